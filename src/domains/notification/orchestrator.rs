use super::action::NotificationAction;
use crate::domains::guarded;
use crate::effect::{Effect, RequestId};
use crate::environment::Environment;

pub fn orchestrate(
    action: &NotificationAction,
    environment: &Environment,
) -> Effect<NotificationAction> {
    match action {
        NotificationAction::FetchHistory(id) => {
            let id = *id;
            guarded(
                environment,
                Ok(()),
                |backend| async move { backend.notification_history().await },
                move |r| NotificationAction::HistoryLoaded(id, r),
            )
        }
        NotificationAction::SendTest(id) => {
            let id = *id;
            guarded(
                environment,
                Ok(()),
                |backend| async move { backend.send_test_notification().await },
                move |r| NotificationAction::TestSent(id, r),
            )
        }
        // Show the new entry without a manual refresh
        NotificationAction::TestSent(_, Ok(())) => {
            Effect::action(NotificationAction::FetchHistory(RequestId::next()))
        }
        _ => Effect::NONE,
    }
}
