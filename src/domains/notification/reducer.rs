use super::action::NotificationAction;
use super::state::NotificationState;

pub fn reduce(action: &NotificationAction, state: &mut NotificationState) {
    match action {
        NotificationAction::FetchHistory(_) | NotificationAction::SendTest(_) => {
            state.loading = true;
            state.error = None;
        }
        NotificationAction::HistoryLoaded(_, result) => {
            state.loading = false;
            match result {
                Ok(history) => state.history = history.iter().cloned().collect(),
                Err(e) => state.error = Some(e.user_message()),
            }
        }
        NotificationAction::TestSent(_, result) => {
            state.loading = false;
            if let Err(e) = result {
                state.error = Some(e.user_message());
            }
        }
        NotificationAction::ClearError => state.error = None,
        NotificationAction::Reset => *state = NotificationState::default(),
    }
}
