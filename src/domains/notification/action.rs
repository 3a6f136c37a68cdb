use strum_macros::{Display, IntoStaticStr};

use crate::effect::RequestId;
use crate::environment::error::ApiError;
use crate::environment::types::NotificationRecord;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Display, IntoStaticStr)]
pub enum NotificationOperation {
    FetchHistory,
    SendTest,
}

#[derive(Clone, Debug)]
pub enum NotificationAction {
    FetchHistory(RequestId),
    HistoryLoaded(RequestId, Result<Vec<NotificationRecord>, ApiError>),
    SendTest(RequestId),
    TestSent(RequestId, Result<(), ApiError>),
    ClearError,
    Reset,
}

impl NotificationAction {
    pub fn request(&self) -> Option<(NotificationOperation, RequestId)> {
        match self {
            NotificationAction::FetchHistory(id) => Some((NotificationOperation::FetchHistory, *id)),
            NotificationAction::SendTest(id) => Some((NotificationOperation::SendTest, *id)),
            _ => None,
        }
    }

    pub fn completion(&self) -> Option<(NotificationOperation, RequestId, bool)> {
        match self {
            NotificationAction::HistoryLoaded(id, r) => {
                Some((NotificationOperation::FetchHistory, *id, r.is_ok()))
            }
            NotificationAction::TestSent(id, r) => {
                Some((NotificationOperation::SendTest, *id, r.is_ok()))
            }
            _ => None,
        }
    }
}
