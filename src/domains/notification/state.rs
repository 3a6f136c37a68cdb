use crate::environment::types::NotificationRecord;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct NotificationState {
    pub loading: bool,
    /// In the order the server returned them
    pub history: im::Vector<NotificationRecord>,
    pub error: Option<String>,
}
