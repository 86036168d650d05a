use sqlx::prelude::Type;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Type, PartialEq, Eq)]
#[sqlx(type_name = "notification_type", rename_all = "lowercase")]
pub enum NotificationType {
    Follow,
}

/// A notification delivered to `to_user`. Rows are only ever written, never read back.
#[derive(Debug, Clone)]
pub struct Notification {
    pub id: Uuid,
    pub kind: NotificationType,
    pub from_user: Uuid,
    pub to_user: Uuid,
    pub read: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Notification {
    /// A new unread `follow` notification from `from` to `to`.
    pub fn follow(from: Uuid, to: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: NotificationType::Follow,
            from_user: from,
            to_user: to,
            read: false,
            created_at: chrono::Utc::now(),
        }
    }
}
