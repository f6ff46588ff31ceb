use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Comment entity - a reader comment on a post.
///
/// Comments belong to exactly one post and are removed with it. The `active`
/// flag is the moderation gate: only active comments are shown to readers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub name: String,
    pub email: String,
    pub body: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    /// Create a new comment. Comments start active and are hidden by
    /// moderation, not the other way round.
    pub fn new(post_id: Uuid, name: String, email: String, body: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            post_id,
            name,
            email,
            body,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Moderation toggle.
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
        self.updated_at = Utc::now();
    }
}
