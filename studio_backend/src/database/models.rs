use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub cover_url: Option<String>,
    pub social_links: Vec<String>,
    pub created_at: String,
}

impl UserRecord {
    /// Name shown in notification snapshots and mention links.
    pub fn display_name(&self) -> &str {
        &self.username
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShowcaseRecord {
    pub id: String,
    pub owner_id: String,
    pub url: String,
    pub storage_key: String,
    pub media_kind: String, // 'image', 'video' or 'gif'
    pub caption: String,
    pub tags: Vec<String>,
    pub privacy: String, // 'private' or 'public'
    pub comment_count: i64,
    pub like_count: i64,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentRecord {
    pub id: String,
    pub showcase_id: String,
    pub author_id: String,
    pub content: String,
    pub parent_id: Option<String>,
    pub is_reply: bool,
    pub like_count: i64,
    pub created_at: String,
}

/// One user's like on a showcase or comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LikeEntry {
    pub user_id: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlbumRecord {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    Follow,
    Comment,
    Reply,
    LikeComment,
    LikeShowcase,
    AddShowcase,
    Mention,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Follow => "FOLLOW",
            NotificationKind::Comment => "COMMENT",
            NotificationKind::Reply => "REPLY",
            NotificationKind::LikeComment => "LIKE_COMMENT",
            NotificationKind::LikeShowcase => "LIKE_SHOWCASE",
            NotificationKind::AddShowcase => "ADD_SHOWCASE",
            NotificationKind::Mention => "MENTION",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "FOLLOW" => Some(NotificationKind::Follow),
            "COMMENT" => Some(NotificationKind::Comment),
            "REPLY" => Some(NotificationKind::Reply),
            "LIKE_COMMENT" => Some(NotificationKind::LikeComment),
            "LIKE_SHOWCASE" => Some(NotificationKind::LikeShowcase),
            "ADD_SHOWCASE" => Some(NotificationKind::AddShowcase),
            "MENTION" => Some(NotificationKind::Mention),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRecord {
    pub id: String,
    pub recipient_id: String,
    pub sender_id: String,
    pub showcase_id: Option<String>,
    pub comment_id: Option<String>,
    pub kind: NotificationKind,
    pub is_read: bool,
    /// Snapshot captured at creation time; later profile edits must not
    /// alter historical notification text.
    pub sender_name: String,
    pub title: String,
    pub content: String,
    pub created_at: String,
}

/// A notification joined with the sender's current profile for display:
/// current name/avatar for "who", immutable snapshot for "what was said".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationListItem {
    pub notification: NotificationRecord,
    pub sender_username: Option<String>,
    pub sender_avatar_url: Option<String>,
}
