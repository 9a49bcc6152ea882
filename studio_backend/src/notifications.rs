use crate::database::models::{
    CommentRecord, NotificationKind, NotificationRecord, ShowcaseRecord, UserRecord,
};
use crate::database::repositories::NotificationRepository;
use crate::database::Database;
use crate::error::{StudioError, StudioResult};
use crate::realtime::{NotificationPush, RealtimeBridge};
use crate::utils::{excerpt, now_utc_iso};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const EXCERPT_CHARS: usize = 120;

/// A domain event to fan out: one durable row per recipient plus a
/// best-effort push on each recipient's channel.
#[derive(Debug, Clone)]
pub struct NotificationEvent {
    pub kind: NotificationKind,
    pub sender_id: String,
    pub sender_name: String,
    pub showcase_id: Option<String>,
    pub comment_id: Option<String>,
    pub recipients: Vec<String>,
    pub title: String,
    pub content: String,
}

impl NotificationEvent {
    pub fn follow(sender: &UserRecord, recipient_id: &str) -> Self {
        Self {
            kind: NotificationKind::Follow,
            sender_id: sender.id.clone(),
            sender_name: sender.display_name().to_string(),
            showcase_id: None,
            comment_id: None,
            recipients: vec![recipient_id.to_string()],
            title: format!("{} started following you", sender.display_name()),
            content: String::new(),
        }
    }

    pub fn comment(sender: &UserRecord, showcase: &ShowcaseRecord, comment: &CommentRecord) -> Self {
        Self {
            kind: NotificationKind::Comment,
            sender_id: sender.id.clone(),
            sender_name: sender.display_name().to_string(),
            showcase_id: Some(showcase.id.clone()),
            comment_id: Some(comment.id.clone()),
            recipients: vec![showcase.owner_id.clone()],
            title: format!("{} commented on your showcase", sender.display_name()),
            content: excerpt(&comment.content, EXCERPT_CHARS),
        }
    }

    pub fn reply(sender: &UserRecord, parent: &CommentRecord, comment: &CommentRecord) -> Self {
        Self {
            kind: NotificationKind::Reply,
            sender_id: sender.id.clone(),
            sender_name: sender.display_name().to_string(),
            showcase_id: Some(comment.showcase_id.clone()),
            comment_id: Some(comment.id.clone()),
            recipients: vec![parent.author_id.clone()],
            title: format!("{} replied to your comment", sender.display_name()),
            content: excerpt(&comment.content, EXCERPT_CHARS),
        }
    }

    pub fn like_showcase(sender: &UserRecord, showcase: &ShowcaseRecord) -> Self {
        Self {
            kind: NotificationKind::LikeShowcase,
            sender_id: sender.id.clone(),
            sender_name: sender.display_name().to_string(),
            showcase_id: Some(showcase.id.clone()),
            comment_id: None,
            recipients: vec![showcase.owner_id.clone()],
            title: format!("{} liked your showcase", sender.display_name()),
            content: excerpt(&showcase.caption, EXCERPT_CHARS),
        }
    }

    pub fn like_comment(sender: &UserRecord, comment: &CommentRecord) -> Self {
        Self {
            kind: NotificationKind::LikeComment,
            sender_id: sender.id.clone(),
            sender_name: sender.display_name().to_string(),
            showcase_id: Some(comment.showcase_id.clone()),
            comment_id: Some(comment.id.clone()),
            recipients: vec![comment.author_id.clone()],
            title: format!("{} liked your comment", sender.display_name()),
            content: excerpt(&comment.content, EXCERPT_CHARS),
        }
    }

    pub fn add_showcase(
        sender: &UserRecord,
        showcase: &ShowcaseRecord,
        follower_ids: Vec<String>,
    ) -> Self {
        Self {
            kind: NotificationKind::AddShowcase,
            sender_id: sender.id.clone(),
            sender_name: sender.display_name().to_string(),
            showcase_id: Some(showcase.id.clone()),
            comment_id: None,
            recipients: follower_ids,
            title: format!("{} added a new showcase", sender.display_name()),
            content: excerpt(&showcase.caption, EXCERPT_CHARS),
        }
    }

    pub fn mention(
        sender: &UserRecord,
        recipient_id: &str,
        showcase_id: Option<String>,
        comment_id: Option<String>,
        text: &str,
    ) -> Self {
        Self {
            kind: NotificationKind::Mention,
            sender_id: sender.id.clone(),
            sender_name: sender.display_name().to_string(),
            showcase_id,
            comment_id,
            recipients: vec![recipient_id.to_string()],
            title: format!("{} mentioned you", sender.display_name()),
            content: excerpt(text, EXCERPT_CHARS),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationView {
    pub id: String,
    pub kind: NotificationKind,
    pub is_read: bool,
    pub showcase_id: Option<String>,
    pub comment_id: Option<String>,
    pub sender_id: String,
    /// Sender's current username; falls back to the snapshot when the
    /// sender row is gone.
    pub sender_username: String,
    pub sender_avatar_url: Option<String>,
    /// Snapshot captured at creation time.
    pub sender_name: String,
    pub title: String,
    pub content: String,
    pub created_at: String,
}

#[derive(Clone)]
pub struct NotificationService {
    database: Database,
    realtime: RealtimeBridge,
}

impl NotificationService {
    pub fn new(database: Database, realtime: RealtimeBridge) -> Self {
        Self { database, realtime }
    }

    /// Writes one row per recipient and publishes a push on each recipient's
    /// channel. A recipient equal to the sender is skipped entirely for
    /// every event kind: no row, no push. Returns the number of rows written.
    pub fn notify(&self, event: &NotificationEvent) -> Result<usize> {
        let mut delivered = 0;
        for recipient_id in &event.recipients {
            if recipient_id == &event.sender_id {
                continue;
            }
            let record = NotificationRecord {
                id: Uuid::new_v4().to_string(),
                recipient_id: recipient_id.clone(),
                sender_id: event.sender_id.clone(),
                showcase_id: event.showcase_id.clone(),
                comment_id: event.comment_id.clone(),
                kind: event.kind,
                is_read: false,
                sender_name: event.sender_name.clone(),
                title: event.title.clone(),
                content: event.content.clone(),
                created_at: now_utc_iso(),
            };
            self.database
                .with_repositories(|repos| repos.notifications().create(&record))?;
            delivered += 1;

            let push = NotificationPush {
                content: event.content.clone(),
                sender: event.sender_name.clone(),
                title: event.title.clone(),
            };
            // The row is durable; the push is best-effort and must never
            // fail the triggering mutation.
            match self.realtime.publish(recipient_id, push) {
                Ok(0) => {}
                Ok(reached) => {
                    tracing::debug!(recipient = %recipient_id, reached, kind = event.kind.as_str(), "notification push delivered");
                }
                Err(err) => {
                    tracing::warn!(error = ?err, recipient = %recipient_id, "notification push failed");
                }
            }
        }
        Ok(delivered)
    }

    pub fn list(&self, recipient_id: &str) -> StudioResult<Vec<NotificationView>> {
        let items = self
            .database
            .with_repositories(|repos| repos.notifications().list_for_recipient(recipient_id))?;
        Ok(items
            .into_iter()
            .map(|item| {
                let n = item.notification;
                NotificationView {
                    id: n.id,
                    kind: n.kind,
                    is_read: n.is_read,
                    showcase_id: n.showcase_id,
                    comment_id: n.comment_id,
                    sender_id: n.sender_id,
                    sender_username: item
                        .sender_username
                        .unwrap_or_else(|| n.sender_name.clone()),
                    sender_avatar_url: item.sender_avatar_url,
                    sender_name: n.sender_name,
                    title: n.title,
                    content: n.content,
                    created_at: n.created_at,
                }
            })
            .collect())
    }

    pub fn unread_count(&self, recipient_id: &str) -> StudioResult<usize> {
        Ok(self
            .database
            .with_repositories(|repos| repos.notifications().count_unread(recipient_id))?)
    }

    /// Only the recipient may flip the read flag.
    pub fn set_read(&self, notification_id: &str, user_id: &str, is_read: bool) -> StudioResult<()> {
        let notification = self
            .database
            .with_repositories(|repos| repos.notifications().get(notification_id))?
            .ok_or(StudioError::NotFound("notification"))?;
        if notification.recipient_id != user_id {
            return Err(StudioError::Unauthorized);
        }
        if notification.is_read == is_read {
            return Ok(());
        }
        self.database
            .with_repositories(|repos| repos.notifications().set_read(notification_id, is_read))?;
        Ok(())
    }
}
