use crate::database::models::LikeEntry;
use crate::database::repositories::{
    CommentRepository, LikeRepository, ShowcaseRepository, UserRepository,
};
use crate::database::Database;
use crate::error::{StudioError, StudioResult};
use crate::notifications::{NotificationEvent, NotificationService};
use crate::utils::now_utc_iso;
use serde::{Deserialize, Serialize};

/// Membership list plus the denormalized counter, which stay equal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LikesView {
    pub count: i64,
    pub likers: Vec<LikeEntry>,
}

#[derive(Clone)]
pub struct LikeService {
    database: Database,
    notifications: NotificationService,
}

impl LikeService {
    pub fn new(database: Database, notifications: NotificationService) -> Self {
        Self {
            database,
            notifications,
        }
    }

    /// Returns whether membership changed. Liking a missing showcase is a
    /// silent no-op; liking twice is a no-op for the row, the counter and
    /// the notification alike.
    pub fn like_showcase(&self, showcase_id: &str, user_id: &str) -> StudioResult<bool> {
        let created_at = now_utc_iso();
        let (liker, showcase, changed) = self.database.with_repositories(|repos| {
            let liker = repos.users().get(user_id)?;
            let showcase = repos.showcases().get(showcase_id)?;
            let changed = match (&liker, &showcase) {
                (Some(_), Some(_)) => repos.likes().like_showcase(showcase_id, user_id, &created_at)?,
                _ => false,
            };
            Ok((liker, showcase, changed))
        })?;
        let liker = liker.ok_or(StudioError::Unauthorized)?;
        let Some(showcase) = showcase else {
            return Ok(false);
        };
        if changed {
            self.notifications
                .notify(&NotificationEvent::like_showcase(&liker, &showcase))?;
        }
        Ok(changed)
    }

    pub fn unlike_showcase(&self, showcase_id: &str, user_id: &str) -> StudioResult<bool> {
        self.database
            .with_repositories(|repos| {
                if repos.users().get(user_id)?.is_none() {
                    return Ok(None);
                }
                if repos.showcases().get(showcase_id)?.is_none() {
                    return Ok(Some(false));
                }
                Ok(Some(repos.likes().unlike_showcase(showcase_id, user_id)?))
            })?
            .ok_or(StudioError::Unauthorized)
    }

    pub fn like_comment(&self, comment_id: &str, user_id: &str) -> StudioResult<bool> {
        let created_at = now_utc_iso();
        let (liker, comment, changed) = self.database.with_repositories(|repos| {
            let liker = repos.users().get(user_id)?;
            let comment = repos.comments().get(comment_id)?;
            let changed = match (&liker, &comment) {
                (Some(_), Some(_)) => repos.likes().like_comment(comment_id, user_id, &created_at)?,
                _ => false,
            };
            Ok((liker, comment, changed))
        })?;
        let liker = liker.ok_or(StudioError::Unauthorized)?;
        let Some(comment) = comment else {
            return Ok(false);
        };
        if changed {
            self.notifications
                .notify(&NotificationEvent::like_comment(&liker, &comment))?;
        }
        Ok(changed)
    }

    pub fn unlike_comment(&self, comment_id: &str, user_id: &str) -> StudioResult<bool> {
        self.database
            .with_repositories(|repos| {
                if repos.users().get(user_id)?.is_none() {
                    return Ok(None);
                }
                if repos.comments().get(comment_id)?.is_none() {
                    return Ok(Some(false));
                }
                Ok(Some(repos.likes().unlike_comment(comment_id, user_id)?))
            })?
            .ok_or(StudioError::Unauthorized)
    }

    pub fn showcase_likes(&self, showcase_id: &str) -> StudioResult<LikesView> {
        let view = self.database.with_repositories(|repos| {
            let Some(showcase) = repos.showcases().get(showcase_id)? else {
                return Ok(None);
            };
            let likers = repos.likes().showcase_likers(showcase_id)?;
            Ok(Some(LikesView {
                count: showcase.like_count,
                likers,
            }))
        })?;
        view.ok_or(StudioError::NotFound("showcase"))
    }

    pub fn comment_likes(&self, comment_id: &str) -> StudioResult<LikesView> {
        let view = self.database.with_repositories(|repos| {
            let Some(comment) = repos.comments().get(comment_id)? else {
                return Ok(None);
            };
            let likers = repos.likes().comment_likers(comment_id)?;
            Ok(Some(LikesView {
                count: comment.like_count,
                likers,
            }))
        })?;
        view.ok_or(StudioError::NotFound("comment"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comments::CommentService;
    use crate::database::models::{NotificationKind, ShowcaseRecord, UserRecord};
    use crate::realtime::RealtimeBridge;
    use rusqlite::Connection;

    fn setup() -> (LikeService, CommentService, NotificationService, Database) {
        let conn = Connection::open_in_memory().expect("in-memory db");
        let database = Database::from_connection(conn, true);
        database.ensure_migrations().expect("migrations");
        let notifications = NotificationService::new(database.clone(), RealtimeBridge::new(8));
        let likes = LikeService::new(database.clone(), notifications.clone());
        let comments = CommentService::new(database.clone(), notifications.clone());
        (likes, comments, notifications, database)
    }

    fn seed_user(database: &Database, id: &str, username: &str) {
        let record = UserRecord {
            id: id.into(),
            username: username.into(),
            first_name: None,
            last_name: None,
            bio: None,
            avatar_url: None,
            cover_url: None,
            social_links: Vec::new(),
            created_at: now_utc_iso(),
        };
        database
            .with_repositories(|repos| repos.users().upsert(&record))
            .expect("seed user");
    }

    fn seed_showcase(database: &Database, id: &str, owner_id: &str) {
        let record = ShowcaseRecord {
            id: id.into(),
            owner_id: owner_id.into(),
            url: format!("https://storage.example/{id}"),
            storage_key: format!("objects/{id}"),
            media_kind: "image".into(),
            caption: "night market".into(),
            tags: Vec::new(),
            privacy: "public".into(),
            comment_count: 0,
            like_count: 0,
            created_at: now_utc_iso(),
        };
        database
            .with_repositories(|repos| repos.showcases().create(&record))
            .expect("seed showcase");
    }

    #[test]
    fn like_is_idempotent() {
        let (likes, _comments, notifications, database) = setup();
        seed_user(&database, "user-1", "mina");
        seed_user(&database, "user-2", "theo");
        seed_showcase(&database, "showcase-1", "user-1");

        assert!(likes.like_showcase("showcase-1", "user-2").unwrap());
        assert!(!likes.like_showcase("showcase-1", "user-2").unwrap());

        let view = likes.showcase_likes("showcase-1").unwrap();
        assert_eq!(view.count, 1);
        assert_eq!(view.likers.len(), 1);
        assert_eq!(view.likers[0].user_id, "user-2");

        // Exactly one LIKE_SHOWCASE notification despite the repeat.
        let listed = notifications.list("user-1").unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].kind, NotificationKind::LikeShowcase);
    }

    #[test]
    fn unlike_restores_the_previous_state() {
        let (likes, _comments, _notifications, database) = setup();
        seed_user(&database, "user-1", "mina");
        seed_user(&database, "user-2", "theo");
        seed_showcase(&database, "showcase-1", "user-1");

        likes.like_showcase("showcase-1", "user-2").unwrap();
        assert!(likes.unlike_showcase("showcase-1", "user-2").unwrap());
        assert!(!likes.unlike_showcase("showcase-1", "user-2").unwrap());

        let view = likes.showcase_likes("showcase-1").unwrap();
        assert_eq!(view.count, 0);
        assert!(view.likers.is_empty());
    }

    #[test]
    fn like_unlike_like_ends_with_exactly_one_entry() {
        let (likes, comments, _notifications, database) = setup();
        seed_user(&database, "user-1", "mina");
        seed_user(&database, "user-2", "theo");
        seed_showcase(&database, "showcase-1", "user-1");
        let comment = comments
            .post_comment("showcase-1", "love the light", "user-1")
            .unwrap();

        likes.like_comment(&comment.id, "user-2").unwrap();
        likes.unlike_comment(&comment.id, "user-2").unwrap();
        likes.like_comment(&comment.id, "user-2").unwrap();

        let view = likes.comment_likes(&comment.id).unwrap();
        assert_eq!(view.count, 1);
        assert_eq!(view.likers.len(), 1);
        assert_eq!(view.likers[0].user_id, "user-2");
    }

    #[test]
    fn liking_a_missing_target_is_a_silent_no_op() {
        let (likes, _comments, notifications, database) = setup();
        seed_user(&database, "user-2", "theo");
        assert!(!likes.like_showcase("showcase-404", "user-2").unwrap());
        assert!(!likes.like_comment("comment-404", "user-2").unwrap());
        assert!(notifications.list("user-2").unwrap().is_empty());
    }

    #[test]
    fn liking_your_own_work_notifies_nobody() {
        let (likes, _comments, notifications, database) = setup();
        seed_user(&database, "user-1", "mina");
        seed_showcase(&database, "showcase-1", "user-1");

        assert!(likes.like_showcase("showcase-1", "user-1").unwrap());
        assert_eq!(likes.showcase_likes("showcase-1").unwrap().count, 1);
        assert!(notifications.list("user-1").unwrap().is_empty());
    }

    #[test]
    fn counter_matches_membership_after_mixed_sequences() {
        let (likes, _comments, _notifications, database) = setup();
        seed_user(&database, "user-1", "mina");
        seed_user(&database, "user-2", "theo");
        seed_user(&database, "user-3", "iris");
        seed_showcase(&database, "showcase-1", "user-1");

        likes.like_showcase("showcase-1", "user-2").unwrap();
        likes.like_showcase("showcase-1", "user-3").unwrap();
        likes.like_showcase("showcase-1", "user-2").unwrap();
        likes.unlike_showcase("showcase-1", "user-3").unwrap();
        likes.like_showcase("showcase-1", "user-3").unwrap();
        likes.unlike_showcase("showcase-1", "user-2").unwrap();

        let view = likes.showcase_likes("showcase-1").unwrap();
        assert_eq!(view.count, view.likers.len() as i64);
        assert_eq!(view.count, 1);
        assert_eq!(view.likers[0].user_id, "user-3");
    }
}
