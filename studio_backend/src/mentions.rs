//! `@username` handling. Mentions are stored as literal text inside the
//! content, exactly as typed; resolution against the user directory happens
//! at submission time (notifications) and at render time (profile links).

use crate::database::models::{CommentRecord, ShowcaseRecord, UserRecord};
use crate::database::repositories::{FollowRepository, UserRepository};
use crate::database::Database;
use crate::error::StudioResult;
use crate::notifications::{NotificationEvent, NotificationService};
use anyhow::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

fn mention_regex() -> &'static Regex {
    static MENTION_RE: OnceLock<Regex> = OnceLock::new();
    MENTION_RE.get_or_init(|| Regex::new(r"@([A-Za-z0-9_]+)").expect("mention regex"))
}

fn leading_mention_regex() -> &'static Regex {
    static LEADING_RE: OnceLock<Regex> = OnceLock::new();
    LEADING_RE.get_or_init(|| Regex::new(r"(?s)^@([A-Za-z0-9_]+)\s*(.*)$").expect("leading regex"))
}

/// Every distinct `@username` token, in order of first appearance.
pub fn extract_mentions(text: &str) -> Vec<String> {
    let mut seen = Vec::new();
    for capture in mention_regex().captures_iter(text) {
        let username = capture[1].to_string();
        if !seen.contains(&username) {
            seen.push(username);
        }
    }
    seen
}

/// Splits a leading mention span from the remainder for display. Returns
/// `(username, rest)`; text without a leading mention renders as-is.
pub fn split_leading_mention(text: &str) -> Option<(String, String)> {
    let capture = leading_mention_regex().captures(text)?;
    Some((capture[1].to_string(), capture[2].to_string()))
}

/// One row in the composer's suggestion dropdown. The "no results" sentinel
/// the composer shows for an empty list is a view concern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MentionSuggestion {
    pub user_id: String,
    pub username: String,
    pub avatar_url: Option<String>,
}

#[derive(Clone)]
pub struct MentionResolver {
    database: Database,
    notifications: NotificationService,
}

impl MentionResolver {
    pub fn new(database: Database, notifications: NotificationService) -> Self {
        Self {
            database,
            notifications,
        }
    }

    /// Composition-time suggestions: the author's followings filtered by
    /// case-insensitive substring on username.
    pub fn suggestions(&self, user_id: &str, partial: &str) -> StudioResult<Vec<MentionSuggestion>> {
        let needle = partial.trim_start_matches('@').to_lowercase();
        let followings = self
            .database
            .with_repositories(|repos| repos.follows().followings_of(user_id))?;
        Ok(followings
            .into_iter()
            .filter(|user| user.username.to_lowercase().contains(&needle))
            .map(|user| MentionSuggestion {
                user_id: user.id,
                username: user.username,
                avatar_url: user.avatar_url,
            })
            .collect())
    }

    /// Resolves every distinct `@username` in `text` against the user
    /// directory and sends one MENTION notification per resolved user.
    /// Unknown tokens are ignored; self-mentions are suppressed by the
    /// fan-out. Returns the number of notifications written.
    pub fn notify_mentions(
        &self,
        text: &str,
        sender: &UserRecord,
        showcase: Option<&ShowcaseRecord>,
        comment: Option<&CommentRecord>,
    ) -> Result<usize> {
        let mut delivered = 0;
        for username in extract_mentions(text) {
            let Some(mentioned) = self
                .database
                .with_repositories(|repos| repos.users().get_by_username(&username))?
            else {
                continue;
            };
            let event = NotificationEvent::mention(
                sender,
                &mentioned.id,
                showcase.map(|s| s.id.clone()),
                comment.map(|c| c.id.clone()),
                text,
            );
            delivered += self.notifications.notify(&event)?;
        }
        Ok(delivered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::repositories::ShowcaseRepository;
    use crate::realtime::RealtimeBridge;
    use crate::utils::now_utc_iso;
    use rusqlite::Connection;

    fn setup() -> (MentionResolver, NotificationService, Database) {
        let conn = Connection::open_in_memory().expect("in-memory db");
        let database = Database::from_connection(conn, true);
        database.ensure_migrations().expect("migrations");
        let notifications =
            NotificationService::new(database.clone(), RealtimeBridge::new(8));
        let resolver = MentionResolver::new(database.clone(), notifications.clone());
        (resolver, notifications, database)
    }

    fn seed_user(database: &Database, id: &str, username: &str) -> UserRecord {
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
        record
    }

    #[test]
    fn extracts_distinct_mentions_in_order() {
        let text = "@mina look, also @theo, and @mina again";
        assert_eq!(extract_mentions(text), vec!["mina", "theo"]);
    }

    #[test]
    fn text_without_mentions_extracts_nothing() {
        assert!(extract_mentions("plain compliment, no handles").is_empty());
        assert!(extract_mentions("mail me at nobody@ (dangling at)").is_empty());
    }

    #[test]
    fn splits_leading_mention_from_remainder() {
        let (username, rest) = split_leading_mention("@mina nice work").unwrap();
        assert_eq!(username, "mina");
        assert_eq!(rest, "nice work");
        assert!(split_leading_mention("nice work @mina").is_none());
    }

    #[test]
    fn suggestions_filter_followings_by_substring() {
        let (resolver, _notifications, database) = setup();
        seed_user(&database, "user-1", "mina");
        seed_user(&database, "user-2", "minotaur");
        seed_user(&database, "user-3", "theo");
        seed_user(&database, "user-9", "viewer");
        database
            .with_repositories(|repos| {
                repos.follows().follow("user-9", "user-1", &now_utc_iso())?;
                repos.follows().follow("user-9", "user-2", &now_utc_iso())?;
                repos.follows().follow("user-9", "user-3", &now_utc_iso())?;
                Ok(())
            })
            .unwrap();

        let hits = resolver.suggestions("user-9", "min").unwrap();
        let names: Vec<_> = hits.iter().map(|s| s.username.as_str()).collect();
        assert_eq!(names, vec!["mina", "minotaur"]);

        // Only the follow graph is searched.
        seed_user(&database, "user-4", "minerva");
        assert_eq!(resolver.suggestions("user-9", "minerva").unwrap().len(), 0);

        assert!(resolver.suggestions("user-9", "zzz").unwrap().is_empty());
    }

    #[test]
    fn notify_mentions_resolves_known_users_once_each() {
        let (resolver, notifications, database) = setup();
        let theo = seed_user(&database, "user-2", "theo");
        seed_user(&database, "user-1", "mina");

        let showcase = ShowcaseRecord {
            id: "showcase-1".into(),
            owner_id: "user-1".into(),
            url: "https://storage.example/s1".into(),
            storage_key: "objects/s1".into(),
            media_kind: "image".into(),
            caption: String::new(),
            tags: Vec::new(),
            privacy: "public".into(),
            comment_count: 0,
            like_count: 0,
            created_at: now_utc_iso(),
        };
        database
            .with_repositories(|repos| repos.showcases().create(&showcase))
            .unwrap();

        let delivered = resolver
            .notify_mentions(
                "@mina great piece @mina @ghost",
                &theo,
                Some(&showcase),
                None,
            )
            .unwrap();
        assert_eq!(delivered, 1);

        let listed = notifications.list("user-1").unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].title, "theo mentioned you");
        assert_eq!(listed[0].showcase_id.as_deref(), Some("showcase-1"));
    }

    #[test]
    fn self_mention_is_suppressed() {
        let (resolver, notifications, database) = setup();
        let mina = seed_user(&database, "user-1", "mina");
        let delivered = resolver
            .notify_mentions("@mina talking to myself", &mina, None, None)
            .unwrap();
        assert_eq!(delivered, 0);
        assert!(notifications.list("user-1").unwrap().is_empty());
    }
}
