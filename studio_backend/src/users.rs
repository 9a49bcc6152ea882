use crate::database::models::UserRecord;
use crate::database::repositories::{FollowRepository, ShowcaseRepository, UserRepository};
use crate::database::Database;
use crate::error::{StudioError, StudioResult};
use crate::mentions::MentionResolver;
use crate::notifications::{NotificationEvent, NotificationService};
use crate::utils::now_utc_iso;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterInput {
    pub username: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateProfileInput {
    /// None keeps the current username; a new value must stay unique.
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub cover_url: Option<String>,
    #[serde(default)]
    pub social_links: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub user: UserRecord,
    pub follower_ids: Vec<String>,
    pub following_ids: Vec<String>,
    pub showcase_count: i64,
}

fn is_valid_username(username: &str) -> bool {
    !username.is_empty()
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[derive(Clone)]
pub struct UserService {
    database: Database,
    notifications: NotificationService,
    mentions: MentionResolver,
}

impl UserService {
    pub fn new(database: Database, notifications: NotificationService) -> Self {
        let mentions = MentionResolver::new(database.clone(), notifications.clone());
        Self {
            database,
            notifications,
            mentions,
        }
    }

    /// First sign-in creates the profile; signing in again with the same
    /// username returns the existing one.
    pub fn register(&self, input: RegisterInput) -> StudioResult<UserRecord> {
        let username = input.username.trim();
        if !is_valid_username(username) {
            return Err(StudioError::BadRequest(format!(
                "invalid username: {username:?} (letters, digits and underscores only)"
            )));
        }
        if let Some(existing) = self
            .database
            .with_repositories(|repos| repos.users().get_by_username(username))?
        {
            return Ok(existing);
        }

        let record = UserRecord {
            id: Uuid::new_v4().to_string(),
            username: username.to_string(),
            first_name: input.first_name,
            last_name: input.last_name,
            bio: None,
            avatar_url: input.avatar_url,
            cover_url: None,
            social_links: Vec::new(),
            created_at: now_utc_iso(),
        };
        self.database
            .with_repositories(|repos| repos.users().upsert(&record))?;
        tracing::info!(user_id = %record.id, username = %record.username, "registered user");
        Ok(record)
    }

    pub fn get_profile(&self, username: &str) -> StudioResult<UserProfile> {
        let profile = self.database.with_repositories(|repos| {
            let Some(user) = repos.users().get_by_username(username)? else {
                return Ok(None);
            };
            let follower_ids = repos.follows().follower_ids(&user.id)?;
            let following_ids = repos.follows().following_ids(&user.id)?;
            let showcase_count = repos.showcases().count_for_owner(&user.id)?;
            Ok(Some(UserProfile {
                user,
                follower_ids,
                following_ids,
                showcase_count,
            }))
        })?;
        profile.ok_or(StudioError::NotFound("user"))
    }

    pub fn update_profile(
        &self,
        user_id: &str,
        input: UpdateProfileInput,
    ) -> StudioResult<UserRecord> {
        let mut user = self
            .database
            .with_repositories(|repos| repos.users().get(user_id))?
            .ok_or(StudioError::Unauthorized)?;

        if let Some(new_username) = &input.username {
            let new_username = new_username.trim();
            if !is_valid_username(new_username) {
                return Err(StudioError::BadRequest(format!(
                    "invalid username: {new_username:?} (letters, digits and underscores only)"
                )));
            }
            if new_username != user.username {
                let taken = self
                    .database
                    .with_repositories(|repos| repos.users().get_by_username(new_username))?;
                if taken.is_some() {
                    return Err(StudioError::Conflict(format!(
                        "username {new_username} is already taken"
                    )));
                }
                user.username = new_username.to_string();
            }
        }

        let bio_changed = input.bio != user.bio;
        user.first_name = input.first_name;
        user.last_name = input.last_name;
        user.bio = input.bio;
        user.avatar_url = input.avatar_url;
        user.cover_url = input.cover_url;
        user.social_links = input.social_links;

        self.database
            .with_repositories(|repos| repos.users().upsert(&user))?;

        // A freshly written bio can mention other artists.
        if bio_changed {
            if let Some(bio) = &user.bio {
                self.mentions.notify_mentions(bio, &user, None, None)?;
            }
        }
        Ok(user)
    }

    /// Idempotent; following yourself is a no-op. A new edge notifies the
    /// followed user.
    pub fn follow(&self, follower_id: &str, username: &str) -> StudioResult<bool> {
        let (follower, target) = self.lookup_pair(follower_id, username)?;
        if follower.id == target.id {
            return Ok(false);
        }
        let created = self.database.with_repositories(|repos| {
            repos
                .follows()
                .follow(&follower.id, &target.id, &now_utc_iso())
        })?;
        if created {
            self.notifications
                .notify(&NotificationEvent::follow(&follower, &target.id))?;
        }
        Ok(created)
    }

    pub fn unfollow(&self, follower_id: &str, username: &str) -> StudioResult<bool> {
        let (follower, target) = self.lookup_pair(follower_id, username)?;
        Ok(self
            .database
            .with_repositories(|repos| repos.follows().unfollow(&follower.id, &target.id))?)
    }

    pub fn mention_suggestions(
        &self,
        user_id: &str,
        partial: &str,
    ) -> StudioResult<Vec<crate::mentions::MentionSuggestion>> {
        self.mentions.suggestions(user_id, partial)
    }

    fn lookup_pair(
        &self,
        follower_id: &str,
        username: &str,
    ) -> StudioResult<(UserRecord, UserRecord)> {
        let (follower, target) = self.database.with_repositories(|repos| {
            Ok((
                repos.users().get(follower_id)?,
                repos.users().get_by_username(username)?,
            ))
        })?;
        let follower = follower.ok_or(StudioError::Unauthorized)?;
        let target = target.ok_or(StudioError::NotFound("user"))?;
        Ok((follower, target))
    }
}
