use crate::database::models::ShowcaseRecord;
use crate::database::repositories::{FollowRepository, ShowcaseRepository, UserRepository};
use crate::database::Database;
use crate::error::{StudioError, StudioResult};
use crate::notifications::{NotificationEvent, NotificationService};
use crate::utils::now_utc_iso;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Derived from the upload's MIME string; stored as its lowercase name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
    Gif,
}

impl MediaKind {
    pub fn from_mime(mime: &str) -> Self {
        let mime = mime.trim().to_ascii_lowercase();
        if mime == "image/gif" {
            MediaKind::Gif
        } else if mime.starts_with("video/") {
            MediaKind::Video
        } else {
            MediaKind::Image
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
            MediaKind::Gif => "gif",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Privacy {
    Private,
    Public,
}

impl Privacy {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "private" => Some(Privacy::Private),
            "public" => Some(Privacy::Public),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Privacy::Private => "private",
            Privacy::Public => "public",
        }
    }
}

/// Tags are stored with a leading `#`, the way the composer displays them.
fn normalize_tags(tags: &[String]) -> Vec<String> {
    tags.iter()
        .map(|tag| tag.trim())
        .filter(|tag| !tag.is_empty() && *tag != "#")
        .map(|tag| {
            if tag.starts_with('#') {
                tag.to_string()
            } else {
                format!("#{tag}")
            }
        })
        .collect()
}

/// Arrives on upload-complete: the object store has already minted
/// `{url, key}`; this service only records them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateShowcaseInput {
    pub url: String,
    pub storage_key: String,
    pub mime: String,
    #[serde(default)]
    pub caption: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub privacy: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateShowcaseInput {
    pub caption: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub privacy: String,
}

#[derive(Clone)]
pub struct ShowcaseService {
    database: Database,
    notifications: NotificationService,
}

impl ShowcaseService {
    pub fn new(database: Database, notifications: NotificationService) -> Self {
        Self {
            database,
            notifications,
        }
    }

    /// Records the uploaded media and announces it to the owner's followers
    /// (ADD_SHOWCASE). Private showcases are not announced.
    pub fn create(&self, owner_id: &str, input: CreateShowcaseInput) -> StudioResult<ShowcaseRecord> {
        if input.url.trim().is_empty() || input.storage_key.trim().is_empty() {
            return Err(StudioError::BadRequest(
                "showcase url and storage key are required".into(),
            ));
        }
        let privacy = match input.privacy.as_deref() {
            None => Privacy::Public,
            Some(raw) => Privacy::parse(raw)
                .ok_or_else(|| StudioError::BadRequest(format!("unknown privacy: {raw}")))?,
        };

        let owner = self
            .database
            .with_repositories(|repos| repos.users().get(owner_id))?
            .ok_or(StudioError::Unauthorized)?;

        let record = ShowcaseRecord {
            id: Uuid::new_v4().to_string(),
            owner_id: owner.id.clone(),
            url: input.url.trim().to_string(),
            storage_key: input.storage_key.trim().to_string(),
            media_kind: MediaKind::from_mime(&input.mime).as_str().to_string(),
            caption: input.caption.trim().to_string(),
            tags: normalize_tags(&input.tags),
            privacy: privacy.as_str().to_string(),
            comment_count: 0,
            like_count: 0,
            created_at: now_utc_iso(),
        };
        self.database
            .with_repositories(|repos| repos.showcases().create(&record))?;

        if privacy == Privacy::Public {
            let follower_ids = self
                .database
                .with_repositories(|repos| repos.follows().follower_ids(&owner.id))?;
            self.notifications.notify(&NotificationEvent::add_showcase(
                &owner,
                &record,
                follower_ids,
            ))?;
        }
        Ok(record)
    }

    /// Private showcases exist only for their owner.
    pub fn get(&self, showcase_id: &str, viewer_id: &str) -> StudioResult<ShowcaseRecord> {
        let showcase = self
            .database
            .with_repositories(|repos| repos.showcases().get(showcase_id))?
            .ok_or(StudioError::NotFound("showcase"))?;
        if showcase.privacy == "private" && showcase.owner_id != viewer_id {
            return Err(StudioError::NotFound("showcase"));
        }
        Ok(showcase)
    }

    pub fn list_for_user(&self, username: &str, viewer_id: &str) -> StudioResult<Vec<ShowcaseRecord>> {
        let showcases = self.database.with_repositories(|repos| {
            let Some(owner) = repos.users().get_by_username(username)? else {
                return Ok(None);
            };
            let include_private = owner.id == viewer_id;
            Ok(Some(
                repos.showcases().list_for_owner(&owner.id, include_private)?,
            ))
        })?;
        showcases.ok_or(StudioError::NotFound("user"))
    }

    pub fn update(
        &self,
        showcase_id: &str,
        owner_id: &str,
        input: UpdateShowcaseInput,
    ) -> StudioResult<ShowcaseRecord> {
        let privacy = Privacy::parse(&input.privacy)
            .ok_or_else(|| StudioError::BadRequest(format!("unknown privacy: {}", input.privacy)))?;
        let mut showcase = self
            .database
            .with_repositories(|repos| repos.showcases().get(showcase_id))?
            .ok_or(StudioError::NotFound("showcase"))?;
        if showcase.owner_id != owner_id {
            return Err(StudioError::Unauthorized);
        }

        showcase.caption = input.caption.trim().to_string();
        showcase.tags = normalize_tags(&input.tags);
        showcase.privacy = privacy.as_str().to_string();
        self.database.with_repositories(|repos| {
            repos.showcases().update_details(
                showcase_id,
                &showcase.caption,
                &showcase.tags,
                &showcase.privacy,
            )
        })?;
        Ok(showcase)
    }

    /// Removes the row; comments and likes cascade. Deleting the backing
    /// media object is the object store's side of the contract, keyed by
    /// `storage_key`.
    pub fn delete(&self, showcase_id: &str, owner_id: &str) -> StudioResult<()> {
        let showcase = self
            .database
            .with_repositories(|repos| repos.showcases().get(showcase_id))?
            .ok_or(StudioError::NotFound("showcase"))?;
        if showcase.owner_id != owner_id {
            return Err(StudioError::Unauthorized);
        }
        self.database
            .with_repositories(|repos| repos.showcases().delete(showcase_id))?;
        tracing::info!(
            showcase_id = %showcase_id,
            storage_key = %showcase.storage_key,
            "showcase deleted, media object cleanup delegated to storage"
        );
        Ok(())
    }
}
