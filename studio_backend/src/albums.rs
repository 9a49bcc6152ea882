use crate::database::models::AlbumRecord;
use crate::database::repositories::{AlbumRepository, ShowcaseRepository};
use crate::database::Database;
use crate::error::{StudioError, StudioResult};
use crate::utils::now_utc_iso;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An album with the showcases currently filed under it, newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlbumView {
    pub id: String,
    pub name: String,
    pub created_at: String,
    pub showcase_ids: Vec<String>,
}

#[derive(Clone)]
pub struct AlbumService {
    database: Database,
}

impl AlbumService {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    /// Album names are unique within a gallery; a duplicate is a conflict,
    /// surfaced with the name so the UI can say which one.
    pub fn create(&self, owner_id: &str, name: &str) -> StudioResult<AlbumRecord> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StudioError::BadRequest("album name may not be empty".into()));
        }
        let existing = self
            .database
            .with_repositories(|repos| repos.albums().get_by_name(owner_id, name))?;
        if existing.is_some() {
            return Err(StudioError::Conflict(format!("album {name} already exists")));
        }

        let record = AlbumRecord {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            name: name.to_string(),
            created_at: now_utc_iso(),
        };
        self.database
            .with_repositories(|repos| repos.albums().create(&record))?;
        Ok(record)
    }

    pub fn rename(&self, album_id: &str, owner_id: &str, name: &str) -> StudioResult<AlbumRecord> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StudioError::BadRequest("album name may not be empty".into()));
        }
        let mut album = self.owned_album(album_id, owner_id)?;
        if album.name == name {
            return Ok(album);
        }
        let taken = self
            .database
            .with_repositories(|repos| repos.albums().get_by_name(owner_id, name))?;
        if taken.is_some() {
            return Err(StudioError::Conflict(format!("album {name} already exists")));
        }
        self.database
            .with_repositories(|repos| repos.albums().rename(album_id, name))?;
        album.name = name.to_string();
        Ok(album)
    }

    pub fn delete(&self, album_id: &str, owner_id: &str) -> StudioResult<()> {
        self.owned_album(album_id, owner_id)?;
        self.database
            .with_repositories(|repos| repos.albums().delete(album_id))?;
        Ok(())
    }

    /// Files a showcase under an album. Both must belong to the caller; a
    /// showcase may sit in any number of albums.
    pub fn add_showcase(
        &self,
        album_id: &str,
        showcase_id: &str,
        owner_id: &str,
    ) -> StudioResult<()> {
        self.owned_album(album_id, owner_id)?;
        let showcase = self
            .database
            .with_repositories(|repos| repos.showcases().get(showcase_id))?
            .ok_or(StudioError::NotFound("showcase"))?;
        if showcase.owner_id != owner_id {
            return Err(StudioError::Unauthorized);
        }
        self.database
            .with_repositories(|repos| repos.albums().add_showcase(album_id, showcase_id))?;
        Ok(())
    }

    pub fn remove_showcase(
        &self,
        album_id: &str,
        showcase_id: &str,
        owner_id: &str,
    ) -> StudioResult<bool> {
        self.owned_album(album_id, owner_id)?;
        Ok(self
            .database
            .with_repositories(|repos| repos.albums().remove_showcase(album_id, showcase_id))?)
    }

    pub fn list_for_owner(&self, owner_id: &str) -> StudioResult<Vec<AlbumView>> {
        let views = self.database.with_repositories(|repos| {
            let albums = repos.albums().list_for_owner(owner_id)?;
            let mut views = Vec::with_capacity(albums.len());
            for album in albums {
                let showcase_ids = repos.albums().showcase_ids(&album.id)?;
                views.push(AlbumView {
                    id: album.id,
                    name: album.name,
                    created_at: album.created_at,
                    showcase_ids,
                });
            }
            Ok(views)
        })?;
        Ok(views)
    }

    fn owned_album(&self, album_id: &str, owner_id: &str) -> StudioResult<AlbumRecord> {
        let album = self
            .database
            .with_repositories(|repos| repos.albums().get(album_id))?
            .ok_or(StudioError::NotFound("album"))?;
        if album.owner_id != owner_id {
            return Err(StudioError::Unauthorized);
        }
        Ok(album)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{ShowcaseRecord, UserRecord};
    use crate::database::repositories::UserRepository;
    use rusqlite::Connection;

    fn setup() -> (AlbumService, Database) {
        let conn = Connection::open_in_memory().expect("in-memory db");
        let database = Database::from_connection(conn, true);
        database.ensure_migrations().expect("migrations");
        (AlbumService::new(database.clone()), database)
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
            caption: String::new(),
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
    fn duplicate_album_name_conflicts_per_owner() {
        let (service, database) = setup();
        seed_user(&database, "user-1", "mina");
        seed_user(&database, "user-2", "theo");

        service.create("user-1", "Sketches").unwrap();
        let err = service.create("user-1", "Sketches").unwrap_err();
        assert!(matches!(err, StudioError::Conflict(_)));

        // A different gallery may reuse the name.
        service.create("user-2", "Sketches").unwrap();
    }

    #[test]
    fn showcases_can_join_and_leave_albums() {
        let (service, database) = setup();
        seed_user(&database, "user-1", "mina");
        seed_showcase(&database, "showcase-1", "user-1");

        let album = service.create("user-1", "Ink work").unwrap();
        service
            .add_showcase(&album.id, "showcase-1", "user-1")
            .unwrap();
        // Filing twice is harmless.
        service
            .add_showcase(&album.id, "showcase-1", "user-1")
            .unwrap();

        let listed = service.list_for_owner("user-1").unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].showcase_ids, vec!["showcase-1"]);

        assert!(service
            .remove_showcase(&album.id, "showcase-1", "user-1")
            .unwrap());
        assert!(service.list_for_owner("user-1").unwrap()[0]
            .showcase_ids
            .is_empty());
    }

    #[test]
    fn only_the_owner_touches_an_album() {
        let (service, database) = setup();
        seed_user(&database, "user-1", "mina");
        seed_user(&database, "user-2", "theo");
        let album = service.create("user-1", "Private studies").unwrap();

        let err = service
            .rename(&album.id, "user-2", "Stolen").unwrap_err();
        assert!(matches!(err, StudioError::Unauthorized));
        let err = service.delete(&album.id, "user-2").unwrap_err();
        assert!(matches!(err, StudioError::Unauthorized));

        let renamed = service.rename(&album.id, "user-1", "Figure studies").unwrap();
        assert_eq!(renamed.name, "Figure studies");
        service.delete(&album.id, "user-1").unwrap();
        let err = service.rename(&album.id, "user-1", "Gone").unwrap_err();
        assert!(matches!(err, StudioError::NotFound(_)));
    }
}
