use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use models::title::{self, TitleData};

use crate::errors::ServiceError;
use crate::title::domain::Title;
use crate::title::repository::TitleRepository;

/// SeaORM-backed repository implementation.
pub struct SeaOrmTitleRepository {
    pub db: DatabaseConnection,
}

fn to_title(m: title::Model) -> Title {
    Title {
        id: Some(m.id),
        kind: m.kind,
        due_date: m.due_date,
        value: m.value,
        description: m.description,
        registered_at: m.registered_at.with_timezone(&Utc),
        owner_id: m.owner_id,
    }
}

fn to_data(t: Title) -> (Option<i32>, TitleData) {
    let data = TitleData {
        owner_id: t.owner_id,
        kind: t.kind,
        due_date: t.due_date,
        value: t.value,
        description: t.description,
        registered_at: t.registered_at.into(),
    };
    (t.id, data)
}

#[async_trait]
impl TitleRepository for SeaOrmTitleRepository {
    async fn find_by_id(&self, id: i32) -> Result<Option<Title>, ServiceError> {
        Ok(title::find(&self.db, id).await?.map(to_title))
    }

    async fn find_all_by_owner(&self, owner_id: Uuid) -> Result<Vec<Title>, ServiceError> {
        let rows = title::find_by_owner(&self.db, owner_id).await?;
        Ok(rows.into_iter().map(to_title).collect())
    }

    async fn save(&self, t: Title) -> Result<Title, ServiceError> {
        let saved = match to_data(t) {
            (None, data) => title::insert(&self.db, data).await?,
            (Some(id), data) => title::upsert(&self.db, id, data).await?,
        };
        Ok(to_title(saved))
    }

    async fn delete_by_id(&self, id: i32) -> Result<(), ServiceError> {
        title::delete(&self.db, id).await?;
        Ok(())
    }

    async fn find_by_due_date_range(&self, owner_id: Uuid, start: NaiveDate, end: NaiveDate) -> Result<Vec<Title>, ServiceError> {
        let rows = title::find_by_owner_and_due_date_range(&self.db, owner_id, start, end).await?;
        Ok(rows.into_iter().map(to_title).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{get_db, seed_user};

    fn sample(owner_id: Uuid, due: NaiveDate) -> Title {
        Title {
            id: None,
            kind: "INVOICE".into(),
            due_date: due,
            value: 100.0,
            description: "rent".into(),
            registered_at: Utc::now(),
            owner_id,
        }
    }

    #[tokio::test]
    async fn save_assigns_id_then_overwrites() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let owner = seed_user(&db, "seaorm_title@example.com").await?;
        let repo = SeaOrmTitleRepository { db };
        let due = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

        let created = repo.save(sample(owner, due)).await?;
        let id = created.id.unwrap();

        let mut changed = created.clone();
        changed.description = "office rent".into();
        changed.value = 120.0;
        repo.save(changed).await?;

        let found = repo.find_by_id(id).await?.unwrap();
        assert_eq!(found.description, "office rent");
        assert_eq!(found.value, 120.0);
        assert_eq!(found.owner_id, owner);
        // registration date survives the round trip through the store
        assert!((found.registered_at - created.registered_at).num_seconds().abs() <= 1);

        repo.delete_by_id(id).await?;
        assert!(repo.find_by_id(id).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn range_query_respects_owner_and_bounds() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let alice = seed_user(&db, "alice_range@example.com").await?;
        let bob = seed_user(&db, "bob_range@example.com").await?;
        let repo = SeaOrmTitleRepository { db };
        let d = |m: u32| NaiveDate::from_ymd_opt(2024, m, 15).unwrap();

        repo.save(sample(alice, d(1))).await?;
        repo.save(sample(alice, d(2))).await?;
        repo.save(sample(alice, d(6))).await?;
        repo.save(sample(bob, d(2))).await?;

        let found = repo.find_by_due_date_range(alice, d(1), d(3)).await?;
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|t| t.owner_id == alice));
        assert_eq!(repo.find_all_by_owner(bob).await?.len(), 1);
        Ok(())
    }
}
