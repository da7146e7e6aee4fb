use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use super::domain::Title;
use crate::errors::ServiceError;

/// Persistence gateway for titles.
#[async_trait]
pub trait TitleRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> Result<Option<Title>, ServiceError>;
    async fn find_all_by_owner(&self, owner_id: Uuid) -> Result<Vec<Title>, ServiceError>;
    /// Insert when `title.id` is `None` (assigning an id), otherwise overwrite that row.
    async fn save(&self, title: Title) -> Result<Title, ServiceError>;
    async fn delete_by_id(&self, id: i32) -> Result<(), ServiceError>;
    /// Titles of `owner_id` with a due date in `[start, end]`.
    async fn find_by_due_date_range(&self, owner_id: Uuid, start: NaiveDate, end: NaiveDate) -> Result<Vec<Title>, ServiceError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicI32, AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockTitleRepository {
        titles: Mutex<BTreeMap<i32, Title>>, // key: id
        last_id: AtomicI32,
        writes: AtomicUsize,
    }

    impl MockTitleRepository {
        /// Number of `save` and `delete_by_id` calls so far.
        pub fn writes(&self) -> usize { self.writes.load(Ordering::SeqCst) }
    }

    fn poisoned<T>(e: std::sync::PoisonError<T>) -> ServiceError {
        ServiceError::Db(e.to_string())
    }

    #[async_trait]
    impl TitleRepository for MockTitleRepository {
        async fn find_by_id(&self, id: i32) -> Result<Option<Title>, ServiceError> {
            let titles = self.titles.lock().map_err(poisoned)?;
            Ok(titles.get(&id).cloned())
        }

        async fn find_all_by_owner(&self, owner_id: Uuid) -> Result<Vec<Title>, ServiceError> {
            let titles = self.titles.lock().map_err(poisoned)?;
            Ok(titles.values().filter(|t| t.owner_id == owner_id).cloned().collect())
        }

        async fn save(&self, mut title: Title) -> Result<Title, ServiceError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            let mut titles = self.titles.lock().map_err(poisoned)?;
            let id = match title.id {
                Some(id) => {
                    self.last_id.fetch_max(id, Ordering::SeqCst);
                    id
                }
                None => self.last_id.fetch_add(1, Ordering::SeqCst) + 1,
            };
            title.id = Some(id);
            titles.insert(id, title.clone());
            Ok(title)
        }

        async fn delete_by_id(&self, id: i32) -> Result<(), ServiceError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            let mut titles = self.titles.lock().map_err(poisoned)?;
            titles.remove(&id);
            Ok(())
        }

        async fn find_by_due_date_range(&self, owner_id: Uuid, start: NaiveDate, end: NaiveDate) -> Result<Vec<Title>, ServiceError> {
            let titles = self.titles.lock().map_err(poisoned)?;
            let mut found: Vec<Title> = titles
                .values()
                .filter(|t| t.owner_id == owner_id && t.due_date >= start && t.due_date <= end)
                .cloned()
                .collect();
            found.sort_by_key(|t| (t.due_date, t.id));
            Ok(found)
        }
    }
}
