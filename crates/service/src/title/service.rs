use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, instrument};

use super::domain::{parse_period_marker, Title, TitleRequest, TitleResponse};
use super::repository::TitleRepository;
use crate::auth::CurrentUser;
use crate::errors::ServiceError;

/// Title business service. Every operation is scoped to the calling user.
pub struct TitleService<R: TitleRepository> {
    repo: Arc<R>,
}

impl<R: TitleRepository> TitleService<R> {
    pub fn new(repo: Arc<R>) -> Self { Self { repo } }

    /// All titles owned by `user`.
    #[instrument(skip(self), fields(user_id = %user.id))]
    pub async fn list_all(&self, user: &CurrentUser) -> Result<Vec<TitleResponse>, ServiceError> {
        let titles = self.repo.find_all_by_owner(user.id).await?;
        debug!(count = titles.len(), "titles_listed");
        to_responses(titles)
    }

    /// Fetch one title. A title owned by someone else is reported as missing.
    ///
    /// # Examples
    /// ```
    /// use service::auth::CurrentUser;
    /// use service::title::{TitleRequest, TitleService};
    /// use service::title::repository::mock::MockTitleRepository;
    /// use std::sync::Arc;
    /// let svc = TitleService::new(Arc::new(MockTitleRepository::default()));
    /// let alice = CurrentUser::new(uuid::Uuid::new_v4());
    /// let req = TitleRequest {
    ///     kind: Some("INVOICE".into()),
    ///     due_date: chrono::NaiveDate::from_ymd_opt(2024, 1, 1),
    ///     value: Some(100.0),
    ///     description: Some("rent".into()),
    /// };
    /// let created = tokio_test::block_on(svc.create(&alice, req)).unwrap();
    /// assert_eq!(created.owner_id, alice.id);
    ///
    /// let fetched = tokio_test::block_on(svc.get_by_id(&alice, created.id)).unwrap();
    /// assert_eq!(fetched.kind, "INVOICE");
    /// assert_eq!(fetched.description, "rent");
    ///
    /// let bob = CurrentUser::new(uuid::Uuid::new_v4());
    /// assert!(tokio_test::block_on(svc.get_by_id(&bob, created.id)).is_err());
    /// ```
    #[instrument(skip(self), fields(user_id = %user.id))]
    pub async fn get_by_id(&self, user: &CurrentUser, id: i32) -> Result<TitleResponse, ServiceError> {
        TitleResponse::try_from(self.find_owned(user, id).await?)
    }

    #[instrument(skip(self, req), fields(user_id = %user.id))]
    pub async fn create(&self, user: &CurrentUser, req: TitleRequest) -> Result<TitleResponse, ServiceError> {
        let fields = req.validate()?;
        let saved = self.repo.save(fields.into_title(None, user, Utc::now())).await?;
        let resp = TitleResponse::try_from(saved)?;
        info!(title_id = resp.id, "title_created");
        Ok(resp)
    }

    /// Replace the client-settable fields of an owned title. The registration
    /// date and owner are kept.
    #[instrument(skip(self, req), fields(user_id = %user.id))]
    pub async fn update(&self, user: &CurrentUser, id: i32, req: TitleRequest) -> Result<TitleResponse, ServiceError> {
        let existing = self.find_owned(user, id).await?;
        let fields = req.validate()?;
        let saved = self.repo.save(fields.into_title(Some(id), user, existing.registered_at)).await?;
        info!(title_id = id, "title_updated");
        TitleResponse::try_from(saved)
    }

    #[instrument(skip(self), fields(user_id = %user.id))]
    pub async fn delete(&self, user: &CurrentUser, id: i32) -> Result<(), ServiceError> {
        self.find_owned(user, id).await?;
        self.repo.delete_by_id(id).await?;
        info!(title_id = id, "title_deleted");
        Ok(())
    }

    /// Owned titles whose due date falls within `[start, end]`, both inclusive.
    /// Markers may carry a time of day; only the date part is used.
    #[instrument(skip(self), fields(user_id = %user.id))]
    pub async fn list_by_due_date_range(&self, user: &CurrentUser, start: &str, end: &str) -> Result<Vec<TitleResponse>, ServiceError> {
        let start = parse_period_marker(start)?;
        let end = parse_period_marker(end)?;
        let titles = self.repo.find_by_due_date_range(user.id, start, end).await?;
        debug!(%start, %end, count = titles.len(), "cash_flow_listed");
        to_responses(titles)
    }

    async fn find_owned(&self, user: &CurrentUser, id: i32) -> Result<Title, ServiceError> {
        match self.repo.find_by_id(id).await? {
            Some(t) if t.owner_id == user.id => Ok(t),
            Some(_) => {
                debug!(title_id = id, "title_owned_by_other_user");
                Err(ServiceError::title_not_found(id))
            }
            None => Err(ServiceError::title_not_found(id)),
        }
    }
}

fn to_responses(titles: Vec<Title>) -> Result<Vec<TitleResponse>, ServiceError> {
    titles.into_iter().map(TitleResponse::try_from).collect()
}
