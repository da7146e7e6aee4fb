use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("database error: {0}")]
    Db(String),
    #[error("model error: {0}")]
    Model(#[from] models::errors::ModelError),
}

impl ServiceError {
    /// Same message whether the title is missing or belongs to someone else.
    pub fn title_not_found(id: i32) -> Self {
        Self::NotFound(format!("could not find title with id: {id}"))
    }

    pub fn invalid_title() -> Self { Self::BadRequest("invalid title".into()) }
}
