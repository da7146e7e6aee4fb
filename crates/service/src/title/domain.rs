use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::errors::ServiceError;

/// Persistence shape of a title. `id` stays `None` until the store assigns one.
#[derive(Debug, Clone, PartialEq)]
pub struct Title {
    pub id: Option<i32>,
    pub kind: String,
    pub due_date: NaiveDate,
    pub value: f64,
    pub description: String,
    pub registered_at: DateTime<Utc>,
    pub owner_id: Uuid,
}

/// Client input for create and update. Every field is optional on the wire so
/// that a missing one is reported as a bad request instead of a decode error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TitleRequest {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub value: Option<f64>,
    pub description: Option<String>,
}

/// Client-settable fields of a request that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct TitleFields {
    pub kind: String,
    pub due_date: NaiveDate,
    pub value: f64,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitleResponse {
    pub id: i32,
    #[serde(rename = "type")]
    pub kind: String,
    pub due_date: NaiveDate,
    pub value: f64,
    pub description: String,
    pub registered_at: DateTime<Utc>,
    pub owner_id: Uuid,
}

impl TitleRequest {
    pub fn validate(self) -> Result<TitleFields, ServiceError> {
        match (self.kind, self.due_date, self.value, self.description) {
            (Some(kind), Some(due_date), Some(value), Some(description)) => {
                Ok(TitleFields { kind, due_date, value, description })
            }
            _ => Err(ServiceError::invalid_title()),
        }
    }
}

impl TitleFields {
    /// Build the entity; id, owner and registration date never come from the client.
    pub fn into_title(self, id: Option<i32>, owner: &CurrentUser, registered_at: DateTime<Utc>) -> Title {
        Title {
            id,
            kind: self.kind,
            due_date: self.due_date,
            value: self.value,
            description: self.description,
            registered_at,
            owner_id: owner.id,
        }
    }
}

impl TryFrom<Title> for TitleResponse {
    type Error = ServiceError;

    fn try_from(t: Title) -> Result<Self, Self::Error> {
        let id = t.id.ok_or_else(|| ServiceError::Db("title has no id; it was never persisted".into()))?;
        Ok(Self {
            id,
            kind: t.kind,
            due_date: t.due_date,
            value: t.value,
            description: t.description,
            registered_at: t.registered_at,
            owner_id: t.owner_id,
        })
    }
}

const MARKER_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Parse a cash-flow period marker (`2024-01-31` or `2024-01-31 23:59:59`) into its date.
pub fn parse_period_marker(raw: &str) -> Result<NaiveDate, ServiceError> {
    let s = raw.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(d);
    }
    MARKER_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.date())
        .ok_or_else(|| ServiceError::BadRequest(format!("invalid period marker: {raw:?}")))
}
