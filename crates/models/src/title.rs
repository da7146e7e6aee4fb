//! `title` entity: a financial title (bill) owned by a user.
use sea_orm::{entity::prelude::*, Set, NotSet, DatabaseConnection, QueryFilter, QueryOrder};
use uuid::Uuid;
use serde::{Deserialize, Serialize};

use crate::{errors, user};

pub const KIND_MAX_LEN: usize = 32;
pub const DESCRIPTION_MAX_LEN: usize = 255;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "title")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub owner_id: Uuid,
    pub kind: String,
    pub due_date: Date,
    pub value: f64,
    pub description: String,
    pub registered_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Owner }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Owner => Entity::belongs_to(user::Entity)
                .from(Column::OwnerId)
                .to(user::Column::Id)
                .into(),
        }
    }
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef { Relation::Owner.def() }
}

impl ActiveModelBehavior for ActiveModel {}

/// Column values of a title row, without the primary key.
#[derive(Clone, Debug, PartialEq)]
pub struct TitleData {
    pub owner_id: Uuid,
    pub kind: String,
    pub due_date: Date,
    pub value: f64,
    pub description: String,
    pub registered_at: DateTimeWithTimeZone,
}

pub fn validate_kind(kind: &str) -> Result<(), errors::ModelError> {
    if kind.trim().is_empty() {
        return Err(errors::ModelError::Validation("type must not be blank".into()));
    }
    if kind.chars().count() > KIND_MAX_LEN {
        return Err(errors::ModelError::Validation(format!("type too long (<={KIND_MAX_LEN})")));
    }
    Ok(())
}

pub fn validate_description(description: &str) -> Result<(), errors::ModelError> {
    if description.chars().count() > DESCRIPTION_MAX_LEN {
        return Err(errors::ModelError::Validation(format!("description too long (<={DESCRIPTION_MAX_LEN})")));
    }
    Ok(())
}

pub fn validate_value(value: f64) -> Result<(), errors::ModelError> {
    if !value.is_finite() {
        return Err(errors::ModelError::Validation("value must be a finite number".into()));
    }
    Ok(())
}

impl TitleData {
    pub fn validate(&self) -> Result<(), errors::ModelError> {
        validate_kind(&self.kind)?;
        validate_description(&self.description)?;
        validate_value(self.value)
    }

    fn into_active_model(self, id: Option<i32>) -> ActiveModel {
        ActiveModel {
            id: id.map(Set).unwrap_or(NotSet),
            owner_id: Set(self.owner_id),
            kind: Set(self.kind),
            due_date: Set(self.due_date),
            value: Set(self.value),
            description: Set(self.description),
            registered_at: Set(self.registered_at),
        }
    }
}

/// Insert a new row; the database assigns the id.
pub async fn insert(db: &DatabaseConnection, data: TitleData) -> Result<Model, errors::ModelError> {
    data.validate()?;
    data.into_active_model(None)
        .insert(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}

/// Overwrite every column of row `id`, inserting it under that id when absent.
pub async fn upsert(db: &DatabaseConnection, id: i32, data: TitleData) -> Result<Model, errors::ModelError> {
    data.validate()?;
    let exists = Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))?
        .is_some();
    let am = data.into_active_model(Some(id));
    let saved = if exists { am.update(db).await } else { am.insert(db).await };
    saved.map_err(|e| errors::ModelError::Db(e.to_string()))
}

pub async fn find(db: &DatabaseConnection, id: i32) -> Result<Option<Model>, errors::ModelError> {
    Entity::find_by_id(id).one(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

pub async fn find_by_owner(db: &DatabaseConnection, owner_id: Uuid) -> Result<Vec<Model>, errors::ModelError> {
    Entity::find()
        .filter(Column::OwnerId.eq(owner_id))
        .order_by_asc(Column::Id)
        .all(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}

/// Titles of `owner_id` due within `[start, end]`, earliest first.
pub async fn find_by_owner_and_due_date_range(
    db: &DatabaseConnection,
    owner_id: Uuid,
    start: Date,
    end: Date,
) -> Result<Vec<Model>, errors::ModelError> {
    Entity::find()
        .filter(Column::OwnerId.eq(owner_id))
        .filter(Column::DueDate.between(start, end))
        .order_by_asc(Column::DueDate)
        .order_by_asc(Column::Id)
        .all(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}

/// Returns whether a row was removed.
pub async fn delete(db: &DatabaseConnection, id: i32) -> Result<bool, errors::ModelError> {
    let res = Entity::delete_by_id(id).exec(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))?;
    Ok(res.rows_affected > 0)
}
