use serde::Serialize;
use utoipa::OpenApi;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(utoipa::ToSchema)]
pub struct RegisterRequest { pub email: String, pub name: String, pub password: String }

#[derive(utoipa::ToSchema)]
pub struct LoginRequest { pub email: String, pub password: String }

/// Every field is required; a missing one is rejected with 400.
#[derive(Serialize, ToSchema)]
pub struct TitleRequestDoc {
    #[serde(rename = "type")]
    pub kind: String,
    /// `YYYY-MM-DD`
    pub due_date: String,
    pub value: f64,
    pub description: String,
}

#[derive(Serialize, ToSchema)]
pub struct TitleResponseDoc {
    pub id: i32,
    #[serde(rename = "type")]
    pub kind: String,
    pub due_date: String,
    pub value: f64,
    pub description: String,
    /// RFC 3339 UTC timestamp
    pub registered_at: String,
    pub owner_id: Uuid,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::auth::logout,
        crate::routes::titles::list,
        crate::routes::titles::create,
        crate::routes::titles::get,
        crate::routes::titles::update,
        crate::routes::titles::delete,
        crate::routes::titles::cash_flow,
    ),
    components(
        schemas(
            HealthResponse,
            RegisterRequest,
            LoginRequest,
            TitleRequestDoc,
            TitleResponseDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "auth"),
        (name = "titles")
    )
)]
pub struct ApiDoc;
