use axum::{extract::{Path, Query, State}, http::StatusCode, Extension, Json};
use serde::Deserialize;
use tracing::info;

use service::auth::CurrentUser;
use service::title::{TitleRequest, TitleResponse};

use crate::errors::JsonApiError;
use crate::routes::auth::ServerState;

#[derive(Debug, Deserialize)]
pub struct CashFlowQuery {
    pub start: Option<String>,
    pub end: Option<String>,
}

#[utoipa::path(get, path = "/api/titles", tag = "titles", responses((status = 200, description = "Titles of the current user", body = [crate::openapi::TitleResponseDoc]), (status = 400, description = "Missing token"), (status = 401, description = "Invalid token")))]
pub async fn list(State(state): State<ServerState>, Extension(user): Extension<CurrentUser>) -> Result<Json<Vec<TitleResponse>>, JsonApiError> {
    Ok(Json(state.titles.list_all(&user).await?))
}

#[utoipa::path(get, path = "/api/titles/{id}", tag = "titles", params(("id" = i32, Path, description = "Title id")), responses((status = 200, body = crate::openapi::TitleResponseDoc), (status = 404, description = "Not Found")))]
pub async fn get(State(state): State<ServerState>, Extension(user): Extension<CurrentUser>, Path(id): Path<i32>) -> Result<Json<TitleResponse>, JsonApiError> {
    Ok(Json(state.titles.get_by_id(&user, id).await?))
}

#[utoipa::path(post, path = "/api/titles", tag = "titles", request_body = crate::openapi::TitleRequestDoc, responses((status = 201, body = crate::openapi::TitleResponseDoc), (status = 400, description = "Bad Request")))]
pub async fn create(State(state): State<ServerState>, Extension(user): Extension<CurrentUser>, Json(input): Json<TitleRequest>) -> Result<(StatusCode, Json<TitleResponse>), JsonApiError> {
    let resp = state.titles.create(&user, input).await?;
    info!(title_id = resp.id, owner_id = %user.id, "title_create_request_done");
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(put, path = "/api/titles/{id}", tag = "titles", params(("id" = i32, Path, description = "Title id")), request_body = crate::openapi::TitleRequestDoc, responses((status = 200, body = crate::openapi::TitleResponseDoc), (status = 400, description = "Bad Request"), (status = 404, description = "Not Found")))]
pub async fn update(State(state): State<ServerState>, Extension(user): Extension<CurrentUser>, Path(id): Path<i32>, Json(input): Json<TitleRequest>) -> Result<Json<TitleResponse>, JsonApiError> {
    Ok(Json(state.titles.update(&user, id, input).await?))
}

#[utoipa::path(delete, path = "/api/titles/{id}", tag = "titles", params(("id" = i32, Path, description = "Title id")), responses((status = 204, description = "Deleted"), (status = 404, description = "Not Found")))]
pub async fn delete(State(state): State<ServerState>, Extension(user): Extension<CurrentUser>, Path(id): Path<i32>) -> Result<StatusCode, JsonApiError> {
    state.titles.delete(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(get, path = "/api/titles/cash-flow", tag = "titles", params(("start" = String, Query, description = "Period start, YYYY-MM-DD"), ("end" = String, Query, description = "Period end, YYYY-MM-DD")), responses((status = 200, body = [crate::openapi::TitleResponseDoc]), (status = 400, description = "Bad period marker")))]
pub async fn cash_flow(State(state): State<ServerState>, Extension(user): Extension<CurrentUser>, Query(q): Query<CashFlowQuery>) -> Result<Json<Vec<TitleResponse>>, JsonApiError> {
    let (Some(start), Some(end)) = (q.start, q.end) else {
        return Err(JsonApiError::bad_request("start and end query parameters are required"));
    };
    Ok(Json(state.titles.list_by_due_date_range(&user, &start, &end).await?))
}
