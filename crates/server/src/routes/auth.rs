use std::sync::Arc;

use axum::{Json, extract::{State, Request}, http::{header, StatusCode}, middleware::Next, response::Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use service::auth::{domain::{LoginInput, RegisterInput}, service::{AuthConfig, AuthService}};
use service::auth::repo::seaorm::SeaOrmAuthRepository;
use service::title::repo::seaorm::SeaOrmTitleRepository;
use service::title::TitleService;

use crate::errors::JsonApiError;

pub const AUTH_COOKIE: &str = "auth_token";

/// Shared handler state; services are built once at startup.
#[derive(Clone)]
pub struct ServerState {
    pub auth: Arc<AuthService<SeaOrmAuthRepository>>,
    pub titles: Arc<TitleService<SeaOrmTitleRepository>>,
}

impl ServerState {
    pub fn new(db: DatabaseConnection, auth_cfg: AuthConfig) -> Self {
        let auth_repo = Arc::new(SeaOrmAuthRepository { db: db.clone() });
        let title_repo = Arc::new(SeaOrmTitleRepository { db });
        Self {
            auth: Arc::new(AuthService::new(auth_repo, auth_cfg)),
            titles: Arc::new(TitleService::new(title_repo)),
        }
    }
}

#[derive(Serialize)]
pub struct RegisterOutput { pub user_id: Uuid }

#[derive(Serialize)]
pub struct LoginOutput { pub user_id: Uuid, pub email: String, pub name: String, pub token: String }

#[utoipa::path(post, path = "/auth/register", tag = "auth", request_body = crate::openapi::RegisterRequest, responses((status = 200, description = "Registered"), (status = 400, description = "Bad Request"), (status = 409, description = "Conflict")))]
pub async fn register(State(state): State<ServerState>, Json(input): Json<RegisterInput>) -> Result<Json<RegisterOutput>, JsonApiError> {
    let user = state.auth.register(input).await?;
    Ok(Json(RegisterOutput { user_id: user.id }))
}

#[utoipa::path(post, path = "/auth/login", tag = "auth", request_body = crate::openapi::LoginRequest, responses((status = 200, description = "Logged In"), (status = 401, description = "Unauthorized")))]
pub async fn login(State(state): State<ServerState>, jar: CookieJar, Json(input): Json<LoginInput>) -> Result<(CookieJar, Json<LoginOutput>), JsonApiError> {
    let session = state.auth.login(input).await?;
    let user = session.user;
    let token = session.token.ok_or_else(|| {
        JsonApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "internal", "token generation failed")
    })?;

    let mut cookie = Cookie::new(AUTH_COOKIE, token.clone());
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_secure(false);
    cookie.set_same_site(SameSite::Lax);
    let jar = jar.add(cookie);
    let out = LoginOutput { user_id: user.id, email: user.email, name: user.name, token };
    Ok((jar, Json(out)))
}

#[utoipa::path(post, path = "/auth/logout", tag = "auth", responses((status = 204, description = "Cookie cleared")))]
pub async fn logout(jar: CookieJar) -> (CookieJar, StatusCode) {
    let mut cookie = Cookie::from(AUTH_COOKIE);
    cookie.set_path("/");
    (jar.remove(cookie), StatusCode::NO_CONTENT)
}

/// Bearer-token guard for `/api` routes.
/// Reads `Authorization: Bearer <token>`, falling back to the `auth_token` cookie.
/// Missing token gives 400, invalid or expired gives 401. On success the
/// resolved `CurrentUser` is inserted into the request extensions.
pub async fn require_bearer_token_state(
    State(state): State<ServerState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, JsonApiError> {
    let path = req.uri().path().to_owned();

    let authz = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let token = match authz {
        Some(h) => match h.strip_prefix("Bearer ") {
            Some(t) => t.trim().to_string(),
            None => {
                warn!(path = %path, "invalid Authorization format (expect Bearer)");
                return Err(JsonApiError::new(StatusCode::UNAUTHORIZED, "unauthorized", "expected a Bearer token"));
            }
        },
        None => match jar.get(AUTH_COOKIE).map(|c| c.value().to_string()) {
            Some(t) if !t.is_empty() => t,
            _ => {
                warn!(path = %path, "missing Authorization header and auth_token cookie");
                return Err(JsonApiError::bad_request("missing bearer token"));
            }
        },
    };

    let user = state.auth.verify_token(&token).map_err(|e| {
        warn!(path = %path, err = %e, "token validation failed");
        JsonApiError::from(e)
    })?;
    debug!(path = %path, user_id = %user.id, "request_authenticated");
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}
