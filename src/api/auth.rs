use super::AppState;
use crate::auth::{AccessToken, Principal};
use crate::error::{Result, TicketDeskError};
use axum::{
    Form, Json, async_trait,
    extract::{FromRef, FromRequestParts, State, rejection::{FormRejection, JsonRejection}},
    http::{HeaderMap, header, request::Parts},
};
use serde::Deserialize;
use tracing::debug;

/// Credentials for `POST /login` (JSON) and `POST /token` (form)
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Principal of a request carrying a valid bearer token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authenticated(pub Principal);

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    scheme.eq_ignore_ascii_case("bearer").then(|| token.trim())
}

#[async_trait]
impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = TicketDeskError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self> {
        let state = AppState::from_ref(state);
        let token = bearer_token(&parts.headers).ok_or_else(|| {
            TicketDeskError::Unauthenticated("Missing bearer token".to_string())
        })?;
        let principal = state.authenticator.verify(token)?;
        debug!("Request authenticated as {principal}");
        Ok(Self(principal))
    }
}

/// `POST /login`
pub async fn login(
    State(state): State<AppState>,
    payload: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AccessToken>> {
    let Json(request) = payload.map_err(|e| TicketDeskError::InvalidInput(e.body_text()))?;
    issue(state, request).await
}

/// `POST /token`, the OAuth2 password form
pub async fn token(
    State(state): State<AppState>,
    payload: std::result::Result<Form<LoginRequest>, FormRejection>,
) -> Result<Json<AccessToken>> {
    let Form(request) = payload.map_err(|e| TicketDeskError::InvalidInput(e.body_text()))?;
    issue(state, request).await
}

async fn issue(state: AppState, request: LoginRequest) -> Result<Json<AccessToken>> {
    // Password verification is CPU bound.
    let authenticator = state.authenticator.clone();
    let token = tokio::task::spawn_blocking(move || {
        authenticator.login(&request.username, &request.password)
    })
    .await
    .map_err(|e| TicketDeskError::custom(format!("Login task failed: {e}")))??;
    Ok(Json(token))
}
