use axum::{
    extract::Extension,
    http::{
        header::{LOCATION, SET_COOKIE},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::{error, instrument};

use super::{
    session::{clear_session_cookie, extract_session_id},
    state::AppState,
};

#[utoipa::path(
    get,
    path = "/logout",
    responses(
        (status = 302, description = "Session destroyed, redirect to the login form")
    ),
    tag = "gate"
)]
#[instrument(skip_all)]
pub async fn logout(headers: HeaderMap, state: Extension<Arc<AppState>>) -> impl IntoResponse {
    let session = extract_session_id(&headers);
    state.gate().logout(session.as_ref());

    // Always clear the cookie, even if the session record was missing.
    let mut response_headers = HeaderMap::new();
    response_headers.insert(LOCATION, HeaderValue::from_static("/"));
    match clear_session_cookie(state.config()) {
        Ok(cookie) => {
            response_headers.insert(SET_COOKIE, cookie);
        }
        Err(err) => error!("Failed to build session cookie: {err}"),
    }

    (StatusCode::FOUND, response_headers)
}
