//! `GET /` and `POST /`: the login checkpoint.

use axum::{
    extract::Extension,
    http::{
        header::{CACHE_CONTROL, EXPIRES, LOCATION, PRAGMA, SET_COOKIE},
        HeaderMap, HeaderValue, StatusCode, Uri,
    },
    response::{Html, IntoResponse, Response},
    Form,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, instrument};
use url::form_urlencoded;
use utoipa::ToSchema;

use super::{
    session::{extract_session_id, session_cookie},
    state::AppState,
};
use crate::gate::{page::render_login, Action, GateRequest, SessionId};

const NO_CACHE_HEADERS: [(axum::http::HeaderName, &str); 3] = [
    (CACHE_CONTROL, "no-cache, no-store, must-revalidate"),
    (PRAGMA, "no-cache"),
    (EXPIRES, "0"),
];

#[derive(ToSchema, Deserialize, Default)]
pub struct LoginForm {
    /// Clear-text password candidate.
    pub loginpassword: Option<String>,
    /// Copy of `window.location.hash` taken by the login page.
    pub url_hash: Option<String>,
}

/// Last `next` value in the query string, like most form decoders.
pub(super) fn next_param(uri: &Uri) -> Option<String> {
    let query = uri.query()?;
    form_urlencoded::parse(query.as_bytes())
        .filter(|(key, _)| key == "next")
        .last()
        .map(|(_, value)| value.into_owned())
}

#[utoipa::path(
    get,
    path = "/",
    params(
        ("next" = Option<String>, Query, description = "Base64 encoded local path to continue to")
    ),
    responses(
        (status = 200, description = "Login form", content_type = "text/html", body = String),
        (status = 302, description = "Redirect to the validated target")
    ),
    tag = "gate"
)]
#[instrument(skip_all)]
pub async fn gate_get(uri: Uri, headers: HeaderMap, state: Extension<Arc<AppState>>) -> Response {
    respond(&state, &uri, &headers, &LoginForm::default())
}

#[utoipa::path(
    post,
    path = "/",
    params(
        ("next" = Option<String>, Query, description = "Base64 encoded local path to continue to")
    ),
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Login form, password missing or wrong", content_type = "text/html", body = String),
        (status = 302, description = "Logged in, redirect to the validated target")
    ),
    tag = "gate"
)]
#[instrument(skip_all)]
pub async fn gate_post(
    uri: Uri,
    headers: HeaderMap,
    state: Extension<Arc<AppState>>,
    form: Option<Form<LoginForm>>,
) -> Response {
    // An unreadable body is the same as no login attempt.
    let form = form.map(|Form(form)| form).unwrap_or_default();
    respond(&state, &uri, &headers, &form)
}

fn respond(state: &AppState, uri: &Uri, headers: &HeaderMap, form: &LoginForm) -> Response {
    let next = next_param(uri);
    let session = extract_session_id(headers);

    let decision = state.gate().decide(GateRequest {
        next: next.as_deref(),
        password: form.loginpassword.as_deref(),
        url_hash: form.url_hash.as_deref(),
        session: session.as_ref(),
    });

    match decision.action {
        Action::Redirect { location, session } => {
            redirect_response(state, &location, session.as_ref())
        }
        Action::RenderLogin(page) => {
            let body = render_login(&page, state.localizer());
            (StatusCode::OK, NO_CACHE_HEADERS, Html(body)).into_response()
        }
    }
}

fn redirect_response(state: &AppState, location: &str, session: Option<&SessionId>) -> Response {
    let mut headers = HeaderMap::new();

    match HeaderValue::from_str(location) {
        Ok(value) => {
            headers.insert(LOCATION, value);
        }
        Err(err) => {
            error!("Failed to build Location header: {err}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    }

    if let Some(id) = session {
        match session_cookie(state.config(), id) {
            Ok(cookie) => {
                headers.insert(SET_COOKIE, cookie);
            }
            Err(err) => {
                error!("Failed to build session cookie: {err}");
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
        }
    }

    (StatusCode::FOUND, headers).into_response()
}
