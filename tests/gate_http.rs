use anyhow::{anyhow, Result};
use axum::{
    body::{to_bytes, Body},
    http::{
        header::{CACHE_CONTROL, CONTENT_TYPE, COOKIE, EXPIRES, LOCATION, PRAGMA, SET_COOKIE},
        Request, Response, StatusCode,
    },
    Router,
};
use gatekeep::{
    api::{self, AppState, GateConfig},
    gate::{
        locale, redirect::encode_next, Localizer, SafePath, Sha256Verifier,
        DEFAULT_PASSWORD_DIGEST,
    },
};
use secrecy::SecretString;
use std::sync::Arc;
use tower::ServiceExt;
use url::{form_urlencoded, Url};

const PASSWORD: &str = "correct horse";

fn state(protection: bool) -> Result<Arc<AppState>> {
    let config = GateConfig::new(SafePath::parse("/devices.php")?)
        .with_protection_enabled(protection)
        .with_session_ttl_seconds(600);
    Ok(Arc::new(AppState::new(
        config,
        Arc::new(Sha256Verifier::from_password(PASSWORD)),
    )))
}

fn gate_uri(target: Option<&str>) -> String {
    target.map_or_else(
        || "/".to_string(),
        |path| {
            let next: String = form_urlencoded::byte_serialize(encode_next(path).as_bytes()).collect();
            format!("/?next={next}")
        },
    )
}

fn get(uri: &str, cookie: Option<&str>) -> Result<Request<Body>> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }
    Ok(builder.body(Body::empty())?)
}

fn post(uri: &str, form: &[(&str, &str)], cookie: Option<&str>) -> Result<Request<Body>> {
    let body = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(form)
        .finish();
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }
    Ok(builder.body(Body::from(body))?)
}

async fn send(app: &Router, request: Request<Body>) -> Result<Response<Body>> {
    Ok(app.clone().oneshot(request).await?)
}

async fn body_text(response: Response<Body>) -> Result<String> {
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    Ok(String::from_utf8(bytes.to_vec())?)
}

fn location(response: &Response<Body>) -> Result<String> {
    let value = response
        .headers()
        .get(LOCATION)
        .ok_or_else(|| anyhow!("missing Location header"))?;
    Ok(value.to_str()?.to_string())
}

/// `name=value` part of the Set-Cookie header, ready to send back.
fn session_cookie(response: &Response<Body>) -> Result<String> {
    let value = response
        .headers()
        .get(SET_COOKIE)
        .ok_or_else(|| anyhow!("missing Set-Cookie header"))?
        .to_str()?;
    value
        .split(';')
        .next()
        .map(str::to_string)
        .ok_or_else(|| anyhow!("empty Set-Cookie header"))
}

fn assert_no_cache(response: &Response<Body>) {
    let header = |name| response.headers().get(name).map(|v| v.as_bytes());
    assert_eq!(
        header(CACHE_CONTROL),
        Some(&b"no-cache, no-store, must-revalidate"[..])
    );
    assert_eq!(header(PRAGMA), Some(&b"no-cache"[..]));
    assert_eq!(header(EXPIRES), Some(&b"0"[..]));
}

fn assert_same_origin(location: &str) -> Result<()> {
    let base = Url::parse("https://router.local/")?;
    let resolved = base.join(location)?;
    assert_eq!(resolved.origin(), base.origin(), "{location} leaves the host");
    Ok(())
}

async fn login(app: &Router, target: Option<&str>) -> Result<String> {
    let response = send(
        app,
        post(&gate_uri(target), &[("loginpassword", PASSWORD)], None)?,
    )
    .await?;
    assert_eq!(response.status(), StatusCode::FOUND);
    session_cookie(&response)
}

#[tokio::test]
async fn unauthenticated_deep_link_renders_form() -> Result<()> {
    let app = api::router(state(true)?);
    let uri = gate_uri(Some("/devices.php#device-123"));

    let response = send(&app, get(&uri, None)?).await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(SET_COOKIE).is_none());
    assert_no_cache(&response);

    let html = body_text(response).await?;
    assert!(html.contains("name=\"loginpassword\""));
    assert!(html.contains(&format!("action=\"{uri}\"")));
    Ok(())
}

#[tokio::test]
async fn correct_password_redirects_to_deep_link() -> Result<()> {
    let app = api::router(state(true)?);
    let uri = gate_uri(Some("/devices.php#device-123"));

    let response = send(&app, post(&uri, &[("loginpassword", PASSWORD)], None)?).await?;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response)?, "/devices.php#device-123");

    let cookie = response
        .headers()
        .get(SET_COOKIE)
        .ok_or_else(|| anyhow!("missing Set-Cookie header"))?
        .to_str()?;
    assert!(cookie.starts_with("gatekeep_session="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("Max-Age=600"));
    Ok(())
}

#[tokio::test]
async fn posted_hash_applies_when_next_has_none() -> Result<()> {
    let app = api::router(state(true)?);
    let uri = gate_uri(Some("/devices.php"));

    let response = send(
        &app,
        post(
            &uri,
            &[("loginpassword", PASSWORD), ("url_hash", "#port<script>-7")],
            None,
        )?,
    )
    .await?;
    assert_eq!(location(&response)?, "/devices.php#portscript-7");
    Ok(())
}

#[tokio::test]
async fn fragment_in_next_beats_posted_hash() -> Result<()> {
    let app = api::router(state(true)?);
    let uri = gate_uri(Some("/devices.php#device-123"));

    let response = send(
        &app,
        post(&uri, &[("loginpassword", PASSWORD), ("url_hash", "#other")], None)?,
    )
    .await?;
    assert_eq!(location(&response)?, "/devices.php#device-123");
    Ok(())
}

#[tokio::test]
async fn offsite_targets_fall_back_to_default() -> Result<()> {
    let app = api::router(state(true)?);

    for target in [
        "https://evil.com/phish",
        "//evil.com",
        "/\\evil.com",
        "devices.php",
        "/devices.php?x=<y>",
    ] {
        let response = send(
            &app,
            post(&gate_uri(Some(target)), &[("loginpassword", PASSWORD)], None)?,
        )
        .await?;
        let location = location(&response)?;
        assert_eq!(location, "/devices.php", "target {target:?}");
        assert_same_origin(&location)?;
    }
    Ok(())
}

#[tokio::test]
async fn undecodable_next_falls_back_to_default() -> Result<()> {
    let app = api::router(state(true)?);

    let response = send(
        &app,
        post("/?next=%25%25not-base64", &[("loginpassword", PASSWORD)], None)?,
    )
    .await?;
    assert_eq!(location(&response)?, "/devices.php");
    Ok(())
}

#[tokio::test]
async fn authenticated_session_redirects_without_form() -> Result<()> {
    let app = api::router(state(true)?);
    let cookie = login(&app, None).await?;

    let response = send(&app, get("/", Some(&cookie))?).await?;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response)?, "/devices.php");
    assert!(response.headers().get(SET_COOKIE).is_none());

    let response = send(&app, get(&gate_uri(Some("/index.php")), Some(&cookie))?).await?;
    assert_eq!(location(&response)?, "/index.php");
    Ok(())
}

#[tokio::test]
async fn wrong_password_rerenders_form() -> Result<()> {
    let state = state(true)?;
    let app = api::router(state.clone());

    let response = send(&app, post("/", &[("loginpassword", "nope")], None)?).await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_no_cache(&response);
    assert!(response.headers().get(LOCATION).is_none());
    assert!(response.headers().get(SET_COOKIE).is_none());
    assert!(state.sessions().is_empty());

    let html = body_text(response).await?;
    assert!(html.contains("alert-info"));
    assert!(!html.contains("alert-danger"));
    Ok(())
}

#[tokio::test]
async fn relogin_rotates_session_id() -> Result<()> {
    let app = api::router(state(true)?);
    let first = login(&app, None).await?;

    let response = send(&app, post("/", &[("loginpassword", PASSWORD)], Some(&first))?).await?;
    assert_eq!(response.status(), StatusCode::FOUND);
    let second = session_cookie(&response)?;
    assert_ne!(first, second);

    let stale = send(&app, get("/", Some(&first))?).await?;
    assert_eq!(stale.status(), StatusCode::OK);

    let fresh = send(&app, get("/", Some(&second))?).await?;
    assert_eq!(fresh.status(), StatusCode::FOUND);
    Ok(())
}

#[tokio::test]
async fn disabled_protection_logs_everyone_in() -> Result<()> {
    let app = api::router(state(false)?);

    let response = send(&app, get(&gate_uri(Some("/devices.php#lan")), None)?).await?;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response)?, "/devices.php#lan");
    let cookie = session_cookie(&response)?;

    let response = send(&app, get("/", Some(&cookie))?).await?;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert!(response.headers().get(SET_COOKIE).is_none());
    Ok(())
}

#[tokio::test]
async fn default_password_shows_warning() -> Result<()> {
    let config = GateConfig::new(SafePath::parse("/devices.php")?);
    let verifier = Sha256Verifier::new(&SecretString::from(DEFAULT_PASSWORD_DIGEST.to_string()))?;
    let app = api::router(Arc::new(AppState::new(config, Arc::new(verifier))));

    let html = body_text(send(&app, get("/", None)?).await?).await?;
    assert!(html.contains("alert-danger"));
    Ok(())
}

#[tokio::test]
async fn logout_destroys_session() -> Result<()> {
    let state = state(true)?;
    let app = api::router(state.clone());
    let cookie = login(&app, None).await?;
    assert_eq!(state.sessions().len(), 1);

    let response = send(&app, get("/logout", Some(&cookie))?).await?;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response)?, "/");
    assert!(session_cookie(&response)?.ends_with('='));
    assert!(state.sessions().is_empty());

    let response = send(&app, get("/", Some(&cookie))?).await?;
    assert_eq!(response.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn health_reports_status() -> Result<()> {
    let app = api::router(state(true)?);

    let response = send(&app, get("/health", None)?).await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get("x-app").is_some());
    assert!(response.headers().get("x-request-id").is_some());

    let body: serde_json::Value = serde_json::from_str(&body_text(response).await?)?;
    assert_eq!(body["name"], env!("CARGO_PKG_NAME"));
    assert_eq!(body["protection"], "enabled");
    assert_eq!(body["sessions"], 0);
    Ok(())
}

#[tokio::test]
async fn openapi_document_is_served() -> Result<()> {
    let app = api::router(state(true)?);

    let response = send(&app, get("/openapi.json", None)?).await?;
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = serde_json::from_str(&body_text(response).await?)?;
    assert!(body["paths"]["/logout"].is_object());
    Ok(())
}

struct KeyEcho;

impl Localizer for KeyEcho {
    fn lookup(&self, key: &str) -> String {
        format!("[{key}]")
    }
}

#[tokio::test]
async fn login_page_uses_installed_localizer() -> Result<()> {
    let config = GateConfig::new(SafePath::parse("/devices.php")?);
    let state = AppState::new(config, Arc::new(Sha256Verifier::from_password(PASSWORD)))
        .with_localizer(Arc::new(KeyEcho));
    let app = api::router(Arc::new(state));

    let html = body_text(send(&app, get("/", None)?).await?).await?;
    for key in [
        locale::LOGIN_BOX,
        locale::LOGIN_PASSWORD_PLACEHOLDER,
        locale::LOGIN_SUBMIT,
        locale::LOGIN_INFO_HEADLINE,
        locale::LOGIN_INFO,
    ] {
        assert!(html.contains(&format!("[{key}]")), "missing {key}");
    }
    assert!(!html.contains("Password alert!"));
    Ok(())
}
