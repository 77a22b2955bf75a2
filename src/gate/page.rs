//! Login page markup.

use url::form_urlencoded;

use super::{locale, locale::Localizer, machine::LoginPage};

/// Escape text for HTML element content and quoted attributes.
#[must_use]
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Form action that posts back to the gate while keeping `next`.
#[must_use]
pub fn form_action(next: Option<&str>) -> String {
    match next {
        Some(next) => {
            let encoded: String = form_urlencoded::byte_serialize(next.as_bytes()).collect();
            format!("/?next={encoded}")
        }
        None => "/".to_string(),
    }
}

// Copies the browser fragment into the hidden field so it survives the POST.
const HASH_CAPTURE_SCRIPT: &str = r#"<script>
  if (window.location.hash) {
    document.getElementById('url_hash').value = window.location.hash;
  }
  function toggleNotice() {
    var notice = document.getElementById('login-notice');
    notice.style.display = notice.style.display === 'none' ? 'block' : 'none';
  }
</script>"#;

#[must_use]
pub fn render_login(page: &LoginPage, localizer: &dyn Localizer) -> String {
    let text = |key: &str| escape_html(&localizer.lookup(key));
    let notice = page.notice;
    let display = if notice.initially_visible() {
        "block"
    } else {
        "none"
    };

    let mut html = String::with_capacity(2048);
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
    html.push_str("  <meta charset=\"utf-8\">\n");
    html.push_str("  <meta http-equiv=\"Cache-Control\" content=\"no-cache, no-store, must-revalidate\">\n");
    html.push_str("  <meta http-equiv=\"Pragma\" content=\"no-cache\">\n");
    html.push_str("  <meta http-equiv=\"Expires\" content=\"0\">\n");
    html.push_str("  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str("  <title>Log in</title>\n</head>\n<body class=\"login-page\">\n");

    html.push_str(&format!(
        concat!(
            "<div class=\"login-box\">\n",
            "  <p class=\"login-box-msg\">{box_msg}</p>\n",
            "  <form action=\"{action}\" method=\"post\">\n",
            "    <input type=\"hidden\" name=\"url_hash\" id=\"url_hash\">\n",
            "    <input type=\"password\" name=\"loginpassword\" placeholder=\"{placeholder}\" autofocus>\n",
            "    <button type=\"submit\">{submit}</button>\n",
            "  </form>\n",
            "  <button type=\"button\" onclick=\"toggleNotice()\">{toggle}</button>\n",
            "  <div id=\"login-notice\" style=\"display:{display};\">\n",
            "    <div class=\"alert alert-{class}\">\n",
            "      <h4><i class=\"icon fa {icon}\"></i>{headline}</h4>\n",
            "      <p>{body}</p>\n",
            "    </div>\n",
            "  </div>\n",
            "</div>\n",
        ),
        box_msg = text(locale::LOGIN_BOX),
        action = escape_html(&form_action(page.next.as_deref())),
        placeholder = text(locale::LOGIN_PASSWORD_PLACEHOLDER),
        submit = text(locale::LOGIN_SUBMIT),
        toggle = text(locale::LOGIN_TOGGLE_INFO),
        display = display,
        class = notice.alert_class(),
        icon = notice.icon(),
        headline = text(notice.headline_key()),
        body = text(notice.body_key()),
    ));

    html.push_str(HASH_CAPTURE_SCRIPT);
    html.push_str("\n</body>\n</html>\n");
    html
}
