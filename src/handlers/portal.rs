use axum::extract::State;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use axum_extra::extract::cookie::PrivateCookieJar;
use serde::Deserialize;
use tracing::info;

use crate::auth::{password, session};
use crate::error::SnowgateError;
use crate::router::SnowgateState;

/// GET / and /dashboard — the labeling page. Anonymous visitors are sent to
/// the login form; page routes redirect where the JSON API returns 401.
pub async fn dashboard_handler(
    State(state): State<SnowgateState>,
    jar: PrivateCookieJar,
) -> Result<Response, SnowgateError> {
    if session::current_operator(&jar).is_none() {
        return Ok(Redirect::to("/login").into_response());
    }

    let first = state.records.first_unlabeled().await?;
    let remaining = state.records.count_unlabeled().await?;

    let (first_id, first_url) = match &first {
        Some(image) => (image.id, format!("/uploads/{}", image.filename)),
        None => (0, String::new()),
    };
    let page = DASHBOARD_PAGE
        .replace("%COUNT%", &remaining.to_string())
        .replace("%FIRST_ID%", &first_id.to_string())
        .replace("%FIRST_URL%", &first_url);
    Ok(Html(page).into_response())
}

/// GET /login
pub async fn login_form_handler(jar: PrivateCookieJar) -> Response {
    if session::current_operator(&jar).is_some() {
        return Redirect::to("/dashboard").into_response();
    }
    render_login(None).into_response()
}

#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// POST /login — verify credentials and establish the session. Unknown
/// usernames and wrong passwords re-render the form with the identical
/// generic message.
pub async fn login_submit_handler(
    State(state): State<SnowgateState>,
    jar: PrivateCookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, SnowgateError> {
    let operator = state.records.find_operator(&form.username).await?;

    let verified = match &operator {
        Some(op) => password::verify_password(&form.password, &op.password_hash),
        None => false,
    };
    let Some(operator) = operator.filter(|_| verified) else {
        return Ok(render_login(Some("Invalid username or password")).into_response());
    };

    info!(operator_id = operator.id, username = %operator.username, "operator logged in");

    let jar = session::establish(jar, operator.id);
    Ok((jar, Redirect::to("/dashboard")).into_response())
}

/// GET /logout
pub async fn logout_handler(jar: PrivateCookieJar) -> impl IntoResponse {
    (session::clear(jar), Redirect::to("/login"))
}

fn render_login(error: Option<&str>) -> Html<String> {
    let error_block = match error {
        Some(message) => format!("<p class=\"error\">{}</p>", message),
        None => String::new(),
    };
    Html(LOGIN_PAGE.replace("%ERROR%", &error_block))
}

const LOGIN_PAGE: &str = r#"<!doctype html>
<html>
<head><meta charset="utf-8"><title>Server Login</title></head>
<body>
  <h1>Server Login</h1>
  %ERROR%
  <form method="post" action="/login">
    <label>Username <input name="username" autofocus></label>
    <label>Password <input type="password" name="password"></label>
    <button type="submit">Sign in</button>
  </form>
</body>
</html>
"#;

const DASHBOARD_PAGE: &str = r#"<!doctype html>
<html>
<head><meta charset="utf-8"><title>Labeling Dashboard</title></head>
<body>
  <h1>Labeling Dashboard</h1>
  <p><span id="remaining">%COUNT%</span> image(s) awaiting a label. <a href="/logout">Log out</a></p>
  <p id="status"></p>
  <img id="current" src="%FIRST_URL%" alt="" style="max-width: 640px">
  <div id="controls">
    <button onclick="label('snowy')">Snowy</button>
    <button onclick="label('not_snowy')">Not snowy</button>
  </div>
  <script>
    let currentId = %FIRST_ID%;
    const img = document.getElementById('current');
    const status = document.getElementById('status');
    const controls = document.getElementById('controls');

    function show(data) {
      if (data.status === 'complete') {
        currentId = 0;
        img.style.display = 'none';
        controls.style.display = 'none';
        status.textContent = data.message;
      } else {
        currentId = data.image_id;
        img.src = data.image_url;
      }
    }

    async function loadNext() {
      const resp = await fetch('/api/next-image');
      show(await resp.json());
    }

    async function label(value) {
      if (!currentId) return;
      await fetch('/api/label-image/' + currentId, {
        method: 'POST',
        headers: {'Content-Type': 'application/json'},
        body: JSON.stringify({label: value}),
      });
      const remaining = document.getElementById('remaining');
      remaining.textContent = Math.max(0, Number(remaining.textContent) - 1);
      await loadNext();
    }

    if (!currentId) {
      show({status: 'complete', message: 'No more images to label!'});
    }
  </script>
</body>
</html>
"#;
