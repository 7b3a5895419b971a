use axum_extra::extract::cookie::{Cookie, PrivateCookieJar, SameSite};
use time::Duration;

const SESSION_COOKIE: &str = "snowgate_session";

/// Remember-me lifetime: the session survives browser restarts.
const SESSION_TTL: Duration = Duration::days(30);

/// Establish an operator session. The jar is encrypted and authenticated
/// with the server key, so the cookie value cannot be read or forged by
/// clients.
pub fn establish(jar: PrivateCookieJar, operator_id: i64) -> PrivateCookieJar {
    jar.add(build_cookie(operator_id))
}

/// The operator id carried by the request's session cookie, if any.
pub fn current_operator(jar: &PrivateCookieJar) -> Option<i64> {
    jar.get(SESSION_COOKIE)?.value().parse().ok()
}

/// Invalidate the session.
pub fn clear(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.remove(clear_cookie())
}

fn build_cookie(operator_id: i64) -> Cookie<'static> {
    Cookie::build(Cookie::new(SESSION_COOKIE, operator_id.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(SESSION_TTL)
        .build()
}

fn clear_cookie() -> Cookie<'static> {
    Cookie::build(Cookie::new(SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}
