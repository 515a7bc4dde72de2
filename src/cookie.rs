use std::fmt;

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

/// Banner tokens already counted in this browser session.
///
/// Stored client-side as one comma separated list shared by every banner,
/// so it only grows until the session ends.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClickCookie {
  tokens: Vec<String>,
}

impl ClickCookie {
  pub fn parse(value: &str) -> Self {
    let tokens = value
      .split(',')
      .map(str::trim)
      .filter(|token| !token.is_empty())
      .map(String::from)
      .collect();
    Self { tokens }
  }

  /// Reads the cookie named `name`, empty when the client sent none.
  pub fn from_jar(jar: &CookieJar, name: &str) -> Self {
    jar.get(name).map(|cookie| Self::parse(cookie.value())).unwrap_or_default()
  }

  pub fn is_empty(&self) -> bool {
    self.tokens.is_empty()
  }

  pub fn contains(&self, token: &str) -> bool {
    self.tokens.iter().any(|seen| seen == token)
  }

  pub fn push(&mut self, token: &str) {
    self.tokens.push(token.to_string());
  }

  pub fn value(&self) -> String {
    self.tokens.join(",")
  }

  /// Session cookie sent back with the response. No max age, the browser
  /// drops it when the session ends.
  pub fn to_cookie(&self, name: &str) -> Cookie<'static> {
    Cookie::build((name.to_string(), self.value()))
      .path("/")
      .same_site(SameSite::Lax)
      .build()
  }
}

impl fmt::Display for ClickCookie {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.value())
  }
}

#[cfg(test)]
mod tests {
  use axum::http::{HeaderMap, HeaderValue, header};

  use super::*;

  fn jar(raw: &'static str) -> CookieJar {
    let mut headers = HeaderMap::new();
    headers.insert(header::COOKIE, HeaderValue::from_static(raw));
    CookieJar::from_headers(&headers)
  }

  #[test]
  fn test_parse_and_push() {
    let mut cookie = ClickCookie::parse("");
    assert!(cookie.is_empty());

    cookie.push("Nw==");
    cookie.push("OA==");
    assert!(cookie.contains("Nw=="));
    assert!(!cookie.contains("OQ=="));
    assert_eq!(cookie.value(), "Nw==,OA==");
    assert_eq!(ClickCookie::parse(&cookie.value()), cookie);
  }

  #[test]
  fn test_session_cookie_attributes() {
    let mut clicks = ClickCookie::default();
    clicks.push("Nw==");
    clicks.push("MTI+");

    let cookie = clicks.to_cookie("_ar_click");
    assert_eq!(cookie.name(), "_ar_click");
    assert_eq!(cookie.value(), "Nw==,MTI+");
    assert_eq!(cookie.path(), Some("/"));
    assert_eq!(cookie.same_site(), Some(SameSite::Lax));
    assert_eq!(cookie.max_age(), None);
  }

  #[test]
  fn test_reads_named_cookie_among_others() {
    let clicks = ClickCookie::from_jar(
      &jar("session=abc; _ar_click=Nw%3D%3D%2CMTI%2B; theme=dark"),
      "_ar_click",
    );
    assert!(clicks.contains("Nw=="));
    assert!(clicks.contains("MTI+"));
  }

  #[test]
  fn test_unencoded_value() {
    let clicks = ClickCookie::from_jar(&jar("_ar_click=Nw==,OA=="), "_ar_click");
    assert!(clicks.contains("Nw=="));
    assert!(clicks.contains("OA=="));
  }

  #[test]
  fn test_missing_cookie() {
    let clicks = ClickCookie::from_jar(&jar("session=abc"), "_ar_click");
    assert!(clicks.is_empty());
  }
}
