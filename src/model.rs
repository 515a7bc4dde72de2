use base64::{Engine, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};

use crate::{
  entity::{ReportableKind, UserKind},
  prelude::*,
};

/// Referral parameters carried by the registration request.
///
/// Clients send the literal string `"null"` for unset fields, so every
/// accessor treats `"null"` and blank values as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Signals {
  /// Base64 encoded banner id.
  pub b: Option<String>,
  /// Referral code of the affiliate.
  pub u: Option<String>,
  /// Fallback referral code.
  pub referrer_code: Option<String>,
  /// Host token of the referring site.
  pub h: Option<String>,
}

impl Signals {
  pub fn banner_token(&self) -> Option<&str> {
    usable(&self.b)
  }

  pub fn banner_id(&self) -> Option<i64> {
    self.banner_token().and_then(decode_banner_token)
  }

  pub fn referrer(&self) -> Option<&str> {
    usable(&self.u).or_else(|| usable(&self.referrer_code))
  }

  pub fn host(&self) -> Option<&str> {
    usable(&self.h)
  }
}

pub fn usable(value: &Option<String>) -> Option<&str> {
  value.as_deref().map(str::trim).filter(|v| !v.is_empty() && *v != "null")
}

pub fn decode_banner_token(token: &str) -> Option<i64> {
  let bytes = STANDARD.decode(token.trim()).ok()?;
  std::str::from_utf8(&bytes).ok()?.trim().parse().ok()
}

#[cfg(test)]
pub fn encode_banner_token(banner_id: i64) -> String {
  STANDARD.encode(banner_id.to_string())
}

/// Host token of a `Referer` header value: the base64 encoded host name.
pub fn host_token(referer: &str) -> Option<String> {
  let url = url::Url::parse(referer.trim()).ok()?;
  url.host_str().map(|host| STANDARD.encode(host))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
  pub id: i64,
  pub kind: UserKind,
  pub name: String,
}

/// Requesting client, recorded on statistics rows.
#[derive(Debug, Clone, Default)]
pub struct Client {
  pub ip_address: Option<String>,
  pub user_agent: Option<String>,
}

/// One hit against a banner.
#[derive(Debug, Clone, Default)]
pub struct BannerVisit {
  pub token: Option<String>,
  /// Referral code of the affiliate hosting the banner.
  pub payee_code: Option<String>,
  pub referer: Option<String>,
  pub client: Client,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Reportable {
  pub kind: ReportableKind,
  pub id: i64,
}

impl Reportable {
  pub fn banner(id: i64) -> Self {
    Self { kind: ReportableKind::Banner, id }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Event {
  View,
  Click,
}

impl Event {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::View => "view",
      Self::Click => "click",
    }
  }
}

/// Result of a best-effort operation that did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
  Done(T),
  Skipped(Skip),
}

impl<T> Outcome<T> {
  pub fn done(self) -> Option<T> {
    match self {
      Self::Done(value) => Some(value),
      Self::Skipped(_) => None,
    }
  }

  #[cfg(test)]
  pub fn skipped(&self) -> Option<Skip> {
    match self {
      Self::Done(_) => None,
      Self::Skipped(skip) => Some(*skip),
    }
  }
}

/// Why an operation turned into a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Skip {
  NoSignal,
  AlreadyReferred,
  NoReferrer,
  PayeeNotFound,
  DomainNotFound,
  DomainNotApproved,
  DomainUnverified,
  BannerNotFound,
  ItemNotFound,
  MissingReferer,
  MissingBanner,
  AlreadyCounted,
}

/// Wire form of an [`Outcome`], used by the HTTP layer.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Report {
  Done,
  Skipped { reason: Skip },
  Failed { error: String },
}

impl<T> From<&Result<Outcome<T>>> for Report {
  fn from(result: &Result<Outcome<T>>) -> Self {
    match result {
      Ok(Outcome::Done(_)) => Self::Done,
      Ok(Outcome::Skipped(reason)) => Self::Skipped { reason: *reason },
      Err(err) => Self::Failed { error: err.to_string() },
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_null_signals_are_ignored() {
    let signals = Signals {
      b: Some("null".into()),
      u: Some("  ".into()),
      referrer_code: Some("null".into()),
      h: None,
    };
    assert_eq!(signals.banner_token(), None);
    assert_eq!(signals.referrer(), None);
    assert_eq!(signals.host(), None);
  }

  #[test]
  fn test_referrer_falls_back_to_code() {
    let signals = Signals {
      u: Some("null".into()),
      referrer_code: Some("AFF42".into()),
      ..Default::default()
    };
    assert_eq!(signals.referrer(), Some("AFF42"));

    let signals = Signals {
      u: Some("AFF1".into()),
      referrer_code: Some("AFF42".into()),
      ..Default::default()
    };
    assert_eq!(signals.referrer(), Some("AFF1"));
  }

  #[test]
  fn test_banner_token() {
    assert_eq!(encode_banner_token(7), "Nw==");
    assert_eq!(decode_banner_token("Nw=="), Some(7));
    assert_eq!(decode_banner_token("not base64!"), None);
    assert_eq!(decode_banner_token(&STANDARD.encode("seven")), None);
  }

  #[test]
  fn test_host_token_uses_host_only() {
    let token = host_token("https://blog.example.com/post/1?x=y").unwrap();
    assert_eq!(token, STANDARD.encode("blog.example.com"));
    assert_eq!(host_token("not a url"), None);
  }
}
