use std::{net::SocketAddr, sync::Arc};

use axum::{
  Json,
  extract::{ConnectInfo, Path, Query, State},
  http::{StatusCode, header, request::Parts},
  response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};

use crate::{
  cookie::ClickCookie,
  entity::{ItemKind, history, wallet},
  model::{BannerVisit, Client, Event, NewUser, Report, Reportable, Signals},
  prelude::*,
  state::AppState,
};

type App = State<Arc<AppState>>;

#[derive(Serialize)]
pub struct Status<T> {
  success: bool,
  msg: Option<String>,
  data: Option<T>,
}

impl<T> Status<T> {
  fn ok(data: T) -> Json<Self> {
    Json(Self { success: true, msg: None, data: Some(data) })
  }

  fn failed(msg: impl Into<String>) -> Json<Self> {
    Json(Self { success: false, msg: Some(msg.into()), data: None })
  }
}

pub async fn health() -> &'static str {
  "OK"
}

#[derive(Deserialize)]
pub struct RegistrationReq {
  user: NewUser,
  #[serde(flatten)]
  signals: Signals,
}

#[derive(Debug, Serialize)]
pub struct RegistrationResp {
  referrer: Report,
  commission: Report,
}

/// Registration hook: captures the referral, then pays for it.
/// Failures are logged and reported, never turned into an HTTP error.
pub async fn register(
  State(app): App,
  Json(req): Json<RegistrationReq>,
) -> Json<Status<RegistrationResp>> {
  let captured = app.referrers().capture(&req.user, &req.signals).await;
  if let Err(err) = &captured {
    error!(
      "referrer capture for {} {} failed: {err}",
      req.user.kind, req.user.id
    );
  }

  let granted = app
    .commissions()
    .grant_registration(&req.user, req.signals.host())
    .await;
  if let Err(err) = &granted {
    error!(
      "registration commission for {} {} failed: {err}",
      req.user.kind, req.user.id
    );
  }

  Status::ok(RegistrationResp {
    referrer: Report::from(&captured),
    commission: Report::from(&granted),
  })
}

#[derive(Deserialize)]
pub struct TrackQuery {
  b: Option<String>,
  u: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TrackResp {
  counted: bool,
  commission: Option<Report>,
}

fn client(parts: &Parts) -> Client {
  let forwarded = parts
    .headers
    .get("x-forwarded-for")
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.split(',').next())
    .map(|v| v.trim().to_string());
  let peer = parts
    .extensions
    .get::<ConnectInfo<SocketAddr>>()
    .map(|ConnectInfo(addr)| addr.ip().to_string());

  Client {
    ip_address: forwarded.or(peer),
    user_agent: header_str(parts, header::USER_AGENT),
  }
}

fn header_str(parts: &Parts, name: header::HeaderName) -> Option<String> {
  parts.headers.get(name).and_then(|v| v.to_str().ok()).map(String::from)
}

pub async fn track_banner(
  State(app): App,
  Query(query): Query<TrackQuery>,
  jar: CookieJar,
  parts: Parts,
) -> Response {
  let cookie_name = &app.config.click_cookie;
  let cookie = ClickCookie::from_jar(&jar, cookie_name);

  let visit = BannerVisit {
    token: query.b,
    payee_code: query.u,
    referer: header_str(&parts, header::REFERER),
    client: client(&parts),
  };

  let interaction =
    match app.tracker().record_banner_interaction(&visit, cookie).await {
      Ok(interaction) => interaction,
      Err(err) => {
        error!("banner interaction failed: {err}");
        return Status::<TrackResp>::failed(err.to_string()).into_response();
      }
    };

  let body = TrackResp {
    counted: interaction.skipped.is_none(),
    commission: interaction.commission.as_ref().map(Report::from),
  };
  let jar = jar.add(interaction.cookie.to_cookie(cookie_name));
  (jar, Status::ok(body)).into_response()
}

#[derive(Deserialize)]
pub struct ItemQuery {
  u: Option<String>,
  #[serde(default)]
  total_only: bool,
}

#[derive(Debug, Serialize)]
pub struct ItemResp {
  outcome: Report,
  total_view: Option<i64>,
  total_click: Option<i64>,
}

pub async fn track_item(
  State(app): App,
  Path((kind, id, event)): Path<(ItemKind, i64, Event)>,
  Query(query): Query<ItemQuery>,
  parts: Parts,
) -> Json<Status<ItemResp>> {
  let target = Reportable { kind: kind.into(), id };
  let result = app
    .stats()
    .increment(
      target,
      query.u.as_deref(),
      &[event],
      query.total_only,
      &client(&parts),
    )
    .await;

  if let Err(err) = &result {
    error!("{kind} {id} {} not recorded: {err}", event.as_str());
  }

  let outcome = Report::from(&result);
  let row = result.ok().and_then(|outcome| outcome.done());
  Status::ok(ItemResp {
    outcome,
    total_view: row.as_ref().map(|row| row.total_view),
    total_click: row.as_ref().map(|row| row.total_click),
  })
}

pub async fn wallet(
  State(app): App,
  Path(user_id): Path<i64>,
) -> (StatusCode, Json<Status<wallet::Model>>) {
  match app.wallets().by_user(user_id).await {
    Ok(Some(wallet)) => (StatusCode::OK, Status::ok(wallet)),
    Ok(None) => (StatusCode::NOT_FOUND, Status::failed("No wallet")),
    Err(err) => {
      error!("wallet lookup for {user_id} failed: {err}");
      (StatusCode::INTERNAL_SERVER_ERROR, Status::failed("Storage error"))
    }
  }
}

#[derive(Deserialize)]
pub struct HistoryQuery {
  limit: Option<u64>,
}

pub async fn commissions(
  State(app): App,
  Path(user_id): Path<i64>,
  Query(query): Query<HistoryQuery>,
) -> (StatusCode, Json<Status<Vec<history::Model>>>) {
  let limit = query.limit.unwrap_or(50).min(500);
  match app.commissions().history(user_id, limit).await {
    Ok(entries) => (StatusCode::OK, Status::ok(entries)),
    Err(err) => {
      error!("commission history for {user_id} failed: {err}");
      (StatusCode::INTERNAL_SERVER_ERROR, Status::failed("Storage error"))
    }
  }
}

#[cfg(test)]
mod tests {
  use axum::{
    body::{Body, to_bytes},
    http::Request,
  };
  use tower::ServiceExt;

  use super::*;
  use crate::{
    config::Config,
    entity::SiteStatus,
    model::encode_banner_token,
    plugins::server::router,
    sv::test_utils::{seed, test_db},
  };

  async fn app() -> Arc<AppState> {
    let db = test_db::setup().await;
    seed::affiliate(&db, 1, "AFF1").await;
    seed::banner(&db, 7, "seller", None).await;
    seed::rate(&db, "seller-banner-registration", 50).await;
    seed::rate(&db, "seller-banner-registration-click", 5).await;
    seed::site(&db, 1, "blog.example.com", SiteStatus::Approved, true).await;
    Arc::new(AppState::with_db(db, Config::default()))
  }

  async fn body_json(response: Response) -> json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    json::from_slice(&bytes).unwrap()
  }

  #[tokio::test]
  async fn test_register_pays_banner_commission() {
    let app = app().await;
    let payload = json::json!({
      "user": { "id": 1, "kind": "seller", "name": "Jane" },
      "b": encode_banner_token(7),
      "u": "AFF1",
      "referrer_code": "null",
      "h": base64::Engine::encode(
        &base64::engine::general_purpose::STANDARD,
        "blog.example.com"
      ),
    });

    let response = router(app.clone())
      .oneshot(
        Request::post("/api/registrations")
          .header(header::CONTENT_TYPE, "application/json")
          .body(Body::from(payload.to_string()))
          .unwrap(),
      )
      .await
      .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["referrer"]["status"], "done");
    assert_eq!(body["data"]["commission"]["status"], "done");

    let wallet = app.wallets().by_user(1).await.unwrap().unwrap();
    assert_eq!(wallet.balance, 50);
  }

  #[tokio::test]
  async fn test_register_without_signal() {
    let app = app().await;
    let payload = json::json!({
      "user": { "id": 2, "kind": "buyer", "name": "Joe" },
      "b": "null",
      "u": "null",
    });

    let response = router(app)
      .oneshot(
        Request::post("/api/registrations")
          .header(header::CONTENT_TYPE, "application/json")
          .body(Body::from(payload.to_string()))
          .unwrap(),
      )
      .await
      .unwrap();

    let body = body_json(response).await;
    assert_eq!(body["data"]["referrer"]["status"], "skipped");
    assert_eq!(body["data"]["referrer"]["reason"], "no_signal");
    assert_eq!(body["data"]["commission"]["reason"], "no_referrer");
  }

  #[tokio::test]
  async fn test_track_banner_sets_and_honours_cookie() {
    let app = app().await;
    let uri = format!("/api/banners/track?b={}&u=AFF1", "Nw%3D%3D");

    let first = router(app.clone())
      .oneshot(
        Request::get(&uri)
          .header(header::REFERER, "https://blog.example.com/post")
          .body(Body::empty())
          .unwrap(),
      )
      .await
      .unwrap();

    let set_cookie = first
      .headers()
      .get(header::SET_COOKIE)
      .unwrap()
      .to_str()
      .unwrap()
      .to_string();
    assert!(set_cookie.starts_with("_ar_click="));
    assert!(set_cookie.contains("Path=/"));
    assert!(set_cookie.contains("SameSite=Lax"));
    let body = body_json(first).await;
    assert_eq!(body["data"]["counted"], true);
    assert_eq!(body["data"]["commission"]["status"], "done");

    let cookie = set_cookie.split(';').next().unwrap().to_string();
    let second = router(app.clone())
      .oneshot(
        Request::get(&uri)
          .header(header::REFERER, "https://blog.example.com/post")
          .header(header::COOKIE, cookie)
          .body(Body::empty())
          .unwrap(),
      )
      .await
      .unwrap();

    let body = body_json(second).await;
    assert_eq!(body["data"]["counted"], false);
    assert!(body["data"]["commission"].is_null());

    let wallet = app.wallets().by_user(1).await.unwrap().unwrap();
    assert_eq!(wallet.balance, 5);
  }

  #[tokio::test]
  async fn test_track_item() {
    let app = app().await;
    seed::item(&app.db, 3, ItemKind::Product).await;
    seed::rate(&app.db, "product-view", 2).await;

    let response = router(app)
      .oneshot(
        Request::post("/api/items/product/3/view?u=AFF1")
          .header(header::USER_AGENT, "test-agent")
          .body(Body::empty())
          .unwrap(),
      )
      .await
      .unwrap();

    let body = body_json(response).await;
    assert_eq!(body["data"]["outcome"]["status"], "done");
    assert_eq!(body["data"]["total_view"], 1);
  }

  #[tokio::test]
  async fn test_wallet_not_found() {
    let response = router(app().await)
      .oneshot(Request::get("/api/wallets/1").body(Body::empty()).unwrap())
      .await
      .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
  }
}
