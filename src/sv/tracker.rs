use crate::{
  config::{CostFormula, MissingRate},
  cookie::ClickCookie,
  entity::history,
  locks::KeyedLocks,
  model::{BannerVisit, Event, Outcome, Reportable, Skip, decode_banner_token, usable},
  prelude::*,
  sv::{Commission, Lookup, Stats},
};

/// Result of one banner hit. `cookie` must be sent back to the client.
#[derive(Debug)]
pub struct Interaction {
  pub cookie: ClickCookie,
  pub skipped: Option<Skip>,
  /// Set only for the first hit of a banner in the session.
  pub commission: Option<Result<Outcome<history::Model>>>,
}

impl Interaction {
  fn skipped(cookie: ClickCookie, skip: Skip) -> Self {
    Self { cookie, skipped: Some(skip), commission: None }
  }
}

pub struct Tracker<'a> {
  db: &'a DatabaseConnection,
  locks: &'a KeyedLocks<Reportable>,
  missing_rate: MissingRate,
  formula: CostFormula,
}

impl<'a> Tracker<'a> {
  pub fn new(
    db: &'a DatabaseConnection,
    locks: &'a KeyedLocks<Reportable>,
    missing_rate: MissingRate,
    formula: CostFormula,
  ) -> Self {
    Self { db, locks, missing_rate, formula }
  }

  /// Counts a banner hit and pays the click commission once per session.
  ///
  /// Every hit bumps the raw click total. A token missing from `cookie`
  /// additionally appends a view+click row and attempts the click
  /// commission, then is added to the returned cookie. Statistics and
  /// commission failures are logged and do not stop the other steps.
  pub async fn record_banner_interaction(
    &self,
    visit: &BannerVisit,
    mut cookie: ClickCookie,
  ) -> Result<Interaction> {
    let Some(referer) = usable(&visit.referer) else {
      return Ok(Interaction::skipped(cookie, Skip::MissingReferer));
    };
    let Some(token) = usable(&visit.token) else {
      return Ok(Interaction::skipped(cookie, Skip::MissingBanner));
    };

    let banner = match decode_banner_token(token) {
      Some(banner_id) => Lookup::new(self.db).banner(banner_id).await?,
      None => None,
    };
    let Some(banner) = banner else {
      debug!("banner token {token:?} does not resolve");
      return Ok(Interaction::skipped(cookie, Skip::BannerNotFound));
    };

    let stats =
      Stats::new(self.db, self.locks, self.missing_rate, self.formula);
    let target = Reportable::banner(banner.id);
    let payee_code = usable(&visit.payee_code);

    if let Err(err) = stats
      .increment(target, payee_code, &[Event::Click], true, &visit.client)
      .await
    {
      error!("click total of banner {} not recorded: {err}", banner.id);
    }

    if !cookie.is_empty() && cookie.contains(token) {
      debug!("banner {} already counted in this session", banner.id);
      return Ok(Interaction::skipped(cookie, Skip::AlreadyCounted));
    }

    if let Err(err) = stats
      .increment(
        target,
        payee_code,
        &[Event::View, Event::Click],
        false,
        &visit.client,
      )
      .await
    {
      error!("statistics of banner {} not recorded: {err}", banner.id);
    }

    let commission = Commission::new(self.db, self.missing_rate)
      .grant_click(&banner, payee_code, referer)
      .await;
    if let Err(err) = &commission {
      error!("click commission for banner {} failed: {err}", banner.id);
    }

    cookie.push(token);
    Ok(Interaction { cookie, skipped: None, commission: Some(commission) })
  }
}
