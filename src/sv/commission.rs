use json::json;

use crate::{
  config::MissingRate,
  entity::{SiteStatus, UserKind, affiliate, banner, commission, history, site},
  model::{NewUser, Outcome, Skip, host_token},
  prelude::*,
  sv::{Lookup, Referrer, Wallet},
};

/// `{user}-{banner|direct}-registration`
pub fn registration_type(kind: UserKind, via_banner: bool) -> String {
  let path = if via_banner { "banner" } else { "direct" };
  format!("{kind}-{path}-registration")
}

/// `{banner type}-banner-registration-click`
pub fn click_type(banner_kind: &str) -> String {
  format!("{banner_kind}-banner-registration-click")
}

/// Banner commissions require an approved and verified site
/// and an existing payee.
pub fn domain_gate<'p>(
  site: Option<&site::Model>,
  payee: Option<&'p affiliate::Model>,
) -> Result<&'p affiliate::Model, Skip> {
  let site = site.ok_or(Skip::DomainNotFound)?;
  if site.status != SiteStatus::Approved {
    return Err(Skip::DomainNotApproved);
  }
  let payee = payee.ok_or(Skip::PayeeNotFound)?;
  if !site.verified {
    return Err(Skip::DomainUnverified);
  }
  Ok(payee)
}

pub struct Commission<'a> {
  db: &'a DatabaseConnection,
  missing_rate: MissingRate,
}

impl<'a> Commission<'a> {
  pub fn new(db: &'a DatabaseConnection, missing_rate: MissingRate) -> Self {
    Self { db, missing_rate }
  }

  /// Flat rate configured for a commission type.
  pub async fn rate(&self, kind: &str) -> Result<i64> {
    let rate = commission::Entity::find()
      .filter(commission::Column::Kind.eq(kind))
      .one(self.db)
      .await?;

    match (rate, self.missing_rate) {
      (Some(rate), _) => Ok(rate.commission),
      (None, MissingRate::Zero) => {
        warn!("no commission rate for `{kind}`, using 0");
        Ok(0)
      }
      (None, MissingRate::Fail) => Err(Error::RateNotFound(kind.into())),
    }
  }

  /// Amount granted for `kind`: the banner offer when there is one,
  /// the flat rate otherwise.
  pub async fn amount(
    &self,
    kind: &str,
    banner: Option<&banner::Model>,
  ) -> Result<i64> {
    if let Some(offer_id) = banner.and_then(|banner| banner.offer_id)
      && let Some(amount) = Lookup::new(self.db).offer_commission(offer_id).await?
    {
      return Ok(amount);
    }
    self.rate(kind).await
  }

  /// Writes the history entry and credits the payee wallet by the same
  /// amount, atomically.
  pub async fn commit(
    &self,
    payee_id: i64,
    kind: &str,
    banner: Option<&banner::Model>,
    amount: i64,
    information: Option<json::Value>,
  ) -> Result<history::Model> {
    let txn = self.db.begin().await?;

    let entry = history::ActiveModel {
      id: NotSet,
      user_id: Set(payee_id),
      from_id: Set(banner.map(|banner| banner.id)),
      from_type: Set(banner.map(|_| history::FROM_BANNER.to_string())),
      commission: Set(amount),
      kind: Set(kind.to_string()),
      information: Set(information.map(|info| info.to_string())),
      created_at: Set(Utc::now().naive_utc()),
    }
    .insert(&txn)
    .await?;

    Wallet::new(&txn).credit(payee_id, amount).await?;

    txn.commit().await?;

    info!("granted {amount} `{kind}` commission to affiliate {payee_id}");
    Ok(entry)
  }

  /// Pays the affiliate that referred `user`, if any.
  ///
  /// `host` overrides the host token stored with the referral record.
  pub async fn grant_registration(
    &self,
    user: &NewUser,
    host: Option<&str>,
  ) -> Result<Outcome<history::Model>> {
    let Some(record) = Referrer::new(self.db).of(user.kind, user.id).await?
    else {
      debug!("{} {} was not referred", user.kind, user.id);
      return Ok(Outcome::Skipped(Skip::NoReferrer));
    };

    let via_banner = record.info.is_some();
    let kind = registration_type(user.kind, via_banner);

    let lookup = Lookup::new(self.db);
    let payee = match record.referrer.as_deref() {
      Some(code) => lookup.affiliate(code).await?,
      None => None,
    };
    let extra = json!({ "name": user.name, "user_type": user.kind });

    if !via_banner {
      let Some(payee) = payee else {
        debug!("referrer {:?} is not an affiliate", record.referrer);
        return Ok(Outcome::Skipped(Skip::PayeeNotFound));
      };
      let amount = self.amount(&kind, None).await?;
      return self
        .commit(payee.id, &kind, None, amount, Some(extra))
        .await
        .map(Outcome::Done);
    }

    let site = match host.or(record.host.as_deref()) {
      Some(code) => lookup.site(code).await?,
      None => None,
    };
    let payee = match domain_gate(site.as_ref(), payee.as_ref()) {
      Ok(payee) => payee,
      Err(skip) => {
        debug!("`{kind}` for {} {} gated: {skip:?}", user.kind, user.id);
        return Ok(Outcome::Skipped(skip));
      }
    };

    let Some(info) = record.banner_info()? else {
      return Ok(Outcome::Skipped(Skip::BannerNotFound));
    };
    let banner = lookup.banner(info.banner_id).await?;
    if banner.is_none() {
      warn!("banner {} of {} {} is gone", info.banner_id, user.kind, user.id);
    }

    let amount = self.amount(&kind, banner.as_ref()).await?;
    self
      .commit(payee.id, &kind, banner.as_ref(), amount, Some(extra))
      .await
      .map(Outcome::Done)
  }

  /// Pays the affiliate hosting `banner` for a first click in a session.
  pub async fn grant_click(
    &self,
    banner: &banner::Model,
    payee_code: Option<&str>,
    referer: &str,
  ) -> Result<Outcome<history::Model>> {
    let kind = click_type(&banner.kind);

    let lookup = Lookup::new(self.db);
    let payee = match payee_code {
      Some(code) => lookup.affiliate(code).await?,
      None => None,
    };
    let host = host_token(referer);
    let site = match host.as_deref() {
      Some(code) => lookup.site(code).await?,
      None => None,
    };

    let payee = match domain_gate(site.as_ref(), payee.as_ref()) {
      Ok(payee) => payee,
      Err(skip) => {
        debug!("`{kind}` for banner {} gated: {skip:?}", banner.id);
        return Ok(Outcome::Skipped(skip));
      }
    };

    let amount = self.rate(&kind).await?;
    let extra = json!({ "banner_id": banner.id, "host": host });
    self
      .commit(payee.id, &kind, Some(banner), amount, Some(extra))
      .await
      .map(Outcome::Done)
  }

  /// Latest commissions granted to an affiliate.
  pub async fn history(
    &self,
    payee_id: i64,
    limit: u64,
  ) -> Result<Vec<history::Model>> {
    Ok(
      history::Entity::find()
        .filter(history::Column::UserId.eq(payee_id))
        .order_by_desc(history::Column::Id)
        .limit(limit)
        .all(self.db)
        .await?,
    )
  }
}
