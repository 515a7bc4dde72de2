use crate::{
  entity::{UserKind, referrer},
  model::{NewUser, Outcome, Signals, Skip},
  prelude::*,
  sv::Lookup,
};

pub struct Referrer<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Referrer<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  /// Referral record owned by the given user, if any.
  pub async fn of(
    &self,
    kind: UserKind,
    user_id: i64,
  ) -> Result<Option<referrer::Model>> {
    Ok(
      referrer::Entity::find()
        .filter(referrer::Column::UserType.eq(kind))
        .filter(referrer::Column::UserId.eq(user_id))
        .one(self.db)
        .await?,
    )
  }

  /// Records who referred a freshly registered user.
  ///
  /// A banner token only counts when it resolves to an existing banner.
  /// Nothing is written if neither a banner nor a referral code is present.
  pub async fn capture(
    &self,
    user: &NewUser,
    signals: &Signals,
  ) -> Result<Outcome<referrer::Model>> {
    if self.of(user.kind, user.id).await?.is_some() {
      debug!("{} {} already has a referrer", user.kind, user.id);
      return Ok(Outcome::Skipped(Skip::AlreadyReferred));
    }

    let lookup = Lookup::new(self.db);

    let banner = match signals.banner_id() {
      Some(banner_id) => lookup.banner(banner_id).await?,
      None => None,
    };

    let mut commission = None;
    let mut info = None;
    if let Some(banner) = &banner {
      if let Some(offer_id) = banner.offer_id {
        commission = lookup.offer_commission(offer_id).await?;
      }
      info = Some(json::to_string(&referrer::BannerInfo {
        banner_id: banner.id,
      })?);
    }

    let code = signals.referrer();
    if banner.is_none() && code.is_none() {
      debug!("no referral signal for {} {}", user.kind, user.id);
      return Ok(Outcome::Skipped(Skip::NoSignal));
    }

    let record = referrer::ActiveModel {
      id: NotSet,
      user_id: Set(user.id),
      user_type: Set(user.kind),
      referrer: Set(code.map(String::from)),
      host: Set(signals.host().map(String::from)),
      commission: Set(commission),
      info: Set(info),
      created_at: Set(Utc::now().naive_utc()),
    }
    .insert(self.db)
    .await?;

    info!(
      "captured referrer {:?} for {} {}",
      record.referrer, user.kind, user.id
    );
    Ok(Outcome::Done(record))
  }
}
