use crate::{
  entity::{affiliate, banner, commission_offer, site},
  prelude::*,
};

/// Read side of the reference tables this service does not own.
pub struct Lookup<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Lookup<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  pub async fn banner(&self, banner_id: i64) -> Result<Option<banner::Model>> {
    Ok(banner::Entity::find_by_id(banner_id).one(self.db).await?)
  }

  /// `user_commission` of an offer, `None` if the offer does not exist.
  pub async fn offer_commission(&self, offer_id: i64) -> Result<Option<i64>> {
    let Some(offer) =
      commission_offer::Entity::find_by_id(offer_id).one(self.db).await?
    else {
      return Ok(None);
    };

    Ok(Some(offer.terms()?.user_commission))
  }

  pub async fn affiliate(
    &self,
    referral_code: &str,
  ) -> Result<Option<affiliate::Model>> {
    Ok(
      affiliate::Entity::find()
        .filter(affiliate::Column::ReferralCode.eq(referral_code))
        .one(self.db)
        .await?,
    )
  }

  pub async fn site(&self, code: &str) -> Result<Option<site::Model>> {
    Ok(
      site::Entity::find()
        .filter(site::Column::Code.eq(code))
        .one(self.db)
        .await?,
    )
  }
}
