use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "commission_offers")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i64,
  /// JSON object, see [`OfferCommission`].
  pub commission: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferCommission {
  pub user_commission: i64,
}

impl Model {
  pub fn terms(&self) -> Result<OfferCommission, json::Error> {
    json::from_str(&self.commission)
  }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
