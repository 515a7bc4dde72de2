use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::commission_offer;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "banners")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i64,
  /// Audience tag, e.g. `seller`. Prefixes click commission types.
  #[sea_orm(column_name = "type")]
  pub kind: String,
  pub offer_id: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "commission_offer::Entity",
    from = "Column::OfferId",
    to = "commission_offer::Column::Id"
  )]
  Offer,
}

impl Related<commission_offer::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Offer.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
