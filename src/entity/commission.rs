use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Flat commission rate keyed by commission type,
/// e.g. `seller-banner-registration` or `product-click`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "commissions")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i64,
  #[sea_orm(column_name = "type", unique)]
  pub kind: String,
  pub commission: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
