use std::fmt;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
  #[sea_orm(string_value = "product")]
  Product,
  #[sea_orm(string_value = "service")]
  Service,
}

impl fmt::Display for ItemKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::Product => "product",
      Self::Service => "service",
    })
  }
}

/// Seller product or service whose impressions are billed per view/click.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "seller_items")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i64,
  pub kind: ItemKind,
  pub total_view: i64,
  pub total_click: i64,
  pub total_cost: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
