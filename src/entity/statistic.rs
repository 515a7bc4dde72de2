use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::seller_item::ItemKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum ReportableKind {
  #[sea_orm(string_value = "banner")]
  Banner,
  #[sea_orm(string_value = "product")]
  Product,
  #[sea_orm(string_value = "service")]
  Service,
}

impl ReportableKind {
  pub fn item(self) -> Option<ItemKind> {
    match self {
      Self::Banner => None,
      Self::Product => Some(ItemKind::Product),
      Self::Service => Some(ItemKind::Service),
    }
  }
}

impl From<ItemKind> for ReportableKind {
  fn from(kind: ItemKind) -> Self {
    match kind {
      ItemKind::Product => Self::Product,
      ItemKind::Service => Self::Service,
    }
  }
}

/// Append-only snapshot of the counters of one reportable item.
/// The row with the highest id is the current state.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "statistics")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i64,
  pub user_id: Option<i64>,
  pub reportable_id: i64,
  pub reportable_type: ReportableKind,
  pub view: i64,
  pub click: i64,
  pub total_view: i64,
  pub total_click: i64,
  pub ip_address: Option<String>,
  pub user_agent: Option<String>,
  pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
