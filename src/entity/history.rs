use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::affiliate;

pub const FROM_BANNER: &str = "banner";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "aff_commission_histories")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i64,
  pub user_id: i64,
  pub from_id: Option<i64>,
  pub from_type: Option<String>,
  pub commission: i64,
  #[sea_orm(column_name = "type")]
  pub kind: String,
  pub information: Option<String>,
  pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "affiliate::Entity",
    from = "Column::UserId",
    to = "affiliate::Column::Id"
  )]
  Affiliate,
}

impl Related<affiliate::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Affiliate.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
