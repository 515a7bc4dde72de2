//! Referral record of a registered user.
//!
//! The table name is configurable, so this entity is written in the expanded
//! form instead of `DeriveEntityModel`. Call [`set_table_name`] once at
//! startup, before the first query.

use std::{fmt, sync::OnceLock};

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub const DEFAULT_TABLE: &str = "referrers";

static TABLE: OnceLock<String> = OnceLock::new();

/// Returns `false` if a name was already set.
pub fn set_table_name(name: impl Into<String>) -> bool {
  TABLE.set(name.into()).is_ok()
}

pub fn table_name() -> &'static str {
  TABLE.get().map(String::as_str).unwrap_or(DEFAULT_TABLE)
}

/// Kind of account that owns a referral record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum UserKind {
  #[sea_orm(string_value = "seller")]
  Seller,
  #[sea_orm(string_value = "buyer")]
  Buyer,
}

impl fmt::Display for UserKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::Seller => "seller",
      Self::Buyer => "buyer",
    })
  }
}

#[derive(Copy, Clone, Default, Debug, DeriveEntity)]
pub struct Entity;

impl EntityName for Entity {
  fn table_name(&self) -> &str {
    table_name()
  }
}

#[derive(
  Clone, Debug, PartialEq, DeriveModel, DeriveActiveModel, Serialize, Deserialize,
)]
pub struct Model {
  pub id: i64,
  pub user_id: i64,
  pub user_type: UserKind,
  /// Referral code of the affiliate that brought the user in.
  pub referrer: Option<String>,
  /// Host token, matched against `user_sites.code`.
  pub host: Option<String>,
  /// Offer commission snapshot taken at capture time.
  pub commission: Option<i64>,
  /// JSON `{"banner_id": N}` when the signup came through a banner.
  pub info: Option<String>,
  pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveColumn)]
pub enum Column {
  Id,
  UserId,
  UserType,
  Referrer,
  Host,
  Commission,
  Info,
  CreatedAt,
}

#[derive(Copy, Clone, Debug, EnumIter, DerivePrimaryKey)]
pub enum PrimaryKey {
  Id,
}

impl PrimaryKeyTrait for PrimaryKey {
  type ValueType = i64;

  fn auto_increment() -> bool {
    true
  }
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {}

impl ColumnTrait for Column {
  type EntityName = Entity;

  fn def(&self) -> ColumnDef {
    match self {
      Self::Id => ColumnType::BigInteger.def(),
      Self::UserId => ColumnType::BigInteger.def(),
      Self::UserType => UserKind::db_type(),
      Self::Referrer => ColumnType::Text.def().null(),
      Self::Host => ColumnType::Text.def().null(),
      Self::Commission => ColumnType::BigInteger.def().null(),
      Self::Info => ColumnType::Text.def().null(),
      Self::CreatedAt => ColumnType::DateTime.def(),
    }
  }
}

impl RelationTrait for Relation {
  fn def(&self) -> RelationDef {
    match *self {}
  }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BannerInfo {
  pub banner_id: i64,
}

impl Model {
  /// Banner attribution payload, `None` for direct referrals.
  pub fn banner_info(&self) -> Result<Option<BannerInfo>, json::Error> {
    self.info.as_deref().map(json::from_str).transpose()
  }
}
