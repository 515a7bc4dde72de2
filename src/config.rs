use std::{env, str::FromStr};

use crate::{entity::referrer, prelude::*};

/// What to do when no flat rate exists for a commission type.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum MissingRate {
  /// Grant a zero amount and keep going.
  #[default]
  Zero,
  /// Refuse the grant with [`Error::RateNotFound`].
  Fail,
}

impl FromStr for MissingRate {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "zero" => Ok(Self::Zero),
      "fail" => Ok(Self::Fail),
      other => Err(Error::InvalidArgs(format!(
        "unknown missing rate policy `{other}`"
      ))),
    }
  }
}

/// How the billed cost of a seller item is recomputed on each impression.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum CostFormula {
  /// `(total_click + total_view) * rate`, where `rate` is the rate of the
  /// event being recorded. This is what existing installations bill with.
  #[default]
  Legacy,
  /// `total_click * click_rate + total_view * view_rate`.
  Split,
}

impl FromStr for CostFormula {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "legacy" => Ok(Self::Legacy),
      "split" => Ok(Self::Split),
      other => {
        Err(Error::InvalidArgs(format!("unknown cost formula `{other}`")))
      }
    }
  }
}

#[derive(Debug, Clone)]
pub struct Config {
  pub database_url: String,
  pub port: u16,
  pub referrers_table: String,
  pub click_cookie: String,
  pub missing_rate: MissingRate,
  pub cost_formula: CostFormula,
  pub rate_limit_per_sec: u64,
  pub rate_limit_burst: u32,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      database_url: "sqlite:affiliate.db?mode=rwc".into(),
      port: 3000,
      referrers_table: referrer::DEFAULT_TABLE.into(),
      click_cookie: "_ar_click".into(),
      missing_rate: MissingRate::default(),
      cost_formula: CostFormula::default(),
      rate_limit_per_sec: 2,
      rate_limit_burst: 100,
    }
  }
}

impl Config {
  pub fn from_env() -> Result<Self> {
    let mut config = Self::default();

    if let Ok(url) = env::var("DATABASE_URL") {
      config.database_url = url;
    }
    if let Some(port) = parse_var("PORT")? {
      config.port = port;
    }
    if let Ok(table) = env::var("AFFILIATE_REFERRERS_TABLE")
      && !table.trim().is_empty()
    {
      config.referrers_table = table.trim().to_string();
    }
    if let Ok(cookie) = env::var("AFFILIATE_CLICK_COOKIE")
      && !cookie.trim().is_empty()
    {
      config.click_cookie = cookie.trim().to_string();
    }
    if let Some(policy) = parse_var("AFFILIATE_MISSING_RATE")? {
      config.missing_rate = policy;
    }
    if let Some(formula) = parse_var("AFFILIATE_COST_FORMULA")? {
      config.cost_formula = formula;
    }
    if let Some(per_sec) = parse_var("AFFILIATE_RATE_LIMIT_PER_SEC")? {
      config.rate_limit_per_sec = per_sec;
    }
    if let Some(burst) = parse_var("AFFILIATE_RATE_LIMIT_BURST")? {
      config.rate_limit_burst = burst;
    }

    Ok(config)
  }
}

fn parse_var<T>(key: &str) -> Result<Option<T>>
where
  T: FromStr,
  T::Err: std::fmt::Display,
{
  match env::var(key) {
    Ok(raw) if !raw.trim().is_empty() => raw
      .trim()
      .parse()
      .map(Some)
      .map_err(|e| Error::InvalidArgs(format!("{key}: {e}"))),
    _ => Ok(None),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_policies_parse() {
    assert_eq!("zero".parse::<MissingRate>().unwrap(), MissingRate::Zero);
    assert_eq!(" FAIL ".parse::<MissingRate>().unwrap(), MissingRate::Fail);
    assert_eq!("split".parse::<CostFormula>().unwrap(), CostFormula::Split);
    assert!("both".parse::<CostFormula>().is_err());
  }

  #[test]
  fn test_defaults() {
    let config = Config::default();
    assert_eq!(config.click_cookie, "_ar_click");
    assert_eq!(config.referrers_table, "referrers");
    assert_eq!(config.missing_rate, MissingRate::Zero);
    assert_eq!(config.cost_formula, CostFormula::Legacy);
  }
}
