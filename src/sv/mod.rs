pub mod commission;
pub mod lookup;
pub mod referrer;
pub mod stats;
#[cfg(test)]
pub mod test_utils;
pub mod tracker;
pub mod wallet;

pub use commission::Commission;
pub use lookup::Lookup;
pub use referrer::Referrer;
pub use stats::Stats;
pub use tracker::Tracker;
pub use wallet::Wallet;
