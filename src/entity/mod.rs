pub mod affiliate;
pub mod banner;
pub mod commission;
pub mod commission_offer;
pub mod history;
pub mod referrer;
pub mod seller_item;
pub mod site;
pub mod statistic;
pub mod wallet;

pub use referrer::UserKind;
pub use seller_item::ItemKind;
pub use site::SiteStatus;
pub use statistic::ReportableKind;
