pub mod bill_dates;
pub mod enums;
pub mod outcomes;
pub mod subscriptions;
