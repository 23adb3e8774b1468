pub mod admin;
pub mod events;
pub mod ledger;
pub mod stats;
