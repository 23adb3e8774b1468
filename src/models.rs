pub mod auth;
pub mod employee;
pub mod ledger;
pub mod stats;
