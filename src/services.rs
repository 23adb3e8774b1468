pub mod auth;
pub mod dashboard_events;
pub mod employee_locks;
pub mod ledger_service;
pub mod scheduler;
pub mod stats_engine;
pub mod stats_query;
