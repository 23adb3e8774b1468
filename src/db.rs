pub mod employee_repo;
pub use employee_repo::EmployeeRepository;
pub mod ledger_repo;
pub use ledger_repo::LedgerRepository;
pub mod stats_repo;
pub use stats_repo::StatsRepository;

#[cfg(test)]
pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::{error::AppError, period::DateWindow},
    models::{
        employee::Employee,
        ledger::{PackageSale, Receipt},
        stats::EmployeeStatsRecord,
    },
};

// ---
// Portas usadas pelo motor de estatísticas.
// Postgres em produção, memória nos testes.
// ---

#[async_trait]
pub trait EmployeeDirectory: Send + Sync {
    async fn get_employee(&self, id: Uuid) -> Result<Option<Employee>, AppError>;

    async fn list_employee_ids(&self) -> Result<Vec<Uuid>, AppError>;
}

#[async_trait]
pub trait LedgerReader: Send + Sync {
    async fn list_sales(&self, employee_id: Uuid, window: DateWindow)
        -> Result<Vec<PackageSale>, AppError>;

    async fn list_receipts(&self, employee_id: Uuid, window: DateWindow)
        -> Result<Vec<Receipt>, AppError>;
}

#[async_trait]
pub trait LedgerWriter: Send + Sync {
    async fn insert_sale(
        &self,
        employee_id: Uuid,
        package_ref: Option<&str>,
        client_name: &str,
        amount: Decimal,
        sale_date: NaiveDate,
    ) -> Result<PackageSale, AppError>;

    async fn insert_receipt(
        &self,
        employee_id: Uuid,
        client_name: &str,
        amount: Decimal,
        receipt_date: NaiveDate,
    ) -> Result<Receipt, AppError>;
}

#[async_trait]
pub trait StatsStore: Send + Sync {
    async fn find(&self, employee_id: Uuid) -> Result<Option<EmployeeStatsRecord>, AppError>;

    /// Cria o registro zerado se ainda não existir. Retorna (registro, criado?).
    async fn insert_if_absent(
        &self,
        employee_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<(EmployeeStatsRecord, bool), AppError>;

    async fn save(&self, record: &EmployeeStatsRecord) -> Result<(), AppError>;
}
