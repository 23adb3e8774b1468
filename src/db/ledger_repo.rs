// src/db/ledger_repo.rs

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{error::AppError, period::DateWindow},
    db::{LedgerReader, LedgerWriter},
    models::ledger::{PackageSale, Receipt},
};

#[derive(Clone)]
pub struct LedgerRepository {
    pool: PgPool,
}

impl LedgerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// =========================================================================
//  ESCRITA (append-only)
// =========================================================================

#[async_trait]
impl LedgerWriter for LedgerRepository {
    async fn insert_sale(
        &self,
        employee_id: Uuid,
        package_ref: Option<&str>,
        client_name: &str,
        amount: Decimal,
        sale_date: NaiveDate,
    ) -> Result<PackageSale, AppError> {
        let sale = sqlx::query_as::<_, PackageSale>(
            r#"
            INSERT INTO package_sales (employee_id, package_ref, client_name, amount, sale_date)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, employee_id, package_ref, client_name, amount, sale_date, created_at
            "#,
        )
        .bind(employee_id)
        .bind(package_ref)
        .bind(client_name)
        .bind(amount)
        .bind(sale_date)
        .fetch_one(&self.pool)
        .await?;

        Ok(sale)
    }

    async fn insert_receipt(
        &self,
        employee_id: Uuid,
        client_name: &str,
        amount: Decimal,
        receipt_date: NaiveDate,
    ) -> Result<Receipt, AppError> {
        let receipt = sqlx::query_as::<_, Receipt>(
            r#"
            INSERT INTO receipts (employee_id, client_name, amount, receipt_date)
            VALUES ($1, $2, $3, $4)
            RETURNING id, employee_id, client_name, amount, receipt_date, created_at
            "#,
        )
        .bind(employee_id)
        .bind(client_name)
        .bind(amount)
        .bind(receipt_date)
        .fetch_one(&self.pool)
        .await?;

        Ok(receipt)
    }
}

// =========================================================================
//  LEITURA (janela semiaberta [start, end))
// =========================================================================

#[async_trait]
impl LedgerReader for LedgerRepository {
    async fn list_sales(
        &self,
        employee_id: Uuid,
        window: DateWindow,
    ) -> Result<Vec<PackageSale>, AppError> {
        let sales = sqlx::query_as::<_, PackageSale>(
            r#"
            SELECT id, employee_id, package_ref, client_name, amount, sale_date, created_at
            FROM package_sales
            WHERE employee_id = $1
              AND sale_date >= $2
              AND sale_date < $3
            ORDER BY sale_date ASC, created_at ASC
            "#,
        )
        .bind(employee_id)
        .bind(window.start)
        .bind(window.end)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    async fn list_receipts(
        &self,
        employee_id: Uuid,
        window: DateWindow,
    ) -> Result<Vec<Receipt>, AppError> {
        let receipts = sqlx::query_as::<_, Receipt>(
            r#"
            SELECT id, employee_id, client_name, amount, receipt_date, created_at
            FROM receipts
            WHERE employee_id = $1
              AND receipt_date >= $2
              AND receipt_date < $3
            ORDER BY receipt_date ASC, created_at ASC
            "#,
        )
        .bind(employee_id)
        .bind(window.start)
        .bind(window.end)
        .fetch_all(&self.pool)
        .await?;

        Ok(receipts)
    }
}
