// src/db/stats_repo.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::StatsStore,
    models::stats::{EmployeeStatsRecord, EmployeeStatsRow},
};

const SELECT_COLUMNS: &str = r#"
    employee_id,
    daily_package_count, daily_client_count, daily_revenue, daily_commission,
    weekly_package_count, weekly_client_count, weekly_revenue, weekly_commission,
    monthly_package_count, monthly_client_count, monthly_revenue, monthly_commission,
    daily_rolled_through, weekly_rolled_through, last_updated
"#;

#[derive(Clone)]
pub struct StatsRepository {
    pool: PgPool,
}

impl StatsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StatsStore for StatsRepository {
    async fn find(&self, employee_id: Uuid) -> Result<Option<EmployeeStatsRecord>, AppError> {
        let sql = format!(
            "SELECT {} FROM employee_stats WHERE employee_id = $1",
            SELECT_COLUMNS
        );

        let row = sqlx::query_as::<_, EmployeeStatsRow>(&sql)
            .bind(employee_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(EmployeeStatsRecord::from))
    }

    async fn insert_if_absent(
        &self,
        employee_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<(EmployeeStatsRecord, bool), AppError> {
        let mut tx = self.pool.begin().await?;

        // ON CONFLICT DO NOTHING não retorna linha quando já existe
        let inserted = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO employee_stats (employee_id, last_updated)
            VALUES ($1, $2)
            ON CONFLICT (employee_id) DO NOTHING
            RETURNING employee_id
            "#,
        )
        .bind(employee_id)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await?;

        let sql = format!(
            "SELECT {} FROM employee_stats WHERE employee_id = $1",
            SELECT_COLUMNS
        );
        let row = sqlx::query_as::<_, EmployeeStatsRow>(&sql)
            .bind(employee_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok((EmployeeStatsRecord::from(row), inserted.is_some()))
    }

    async fn save(&self, record: &EmployeeStatsRecord) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE employee_stats SET
                daily_package_count = $2, daily_client_count = $3,
                daily_revenue = $4, daily_commission = $5,
                weekly_package_count = $6, weekly_client_count = $7,
                weekly_revenue = $8, weekly_commission = $9,
                monthly_package_count = $10, monthly_client_count = $11,
                monthly_revenue = $12, monthly_commission = $13,
                daily_rolled_through = $14, weekly_rolled_through = $15,
                last_updated = $16
            WHERE employee_id = $1
            "#,
        )
        .bind(record.employee_id)
        .bind(record.daily.package_count)
        .bind(record.daily.client_count)
        .bind(record.daily.revenue)
        .bind(record.daily.commission)
        .bind(record.weekly.package_count)
        .bind(record.weekly.client_count)
        .bind(record.weekly.revenue)
        .bind(record.weekly.commission)
        .bind(record.monthly.package_count)
        .bind(record.monthly.client_count)
        .bind(record.monthly.revenue)
        .bind(record.monthly.commission)
        .bind(record.daily_rolled_through)
        .bind(record.weekly_rolled_through)
        .bind(record.last_updated)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
