// src/services/stats_query.rs

use std::sync::Arc;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    common::{error::AppError, period::StatsPeriod},
    db::EmployeeDirectory,
    models::stats::{StatsCounters, StatsReport},
    services::stats_engine::StatsEngine,
};

// Caminho de leitura exposto à API
#[derive(Clone)]
pub struct StatsQueryService {
    engine: StatsEngine,
    employees: Arc<dyn EmployeeDirectory>,
}

impl StatsQueryService {
    pub fn new(engine: StatsEngine, employees: Arc<dyn EmployeeDirectory>) -> Self {
        Self { engine, employees }
    }

    /// Contadores persistidos do balde: today -> diário, week -> semanal, month -> mensal.
    pub async fn get_stats(&self, employee_id: Uuid, period: &str) -> Result<StatsCounters, AppError> {
        let period: StatsPeriod = period.parse()?;
        self.persisted(employee_id, period).await
    }

    /// Persistido + recálculo ao vivo para detectar divergência.
    /// O valor persistido continua sendo o oficial para pagamento de comissão.
    pub async fn get_stats_report(
        &self,
        employee_id: Uuid,
        period: &str,
        today: NaiveDate,
    ) -> Result<StatsReport, AppError> {
        let persisted = self.get_stats(employee_id, period).await?;
        let period: StatsPeriod = period.parse()?;

        let real_time_stats = self
            .engine
            .compute_period_stats(employee_id, period.live_window(today))
            .await?;

        let stats_match = persisted.matches(&real_time_stats);
        if !stats_match {
            tracing::warn!(
                %employee_id,
                %period,
                "Divergência entre estatística acumulada e recálculo em tempo real"
            );
        }

        Ok(StatsReport {
            period,
            total_packages: persisted.package_count,
            total_clients: persisted.client_count,
            total_revenue: persisted.revenue,
            commission: persisted.commission,
            real_time_stats,
            stats_match,
        })
    }

    async fn persisted(&self, employee_id: Uuid, period: StatsPeriod) -> Result<StatsCounters, AppError> {
        if self.employees.get_employee(employee_id).await?.is_none() {
            return Err(AppError::EmployeeNotFound);
        }

        let record = self.engine.current_record(employee_id).await?;
        Ok(record.bucket(period))
    }
}
