// src/models/stats.rs

use std::ops::AddAssign;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::common::{money::round_money, period::StatsPeriod};

/// Um "balde" de contadores (diário, semanal ou mensal).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatsCounters {
    pub package_count: i64,
    // Clientes distintos na janela (no semanal/mensal é soma dos diários)
    pub client_count: i64,
    #[schema(example = "120.00")]
    pub revenue: Decimal,
    #[schema(example = "18.00")]
    pub commission: Decimal,
}

impl StatsCounters {
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }

    /// Mesma contagem e diferença monetária abaixo de um centavo.
    pub fn matches(&self, other: &StatsCounters) -> bool {
        let tolerance = Decimal::new(1, 2);
        self.package_count == other.package_count
            && self.client_count == other.client_count
            && (self.revenue - other.revenue).abs() < tolerance
            && (self.commission - other.commission).abs() < tolerance
    }
}

// Os valores já chegam arredondados; re-arredondar só normaliza a escala.
impl AddAssign for StatsCounters {
    fn add_assign(&mut self, rhs: Self) {
        self.package_count += rhs.package_count;
        self.client_count += rhs.client_count;
        self.revenue = round_money(self.revenue + rhs.revenue);
        self.commission = round_money(self.commission + rhs.commission);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeStatsRecord {
    pub employee_id: Uuid,
    pub daily: StatsCounters,
    pub weekly: StatsCounters,
    pub monthly: StatsCounters,

    // Último dia já consolidado no semanal
    #[schema(value_type = Option<String>, format = Date)]
    pub daily_rolled_through: Option<NaiveDate>,
    // Último domingo em que o semanal foi consolidado no mensal
    #[schema(value_type = Option<String>, format = Date)]
    pub weekly_rolled_through: Option<NaiveDate>,

    pub last_updated: DateTime<Utc>,
}

impl EmployeeStatsRecord {
    pub fn empty(employee_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            employee_id,
            daily: StatsCounters::default(),
            weekly: StatsCounters::default(),
            monthly: StatsCounters::default(),
            daily_rolled_through: None,
            weekly_rolled_through: None,
            last_updated: now,
        }
    }

    pub fn bucket(&self, period: StatsPeriod) -> StatsCounters {
        match period {
            StatsPeriod::Today => self.daily,
            StatsPeriod::Week => self.weekly,
            StatsPeriod::Month => self.monthly,
        }
    }
}

// Linha "achatada" da tabela employee_stats
#[derive(Debug, Clone, FromRow)]
pub struct EmployeeStatsRow {
    pub employee_id: Uuid,
    pub daily_package_count: i64,
    pub daily_client_count: i64,
    pub daily_revenue: Decimal,
    pub daily_commission: Decimal,
    pub weekly_package_count: i64,
    pub weekly_client_count: i64,
    pub weekly_revenue: Decimal,
    pub weekly_commission: Decimal,
    pub monthly_package_count: i64,
    pub monthly_client_count: i64,
    pub monthly_revenue: Decimal,
    pub monthly_commission: Decimal,
    pub daily_rolled_through: Option<NaiveDate>,
    pub weekly_rolled_through: Option<NaiveDate>,
    pub last_updated: DateTime<Utc>,
}

impl From<EmployeeStatsRow> for EmployeeStatsRecord {
    fn from(row: EmployeeStatsRow) -> Self {
        Self {
            employee_id: row.employee_id,
            daily: StatsCounters {
                package_count: row.daily_package_count,
                client_count: row.daily_client_count,
                revenue: row.daily_revenue,
                commission: row.daily_commission,
            },
            weekly: StatsCounters {
                package_count: row.weekly_package_count,
                client_count: row.weekly_client_count,
                revenue: row.weekly_revenue,
                commission: row.weekly_commission,
            },
            monthly: StatsCounters {
                package_count: row.monthly_package_count,
                client_count: row.monthly_client_count,
                revenue: row.monthly_revenue,
                commission: row.monthly_commission,
            },
            daily_rolled_through: row.daily_rolled_through,
            weekly_rolled_through: row.weekly_rolled_through,
            last_updated: row.last_updated,
        }
    }
}

/// Resposta de GET /employees/{id}/stats
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatsReport {
    pub period: StatsPeriod,
    pub total_packages: i64,
    pub total_clients: i64,
    pub total_revenue: Decimal,
    pub commission: Decimal,
    pub real_time_stats: StatsCounters,
    pub stats_match: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InitializeStatsResponse {
    pub record: EmployeeStatsRecord,
    pub created: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RolloverFailure {
    pub employee_id: Uuid,
    pub error: String,
}

/// Resultado de um lote (rollover ou reset mensal).
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RolloverReport {
    pub processed: usize,
    pub skipped: usize,
    pub failed: Vec<RolloverFailure>,
}

impl RolloverReport {
    pub fn merge(&mut self, other: RolloverReport) {
        self.processed += other.processed;
        self.skipped += other.skipped;
        self.failed.extend(other.failed);
    }
}
