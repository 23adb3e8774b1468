// src/services/stats_engine.rs

use std::{collections::HashSet, sync::Arc};

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        money::{commission_for, ht_from_ttc, round_money},
        period::{next_day, previous_day, DateWindow},
    },
    db::{EmployeeDirectory, LedgerReader, StatsStore},
    models::{
        ledger::{PackageSale, Receipt},
        stats::{EmployeeStatsRecord, RolloverFailure, RolloverReport, StatsCounters},
    },
    services::employee_locks::EmployeeLocks,
};

/// Agrega vendas e recibos de uma janela.
///
/// Vendas entram em HT (valor / 1.20) e contam um pacote; recibos entram pelo valor bruto.
/// Clientes são contados por nome distinto entre vendas e recibos.
pub fn aggregate(sales: &[PackageSale], receipts: &[Receipt], percentage: Decimal) -> StatsCounters {
    let mut clients: HashSet<&str> = HashSet::new();
    let mut revenue = Decimal::ZERO;

    for sale in sales {
        revenue += ht_from_ttc(sale.amount);
        clients.insert(sale.client_name.as_str());
    }
    for receipt in receipts {
        revenue += receipt.amount;
        clients.insert(receipt.client_name.as_str());
    }

    let revenue = round_money(revenue);

    StatsCounters {
        package_count: sales.len() as i64,
        client_count: clients.len() as i64,
        revenue,
        commission: commission_for(revenue, percentage),
    }
}

/// Delta de uma única transação para o balde diário.
pub fn single_transaction_delta(revenue: Decimal, percentage: Decimal, is_package: bool) -> StatsCounters {
    let revenue = round_money(revenue);
    StatsCounters {
        package_count: if is_package { 1 } else { 0 },
        client_count: 1,
        revenue,
        commission: commission_for(revenue, percentage),
    }
}

#[derive(Clone)]
pub struct StatsEngine {
    employees: Arc<dyn EmployeeDirectory>,
    ledger: Arc<dyn LedgerReader>,
    store: Arc<dyn StatsStore>,
    locks: EmployeeLocks,
}

impl StatsEngine {
    pub fn new(
        employees: Arc<dyn EmployeeDirectory>,
        ledger: Arc<dyn LedgerReader>,
        store: Arc<dyn StatsStore>,
        locks: EmployeeLocks,
    ) -> Self {
        Self {
            employees,
            ledger,
            store,
            locks,
        }
    }

    // =========================================================================
    //  CÁLCULO EM TEMPO REAL
    // =========================================================================

    pub async fn compute_period_stats(
        &self,
        employee_id: Uuid,
        window: DateWindow,
    ) -> Result<StatsCounters, AppError> {
        let employee = self
            .employees
            .get_employee(employee_id)
            .await?
            .ok_or(AppError::EmployeeNotFound)?;

        let sales = self.ledger.list_sales(employee_id, window).await?;
        let receipts = self.ledger.list_receipts(employee_id, window).await?;

        Ok(aggregate(&sales, &receipts, employee.commission_percentage))
    }

    // =========================================================================
    //  REGISTRO
    // =========================================================================

    pub async fn initialize_for_employee(
        &self,
        employee_id: Uuid,
    ) -> Result<(EmployeeStatsRecord, bool), AppError> {
        if self.employees.get_employee(employee_id).await?.is_none() {
            return Err(AppError::EmployeeNotFound);
        }

        self.store.insert_if_absent(employee_id, Utc::now()).await
    }

    /// Leitura do registro, criando-o zerado se necessário.
    pub async fn current_record(&self, employee_id: Uuid) -> Result<EmployeeStatsRecord, AppError> {
        match self.store.find(employee_id).await? {
            Some(record) => Ok(record),
            None => Ok(self.store.insert_if_absent(employee_id, Utc::now()).await?.0),
        }
    }

    /// Soma o delta de uma transação do dia `entry_date` no balde diário.
    ///
    /// Se esse dia já foi consolidado, o lançamento fica só no ledger.
    pub async fn add_to_daily(
        &self,
        employee_id: Uuid,
        entry_date: NaiveDate,
        delta: StatsCounters,
    ) -> Result<EmployeeStatsRecord, AppError> {
        let _guard = self.locks.acquire(employee_id).await;

        let mut record = self.current_record(employee_id).await?;
        if record.daily_rolled_through.is_some_and(|d| d >= entry_date) {
            tracing::debug!(%employee_id, "Dia {} já consolidado, delta fica só no ledger", entry_date);
            return Ok(record);
        }

        record.daily += delta;
        record.last_updated = Utc::now();
        self.store.save(&record).await?;

        Ok(record)
    }

    // =========================================================================
    //  ROLLOVERS
    // =========================================================================

    /// Consolida o dia `closed_day` no semanal, funcionário por funcionário.
    ///
    /// O diário é reconstruído a partir do ledger com os dias ainda abertos
    /// (`closed_day + 1` até `today`), então o que entrou depois da meia-noite não se perde.
    /// Quem já tem `daily_rolled_through >= closed_day` é pulado, então rodar de novo
    /// só reprocessa quem falhou.
    pub async fn rollover_daily(
        &self,
        closed_day: NaiveDate,
        today: NaiveDate,
    ) -> Result<RolloverReport, AppError> {
        tracing::info!("Rollover diário iniciado (dia {})", closed_day);

        let ids = self.employees.list_employee_ids().await?;
        let mut report = RolloverReport::default();

        for employee_id in ids {
            match self.rollover_daily_for(employee_id, closed_day, today).await {
                Ok(true) => report.processed += 1,
                Ok(false) => {
                    tracing::debug!(%employee_id, "Diário de {} já consolidado, pulando", closed_day);
                    report.skipped += 1;
                }
                Err(e) => {
                    tracing::error!(%employee_id, "Falha no rollover diário: {}", e);
                    report.failed.push(RolloverFailure {
                        employee_id,
                        error: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            processed = report.processed,
            skipped = report.skipped,
            failed = report.failed.len(),
            "Rollover diário concluído (dia {})",
            closed_day
        );
        Ok(report)
    }

    async fn rollover_daily_for(
        &self,
        employee_id: Uuid,
        closed_day: NaiveDate,
        today: NaiveDate,
    ) -> Result<bool, AppError> {
        let _guard = self.locks.acquire(employee_id).await;

        let mut record = self.current_record(employee_id).await?;
        if record.daily_rolled_through.is_some_and(|d| d >= closed_day) {
            return Ok(false);
        }

        let day_stats = self
            .compute_period_stats(employee_id, DateWindow::single_day(closed_day))
            .await?;

        let first_open = next_day(closed_day);
        let open_days = DateWindow::new(first_open, next_day(today).max(first_open));
        let still_open = self.compute_period_stats(employee_id, open_days).await?;

        record.weekly += day_stats;
        record.daily = still_open;
        record.daily_rolled_through = Some(closed_day);
        record.last_updated = Utc::now();
        self.store.save(&record).await?;

        Ok(true)
    }

    /// Consolida o semanal no mensal e zera o semanal. `boundary` é o domingo que fecha a semana.
    ///
    /// Funcionário cujo sábado ainda não foi consolidado vai para `failed` e fica intocado.
    pub async fn rollover_weekly(&self, boundary: NaiveDate) -> Result<RolloverReport, AppError> {
        tracing::info!("Rollover semanal iniciado (fronteira {})", boundary);

        let ids = self.employees.list_employee_ids().await?;
        let mut report = RolloverReport::default();

        for employee_id in ids {
            match self.rollover_weekly_for(employee_id, boundary).await {
                Ok(true) => report.processed += 1,
                Ok(false) => report.skipped += 1,
                Err(e) => {
                    tracing::error!(%employee_id, "Falha no rollover semanal: {}", e);
                    report.failed.push(RolloverFailure {
                        employee_id,
                        error: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            processed = report.processed,
            skipped = report.skipped,
            failed = report.failed.len(),
            "Rollover semanal concluído (fronteira {})",
            boundary
        );
        Ok(report)
    }

    async fn rollover_weekly_for(&self, employee_id: Uuid, boundary: NaiveDate) -> Result<bool, AppError> {
        let _guard = self.locks.acquire(employee_id).await;

        let mut record = self.current_record(employee_id).await?;
        if record.weekly_rolled_through.is_some_and(|d| d >= boundary) {
            return Ok(false);
        }

        let last_day = previous_day(boundary);
        if !record.daily_rolled_through.is_some_and(|d| d >= last_day) {
            return Err(AppError::DailyRolloverPending(last_day));
        }

        let week = record.weekly;
        record.monthly += week;
        record.weekly = StatsCounters::default();
        record.weekly_rolled_through = Some(boundary);
        record.last_updated = Utc::now();
        self.store.save(&record).await?;

        Ok(true)
    }

    /// Zera o mensal de todos. Ação administrativa, nunca agendada.
    pub async fn reset_monthly(&self) -> Result<RolloverReport, AppError> {
        let ids = self.employees.list_employee_ids().await?;
        let mut report = RolloverReport::default();

        for employee_id in ids {
            let result: Result<(), AppError> = async {
                let _guard = self.locks.acquire(employee_id).await;
                let mut record = self.current_record(employee_id).await?;
                record.monthly = StatsCounters::default();
                record.last_updated = Utc::now();
                self.store.save(&record).await
            }
            .await;

            match result {
                Ok(()) => report.processed += 1,
                Err(e) => {
                    tracing::error!(%employee_id, "Falha ao zerar o mensal: {}", e);
                    report.failed.push(RolloverFailure {
                        employee_id,
                        error: e.to_string(),
                    });
                }
            }
        }

        tracing::warn!(
            processed = report.processed,
            failed = report.failed.len(),
            "Estatísticas mensais zeradas"
        );
        Ok(report)
    }
}
