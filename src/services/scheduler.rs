//! Agendador dos rollovers de estatísticas.
//!
//! Dois timers independentes: diário (00:00 local) e semanal (domingo 00:00 local).
//! O agendador só decide *quando* disparar; a lógica fica no `StatsEngine`.
//! Um run-lock impede que um disparo do timer e um disparo manual se sobreponham.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use utoipa::ToSchema;

use crate::{
    common::{
        error::AppError,
        period::{next_day, previous_day, week_start, WEEK_START},
    },
    models::stats::RolloverReport,
    services::stats_engine::StatsEngine,
};

const RETRY_FALLBACK: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Job {
    Daily,
    Weekly,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerStatus {
    pub daily_armed: bool,
    pub weekly_armed: bool,
    pub last_daily_run: Option<DateTime<Utc>>,
    pub last_weekly_run: Option<DateTime<Utc>>,
}

#[derive(Default)]
struct Timers {
    daily: Option<CancellationToken>,
    weekly: Option<CancellationToken>,
    last_daily_run: Option<DateTime<Utc>>,
    last_weekly_run: Option<DateTime<Utc>>,
}

struct Inner {
    engine: StatsEngine,
    run_lock: tokio::sync::Mutex<()>,
    timers: Mutex<Timers>,
}

/// Criado uma vez na raiz de composição (`AppState`).
#[derive(Clone)]
pub struct StatsScheduler {
    inner: Arc<Inner>,
}

impl StatsScheduler {
    pub fn new(engine: StatsEngine) -> Self {
        Self {
            inner: Arc::new(Inner {
                engine,
                run_lock: tokio::sync::Mutex::new(()),
                timers: Mutex::new(Timers::default()),
            }),
        }
    }

    /// Arma os timers que ainda não estão armados.
    pub fn start(&self) {
        let mut timers = self.timers();

        if timers.daily.is_none() {
            let token = CancellationToken::new();
            timers.daily = Some(token.clone());
            tokio::spawn(self.clone().timer_loop(Job::Daily, token));
        }
        if timers.weekly.is_none() {
            let token = CancellationToken::new();
            timers.weekly = Some(token.clone());
            tokio::spawn(self.clone().timer_loop(Job::Weekly, token));
        }

        tracing::info!("Agendador de estatísticas iniciado");
    }

    pub fn stop(&self) {
        let mut timers = self.timers();
        if let Some(token) = timers.daily.take() {
            token.cancel();
        }
        if let Some(token) = timers.weekly.take() {
            token.cancel();
        }
        tracing::info!("Agendador de estatísticas parado");
    }

    pub fn status(&self) -> SchedulerStatus {
        let timers = self.timers();
        SchedulerStatus {
            daily_armed: timers.daily.as_ref().is_some_and(|t| !t.is_cancelled()),
            weekly_armed: timers.weekly.as_ref().is_some_and(|t| !t.is_cancelled()),
            last_daily_run: timers.last_daily_run,
            last_weekly_run: timers.last_weekly_run,
        }
    }

    // =========================================================================
    //  DISPAROS MANUAIS (recuperação de execução perdida ou com falha)
    // =========================================================================

    /// Fecha `day` (padrão: ontem).
    pub async fn trigger_daily_update(&self, day: Option<NaiveDate>) -> Result<RolloverReport, AppError> {
        let today = Local::now().date_naive();
        let closed_day = day.unwrap_or_else(|| previous_day(today));
        self.run_daily(closed_day, today).await
    }

    /// Fecha a semana no domingo mais recente.
    pub async fn trigger_weekly_update(&self) -> Result<RolloverReport, AppError> {
        let today = Local::now().date_naive();
        self.run_weekly(week_start(today), today).await
    }

    pub(crate) async fn run_daily(
        &self,
        closed_day: NaiveDate,
        today: NaiveDate,
    ) -> Result<RolloverReport, AppError> {
        let _run = self.inner.run_lock.lock().await;

        let report = self.inner.engine.rollover_daily(closed_day, today).await?;
        self.timers().last_daily_run = Some(Utc::now());
        Ok(report)
    }

    /// O diário da véspera entra antes de o semanal ir para o mensal.
    /// Se o timer diário já rodou, os marcadores fazem disso um no-op.
    /// Quem falhar no diário fica com o semanal aberto até o sábado ser consolidado.
    pub(crate) async fn run_weekly(
        &self,
        boundary: NaiveDate,
        today: NaiveDate,
    ) -> Result<RolloverReport, AppError> {
        let _run = self.inner.run_lock.lock().await;

        let mut report = self
            .inner
            .engine
            .rollover_daily(previous_day(boundary), today)
            .await?;
        report.merge(self.inner.engine.rollover_weekly(boundary).await?);

        let mut timers = self.timers();
        timers.last_weekly_run = Some(Utc::now());
        Ok(report)
    }

    // =========================================================================
    //  LOOP DOS TIMERS
    // =========================================================================

    async fn timer_loop(self, job: Job, shutdown: CancellationToken) {
        loop {
            let now = Local::now().naive_local();
            let next = match job {
                Job::Daily => next_daily_fire(now),
                Job::Weekly => next_weekly_fire(now),
            };
            let sleep_duration = duration_until(next);

            tracing::info!(
                "Próximo rollover {:?} em {} ({} minutos)",
                job,
                next,
                sleep_duration.as_secs() / 60
            );

            tokio::select! {
                _ = tokio::time::sleep(sleep_duration) => {
                    let fired_on = next.date();
                    let today = Local::now().date_naive().max(fired_on);
                    let result = match job {
                        Job::Daily => self.run_daily(previous_day(fired_on), today).await,
                        Job::Weekly => self.run_weekly(fired_on, today).await,
                    };
                    if let Err(e) = result {
                        tracing::error!("Rollover {:?} agendado falhou: {}", job, e);
                    }
                }
                _ = shutdown.cancelled() => {
                    tracing::info!("Timer {:?} cancelado", job);
                    return;
                }
            }
        }
    }

    fn timers(&self) -> std::sync::MutexGuard<'_, Timers> {
        // Envenenamento só acontece se outro thread entrou em pânico segurando o lock
        self.inner
            .timers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Próxima meia-noite estritamente depois de `now`.
pub fn next_daily_fire(now: NaiveDateTime) -> NaiveDateTime {
    next_day(now.date()).and_time(NaiveTime::MIN)
}

/// Próximo domingo 00:00 estritamente depois de `now`.
pub fn next_weekly_fire(now: NaiveDateTime) -> NaiveDateTime {
    let mut date = next_day(now.date());
    while date.weekday() != WEEK_START {
        date = next_day(date);
    }
    date.and_time(NaiveTime::MIN)
}

// Horário local; em lacuna de horário de verão usa o instante válido mais tarde.
fn duration_until(target: NaiveDateTime) -> Duration {
    let now = Local::now();

    let target = match target.and_local_timezone(Local).latest() {
        Some(t) => t,
        None => match (target + chrono::Duration::hours(1)).and_local_timezone(Local).earliest() {
            Some(t) => t,
            None => {
                tracing::error!("Não foi possível resolver {} no fuso local", target);
                return RETRY_FALLBACK;
            }
        },
    };

    let duration = target.signed_duration_since(now);
    if duration.num_seconds() <= 0 {
        RETRY_FALLBACK
    } else {
        duration.to_std().unwrap_or(RETRY_FALLBACK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::stats::EmployeeStatsRecord,
        services::stats_engine::tests::{day, dec, fixture},
    };
    use chrono::Weekday;

    fn at(d: u32, h: u32, m: u32) -> NaiveDateTime {
        day(d).and_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn daily_fires_at_next_midnight() {
        assert_eq!(next_daily_fire(at(15, 13, 30)), at(16, 0, 0));
        // Exatamente meia-noite: a próxima é amanhã
        assert_eq!(next_daily_fire(at(15, 0, 0)), at(16, 0, 0));
        assert_eq!(next_daily_fire(at(31, 23, 59)), NaiveDate::from_ymd_opt(2026, 11, 1).unwrap().and_time(NaiveTime::MIN));
    }

    #[test]
    fn weekly_fires_next_sunday_midnight() {
        // 2026-10-15 é quinta; próximo domingo é 18
        assert_eq!(next_weekly_fire(at(15, 10, 0)), at(18, 0, 0));
        assert_eq!(next_weekly_fire(at(18, 0, 0)), at(25, 0, 0));
        assert_eq!(next_weekly_fire(at(17, 23, 59)), at(18, 0, 0));
        assert_eq!(next_weekly_fire(at(15, 10, 0)).weekday(), Weekday::Sun);
    }

    #[tokio::test]
    async fn start_and_stop_toggle_the_timers() {
        let f = fixture();
        let scheduler = StatsScheduler::new(f.engine.clone());

        let idle = scheduler.status();
        assert!(!idle.daily_armed && !idle.weekly_armed);

        scheduler.start();
        scheduler.start();
        let armed = scheduler.status();
        assert!(armed.daily_armed && armed.weekly_armed);

        scheduler.stop();
        let stopped = scheduler.status();
        assert!(!stopped.daily_armed && !stopped.weekly_armed);
    }

    #[tokio::test]
    async fn manual_daily_trigger_closes_the_requested_day() {
        let f = fixture();
        let e = f.employees.add(dec("15"));
        f.ledger.sale(e, "Alice", dec("120"), day(14));
        let scheduler = StatsScheduler::new(f.engine.clone());

        let report = scheduler.trigger_daily_update(Some(day(14))).await.unwrap();
        assert_eq!(report.processed, 1);
        assert_eq!(f.store.get(e).unwrap().weekly.revenue, dec("100.00"));
        assert!(scheduler.status().last_daily_run.is_some());

        let again = scheduler.trigger_daily_update(Some(day(14))).await.unwrap();
        assert_eq!(again.skipped, 1);
        assert_eq!(f.store.get(e).unwrap().weekly.revenue, dec("100.00"));
    }

    #[tokio::test]
    async fn weekly_run_folds_saturday_before_closing_the_week() {
        let f = fixture();
        let e = f.employees.add(dec("10"));
        f.ledger.sale(e, "Alice", dec("120"), day(17));
        let mut record = EmployeeStatsRecord::empty(e, Utc::now());
        record.weekly.revenue = dec("50.00");
        record.weekly.commission = dec("5.00");
        f.store.put(record);
        let scheduler = StatsScheduler::new(f.engine.clone());

        let report = scheduler.run_weekly(day(18), day(18)).await.unwrap();
        assert_eq!(report.processed, 2);

        let after = f.store.get(e).unwrap();
        assert!(after.weekly.is_zero());
        assert_eq!(after.monthly.revenue, dec("150.00"));
        assert_eq!(after.monthly.commission, dec("15.00"));
        assert_eq!(after.daily_rolled_through, Some(day(17)));
        assert_eq!(after.weekly_rolled_through, Some(day(18)));
    }

    #[tokio::test]
    async fn week_stays_open_when_saturday_failed_to_close() {
        let f = fixture();
        let e = f.employees.add(dec("10"));
        f.ledger.sale(e, "Alice", dec("120"), day(17));
        let mut record = EmployeeStatsRecord::empty(e, Utc::now());
        record.weekly.revenue = dec("50.00");
        record.weekly.commission = dec("5.00");
        record.daily_rolled_through = Some(day(16));
        f.store.put(record);
        // Só o save do diário falha; o store volta antes do semanal
        f.store.fail_next_save_for(e);
        let scheduler = StatsScheduler::new(f.engine.clone());

        let report = scheduler.run_weekly(day(18), day(18)).await.unwrap();
        assert_eq!(report.processed, 0);
        assert_eq!(report.failed.len(), 2);
        assert!(report.failed.iter().all(|fail| fail.employee_id == e));

        let pending = f.store.get(e).unwrap();
        assert!(pending.monthly.is_zero());
        assert_eq!(pending.weekly.revenue, dec("50.00"));
        assert_eq!(pending.weekly_rolled_through, None);

        // Recuperação: o sábado entra no semanal certo antes de fechar a semana
        scheduler.run_daily(day(17), day(18)).await.unwrap();
        let closed = scheduler.run_weekly(day(18), day(18)).await.unwrap();
        assert_eq!(closed.processed, 1);
        assert_eq!(closed.skipped, 1);

        let after = f.store.get(e).unwrap();
        assert!(after.weekly.is_zero());
        assert_eq!(after.monthly.revenue, dec("150.00"));
        assert_eq!(after.monthly.commission, dec("15.00"));
    }
}
