// src/services/ledger_service.rs

use std::sync::Arc;

use chrono::NaiveDate;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{error::AppError, money::ht_from_ttc},
    db::{EmployeeDirectory, LedgerWriter},
    models::{
        ledger::{PackageSale, Receipt, RecordReceiptPayload, RecordSalePayload},
        stats::StatsCounters,
    },
    services::{
        dashboard_events::{DashboardEventKind, DashboardEvents},
        stats_engine::{single_transaction_delta, StatsEngine},
    },
};

/// Registra vendas/recibos e mantém o balde diário em dia.
#[derive(Clone)]
pub struct LedgerService {
    employees: Arc<dyn EmployeeDirectory>,
    writer: Arc<dyn LedgerWriter>,
    engine: StatsEngine,
    events: DashboardEvents,
}

impl LedgerService {
    pub fn new(
        employees: Arc<dyn EmployeeDirectory>,
        writer: Arc<dyn LedgerWriter>,
        engine: StatsEngine,
        events: DashboardEvents,
    ) -> Self {
        Self {
            employees,
            writer,
            engine,
            events,
        }
    }

    pub async fn record_sale(
        &self,
        employee_id: Uuid,
        payload: &RecordSalePayload,
        today: NaiveDate,
    ) -> Result<PackageSale, AppError> {
        payload.validate()?;

        let employee = self
            .employees
            .get_employee(employee_id)
            .await?
            .ok_or(AppError::EmployeeNotFound)?;

        let sale_date = payload.date.unwrap_or(today);
        let sale = self
            .writer
            .insert_sale(
                employee_id,
                payload.package_ref.as_deref(),
                payload.client_name.trim(),
                payload.amount,
                sale_date,
            )
            .await?;

        // Lançamento retroativo só vai para o ledger; o rollover recalcula a partir dele
        if sale_date == today {
            let delta = single_transaction_delta(
                ht_from_ttc(sale.amount),
                employee.commission_percentage,
                true,
            );
            self.apply_to_daily(employee_id, sale_date, delta).await;
        }

        self.events
            .publish(DashboardEventKind::SaleRecorded, Some(employee_id));
        tracing::info!(%employee_id, sale_id = %sale.id, "Venda registrada");

        Ok(sale)
    }

    pub async fn record_receipt(
        &self,
        employee_id: Uuid,
        payload: &RecordReceiptPayload,
        today: NaiveDate,
    ) -> Result<Receipt, AppError> {
        payload.validate()?;

        let employee = self
            .employees
            .get_employee(employee_id)
            .await?
            .ok_or(AppError::EmployeeNotFound)?;

        let receipt_date = payload.date.unwrap_or(today);
        let receipt = self
            .writer
            .insert_receipt(
                employee_id,
                payload.client_name.trim(),
                payload.amount,
                receipt_date,
            )
            .await?;

        if receipt_date == today {
            let delta = single_transaction_delta(
                receipt.amount,
                employee.commission_percentage,
                false,
            );
            self.apply_to_daily(employee_id, receipt_date, delta).await;
        }

        self.events
            .publish(DashboardEventKind::ReceiptRecorded, Some(employee_id));
        tracing::info!(%employee_id, receipt_id = %receipt.id, "Recibo registrado");

        Ok(receipt)
    }

    // O lançamento já está no ledger: uma falha aqui não pode virar erro para o cliente,
    // senão uma nova tentativa duplicaria a venda. O próximo rollover recalcula o diário.
    async fn apply_to_daily(&self, employee_id: Uuid, entry_date: NaiveDate, delta: StatsCounters) {
        if let Err(e) = self.engine.add_to_daily(employee_id, entry_date, delta).await {
            tracing::error!(
                %employee_id,
                "Lançamento gravado, mas o balde diário não foi atualizado: {}",
                e
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        common::period::DateWindow,
        services::{
            stats_engine::tests::{day, dec, fixture, Fixture},
            stats_query::StatsQueryService,
        },
    };

    fn service(f: &Fixture, events: &DashboardEvents) -> LedgerService {
        LedgerService::new(
            f.employees.clone(),
            f.ledger.clone(),
            f.engine.clone(),
            events.clone(),
        )
    }

    fn sale(client: &str, amount: &str, date: Option<NaiveDate>) -> RecordSalePayload {
        RecordSalePayload {
            client_name: client.into(),
            amount: dec(amount),
            package_ref: Some("COUPE".into()),
            date,
        }
    }

    #[tokio::test]
    async fn todays_sale_updates_daily_and_notifies() {
        let f = fixture();
        let events = DashboardEvents::new(8);
        let mut rx = events.subscribe();
        let e = f.employees.add(dec("15"));

        service(&f, &events)
            .record_sale(e, &sale("Alice", "45", None), day(15))
            .await
            .unwrap();

        let record = f.store.get(e).unwrap();
        assert_eq!(record.daily.package_count, 1);
        assert_eq!(record.daily.client_count, 1);
        assert_eq!(record.daily.revenue, dec("37.50"));
        assert_eq!(record.daily.commission, dec("5.63"));

        let event = rx.recv().await.unwrap();
        assert_eq!(event.kind, DashboardEventKind::SaleRecorded);
        assert_eq!(event.employee_id, Some(e));
    }

    #[tokio::test]
    async fn receipt_counts_no_package_and_no_vat() {
        let f = fixture();
        let events = DashboardEvents::new(8);
        let e = f.employees.add(dec("15"));
        let payload = RecordReceiptPayload {
            client_name: "Bob".into(),
            amount: dec("20"),
            date: None,
        };

        service(&f, &events).record_receipt(e, &payload, day(15)).await.unwrap();

        let record = f.store.get(e).unwrap();
        assert_eq!(record.daily.package_count, 0);
        assert_eq!(record.daily.revenue, dec("20.00"));
        assert_eq!(record.daily.commission, dec("3.00"));
    }

    #[tokio::test]
    async fn backdated_sale_only_reaches_the_ledger() {
        let f = fixture();
        let events = DashboardEvents::new(8);
        let e = f.employees.add(dec("15"));

        service(&f, &events)
            .record_sale(e, &sale("Alice", "120", Some(day(12))), day(15))
            .await
            .unwrap();

        assert!(f.store.get(e).is_none());
        let live = f
            .engine
            .compute_period_stats(e, DateWindow::single_day(day(12)))
            .await
            .unwrap();
        assert_eq!(live.revenue, dec("100.00"));
    }

    #[tokio::test]
    async fn invalid_payload_and_unknown_employee_are_rejected() {
        let f = fixture();
        let events = DashboardEvents::new(8);
        let svc = service(&f, &events);
        let e = f.employees.add(dec("15"));

        let err = svc.record_sale(e, &sale("", "10", None), day(15)).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));

        let err = svc
            .record_sale(Uuid::new_v4(), &sale("Alice", "10", None), day(15))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::EmployeeNotFound));
    }

    #[tokio::test]
    async fn sale_after_midnight_survives_the_rollover_of_the_previous_day() {
        let f = fixture();
        let events = DashboardEvents::new(8);
        let e = f.employees.add(dec("15"));

        service(&f, &events)
            .record_sale(e, &sale("Alice", "45", None), day(16))
            .await
            .unwrap();
        f.engine.rollover_daily(day(15), day(16)).await.unwrap();

        let query = StatsQueryService::new(f.engine.clone(), f.employees.clone());
        assert_eq!(query.get_stats(e, "today").await.unwrap().package_count, 1);
        let report = query.get_stats_report(e, "today", day(16)).await.unwrap();
        assert!(report.stats_match);
    }

    #[tokio::test]
    async fn stats_failure_does_not_fail_a_recorded_sale() {
        let f = fixture();
        let events = DashboardEvents::new(8);
        let mut rx = events.subscribe();
        let e = f.employees.add(dec("15"));
        f.store.fail_saves_for(e);

        let recorded = service(&f, &events)
            .record_sale(e, &sale("Alice", "45", None), day(15))
            .await
            .unwrap();
        assert_eq!(recorded.client_name, "Alice");

        let live = f
            .engine
            .compute_period_stats(e, DateWindow::single_day(day(15)))
            .await
            .unwrap();
        assert_eq!(live.package_count, 1);
        assert_eq!(rx.recv().await.unwrap().kind, DashboardEventKind::SaleRecorded);
    }

    #[tokio::test]
    async fn blank_client_name_is_rejected_before_the_ledger() {
        let f = fixture();
        let events = DashboardEvents::new(8);
        let e = f.employees.add(dec("15"));

        let err = service(&f, &events)
            .record_sale(e, &sale("  ", "10", None), day(15))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));

        let live = f
            .engine
            .compute_period_stats(e, DateWindow::single_day(day(15)))
            .await
            .unwrap();
        assert!(live.is_zero());
    }
}
