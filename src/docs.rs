// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;
use crate::common;
use crate::services;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Stats ---
        handlers::stats::get_employee_stats,
        handlers::stats::initialize_stats,

        // --- Ledger ---
        handlers::ledger::record_sale,
        handlers::ledger::record_receipt,

        // --- Dashboard ---
        handlers::events::stream_events,

        // --- Admin ---
        handlers::admin::trigger_daily_rollover,
        handlers::admin::trigger_weekly_rollover,
        handlers::admin::reset_monthly,
        handlers::admin::scheduler_status,
        handlers::admin::start_scheduler,
        handlers::admin::stop_scheduler,
    ),
    components(
        schemas(
            // --- Stats ---
            common::period::StatsPeriod,
            models::stats::StatsCounters,
            models::stats::EmployeeStatsRecord,
            models::stats::StatsReport,
            models::stats::InitializeStatsResponse,
            models::stats::RolloverReport,
            models::stats::RolloverFailure,

            // --- Ledger ---
            models::ledger::PackageSale,
            models::ledger::Receipt,
            models::ledger::RecordSalePayload,
            models::ledger::RecordReceiptPayload,

            // --- Employees ---
            models::employee::Employee,
            models::employee::EmployeeRole,

            // --- Dashboard / Admin ---
            services::dashboard_events::DashboardEvent,
            services::dashboard_events::DashboardEventKind,
            services::scheduler::SchedulerStatus,
        )
    ),
    tags(
        (name = "Stats", description = "Estatísticas de comissão (diário, semanal, mensal)"),
        (name = "Ledger", description = "Vendas de pacotes e recibos"),
        (name = "Dashboard", description = "Eventos em tempo real do dashboard"),
        (name = "Admin", description = "Rollovers manuais e agendador")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
