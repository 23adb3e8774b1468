// src/handlers/admin.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::rbac::{AdminOnly, RequireRole},
    models::stats::RolloverReport,
    services::{dashboard_events::DashboardEventKind, scheduler::SchedulerStatus},
};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DailyRolloverQuery {
    /// Dia a fechar (padrão: ontem)
    #[param(value_type = Option<String>, format = Date)]
    pub date: Option<NaiveDate>,
}

// POST /api/admin/stats/rollover/daily
#[utoipa::path(
    post,
    path = "/api/admin/stats/rollover/daily",
    tag = "Admin",
    params(DailyRolloverQuery),
    responses(
        (status = 200, description = "Resultado do rollover diário", body = RolloverReport),
        (status = 403, description = "Apenas administradores")
    ),
    security(("api_jwt" = []))
)]
pub async fn trigger_daily_rollover(
    State(app_state): State<AppState>,
    _guard: RequireRole<AdminOnly>,
    Query(query): Query<DailyRolloverQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let report = app_state.scheduler.trigger_daily_update(query.date).await?;

    app_state
        .events
        .publish(DashboardEventKind::StatsRolledOver, None);

    Ok((StatusCode::OK, Json(report)))
}

// POST /api/admin/stats/rollover/weekly
#[utoipa::path(
    post,
    path = "/api/admin/stats/rollover/weekly",
    tag = "Admin",
    responses(
        (status = 200, description = "Resultado do rollover semanal", body = RolloverReport),
        (status = 403, description = "Apenas administradores")
    ),
    security(("api_jwt" = []))
)]
pub async fn trigger_weekly_rollover(
    State(app_state): State<AppState>,
    _guard: RequireRole<AdminOnly>,
) -> Result<impl IntoResponse, ApiError> {
    let report = app_state.scheduler.trigger_weekly_update().await?;

    app_state
        .events
        .publish(DashboardEventKind::StatsRolledOver, None);

    Ok((StatusCode::OK, Json(report)))
}

// POST /api/admin/stats/reset-monthly
#[utoipa::path(
    post,
    path = "/api/admin/stats/reset-monthly",
    tag = "Admin",
    responses(
        (status = 200, description = "Mensal zerado", body = RolloverReport),
        (status = 403, description = "Apenas administradores")
    ),
    security(("api_jwt" = []))
)]
pub async fn reset_monthly(
    State(app_state): State<AppState>,
    _guard: RequireRole<AdminOnly>,
) -> Result<impl IntoResponse, ApiError> {
    let report = app_state.stats_engine.reset_monthly().await?;

    app_state
        .events
        .publish(DashboardEventKind::MonthlyReset, None);

    Ok((StatusCode::OK, Json(report)))
}

// GET /api/admin/stats/scheduler
#[utoipa::path(
    get,
    path = "/api/admin/stats/scheduler",
    tag = "Admin",
    responses((status = 200, description = "Estado dos timers", body = SchedulerStatus)),
    security(("api_jwt" = []))
)]
pub async fn scheduler_status(
    State(app_state): State<AppState>,
    _guard: RequireRole<AdminOnly>,
) -> impl IntoResponse {
    Json(app_state.scheduler.status())
}

// POST /api/admin/stats/scheduler/start
#[utoipa::path(
    post,
    path = "/api/admin/stats/scheduler/start",
    tag = "Admin",
    responses((status = 200, description = "Timers armados", body = SchedulerStatus)),
    security(("api_jwt" = []))
)]
pub async fn start_scheduler(
    State(app_state): State<AppState>,
    _guard: RequireRole<AdminOnly>,
) -> impl IntoResponse {
    app_state.scheduler.start();
    Json(app_state.scheduler.status())
}

// POST /api/admin/stats/scheduler/stop
#[utoipa::path(
    post,
    path = "/api/admin/stats/scheduler/stop",
    tag = "Admin",
    responses((status = 200, description = "Timers desarmados", body = SchedulerStatus)),
    security(("api_jwt" = []))
)]
pub async fn stop_scheduler(
    State(app_state): State<AppState>,
    _guard: RequireRole<AdminOnly>,
) -> impl IntoResponse {
    app_state.scheduler.stop();
    Json(app_state.scheduler.status())
}
