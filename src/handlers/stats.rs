// src/handlers/stats.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Local;
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::auth::AuthenticatedEmployee,
    models::stats::{InitializeStatsResponse, StatsReport},
};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StatsQuery {
    /// today | week | month (padrão: today)
    pub period: Option<String>,
}

// GET /api/employees/{employee_id}/stats
#[utoipa::path(
    get,
    path = "/api/employees/{employee_id}/stats",
    tag = "Stats",
    params(
        ("employee_id" = Uuid, Path, description = "ID do Funcionário"),
        StatsQuery
    ),
    responses(
        (status = 200, description = "Contadores do período e verificação em tempo real", body = StatsReport),
        (status = 400, description = "Período inválido"),
        (status = 403, description = "Sem acesso a este funcionário"),
        (status = 404, description = "Funcionário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_employee_stats(
    State(app_state): State<AppState>,
    AuthenticatedEmployee(principal): AuthenticatedEmployee,
    Path(employee_id): Path<Uuid>,
    Query(query): Query<StatsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    if !principal.can_access(employee_id) {
        return Err(AppError::Forbidden.into());
    }

    let period = query.period.as_deref().unwrap_or("today");
    let report = app_state
        .stats_query
        .get_stats_report(employee_id, period, Local::now().date_naive())
        .await?;

    Ok((StatusCode::OK, Json(report)))
}

// POST /api/employees/{employee_id}/stats/init
#[utoipa::path(
    post,
    path = "/api/employees/{employee_id}/stats/init",
    tag = "Stats",
    params(("employee_id" = Uuid, Path, description = "ID do Funcionário")),
    responses(
        (status = 201, description = "Registro criado", body = InitializeStatsResponse),
        (status = 200, description = "Registro já existia", body = InitializeStatsResponse),
        (status = 404, description = "Funcionário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn initialize_stats(
    State(app_state): State<AppState>,
    AuthenticatedEmployee(principal): AuthenticatedEmployee,
    Path(employee_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    if !principal.can_access(employee_id) {
        return Err(AppError::Forbidden.into());
    }

    let (record, created) = app_state
        .stats_engine
        .initialize_for_employee(employee_id)
        .await?;

    let status = if created { StatusCode::CREATED } else { StatusCode::OK };
    Ok((status, Json(InitializeStatsResponse { record, created })))
}
