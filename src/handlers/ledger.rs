// src/handlers/ledger.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Local;
use uuid::Uuid;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::auth::AuthenticatedEmployee,
    models::ledger::{PackageSale, Receipt, RecordReceiptPayload, RecordSalePayload},
};

// POST /api/employees/{employee_id}/sales
#[utoipa::path(
    post,
    path = "/api/employees/{employee_id}/sales",
    tag = "Ledger",
    request_body = RecordSalePayload,
    params(("employee_id" = Uuid, Path, description = "ID do Funcionário")),
    responses(
        (status = 201, description = "Venda registrada", body = PackageSale),
        (status = 400, description = "Payload inválido"),
        (status = 404, description = "Funcionário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn record_sale(
    State(app_state): State<AppState>,
    AuthenticatedEmployee(principal): AuthenticatedEmployee,
    Path(employee_id): Path<Uuid>,
    Json(payload): Json<RecordSalePayload>,
) -> Result<impl IntoResponse, ApiError> {
    if !principal.can_access(employee_id) {
        return Err(AppError::Forbidden.into());
    }

    let sale = app_state
        .ledger_service
        .record_sale(employee_id, &payload, Local::now().date_naive())
        .await?;

    Ok((StatusCode::CREATED, Json(sale)))
}

// POST /api/employees/{employee_id}/receipts
#[utoipa::path(
    post,
    path = "/api/employees/{employee_id}/receipts",
    tag = "Ledger",
    request_body = RecordReceiptPayload,
    params(("employee_id" = Uuid, Path, description = "ID do Funcionário")),
    responses(
        (status = 201, description = "Recibo registrado", body = Receipt),
        (status = 400, description = "Payload inválido"),
        (status = 404, description = "Funcionário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn record_receipt(
    State(app_state): State<AppState>,
    AuthenticatedEmployee(principal): AuthenticatedEmployee,
    Path(employee_id): Path<Uuid>,
    Json(payload): Json<RecordReceiptPayload>,
) -> Result<impl IntoResponse, ApiError> {
    if !principal.can_access(employee_id) {
        return Err(AppError::Forbidden.into());
    }

    let receipt = app_state
        .ledger_service
        .record_receipt(employee_id, &payload, Local::now().date_naive())
        .await?;

    Ok((StatusCode::CREATED, Json(receipt)))
}
