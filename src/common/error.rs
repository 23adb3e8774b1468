// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Erro de domínio. Serviços e repositórios devolvem sempre este tipo.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Funcionário não encontrado")]
    EmployeeNotFound,

    #[error("Período inválido: '{0}'")]
    InvalidPeriod(String),

    #[error("Token inválido")]
    InvalidToken,

    #[error("Acesso negado")]
    Forbidden,

    // O semanal não fecha enquanto o último dia da semana não tiver entrado
    #[error("Rollover diário de {0} pendente")]
    DailyRolloverPending(chrono::NaiveDate),

    // Falha do banco (leitura ou escrita)
    #[error("Erro de persistência: {0}")]
    Persistence(#[from] sqlx::Error),

    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::InvalidPeriod(_) => StatusCode::BAD_REQUEST,
            AppError::EmployeeNotFound => StatusCode::NOT_FOUND,
            AppError::InvalidToken | AppError::JwtError(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::DailyRolloverPending(_) => StatusCode::CONFLICT,
            AppError::Persistence(_) | AppError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

// Rejeição usada pelos extratores (auth, guarda de cargo)
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        let status = err.status();

        let (error, details) = match &err {
            AppError::ValidationError(errors) => {
                let mut details = serde_json::Map::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), json!(messages));
                }
                (
                    "Um ou mais campos são inválidos.".to_string(),
                    Some(serde_json::Value::Object(details)),
                )
            }
            AppError::EmployeeNotFound => ("Funcionário não encontrado.".to_string(), None),
            AppError::InvalidPeriod(p) => (
                format!("Período '{}' inválido. Use today, week ou month.", p),
                None,
            ),
            AppError::InvalidToken | AppError::JwtError(_) => (
                "Token de autenticação inválido ou ausente.".to_string(),
                None,
            ),
            AppError::Forbidden => ("Você não tem acesso a este recurso.".to_string(), None),
            AppError::DailyRolloverPending(day) => (
                format!("Feche primeiro o dia {} (rollover diário).", day),
                None,
            ),

            // O detalhe vai para o log, nunca para o cliente.
            e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                ("Ocorreu um erro inesperado.".to_string(), None)
            }
        };

        ApiError { status, error, details }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}
