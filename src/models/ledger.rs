// src/models/ledger.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

// ---
// Validação Customizada
// ---
fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }
    Ok(())
}

// Nome só com espaços vira "" depois do trim e contaria como cliente distinto
fn validate_not_blank(val: &str) -> Result<(), ValidationError> {
    if val.trim().is_empty() {
        let mut err = ValidationError::new("length");
        err.add_param("min".into(), &1);
        err.message = Some("O nome do cliente é obrigatório.".into());
        return Err(err);
    }
    Ok(())
}

/// Venda de pacote. O valor é TTC.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PackageSale {
    pub id: Uuid,
    pub employee_id: Uuid,

    #[schema(example = "COUPE_BARBE")]
    pub package_ref: Option<String>,

    #[schema(example = "Alice")]
    pub client_name: String,

    #[schema(example = "120.00")]
    pub amount: Decimal,

    #[schema(value_type = String, format = Date, example = "2026-10-15")]
    pub sale_date: NaiveDate,

    pub created_at: Option<DateTime<Utc>>,
}

/// Recibo avulso. Sem IVA.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub id: Uuid,
    pub employee_id: Uuid,

    #[schema(example = "Bob")]
    pub client_name: String,

    #[schema(example = "20.00")]
    pub amount: Decimal,

    #[schema(value_type = String, format = Date, example = "2026-10-15")]
    pub receipt_date: NaiveDate,

    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordSalePayload {
    #[validate(custom(function = "validate_not_blank"))]
    #[schema(example = "Alice")]
    pub client_name: String,

    #[validate(custom(function = "validate_not_negative"))]
    #[schema(example = "120.00")]
    pub amount: Decimal,

    pub package_ref: Option<String>,

    // Se ausente, assume hoje
    #[schema(value_type = Option<String>, format = Date)]
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordReceiptPayload {
    #[validate(custom(function = "validate_not_blank"))]
    #[schema(example = "Bob")]
    pub client_name: String,

    #[validate(custom(function = "validate_not_negative"))]
    #[schema(example = "20.00")]
    pub amount: Decimal,

    #[schema(value_type = Option<String>, format = Date)]
    pub date: Option<NaiveDate>,
}
