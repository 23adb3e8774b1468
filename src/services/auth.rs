// src/services/auth.rs

use std::sync::Arc;

use jsonwebtoken::{decode, DecodingKey, Validation};

use crate::{
    common::error::AppError,
    db::EmployeeDirectory,
    models::auth::{Claims, Principal},
};

// A emissão de tokens fica fora deste serviço; aqui só verificamos.
#[derive(Clone)]
pub struct AuthService {
    employees: Arc<dyn EmployeeDirectory>,
    jwt_secret: String,
}

impl AuthService {
    pub fn new(employees: Arc<dyn EmployeeDirectory>, jwt_secret: String) -> Self {
        Self {
            employees,
            jwt_secret,
        }
    }

    pub async fn validate_token(&self, token: &str) -> Result<Principal, AppError> {
        let validation = Validation::default();
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &validation,
        )
        .map_err(|_| AppError::InvalidToken)?;

        // O cargo vem do cadastro, não do token
        let employee = self
            .employees
            .get_employee(token_data.claims.sub)
            .await?
            .ok_or(AppError::InvalidToken)?;

        Ok(Principal {
            employee_id: employee.id,
            role: employee.role,
        })
    }
}
