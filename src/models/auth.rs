// src/models/auth.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::employee::EmployeeRole;

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,          // Subject (ID do funcionário)
    pub role: EmployeeRole, // admin | employee
    pub exp: usize,         // Expiration time
    pub iat: usize,         // Issued At
}

/// Principal inserido nas extensions pelo auth_guard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub employee_id: Uuid,
    pub role: EmployeeRole,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role == EmployeeRole::Admin
    }

    /// Funcionário comum só acessa os próprios dados.
    pub fn can_access(&self, employee_id: Uuid) -> bool {
        self.is_admin() || self.employee_id == employee_id
    }
}
