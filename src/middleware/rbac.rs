// src/middleware/rbac.rs

use std::marker::PhantomData;

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};

use crate::{
    common::error::ApiError,
    models::{auth::Principal, employee::EmployeeRole},
};

/// 1. O Trait que define um cargo exigido
pub trait RoleDef: Send + Sync + 'static {
    fn role() -> EmployeeRole;
}

/// 2. O Extractor (Guardião)
pub struct RequireRole<T>(pub PhantomData<T>);

impl<T, S> FromRequestParts<S> for RequireRole<T>
where
    T: RoleDef,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let principal = parts.extensions.get::<Principal>().ok_or(ApiError {
            status: StatusCode::UNAUTHORIZED,
            error: "Funcionário não autenticado".into(),
            details: None,
        })?;

        check_role::<T>(principal)?;
        Ok(RequireRole(PhantomData))
    }
}

fn check_role<T: RoleDef>(principal: &Principal) -> Result<(), ApiError> {
    let required = T::role();
    // Admin passa em qualquer guarda
    if principal.role == required || principal.is_admin() {
        return Ok(());
    }

    Err(ApiError {
        status: StatusCode::FORBIDDEN,
        error: format!("Você precisa do cargo '{:?}' para realizar esta ação.", required),
        details: None,
    })
}

// ---
// DEFINIÇÃO DOS CARGOS (TIPOS)
// ---

pub struct AdminOnly;
impl RoleDef for AdminOnly {
    fn role() -> EmployeeRole {
        EmployeeRole::Admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn principal(role: EmployeeRole) -> Principal {
        Principal {
            employee_id: Uuid::new_v4(),
            role,
        }
    }

    #[test]
    fn admin_guard_rejects_plain_employees() {
        assert!(check_role::<AdminOnly>(&principal(EmployeeRole::Admin)).is_ok());

        let err = check_role::<AdminOnly>(&principal(EmployeeRole::Employee)).unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);
    }
}
