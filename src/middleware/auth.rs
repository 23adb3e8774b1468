// src/middleware/auth.rs

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, StatusCode},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    models::auth::Principal,
};

// O middleware em si: valida o Bearer e guarda o principal nas extensions
pub async fn auth_guard(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .typed_get::<Authorization<Bearer>>()
        .map(|auth| auth.token().to_owned())
        .ok_or(AppError::InvalidToken)?;

    let principal = app_state.auth_service.validate_token(&token).await?;

    request.extensions_mut().insert(principal);
    Ok(next.run(request).await)
}

// Extrator para obter o funcionário autenticado diretamente nos handlers
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedEmployee(pub Principal);

impl<S> FromRequestParts<S> for AuthenticatedEmployee
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .copied()
            .map(AuthenticatedEmployee)
            .ok_or(ApiError {
                status: StatusCode::UNAUTHORIZED,
                error: "Funcionário não autenticado".into(),
                details: None,
            })
    }
}
