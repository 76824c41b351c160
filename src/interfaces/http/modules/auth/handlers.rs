//! Authentication API handlers

use std::sync::Arc;

use axum::{extract::State, Extension, Json};

use super::dto::{ChangePasswordRequest, LoginRequest, LoginResponse};
use crate::application::UserService;
use crate::domain::CallerIdentity;
use crate::interfaces::http::common::{ApiError, ApiResponse, EmptyData, ValidatedJson};
use crate::interfaces::http::modules::users::UserDto;

/// Auth state
#[derive(Clone)]
pub struct AuthHandlerState {
    pub user_service: Arc<UserService>,
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Successful login", body = ApiResponse<LoginResponse>),
        (status = 403, description = "Incorrect password or inactive account"),
        (status = 404, description = "No user with this email")
    )
)]
pub async fn login(
    State(state): State<AuthHandlerState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    let result = state
        .user_service
        .login(&request.email, &request.password)
        .await?;
    Ok(Json(ApiResponse::success(result.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    tag = "Authentication",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user profile", body = ApiResponse<UserDto>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_current_user(
    State(state): State<AuthHandlerState>,
    Extension(caller): Extension<CallerIdentity>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let me = state.user_service.me(&caller).await?;
    Ok(Json(ApiResponse::success(UserDto::from(me))))
}

#[utoipa::path(
    put,
    path = "/api/v1/auth/change-password",
    tag = "Authentication",
    security(("bearer_auth" = [])),
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = ApiResponse<EmptyData>),
        (status = 403, description = "Current password is incorrect"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn change_password(
    State(state): State<AuthHandlerState>,
    Extension(caller): Extension<CallerIdentity>,
    ValidatedJson(request): ValidatedJson<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<EmptyData>>, ApiError> {
    state
        .user_service
        .change_password(&caller, &request.current_password, &request.new_password)
        .await?;
    Ok(Json(ApiResponse::success(EmptyData {})))
}
