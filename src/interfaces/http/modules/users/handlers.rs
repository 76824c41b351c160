//! User management API handlers
//!
//! Thin wrappers over `UserService`; role checks happen in the service.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};

use super::dto::{
    AssignDepartmentsRequest, CreateUserRequest, ListUsersParams, ManagerDto, UpdateUserRequest,
    UserDto,
};
use crate::application::UserService;
use crate::domain::CallerIdentity;
use crate::interfaces::http::common::{ApiError, ApiResponse, EmptyData, JsonBody};

/// User handler state
#[derive(Clone)]
pub struct UserHandlerState {
    pub user_service: Arc<UserService>,
}

#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(ListUsersParams),
    responses(
        (status = 200, description = "All users with their departments", body = ApiResponse<Vec<UserDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Administrator role required")
    )
)]
pub async fn list_users(
    State(state): State<UserHandlerState>,
    Extension(caller): Extension<CallerIdentity>,
    Query(params): Query<ListUsersParams>,
) -> Result<Json<ApiResponse<Vec<UserDto>>>, ApiError> {
    let users = state.user_service.list_users(&caller, params.into()).await?;
    Ok(Json(ApiResponse::success(
        users.into_iter().map(UserDto::from).collect(),
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/managers",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Users with the Manager role", body = ApiResponse<Vec<ManagerDto>>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_managers(
    State(state): State<UserHandlerState>,
    Extension(caller): Extension<CallerIdentity>,
) -> Result<Json<ApiResponse<Vec<ManagerDto>>>, ApiError> {
    let managers = state.user_service.list_managers(&caller).await?;
    Ok(Json(ApiResponse::success(
        managers.into_iter().map(ManagerDto::from).collect(),
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User details", body = ApiResponse<UserDto>),
        (status = 403, description = "Neither the user nor an administrator"),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_user(
    State(state): State<UserHandlerState>,
    Extension(caller): Extension<CallerIdentity>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let user = state.user_service.get_user(&caller, id).await?;
    Ok(Json(ApiResponse::success(UserDto::from(user))))
}

#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "Users",
    security(("bearer_auth" = [])),
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = ApiResponse<UserDto>),
        (status = 403, description = "Administrator role required"),
        (status = 404, description = "Referenced manager or department not found"),
        (status = 409, description = "Email already in use"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn create_user(
    State(state): State<UserHandlerState>,
    Extension(caller): Extension<CallerIdentity>,
    JsonBody(request): JsonBody<CreateUserRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserDto>>), ApiError> {
    let user = state
        .user_service
        .create_user(&caller, request.into())
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(UserDto::from(user))),
    ))
}

#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = ApiResponse<UserDto>),
        (status = 403, description = "Not allowed to change this user or these fields"),
        (status = 404, description = "Not found"),
        (status = 409, description = "Email already in use"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn update_user(
    State(state): State<UserHandlerState>,
    Extension(caller): Extension<CallerIdentity>,
    Path(id): Path<i32>,
    JsonBody(request): JsonBody<UpdateUserRequest>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let user = state
        .user_service
        .update_user(&caller, id, request.into())
        .await?;
    Ok(Json(ApiResponse::success(UserDto::from(user))))
}

#[utoipa::path(
    put,
    path = "/api/v1/users/{id}/departments",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    request_body = AssignDepartmentsRequest,
    responses(
        (status = 200, description = "Memberships replaced; managed departments are kept", body = ApiResponse<UserDto>),
        (status = 403, description = "Administrator role required"),
        (status = 404, description = "User or department not found")
    )
)]
pub async fn assign_departments(
    State(state): State<UserHandlerState>,
    Extension(caller): Extension<CallerIdentity>,
    Path(id): Path<i32>,
    JsonBody(request): JsonBody<AssignDepartmentsRequest>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let user = state
        .user_service
        .assign_departments(&caller, id, request.department_ids)
        .await?;
    Ok(Json(ApiResponse::success(UserDto::from(user))))
}

#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted", body = ApiResponse<EmptyData>),
        (status = 403, description = "Administrator role required"),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_user(
    State(state): State<UserHandlerState>,
    Extension(caller): Extension<CallerIdentity>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<EmptyData>>, ApiError> {
    state.user_service.delete_user(&caller, id).await?;
    Ok(Json(ApiResponse::success(EmptyData {})))
}
