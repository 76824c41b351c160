//! Department API handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};

use super::dto::{
    CreateDepartmentRequest, DepartmentDto, DepartmentSummaryDto, SetStatusRequest,
    UpdateDepartmentRequest, UpdateDepartmentResponse,
};
use crate::application::DepartmentService;
use crate::domain::CallerIdentity;
use crate::interfaces::http::common::{ApiError, ApiResponse, EmptyData, JsonBody};

#[derive(Clone)]
pub struct DepartmentHandlerState {
    pub department_service: Arc<DepartmentService>,
}

#[utoipa::path(
    get,
    path = "/api/v1/departments",
    tag = "Departments",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Departments with rosters", body = ApiResponse<Vec<DepartmentDto>>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_departments(
    State(state): State<DepartmentHandlerState>,
    Extension(caller): Extension<CallerIdentity>,
) -> Result<Json<ApiResponse<Vec<DepartmentDto>>>, ApiError> {
    let departments = state.department_service.list(&caller).await?;
    Ok(Json(ApiResponse::success(
        departments.into_iter().map(DepartmentDto::from).collect(),
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/departments/{id}",
    tag = "Departments",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Department ID")),
    responses(
        (status = 200, description = "Department with roster", body = ApiResponse<DepartmentDto>),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_department(
    State(state): State<DepartmentHandlerState>,
    Extension(caller): Extension<CallerIdentity>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<DepartmentDto>>, ApiError> {
    let department = state.department_service.get(&caller, id).await?;
    Ok(Json(ApiResponse::success(department.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/departments",
    tag = "Departments",
    security(("bearer_auth" = [])),
    request_body = CreateDepartmentRequest,
    responses(
        (status = 201, description = "Department created; managers are members", body = ApiResponse<DepartmentDto>),
        (status = 403, description = "Administrator role required"),
        (status = 404, description = "Referenced user not found"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn create_department(
    State(state): State<DepartmentHandlerState>,
    Extension(caller): Extension<CallerIdentity>,
    JsonBody(request): JsonBody<CreateDepartmentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<DepartmentDto>>), ApiError> {
    let department = state
        .department_service
        .create(&caller, request.into())
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(department.into())),
    ))
}

#[utoipa::path(
    put,
    path = "/api/v1/departments/{id}",
    tag = "Departments",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Department ID")),
    request_body = UpdateDepartmentRequest,
    responses(
        (status = 200, description = "Department updated", body = ApiResponse<UpdateDepartmentResponse>),
        (status = 403, description = "Administrator role required"),
        (status = 404, description = "Department or referenced user not found"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn update_department(
    State(state): State<DepartmentHandlerState>,
    Extension(caller): Extension<CallerIdentity>,
    Path(id): Path<i32>,
    JsonBody(request): JsonBody<UpdateDepartmentRequest>,
) -> Result<Json<ApiResponse<UpdateDepartmentResponse>>, ApiError> {
    let outcome = state
        .department_service
        .update(&caller, id, request.into())
        .await?;
    Ok(Json(ApiResponse::success(outcome.into())))
}

#[utoipa::path(
    put,
    path = "/api/v1/departments/{id}/status",
    tag = "Departments",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Department ID")),
    request_body = SetStatusRequest,
    responses(
        (status = 200, description = "Status changed", body = ApiResponse<DepartmentSummaryDto>),
        (status = 403, description = "Administrator role required"),
        (status = 404, description = "Not found")
    )
)]
pub async fn set_department_status(
    State(state): State<DepartmentHandlerState>,
    Extension(caller): Extension<CallerIdentity>,
    Path(id): Path<i32>,
    JsonBody(request): JsonBody<SetStatusRequest>,
) -> Result<Json<ApiResponse<DepartmentSummaryDto>>, ApiError> {
    let department = state
        .department_service
        .set_status(&caller, id, request.status)
        .await?;
    Ok(Json(ApiResponse::success(department.into())))
}

#[utoipa::path(
    delete,
    path = "/api/v1/departments/{id}",
    tag = "Departments",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Department ID")),
    responses(
        (status = 200, description = "Department deleted; users are kept", body = ApiResponse<EmptyData>),
        (status = 403, description = "Administrator role required"),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_department(
    State(state): State<DepartmentHandlerState>,
    Extension(caller): Extension<CallerIdentity>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<EmptyData>>, ApiError> {
    state.department_service.delete(&caller, id).await?;
    Ok(Json(ApiResponse::success(EmptyData {})))
}
