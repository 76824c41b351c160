//! API Router with Swagger UI

use std::sync::Arc;
use std::time::Instant;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::application::{DepartmentService, UserService};
use crate::infrastructure::crypto::jwt::JwtConfig;
use crate::interfaces::http::common::{ApiResponse, EmptyData};
use crate::interfaces::http::middleware::{auth_middleware, AuthState};
use crate::interfaces::http::modules::request_id::request_id_middleware;
use crate::interfaces::http::modules::{auth, departments, health, metrics, users};

/// Security scheme modifier for OpenAPI
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT Bearer token from /api/v1/auth/login"))
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health
        health::health_check,
        // Auth
        auth::login,
        auth::get_current_user,
        auth::change_password,
        // Users
        users::list_users,
        users::list_managers,
        users::get_user,
        users::create_user,
        users::update_user,
        users::assign_departments,
        users::delete_user,
        // Departments
        departments::list_departments,
        departments::get_department,
        departments::create_department,
        departments::update_department,
        departments::set_department_status,
        departments::delete_department,
    ),
    components(
        schemas(
            // Common
            ApiResponse<String>,
            EmptyData,
            crate::domain::UserRole,
            crate::domain::UserStatus,
            crate::domain::DepartmentStatus,
            // Health
            health::HealthResponse,
            health::ComponentHealth,
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            auth::IdentityDto,
            auth::ChangePasswordRequest,
            // Users
            users::UserDto,
            users::ManagerDto,
            users::DepartmentRefDto,
            users::CreateUserRequest,
            users::UpdateUserRequest,
            users::AssignDepartmentsRequest,
            // Departments
            departments::DepartmentDto,
            departments::DepartmentSummaryDto,
            departments::UserRefDto,
            departments::CreateDepartmentRequest,
            departments::UpdateDepartmentRequest,
            departments::UpdateDepartmentResponse,
            departments::SetStatusRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Service health check"),
        (name = "Authentication", description = "Login (JWT), current identity, password change"),
        (name = "Users", description = "User accounts, roles, supervisors and department membership"),
        (name = "Departments", description = "Departments with their members and managers"),
    ),
    info(
        title = "HR Admin API",
        version = "1.0.0",
        description = "REST API for managing users, roles and departments",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

/// Everything the router needs to build its handler states.
#[derive(Clone)]
pub struct ApiContext {
    pub db: DatabaseConnection,
    pub user_service: Arc<UserService>,
    pub department_service: Arc<DepartmentService>,
    pub jwt_config: JwtConfig,
    pub metrics_handle: PrometheusHandle,
    pub started_at: Arc<Instant>,
}

/// Create the API router with all routes
pub fn create_api_router(ctx: ApiContext) -> Router {
    let middleware_state = AuthState {
        jwt_config: ctx.jwt_config.clone(),
    };

    // Auth: `/me` and `/change-password` sit behind the route layer,
    // `/login` is added after it and stays public.
    let auth_routes = Router::new()
        .route("/me", get(auth::get_current_user))
        .route("/change-password", put(auth::change_password))
        .route_layer(middleware::from_fn_with_state(
            middleware_state.clone(),
            auth_middleware,
        ))
        .route("/login", post(auth::login))
        .with_state(auth::AuthHandlerState {
            user_service: ctx.user_service.clone(),
        });

    let user_routes = Router::new()
        .route("/", get(users::list_users).post(users::create_user))
        .route("/managers", get(users::list_managers))
        .route(
            "/{id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route("/{id}/departments", put(users::assign_departments))
        .layer(middleware::from_fn_with_state(
            middleware_state.clone(),
            auth_middleware,
        ))
        .with_state(users::UserHandlerState {
            user_service: ctx.user_service,
        });

    let department_routes = Router::new()
        .route(
            "/",
            get(departments::list_departments).post(departments::create_department),
        )
        .route(
            "/{id}",
            get(departments::get_department)
                .put(departments::update_department)
                .delete(departments::delete_department),
        )
        .route("/{id}/status", put(departments::set_department_status))
        .layer(middleware::from_fn_with_state(
            middleware_state,
            auth_middleware,
        ))
        .with_state(departments::DepartmentHandlerState {
            department_service: ctx.department_service,
        });

    let health_routes = Router::new()
        .route("/health", get(health::health_check))
        .with_state(health::HealthState {
            db: ctx.db,
            started_at: ctx.started_at,
        });

    let metrics_routes = Router::new()
        .route("/metrics", get(metrics::prometheus_metrics))
        .with_state(metrics::MetricsState {
            handle: ctx.metrics_handle,
        });

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let swagger_routes = SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi());

    Router::new()
        .merge(swagger_routes)
        .merge(health_routes)
        .merge(metrics_routes)
        .nest("/api/v1/auth", auth_routes)
        .nest("/api/v1/users", user_routes)
        .nest("/api/v1/departments", department_routes)
        .route_layer(middleware::from_fn(metrics::http_metrics_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
