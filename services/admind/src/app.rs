//! Admin HTTP application wiring.
//!
//! # Purpose
//! Builds the Axum router, configures middleware, and defines the shared
//! application state injected into handlers.
//!
//! # Notes
//! This module centralizes route composition to keep `main` small and testable.
use crate::api;
use crate::api::openapi::ApiDoc;
use crate::auth;
use crate::observability;
use crate::store::AdminStore;
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_opentelemetry::OpenTelemetrySpanExt;
use utoipa::OpenApi;

#[derive(Clone)]
pub struct AppState {
    pub api_version: String,
    pub store: Arc<dyn AdminStore + Send + Sync>,
    /// Lifetime applied to newly created sessions.
    pub session_ttl: chrono::Duration,
    /// Upper bound accepted for the article list `page_size` parameter.
    pub max_page_size: u32,
}

pub fn build_router(state: AppState) -> Router {
    let trace_layer =
        TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
            let parent = observability::trace_context_from_headers(request.headers());
            // Pure payload decode of an upstream-validated token; only used
            // to attribute the request, never to authorize it.
            let subject = request
                .headers()
                .get(axum::http::header::AUTHORIZATION)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.strip_prefix("Bearer "))
                .and_then(|token| auth::token::decode_access_token(token).ok())
                .map(|claims| claims.sub);
            let span = tracing::info_span!(
                "http.request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
                subject = subject.as_deref().unwrap_or("")
            );
            span.set_parent(parent);
            span
        });

    Router::new()
        .route(
            "/v1/system/info",
            axum::routing::get(api::system::system_info),
        )
        .route(
            "/v1/system/health",
            axum::routing::get(api::system::system_health),
        )
        .route(
            "/v1/users",
            axum::routing::get(api::users::list_users).post(api::users::create_user),
        )
        .route(
            "/v1/users/:user_id",
            axum::routing::get(api::users::get_user)
                .put(api::users::update_user)
                .delete(api::users::delete_user),
        )
        .route(
            "/v1/users/:user_id/roles",
            axum::routing::get(api::users::list_user_roles).put(api::users::set_user_roles),
        )
        .route(
            "/v1/users/:user_id/sessions",
            axum::routing::get(api::users::list_user_sessions)
                .delete(api::users::delete_user_sessions),
        )
        .route(
            "/v1/roles",
            axum::routing::get(api::roles::list_roles).post(api::roles::create_role),
        )
        .route(
            "/v1/roles/:role_id",
            axum::routing::get(api::roles::get_role)
                .put(api::roles::update_role)
                .delete(api::roles::delete_role),
        )
        .route(
            "/v1/roles/:role_id/permissions",
            axum::routing::get(api::roles::role_permissions),
        )
        .route(
            "/v1/roles/:role_id/permissions/:action_id",
            axum::routing::put(api::roles::grant_action).delete(api::roles::revoke_action),
        )
        .route(
            "/v1/permission-resources",
            axum::routing::get(api::permissions::list_resources)
                .post(api::permissions::create_resource),
        )
        .route(
            "/v1/permission-resources/:resource_id",
            axum::routing::get(api::permissions::get_resource)
                .put(api::permissions::update_resource)
                .delete(api::permissions::delete_resource),
        )
        .route(
            "/v1/permission-resources/:resource_id/actions",
            axum::routing::get(api::permissions::list_actions)
                .post(api::permissions::create_action),
        )
        .route(
            "/v1/permission-actions/:action_id",
            axum::routing::get(api::permissions::get_action)
                .put(api::permissions::update_action)
                .delete(api::permissions::delete_action),
        )
        .route(
            "/v1/articles",
            axum::routing::get(api::articles::list_articles).post(api::articles::create_article),
        )
        .route(
            "/v1/articles/:article_id",
            axum::routing::get(api::articles::get_article)
                .put(api::articles::update_article)
                .delete(api::articles::delete_article),
        )
        .route(
            "/v1/sessions",
            axum::routing::post(api::sessions::create_session),
        )
        .route(
            "/v1/sessions/lookup",
            axum::routing::post(api::sessions::lookup_session),
        )
        .route(
            "/v1/sessions/:session_id",
            axum::routing::get(api::sessions::get_session).delete(api::sessions::delete_session),
        )
        .merge(
            utoipa_swagger_ui::SwaggerUi::new("/docs").url("/v1/openapi.json", ApiDoc::openapi()),
        )
        .layer(trace_layer)
        .with_state(state)
}
