use crate::state::AppState;
use crate::{api, logging};
use axum::http::HeaderValue;
use axum::middleware;
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "beacon API",
        description = "Notification record REST API",
    ),
    tags(
        (name = "Health", description = "Service liveness"),
        (name = "Notifications", description = "Notification records")
    )
)]
struct ApiDoc;

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if allowed_origins.is_empty() {
        return cors.allow_origin(Any);
    }
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    cors.allow_origin(AllowOrigin::list(origins))
}

pub fn build_http_app(state: AppState) -> Router {
    let (router, api_doc) = api::routes().split_for_parts();

    let mut openapi = ApiDoc::openapi();
    openapi.merge(api_doc);

    let cors = cors_layer(&state.config.cors_allowed_origins);

    router
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/openapi.json", openapi))
        .fallback(api::route_not_found)
        .method_not_allowed_fallback(api::route_not_found)
        .layer(cors)
        .layer(middleware::from_fn(logging::request_logging))
}
