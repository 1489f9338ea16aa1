use axum::{
    handler::Handler,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware,
    routing::{get, patch},
    Router,
};
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};

use crate::config::SecurityConfig;
use crate::handlers::{protected, public};
use crate::middleware::{json_error_fallback, not_found, panic_response, requires_auth};
use crate::state::AppState;
use crate::types::Permission;

/// Build the full application router
pub fn app(state: AppState) -> Router {
    let cors = if state.config.is_development() {
        CorsLayer::permissive()
    } else {
        cors_layer(&state.config.security)
    };

    Router::new()
        // Public
        .route("/", get(public::service::root))
        .route("/health", get(public::service::health))
        // Drinks
        .merge(drink_routes(&state))
        .fallback(not_found)
        .with_state(state)
        // Global middleware
        .layer(middleware::map_response(json_error_fallback))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

fn drink_routes(state: &AppState) -> Router<AppState> {
    use protected::drinks;

    Router::new()
        .route(
            "/drinks",
            get(public::drinks::list).post(drinks::create.layer(
                middleware::from_fn_with_state(state.guard(Permission::PostDrinks), requires_auth),
            )),
        )
        .route(
            "/drinks-detail",
            get(drinks::detail.layer(middleware::from_fn_with_state(
                state.guard(Permission::GetDrinksDetail),
                requires_auth,
            ))),
        )
        .route(
            "/drinks/:id",
            patch(drinks::update.layer(middleware::from_fn_with_state(
                state.guard(Permission::PatchDrinks),
                requires_auth,
            )))
            .delete(drinks::delete.layer(middleware::from_fn_with_state(
                state.guard(Permission::DeleteDrinks),
                requires_auth,
            ))),
        )
}

/// CORS for non-development environments: configured origins only
fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if !security.enable_cors {
        return CorsLayer::new();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
}
