use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::config::{apply_security_headers, create_cors_layer};
use crate::handlers::{config, events, health_check};
use crate::AppState;

pub fn create_routes(state: AppState) -> Router {
    let api = Router::new()
        .route(
            "/events/search",
            post(events::search_events_post).get(events::search_events_get),
        )
        .route("/events", get(events::list_upcoming).post(events::create_event))
        .route("/events/category/:category", get(events::list_by_category))
        .route(
            "/events/:id",
            get(events::get_event)
                .put(events::update_event)
                .delete(events::delete_event),
        )
        .route("/events/:id/star", post(events::toggle_star))
        .route(
            "/config",
            get(config::get_configuration).put(config::update_configuration),
        );

    let router = Router::new()
        .route("/health", get(health_check))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(create_cors_layer())
        .with_state(state);

    apply_security_headers(router)
}
