use crate::handlers::{curves, market, orders, positions, valuations, ws};
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route(
            "/orders",
            get(orders::list_orders).post(orders::submit_order),
        )
        .route("/orders/:id", get(orders::get_order))
        .route("/orders/:id/transitions", post(orders::propose_transition))
        .route("/orders/:id/impact", get(market::order_impact))
        .route("/curves", get(curves::list_curves))
        .route(
            "/curves/:metal",
            get(curves::get_curve).put(curves::put_curve),
        )
        .route("/valuations", post(valuations::preview))
        .route(
            "/positions",
            get(positions::list_positions).put(positions::put_positions),
        )
        .route("/market/axes", get(market::list_axes))
        .route("/market/matches", get(market::list_matches))
        .route("/ws", get(ws::ws_handler));

    Router::new()
        .nest("/v1", api_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
