use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod bookings;
pub mod error;
pub mod middleware;
pub mod requests;
pub mod state;
pub mod trips;
pub mod wallet;
pub mod worker;

pub use state::{AppState, AuthSettings};

async fn health() -> &'static str {
    "OK"
}

/// Build the full router. Everything under /v1 sits behind bearer auth.
pub fn app(state: AppState) -> Router {
    let protected = Router::new()
        .route("/v1/trips", post(trips::create_trip).get(trips::list_my_trips))
        .route("/v1/trips/{id}", get(trips::get_trip))
        .route("/v1/trips/{id}/bookings", get(trips::list_bookings))
        .route("/v1/trips/{id}/verify", post(trips::verify_trip))
        .route("/v1/trips/{id}/cancel", post(trips::cancel_trip))
        .route("/v1/trips/{id}/complete", post(trips::complete_trip))
        .route("/v1/trips/{id}/capacity", get(trips::remaining_capacity))
        .route("/v1/trips/{id}/requests", get(trips::list_requests))
        .route("/v1/requests", post(requests::submit_request))
        .route("/v1/requests/{id}", get(requests::get_request))
        .route("/v1/requests/{id}/decide", post(requests::decide_request))
        .route("/v1/requests/{id}/cancel", post(requests::cancel_request))
        .route("/v1/bookings/{id}", get(bookings::get_booking))
        .route("/v1/bookings/{id}/advance", post(bookings::advance_booking))
        .route("/v1/wallet", get(wallet::get_balance))
        .route("/v1/wallet/open", post(wallet::open_account))
        .route("/v1/wallet/deposit", post(wallet::deposit))
        .route("/v1/wallet/withdraw", post(wallet::withdraw))
        .route("/v1/wallet/escrow/{id}", get(wallet::escrow_history))
        .layer(from_fn_with_state(
            state.clone(),
            middleware::auth::auth_middleware,
        ));

    Router::new()
        .route("/health", get(health))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
