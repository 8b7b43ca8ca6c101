use std::sync::Arc;
use std::time::Instant;

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::{
    Router,
    routing::{delete, get, post, put},
};

use super::{accounts, bundles, plans, purchases, subscriptions, videos};
use crate::payment::PaymentProcessor;
use crate::store::Store;

pub struct AppState {
    pub store: Arc<dyn Store>,
    pub payment: Arc<dyn PaymentProcessor>,
}

impl AppState {
    #[must_use]
    pub fn new(store: Arc<dyn Store>, payment: Arc<dyn PaymentProcessor>) -> Self {
        Self { store, payment }
    }
}

async fn health() -> &'static str {
    "OK"
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    let latency = start.elapsed();
    let status = response.status();

    tracing::info!(
        "{} {} {} {}ms",
        method,
        uri.path(),
        status.as_u16(),
        latency.as_millis()
    );

    response
}

fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        // Accounts
        .route("/auth/register", post(accounts::register))
        .route("/auth/login", post(accounts::login))
        .route("/auth/me", get(accounts::me))
        .route("/auth/become-creator", post(accounts::become_creator))
        // Catalog
        .route("/videos", get(videos::list_videos))
        .route("/videos", post(videos::create_video))
        .route("/videos/{id}", get(videos::get_video))
        .route("/videos/{id}", put(videos::update_video))
        .route("/videos/{id}", delete(videos::delete_video))
        .route("/creators/{id}/videos", get(videos::list_creator_videos))
        .route("/creators/{id}/bundles", get(bundles::list_creator_bundles))
        .route("/creators/{id}/plan", get(plans::get_creator_plan))
        .route("/bundles", post(bundles::create_bundle))
        .route("/bundles/{id}", put(bundles::update_bundle))
        .route("/bundles/{id}", delete(bundles::delete_bundle))
        // Plans
        .route("/plans", post(plans::create_plan))
        .route("/plans/{id}", put(plans::update_plan))
        .route("/plans/{id}", delete(plans::delete_plan))
        // Entitlements
        .route("/videos/{id}/access", get(purchases::check_access))
        .route("/videos/{id}/purchase", post(purchases::purchase_video))
        .route("/bundles/{id}/purchase", post(bundles::purchase_bundle))
        .route("/plans/{id}/subscribe", post(subscriptions::subscribe))
        .route("/purchases", get(purchases::my_purchases))
        .route("/subscriptions", get(subscriptions::my_subscriptions))
        .route("/subscriptions/{id}", delete(subscriptions::unsubscribe))
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api_router())
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}
