//! HTTP surface
//!
//! | Method | Path                       | Role          |
//! |--------|----------------------------|---------------|
//! | POST   | `/login`, `/token`         | none          |
//! | POST   | `/tickets`                 | customer      |
//! | GET    | `/tickets/my`              | customer      |
//! | GET    | `/tickets`                 | agent, admin  |
//! | GET    | `/tickets/{id}`            | any           |
//! | PATCH  | `/tickets/{id}`            | agent         |
//! | PATCH  | `/tickets/{id}/assign`     | admin         |
//! | GET    | `/tickets/embed/{token}`   | none          |
//!
//! Role checks happen in the lifecycle service; handlers only extract,
//! parse and serialize.

mod auth;
mod error;
mod tickets;

pub use auth::{Authenticated, LoginRequest};
pub use tickets::{AssignRequest, ListQuery, UpdateTicketRequest};

use crate::auth::Authenticator;
use crate::config::Settings;
use crate::error::Result;
use crate::service::TicketService;
use axum::{
    Json, Router,
    routing::{get, patch, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared state of all handlers
#[derive(Clone)]
pub struct AppState {
    pub authenticator: Arc<Authenticator>,
    pub tickets: Arc<TicketService>,
}

impl AppState {
    pub fn new(authenticator: Authenticator, tickets: TicketService) -> Self {
        Self {
            authenticator: Arc::new(authenticator),
            tickets: Arc::new(tickets),
        }
    }

    /// Wire directory, token issuer and store from settings
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let directory = settings.directory()?;
        let authenticator = settings.authenticator(directory.clone())?;
        let tickets = settings.ticket_service(directory)?;
        Ok(Self::new(authenticator, tickets))
    }
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/login", post(auth::login))
        .route("/token", post(auth::token))
        .route(
            "/tickets",
            post(tickets::create_ticket).get(tickets::list_ticket_queue),
        )
        .route("/tickets/my", get(tickets::list_own_tickets))
        .route("/tickets/embed/:token", get(tickets::embed_view))
        .route(
            "/tickets/:id",
            get(tickets::get_ticket).patch(tickets::update_ticket),
        )
        .route("/tickets/:id/assign", patch(tickets::assign_ticket))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Serve the API until Ctrl-C
pub async fn serve(settings: Settings) -> Result<()> {
    let state = AppState::from_settings(&settings)?;
    let address = settings.server.bind_address();
    let listener = TcpListener::bind(&address).await?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
