use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::{
    Json, Router,
    extract::{Query, State},
    response::Html,
    routing::get,
};
use log::{error, info};
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::signal;

use crate::app::{handle_selection, top_restaurants};
use crate::config::MAX_TOP_N;
use crate::data::model::GeocodedResult;
use crate::error::AppError;
use crate::state::SharedState;
use crate::ui::page::render_dashboard;

// ---------------------------------------------------------------------------
// Routes
// ---------------------------------------------------------------------------

pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(dashboard_handler))
        .route("/api/cuisines", get(cuisines_handler))
        .route("/api/restaurants", get(restaurants_handler))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct DashboardParams {
    cuisine: Option<String>,
}

async fn dashboard_handler(
    State(state): State<SharedState>,
    Query(params): Query<DashboardParams>,
) -> Result<Html<String>, AppError> {
    let view = handle_selection(&state, params.cuisine.as_deref()).await;
    Ok(Html(render_dashboard(&state.templates, &view)?))
}

async fn cuisines_handler(State(state): State<SharedState>) -> Json<Vec<String>> {
    Json(state.cuisines())
}

#[derive(Debug, Deserialize)]
pub struct RestaurantParams {
    cuisine: Option<String>,
    limit: Option<usize>,
}

async fn restaurants_handler(
    State(state): State<SharedState>,
    Query(params): Query<RestaurantParams>,
) -> Result<Json<Vec<GeocodedResult>>, AppError> {
    let limit = params.limit.unwrap_or(state.settings.top_n);
    if !(1..=MAX_TOP_N).contains(&limit) {
        return Err(AppError::InvalidLimit(limit));
    }

    let cuisine = params
        .cuisine
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(state.settings.default_cuisine.as_str());

    Ok(Json(top_restaurants(&state, cuisine, limit).await))
}

// ---------------------------------------------------------------------------
// Serving
// ---------------------------------------------------------------------------

/// Bind and serve until Ctrl+C or SIGTERM.
pub async fn serve(state: SharedState, address: SocketAddr) -> Result<()> {
    let app = build_router(state);

    info!("Binding to {address}");
    let listener = TcpListener::bind(address)
        .await
        .with_context(|| format!("binding {address}"))?;
    info!("Dashboard running on http://{address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to listen for Ctrl+C: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
