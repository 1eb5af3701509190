//! `kitchenduty serve` -- HTTP calendar feed.
//!
//! Endpoints:
//! - GET /calendar.ics - Subscribable iCalendar feed
//! - GET /health       - Server status
//!
//! The feed refreshes state from the store before each render, so swaps and
//! completions made elsewhere show up on the next calendar poll.

mod handlers;
mod state;

use std::sync::{Arc, Mutex};

use axum::routing::get;
use axum::Router;
use log::{info, warn};

use self::handlers::{handle_calendar, handle_health, handle_not_found};
use self::state::AppState;
use crate::app::Engine;

/// Plain-text body returned when the feed cannot be produced.
const FEED_ERROR_BODY: &str = "Error generating calendar";

const ICS_CONTENT_TYPE: &str = "text/calendar; charset=utf-8";

pub(crate) fn router(engine: Engine) -> Router {
    let state = Arc::new(AppState {
        engine: Mutex::new(engine),
    });

    Router::new()
        .route("/calendar.ics", get(handle_calendar))
        .route("/health", get(handle_health))
        .fallback(handle_not_found)
        .with_state(state)
}

/// Serves the feed on `0.0.0.0:port` until Ctrl+C.
pub(crate) async fn start_server(
    port: u16,
    engine: Engine,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = router(engine);
    let addr = format!("0.0.0.0:{port}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    eprintln!("KitchenDuty feed listening on http://{addr}/calendar.ics");
    info!("event=serve_start module=cli status=ok addr={}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("event=serve_stop module=cli status=ok");
    eprintln!("\nServer shut down.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(
            "event=serve_signal module=cli status=error error={}",
            err
        );
        std::future::pending::<()>().await;
    }
    eprintln!("\nReceived shutdown signal...");
}
