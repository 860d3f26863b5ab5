/*
   Polar (OSS)

   Copyright 2024 Carnegie Mellon University.

   NO WARRANTY. THIS CARNEGIE MELLON UNIVERSITY AND SOFTWARE ENGINEERING INSTITUTE MATERIAL IS
   FURNISHED ON AN "AS-IS" BASIS. CARNEGIE MELLON UNIVERSITY MAKES NO WARRANTIES OF ANY KIND,
   EITHER EXPRESSED OR IMPLIED, AS TO ANY MATTER INCLUDING, BUT NOT LIMITED TO, WARRANTY OF FITNESS
   FOR PURPOSE OR MERCHANTABILITY, EXCLUSIVITY, OR RESULTS OBTAINED FROM USE OF THE MATERIAL.
   CARNEGIE MELLON UNIVERSITY DOES NOT MAKE ANY WARRANTY OF ANY KIND WITH RESPECT TO FREEDOM FROM
   PATENT, TRADEMARK, OR COPYRIGHT INFRINGEMENT.

   Licensed under a MIT-style license, please see license.txt or contact permission@sei.cmu.edu for
   full terms.

   [DISTRIBUTION STATEMENT A] This material has been approved for public release and unlimited
   distribution.  Please see Copyright notice for non-US Government use and distribution.

   This Software includes and/or makes use of Third-Party Software each subject to its own license.

   DM24-0470
*/

//! HTTP side of the button: one resource, `GET` for the press count and `POST` to record a press.
//!
//! The service keeps nothing in memory between requests. Every count is read from the counter
//! store when asked for, and every press goes straight to it.
use std::{error::Error, sync::Arc};

use axum::{
    routing::{get, MethodRouter},
    Router,
};
use pushbutton::{get_web_client, BUTTON_RESOURCE_PATH};
use tokio::{net::TcpListener, signal};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod store;
pub mod validate;

use config::{Config, StoreKind};
use routes::{count_handler, method_not_allowed_handler, press_handler};
use state::AppState;
use store::{CounterStore, MemoryStore, PostgrestStore};

pub const COUNTER_SERVICE_NAME: &str = "counter.service";

fn button_routes() -> MethodRouter<AppState> {
    // an explicit HEAD keeps it off the GET handler
    get(count_handler)
        .post(press_handler)
        .head(method_not_allowed_handler)
        .fallback(method_not_allowed_handler)
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(BUTTON_RESOURCE_PATH, button_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub fn build_store(config: &Config) -> Result<Arc<dyn CounterStore>, Box<dyn Error>> {
    Ok(match config.store {
        StoreKind::Memory => {
            info!("Using in-memory counter store");
            Arc::new(MemoryStore::default())
        }
        StoreKind::Postgrest => Arc::new(PostgrestStore::new(
            get_web_client()?,
            config.store_url.clone(),
            config.service_role.clone(),
            config.table.clone(),
        )),
    })
}

pub async fn start_server(config: Config) -> Result<(), Box<dyn Error>> {
    info!("Initializing state...");
    let state = AppState::new(build_store(&config)?);

    info!("Binding to {}", config.bind_addr);
    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!("Server running on {}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutting down...");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to install Ctrl+C handler {e}");
                std::future::pending::<()>().await
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler {e}");
                std::future::pending::<()>().await
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
