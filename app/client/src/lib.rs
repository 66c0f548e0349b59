//! Notes and products behind an email/password login.
//!
//!
//!
//! # Layers
//! - **Identity gateway** ([`identity`]): sign-up, sign-in, sign-out, password reset
//! - **Record store gateway** ([`documents`]): create/read/update/delete for notes and products
//! - **Home controller** ([`controller`]): latest snapshot of both collections, refreshed after every change
//!
//! Data flow per operation is one way:
//! intent → controller → gateway → provider → controller snapshot → screen
//!
//!
//!
//! # Providers
//! The gateways talk to traits, with two implementations each.
//! - Remote: identity toolkit REST ([`firebase_auth`]) and document store REST ([`firestore`])
//! - In-process: [`memory`], used offline and in tests
//!
//!
//!
//! # Setup
//!
//! Remote providers.
//! ```sh
//! export FIREBASE_API_KEY=...
//! export FIREBASE_PROJECT_ID=my-project
//! RUST_LOG=info cargo run -p firenotes-app
//! ```
//!
//! In-memory providers.
//! ```sh
//! cargo run -p firenotes-app -- --offline
//! ```
//!
//! Against local emulators.
//! ```sh
//! export IDENTITY_URL=http://localhost:9099/identitytoolkit.googleapis.com/v1
//! export FIRESTORE_URL=http://localhost:8080/v1
//! ```
use signal::ctrl_c;
#[cfg(unix)]
use signal::unix::{SignalKind, signal};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

pub mod config;
pub mod controller;
pub mod documents;
pub mod error;
pub mod firebase_auth;
pub mod firestore;
pub mod identity;
pub mod memory;
pub mod navigation;
pub mod screens;
pub mod session;
pub mod state;

pub use config::Config;
pub use controller::{HomeController, Snapshot};
pub use documents::{DocumentStore, RecordStore};
pub use error::{AppError, AuthError, ProviderError, StoreError};
pub use identity::{Identity, IdentityProvider};
pub use navigation::{Destination, Navigator};
pub use screens::{Notice, NoticeKind, Screens};
pub use session::{Session, UserProfile};
pub use state::State;

/// Logs go to stderr; stdout belongs to the screens.
pub fn init_tracing() {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
            }
            Err(e) => {
                warn!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
