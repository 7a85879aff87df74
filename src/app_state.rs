//! Implements a struct that holds the state of the web server.

use axum::extract::FromRef;

use crate::{
    config::{AppConfig, DisplayConfig},
    session::SessionStore,
};

/// The state of the web server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Display, session and upload settings.
    pub config: AppConfig,

    /// The uploads of every active browser session.
    pub sessions: SessionStore,
}

impl AppState {
    /// Create a new [AppState] with an empty session store.
    pub fn new(config: AppConfig) -> Self {
        let sessions = SessionStore::new(config.session.ttl);

        Self { config, sessions }
    }
}

impl FromRef<AppState> for DisplayConfig {
    fn from_ref(state: &AppState) -> Self {
        state.config.display.clone()
    }
}
