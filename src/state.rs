// src/state.rs

use std::sync::Arc;

use axum::extract::FromRef;

use crate::{
    config::Config,
    quiz::{aggregator::StatsAggregator, catalog::QuizCatalog, registry::SessionRegistry},
    store::{AttemptRepository, StatsRepository, UserRepository},
};

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub aggregator: StatsAggregator,
    pub catalog: Arc<QuizCatalog>,
    pub sessions: Arc<SessionRegistry>,
    pub config: Config,
}

impl AppState {
    /// Wires every repository to the same backing store.
    pub fn with_store<S>(config: Config, store: S) -> Self
    where
        S: UserRepository + AttemptRepository + StatsRepository + 'static,
    {
        let store = Arc::new(store);
        Self {
            users: store.clone(),
            aggregator: StatsAggregator::new(store.clone(), store),
            catalog: Arc::new(QuizCatalog::new(config.quiz_data_dir.clone())),
            sessions: Arc::new(SessionRegistry::new(config.session_ttl_secs)),
            config,
        }
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
