//! Biblio API server binary.
//!
//! Loads configuration from the TOML file given as the first argument (or
//! defaults), wires the discovery engines over the configured backend, and
//! serves the HTTP surface.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use biblio_api::{router, AppState, AuthLayer, StaticTokenValidator};
use biblio_core::config::BiblioConfig;
use biblio_core::{
    spawn_effect_logger, AppRole, EffectQueue, MemoryIdentityProvider, MemoryPreferenceStore,
    UserAccount,
};
use biblio_discovery::{MemoryFavoriteStore, ScoringPolicy};
use biblio_query::MemoryIndex;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            let path = PathBuf::from(path);
            BiblioConfig::load(&path).with_context(|| format!("loading {}", path.display()))?
        }
        None => BiblioConfig::default(),
    };

    if config.index.backend != "memory" {
        anyhow::bail!(
            "unsupported index backend {:?}; this build serves the in-memory backend only",
            config.index.backend
        );
    }
    let index = Arc::new(MemoryIndex::new());
    let identity = Arc::new(MemoryIdentityProvider::new());
    let preferences = Arc::new(MemoryPreferenceStore::new());
    let favorites = Arc::new(MemoryFavoriteStore::new());

    if !config.auth.enabled {
        identity
            .register(UserAccount {
                user_id: Uuid::new_v4(),
                username: "dev".to_string(),
                role: AppRole::Admin,
            })
            .await;
        log::warn!("Authentication disabled; requests run as the dev principal");
    }

    let (effects, rx) = EffectQueue::new();
    spawn_effect_logger(rx);

    let state = AppState::new(
        index,
        identity,
        preferences,
        favorites,
        ScoringPolicy::default(),
        effects,
    );
    let app = router(state).layer(AuthLayer::new(
        Arc::new(StaticTokenValidator::new()),
        config.auth.clone(),
    ));

    let addr = format!("{}:{}", config.api.host, config.api.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    log::info!("Biblio API listening on {addr}");
    axum::serve(listener, app).await?;
    Ok(())
}
