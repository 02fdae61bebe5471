//! Axum-based lead-intake gateway: entry point for SiteBrief. Config-driven
//! via CoreConfig.
//!
//! The gateway holds every secret (LLM key, reviewer key, SMTP credentials);
//! clients are stateless and never receive or send them. Routes:
//! AI completion on `/api/ai`, handoff submission on `/api/preferences`, and
//! the reviewer directory under `/api/admin`.

mod handlers;

use axum::routing::{get, post};
use axum::Router;
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sitebrief_core::{
    CoreConfig, HandoffService, IdentityProvider, LeadStore, OpenRouterBridge, ReviewDirectory,
    ReviewerNotifier, SmtpNotifier, StoreBackedIdentities, TextBridge,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) config: Arc<CoreConfig>,
    pub(crate) bridge: TextBridge,
    pub(crate) handoff: Arc<HandoffService>,
    pub(crate) directory: Arc<ReviewDirectory>,
    pub(crate) identities: Arc<dyn IdentityProvider>,
}

pub(crate) fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/health", get(handlers::health))
        .route("/api/ai", post(handlers::ai_complete))
        .route("/api/preferences", post(handlers::submit_preference))
        .route("/api/admin/users", get(handlers::admin_users))
        .route("/api/admin/preference/:id", get(handlers::admin_preference))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[tokio::main]
async fn main() {
    // Load .env first: all API keys stay in the backend only.
    if let Err(e) = dotenvy::dotenv() {
        eprintln!(
            "[sitebrief-gateway] .env not loaded: {} (using system environment)",
            e
        );
    }
    if std::env::var("OPENROUTER_API_KEY").is_err() {
        eprintln!(
            "[sitebrief-gateway] Hint: set OPENROUTER_API_KEY in .env for live completions; the gateway holds the key, clients never see it."
        );
    }
    if std::env::var("ADMIN_API_KEY").is_err() {
        eprintln!(
            "[sitebrief-gateway] Hint: set ADMIN_API_KEY in .env to enable the reviewer endpoints."
        );
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match CoreConfig::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("[sitebrief-gateway] config error: {}", e);
            std::process::exit(1);
        }
    };

    let store = match LeadStore::open_path(Path::new(&config.storage_path).join("sitebrief_leads"))
    {
        Ok(s) => Arc::new(s),
        Err(e) => {
            eprintln!("[sitebrief-gateway] lead store error: {}", e);
            std::process::exit(1);
        }
    };

    let provider = OpenRouterBridge::from_env()
        .unwrap_or_else(|| OpenRouterBridge::new(String::new()))
        .with_model(&config.llm_model);
    let bridge = TextBridge::new(Arc::new(provider));

    let identities: Arc<dyn IdentityProvider> =
        Arc::new(StoreBackedIdentities::from_env(Arc::clone(&store)));
    let notifier = SmtpNotifier::from_env().map(|n| Arc::new(n) as Arc<dyn ReviewerNotifier>);
    if notifier.is_none() {
        tracing::info!(
            target: "sitebrief::gateway",
            "SMTP not configured; reviewer notifications disabled"
        );
    }
    let handoff = Arc::new(HandoffService::new(
        Arc::clone(&store),
        Arc::clone(&identities),
        notifier,
    ));
    let directory = Arc::new(ReviewDirectory::new(Arc::clone(&store)));

    let state = AppState {
        config: Arc::new(config),
        bridge,
        handoff,
        directory,
        identities,
    };

    let addr = format!("0.0.0.0:{}", state.config.port);
    tracing::info!(target: "sitebrief::gateway", %addr, app = %state.config.app_name, "gateway listening");

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("[sitebrief-gateway] bind {} failed: {}", addr, e);
            std::process::exit(1);
        }
    };
    if let Err(e) = axum::serve(listener, build_app(state)).await {
        eprintln!("[sitebrief-gateway] server error: {}", e);
        std::process::exit(1);
    }
}
