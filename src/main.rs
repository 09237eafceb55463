//! Dinner Planner HTTP server.

use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderValue, Method};
use secrecy::ExposeSecret;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use dinner_planner::adapters::ai::{
    AnthropicConfig, AnthropicProvider, MockAIProvider, OpenAIConfig, OpenAIProvider,
};
use dinner_planner::adapters::auth::AllowListAccessChecker;
use dinner_planner::adapters::http::{api_router, AccessState, PlannerHandlers};
use dinner_planner::adapters::storage::{InMemorySessionStore, RetentionPolicy};
use dinner_planner::application::GenerationSettings;
use dinner_planner::config::{AiConfig, AiProvider, AppConfig, ServerConfig};
use dinner_planner::domain::menu::StepOrchestrator;
use dinner_planner::ports::{AIError, AIProvider as AIProviderPort};

const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("dinner-planner failed to start: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config.server);
    config.validate()?;

    let provider = build_provider(&config.ai)?;
    let info = provider.provider_info();
    tracing::info!(provider = %info.name, model = %info.model, "AI provider configured");

    let checker = AllowListAccessChecker::new(config.auth.emails(), config.auth.domains());
    if config.auth.is_open() {
        tracing::warn!("No authorized emails or domains configured; the planner is open to everyone");
    }
    let access = AccessState::new(Arc::new(checker), &config.auth.identity_header)
        .map_err(|header| format!("invalid identity header: {}", header))?;

    let store = InMemorySessionStore::with_policy(RetentionPolicy {
        idle_ttl: config.server.session_ttl(),
        max_sessions: config.server.max_sessions,
    });
    let _sweeper = store.spawn_sweeper(config.server.session_ttl().min(SWEEP_INTERVAL));

    let handlers = PlannerHandlers::build(
        Arc::new(store),
        provider,
        StepOrchestrator::new(config.ai.suggestion_count),
        GenerationSettings {
            temperature: config.ai.temperature,
            max_tokens: config.ai.max_tokens,
        },
    );

    let app = api_router(handlers, access)
        .layer(TimeoutLayer::new(config.server.request_timeout()))
        .layer(cors_layer(&config.server))
        .layer(TraceLayer::new_for_http());

    let addr = config.server.socket_addr()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, environment = ?config.server.environment, "Dinner planner listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Dinner planner stopped");
    Ok(())
}

fn init_tracing(server: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&server.log_level));

    if server.is_production() {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt()
            .pretty()
            .with_env_filter(filter)
            .init();
    }
}

fn build_provider(ai: &AiConfig) -> Result<Arc<dyn AIProviderPort>, AIError> {
    let provider: Arc<dyn AIProviderPort> = match ai.provider {
        AiProvider::OpenAI => {
            let key = ai
                .openai_api_key
                .as_ref()
                .ok_or(AIError::AuthenticationFailed)?;
            let mut config = OpenAIConfig::new(key.expose_secret().clone()).with_timeout(ai.timeout());
            if let Some(model) = &ai.model {
                config = config.with_model(model.clone());
            }
            Arc::new(OpenAIProvider::new(config)?)
        }
        AiProvider::Anthropic => {
            let key = ai
                .anthropic_api_key
                .as_ref()
                .ok_or(AIError::AuthenticationFailed)?;
            let mut config =
                AnthropicConfig::new(key.expose_secret().clone()).with_timeout(ai.timeout());
            if let Some(model) = &ai.model {
                config = config.with_model(model.clone());
            }
            Arc::new(AnthropicProvider::new(config)?)
        }
        AiProvider::Mock => {
            tracing::warn!("Using the mock AI provider; responses are placeholders");
            Arc::new(MockAIProvider::new())
        }
    };
    Ok(provider)
}

fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = server
        .cors_origins_list()
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    if origins.is_empty() {
        return CorsLayer::new();
    }

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers(Any)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
