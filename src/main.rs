use std::error::Error;

use ai_llm_service::{config::default_config::config_gemini, telemetry};
use api::{ApiConfig, AppState};
use chat_gateway::{
    ChatGateway, GatewayConfig, GroundingMode, build_generator, load_template, loader_from_env,
};
use knowledge_loader::KnowledgeBase;
use tracing::{Level, info, warn};
use tracing_subscriber::{Layer, filter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Load environment variables from .env file; a missing file is fine.
    let dotenv = dotenvy::dotenv();

    let app_layer = fmt::layer()
        .with_target(false)
        .with_filter(filter::filter_fn(|meta| !telemetry::is_library_target(meta.target())));

    tracing_subscriber::registry()
        .with(telemetry::env_filter_with_level("info", Level::INFO))
        .with(app_layer)
        .with(telemetry::layer())
        .try_init()?;

    if let Err(e) = dotenv {
        if !e.not_found() {
            warn!(error = %e, "failed to load .env file");
        }
    }

    let llm_cfg = config_gemini()?;
    let gateway_cfg = GatewayConfig::from_env()?;
    let api_cfg = ApiConfig::from_env()?;
    let template = load_template(&gateway_cfg)?;
    let generator = build_generator(llm_cfg)?;

    let knowledge = KnowledgeBase::new();
    match gateway_cfg.mode {
        GroundingMode::PreloadedCorpus => {
            let loader = loader_from_env()?;
            let kb = knowledge.clone();
            // Loads in the background; handlers wait on the readiness barrier.
            tokio::spawn(async move {
                loader.load(&kb).await;
            });
        }
        GroundingMode::RequestContext => {
            info!("grounding on per-request context; knowledge corpus not loaded");
        }
    }

    info!(mode = %gateway_cfg.mode, address = %api_cfg.address, "starting grounded relay");

    let gateway = ChatGateway::new(gateway_cfg, template, generator, knowledge);
    api::start(AppState::new(gateway), api_cfg).await?;

    Ok(())
}
