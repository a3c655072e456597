use std::sync::Arc;

use futures::StreamExt;

use bloom_bot::catalog::{CatalogProvider, InMemoryCatalog};
use bloom_bot::channels::TelegramChannel;
use bloom_bot::config::BotConfig;
use bloom_bot::dispatcher::Dispatcher;
use bloom_bot::external::{
    CannedRecommender, Geocoder, PaymentProvider, PerplexityRecommender, Recommender,
    TelegramStarsProvider, YandexGeocoder,
};
use bloom_bot::screens::{ScreenRegistry, renderers};
use bloom_bot::session::store::SessionStore;
use bloom_bot::store::{InMemoryStorage, LibSqlStorage, Storage};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let bot_token = std::env::var("BLOOM_BOT_TOKEN").unwrap_or_else(|_| {
        eprintln!("Error: BLOOM_BOT_TOKEN not set");
        eprintln!("  export BLOOM_BOT_TOKEN=123456:ABC-DEF...");
        std::process::exit(1);
    });

    let config = BotConfig::from_env();

    eprintln!("🌸 Bloom Bot v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Wizard timeout: {:?}", config.wizard_timeout);
    if config.admin_ids.is_empty() {
        eprintln!("   Admins: everyone (BLOOM_ADMIN_IDS not set)");
    } else {
        eprintln!("   Admins: {} configured", config.admin_ids.len());
    }

    // ── Storage ─────────────────────────────────────────────────────
    let storage: Arc<dyn Storage> = match std::env::var("BLOOM_DB_PATH") {
        Ok(db_path) => {
            let backend = LibSqlStorage::new_local(std::path::Path::new(&db_path))
                .await
                .unwrap_or_else(|e| {
                    eprintln!("Error: Failed to open database at {db_path}: {e}");
                    std::process::exit(1);
                });
            eprintln!("   Database: {db_path}");
            Arc::new(backend)
        }
        Err(_) => {
            eprintln!("   Database: in-memory (set BLOOM_DB_PATH to persist)");
            Arc::new(InMemoryStorage::new())
        }
    };

    // ── Collaborators ───────────────────────────────────────────────
    let recommender: Arc<dyn Recommender> = match std::env::var("PERPLEXITY_API_KEY") {
        Ok(key) => {
            let model = std::env::var("BLOOM_AI_MODEL").unwrap_or_else(|_| "sonar".to_string());
            eprintln!("   Recommendations: Perplexity ({model})");
            Arc::new(PerplexityRecommender::new(
                secrecy::SecretString::from(key),
                model,
            ))
        }
        Err(_) => {
            eprintln!("   Recommendations: canned (PERPLEXITY_API_KEY not set)");
            Arc::new(CannedRecommender)
        }
    };

    let geocoder: Option<Arc<dyn Geocoder>> = match std::env::var("YANDEX_GEOCODER_API_KEY") {
        Ok(key) => Some(Arc::new(YandexGeocoder::new(secrecy::SecretString::from(
            key,
        )))),
        Err(_) => None,
    };

    let payments: Arc<dyn PaymentProvider> =
        Arc::new(TelegramStarsProvider::new(bot_token.clone()));

    // ── Core wiring ─────────────────────────────────────────────────
    let catalog: Arc<dyn CatalogProvider> = Arc::new(InMemoryCatalog::with_samples());
    let sessions = Arc::new(SessionStore::new(Arc::clone(&storage)));
    let mut registry = ScreenRegistry::new();
    renderers::register_all(&mut registry);
    let registry = Arc::new(registry);

    let dispatcher = Arc::new(Dispatcher::new(
        sessions,
        registry,
        catalog,
        storage,
        recommender,
        payments,
        geocoder,
        config,
    ));

    let channel = Arc::new(TelegramChannel::new(bot_token));
    if let Err(e) = channel.health_check().await {
        eprintln!("Error: Telegram token check failed: {e}");
        std::process::exit(1);
    }

    eprintln!("   Listening for Telegram updates.\n");

    let mut events = channel.listen().await?;
    while let Some(event) = events.next().await {
        let dispatcher = Arc::clone(&dispatcher);
        let channel = Arc::clone(&channel);
        tokio::spawn(async move {
            let user_id = event.user_id;
            let instruction = dispatcher.dispatch(event).await;
            if let Err(e) = channel.send(user_id, &instruction).await {
                tracing::error!(user_id, error = %e, "failed to send response");
            }
        });
    }

    Ok(())
}
