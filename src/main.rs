use splitpot::rates::FrankfurterRateProvider;
use splitpot::store::SqliteStore;
use splitpot::{api, config::Config, LedgerService, RateProvider};
use std::net::SocketAddr;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let port = config.port;

    // Initialize the document store and collaborators
    let store = match SqliteStore::connect(&config.database_path).await {
        Ok(s) => Arc::new(s),
        Err(e) => {
            eprintln!("Failed to initialize document store: {}", e);
            std::process::exit(1);
        }
    };

    let rates: Arc<dyn RateProvider> =
        Arc::new(FrankfurterRateProvider::new(config.rates_api_url.clone()));
    let ledger = Arc::new(LedgerService::new(
        store,
        rates,
        config.settlement_currency.clone(),
    ));

    // Create router
    let app = api::create_router(api::AppState::new(ledger));

    // Bind to address
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    tracing::info!("Server listening on {}", addr);

    // Run server
    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}
