use std::sync::Arc;

use tubedrop::core::config::Config;
use tubedrop::core::logging;
use tubedrop::download::extractor::YtDlpExtractor;
use tubedrop::download::store::FileStore;
use tubedrop::server;
use tubedrop::Orchestrator;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Arc::new(Config::from_env());
    logging::init_logger(config.debug, config.log_file.as_deref())?;
    logging::log_cookies_configuration(&config);

    let extractor = YtDlpExtractor::new(&config).await?;
    extractor.log_version().await?;

    let store = FileStore::new(&config)?;
    log::info!("Download store: {}", store.root().display());

    let orchestrator = Arc::new(Orchestrator::new(
        Arc::clone(&config),
        Arc::new(extractor),
        store,
    ));

    server::run(config, orchestrator).await?;
    Ok(())
}
