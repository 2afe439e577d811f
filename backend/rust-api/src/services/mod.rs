use std::sync::Arc;

use crate::config::Config;
use crate::error::ScoringConfigError;
use mongodb::Client as MongoClient;

use self::attempt_store::AttemptStore;
use self::mongo_store::MongoAttemptStore;
use self::progress_service::ProgressService;

pub struct AppState {
    pub config: Config,
    pub progress: ProgressService,
}

impl AppState {
    pub async fn new(config: Config, mongo_client: MongoClient) -> anyhow::Result<Self> {
        let mongo = mongo_client.database(&config.mongo_database);

        tracing::info!("Testing MongoDB connection with ping...");

        tokio::time::timeout(
            std::time::Duration::from_secs(5),
            mongo.run_command(mongodb::bson::doc! { "ping": 1 }),
        )
        .await
        .map_err(|_| anyhow::anyhow!("MongoDB ping timeout after 5s"))??;

        tracing::info!("MongoDB connection established successfully");

        let store: Arc<dyn AttemptStore> = Arc::new(MongoAttemptStore::new(mongo));
        Ok(Self::with_store(config, store)?)
    }

    /// Builds state over any attempt store; the scoring section is validated here.
    pub fn with_store(
        config: Config,
        store: Arc<dyn AttemptStore>,
    ) -> Result<Self, ScoringConfigError> {
        let progress = ProgressService::from_settings(store, &config.scoring)?;
        Ok(Self { config, progress })
    }
}

pub mod attempt_store;
pub mod mongo_store;
pub mod progress_service;
