use std::sync::Arc;

use mongodb::Database;

use super::{
    cache::{init_redis, Cache},
    config::Config,
    database::init_mongo,
    storage::MediaStorage,
};

/// Process-wide handles, constructed once at boot and injected into
/// handlers through axum state.
pub struct AppState {
    pub config: Config,
    pub db: Database,
    pub cache: Cache,
    pub media: MediaStorage,
}

impl AppState {
    pub async fn new() -> Arc<Self> {
        let config = Config::load();

        let db = init_mongo(&config).await;
        let redis_connection = init_redis(&config.redis_url).await;

        let cache = Cache::new(redis_connection);
        let media = MediaStorage::new(&config.upload_dir, "/uploads");

        Arc::new(Self {
            config,
            db,
            cache,
            media,
        })
    }
}
