use std::{env, fmt::Display, fs::read_to_string, str::FromStr};

use tracing::{info, warn};

pub struct Config {
    pub port: u16,
    pub mongodb_url: String,
    pub mongodb_name: String,
    pub redis_url: String,
    pub jwt_secret: String,
    pub upload_dir: String,
}

impl Config {
    pub fn load() -> Self {
        Self {
            port: try_load("PORT", "4000"),
            mongodb_url: try_load("MONGODB_URL", "mongodb://localhost:27017"),
            mongodb_name: try_load("MONGODB_NAME", "storefront"),
            redis_url: try_load("REDIS_URL", "redis://localhost:6379"),
            jwt_secret: read_secret("JWT_SECRET"),
            upload_dir: try_load("UPLOAD_DIR", "uploads"),
        }
    }
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| {
        warn!("Environment variable {key} not found, using default");
    })
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
        })
        .expect("Environment misconfigured!")
}

// Docker-style file secret, with a plain environment variable fallback
// for local runs.
fn read_secret(secret_name: &str) -> String {
    let path = format!("/run/secrets/{secret_name}");

    read_to_string(&path)
        .map(|s| s.trim().to_string())
        .or_else(|e| {
            warn!("Failed to read {secret_name} from file: {e}");
            env::var(secret_name)
        })
        .expect("Secrets misconfigured!")
}
