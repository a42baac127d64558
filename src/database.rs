//! # MongoDB
//!
//! Document store for every entity family (users, products, categories,
//! brands, genders, carts, orders, reviews, media).
//!
//! There is no migration system; the only schema-level state is the set
//! of unique indexes created at boot. Concurrent writes to the same
//! document are last-write-wins, nothing takes a lock.

use mongodb::{bson::doc, options::IndexOptions, Client, Database, IndexModel};
use tracing::info;

use super::config::Config;

pub async fn init_mongo(config: &Config) -> Database {
    let client = Client::with_uri_str(&config.mongodb_url)
        .await
        .expect("MongoDB misconfigured!");

    let db = client.database(&config.mongodb_name);

    // Fails fast when the store is unreachable instead of on the first
    // request.
    db.run_command(doc! { "ping": 1 })
        .await
        .expect("MongoDB unreachable!");

    ensure_indexes(&db)
        .await
        .expect("Failed to create indexes!");

    info!("Connected to MongoDB");

    db
}

async fn ensure_indexes(db: &Database) -> mongodb::error::Result<()> {
    let unique = IndexOptions::builder().unique(true).build();

    db.collection::<crate::models::User>(crate::store::USERS)
        .create_index(
            IndexModel::builder()
                .keys(doc! { "email": 1 })
                .options(unique.clone())
                .build(),
        )
        .await?;

    db.collection::<crate::models::Category>(crate::store::CATEGORIES)
        .create_index(
            IndexModel::builder()
                .keys(doc! { "name": 1 })
                .options(unique.clone())
                .build(),
        )
        .await?;

    db.collection::<crate::models::Brand>(crate::store::BRANDS)
        .create_index(
            IndexModel::builder()
                .keys(doc! { "name": 1 })
                .options(unique)
                .build(),
        )
        .await?;

    Ok(())
}
