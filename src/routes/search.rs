use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Response,
};
use mongodb::bson::{doc, Document};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::{
    cache::{self, LIST_TTL_SECS},
    error::AppError,
    state::AppState,
    store,
};

use super::response::ok;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub name: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub gender: Option<String>,
}

/// Canonical cache key: fixed field order, absent fields skipped, so the
/// same query always hashes to the same key regardless of parameter
/// order on the wire.
fn search_key(query: &SearchQuery) -> String {
    let mut parts = Vec::new();

    if let Some(name) = &query.name {
        parts.push(format!("name={name}"));
    }
    if let Some(min) = query.min_price {
        parts.push(format!("minPrice={min}"));
    }
    if let Some(max) = query.max_price {
        parts.push(format!("maxPrice={max}"));
    }
    if let Some(category) = &query.category {
        parts.push(format!("category={category}"));
    }
    if let Some(brand) = &query.brand {
        parts.push(format!("brand={brand}"));
    }
    if let Some(gender) = &query.gender {
        parts.push(format!("gender={gender}"));
    }

    format!("{}:{}", cache::SEARCH_NS, parts.join("&"))
}

fn price_filter(min: Option<f64>, max: Option<f64>) -> Option<Document> {
    if min.is_none() && max.is_none() {
        return None;
    }

    let mut range = Document::new();
    if let Some(min) = min {
        range.insert("$gte", min);
    }
    if let Some(max) = max {
        range.insert("$lte", max);
    }
    Some(range)
}

pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<Response, AppError> {
    info!("Search endpoint hit...");

    let cache_key = search_key(&query);

    if let Some(cached) = state.cache.get(&cache_key).await? {
        info!("Returning cached search results");
        let products: Value = serde_json::from_str(&cached)?;
        return Ok(ok(
            StatusCode::OK,
            "Products search successful",
            json!({ "products": products }),
        ));
    }

    let mut filter = Document::new();

    if let Some(name) = &query.name {
        filter.insert("name", doc! { "$regex": name, "$options": "i" });
    }

    if let Some(range) = price_filter(query.min_price, query.max_price) {
        filter.insert("price", range);
    }

    if let Some(category) = &query.category {
        let ids = store::ids_matching_name(&state.db, store::CATEGORIES, category).await?;
        if ids.is_empty() {
            return Ok(ok(
                StatusCode::OK,
                "No products found for the provided category",
                json!({ "products": [] }),
            ));
        }
        filter.insert("category", doc! { "$in": ids });
    }

    if let Some(brand) = &query.brand {
        let ids = store::ids_matching_name(&state.db, store::BRANDS, brand).await?;
        if ids.is_empty() {
            return Ok(ok(
                StatusCode::OK,
                "No products found for the provided brand",
                json!({ "products": [] }),
            ));
        }
        filter.insert("brand", doc! { "$in": ids });
    }

    if let Some(gender) = &query.gender {
        let ids = gender_ids_matching(&state, gender).await?;
        if ids.is_empty() {
            return Ok(ok(
                StatusCode::OK,
                "No products found for the provided gender",
                json!({ "products": [] }),
            ));
        }
        filter.insert("gender", doc! { "$in": ids });
    }

    let products = store::populated_products(&state.db, filter).await?;

    if products.is_empty() {
        info!("No products found");
        return Ok(ok(
            StatusCode::OK,
            "No products found",
            json!({ "products": [] }),
        ));
    }

    let serialized = serde_json::to_string(&products)?;
    state
        .cache
        .put(&cache_key, &serialized, LIST_TTL_SECS)
        .await?;

    let cached: Value = serde_json::from_str(&serialized)?;

    info!("Products search successful, cached results");
    Ok(ok(
        StatusCode::OK,
        "Products search successful",
        json!({ "length": products.len(), "products": cached }),
    ))
}

async fn gender_ids_matching(
    state: &AppState,
    gender: &str,
) -> Result<Vec<mongodb::bson::oid::ObjectId>, AppError> {
    use futures::TryStreamExt;

    let docs: Vec<Document> = state
        .db
        .collection::<Document>(store::GENDERS)
        .find(doc! { "gender": { "$regex": gender, "$options": "i" } })
        .await?
        .try_collect()
        .await?;

    Ok(docs
        .into_iter()
        .filter_map(|d| d.get_object_id("_id").ok())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_canonical_and_skips_absent_fields() {
        let query = SearchQuery {
            name: Some("shoe".to_string()),
            max_price: Some(200.0),
            ..Default::default()
        };

        assert_eq!(search_key(&query), "search:name=shoe&maxPrice=200");
        assert_eq!(search_key(&SearchQuery::default()), "search:");
    }

    #[test]
    fn identical_queries_share_a_key() {
        let a = SearchQuery {
            brand: Some("acme".to_string()),
            min_price: Some(10.0),
            ..Default::default()
        };
        let b = SearchQuery {
            min_price: Some(10.0),
            brand: Some("acme".to_string()),
            ..Default::default()
        };

        assert_eq!(search_key(&a), search_key(&b));
    }

    #[test]
    fn keys_live_under_the_search_namespace() {
        let query = SearchQuery {
            gender: Some("men".to_string()),
            ..Default::default()
        };
        let pattern = cache::namespace_pattern(cache::SEARCH_NS);
        assert!(search_key(&query).starts_with(pattern.trim_end_matches('*')));
    }

    #[test]
    fn price_filter_builds_open_and_closed_ranges() {
        assert!(price_filter(None, None).is_none());

        let range = price_filter(Some(10.0), None).unwrap();
        assert_eq!(range.get_f64("$gte").unwrap(), 10.0);
        assert!(range.get("$lte").is_none());

        let range = price_filter(Some(10.0), Some(50.0)).unwrap();
        assert_eq!(range.get_f64("$gte").unwrap(), 10.0);
        assert_eq!(range.get_f64("$lte").unwrap(), 50.0);
    }
}
