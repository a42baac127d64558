use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};

use super::state::AppState;

pub mod auth;
pub mod brands;
pub mod cart;
pub mod categories;
pub mod genders;
pub mod media;
pub mod orders;
pub mod products;
pub mod response;
pub mod reviews;
pub mod search;
pub mod users;

pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/signin", post(auth::signin))
        .route("/api/auth/users", get(users::list))
        .route("/api/products", get(products::list).post(products::create))
        .route(
            "/api/products/{id}",
            get(products::detail)
                .put(products::update)
                .delete(products::remove),
        )
        .route("/api/category/add-category", post(categories::add))
        .route("/api/category/browse-categories", get(categories::list))
        .route("/api/brand/add-brand", post(brands::add))
        .route("/api/brand/browse-brands", get(brands::list))
        .route("/api/gender/add-gender", post(genders::add))
        .route("/api/cart", get(cart::list).post(cart::add))
        .route("/api/cart/{id}", put(cart::update).delete(cart::remove))
        .route("/api/order", post(orders::create))
        .route("/api/review", post(reviews::create))
        .route(
            "/api/review/{id}",
            get(reviews::by_product).delete(reviews::remove),
        )
        .route("/api/media", get(media::list))
        .route(
            "/api/media/upload",
            post(media::upload).layer(DefaultBodyLimit::max(media::MAX_UPLOAD_BYTES)),
        )
        .route("/api/media/delete/{id}", delete(media::remove))
        .route("/api/search", get(search::search))
}
