/*
 * Responsibility
 * - URL structure: a single route, / for every method
 */
use axum::{Router, routing::any};

use crate::api::handlers::home::home;

pub fn routes() -> Router {
    Router::new().route("/", any(home))
}
