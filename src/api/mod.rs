/*
 * Responsibility
 * - Public surface of the HTTP layer (routes() re-export)
 */
pub mod handlers;
mod routes;

pub use routes::routes;
