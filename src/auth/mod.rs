use crate::state::AppState;
use axum::Router;

mod claims;
mod dto;
pub(crate) mod extractors;
pub mod handlers;
pub mod jwt;
mod password;
pub mod repo;
pub mod repo_types;
mod services;
pub(crate) mod validation;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::auth_routes())
        .merge(handlers::me_routes())
}
