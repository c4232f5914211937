use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod handlers;
pub mod repo;
pub mod repo_types;
pub mod services;

pub use dto::LoginResponse;
pub use repo_types::{Role, RoleProfile, User};
pub use services::{AuthUser, CurrentUser};

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::auth_routes())
}
