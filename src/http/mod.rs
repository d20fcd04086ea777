use axum::Router;

use crate::AppState;

mod auth;
mod error;
mod handlers;
mod routes;

pub use auth::AuthUser;
pub use error::AppError;

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .merge(routes::engagement())
        .merge(routes::comments())
        .merge(routes::chat());

    Router::new()
        .merge(routes::health())
        .nest("/api/v1", api)
        .with_state(state)
}
