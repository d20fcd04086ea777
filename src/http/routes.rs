use axum::{routing::get, routing::post, Router};

use crate::http::handlers;
use crate::AppState;

pub fn health() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health))
}

pub fn engagement() -> Router<AppState> {
    Router::new()
        .route("/question/:id/like", post(handlers::like_question))
        .route("/question/:id/unlike", post(handlers::unlike_question))
        .route("/note/:id/like", post(handlers::like_note))
        .route("/note/:id/unlike", post(handlers::unlike_note))
        .route("/post/:id/like", post(handlers::like_post))
        .route("/post/:id/unlike", post(handlers::unlike_post))
}

pub fn comments() -> Router<AppState> {
    Router::new()
        .route("/comment", post(handlers::create_comment))
        .route("/comments", get(handlers::list_comments))
        .route("/comment/:id/reply", post(handlers::reply_comment))
        .route(
            "/comment/:id",
            get(handlers::get_comment).delete(handlers::delete_comment),
        )
        .route("/comment/:id/like", post(handlers::like_comment))
        .route("/comment/:id/unlike", post(handlers::unlike_comment))
}

pub fn chat() -> Router<AppState> {
    Router::new()
        .route("/chat", post(handlers::send_message))
        .route("/chat/:id", get(handlers::get_chat_history))
}
