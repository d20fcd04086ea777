pub mod chat;
pub mod comments;
pub mod engagement;
pub mod error;
