pub mod chat;
pub mod comment;
pub mod subject;

