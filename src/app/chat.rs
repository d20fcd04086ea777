use sqlx::postgres::PgRow;
use sqlx::Row;

use crate::app::error::{ServiceError, ServiceResult};
use crate::domain::chat::{canonical_pair, Conversation, ConversationKind, Message, MessageKind};
use crate::infra::db::Db;

#[derive(Clone)]
pub struct ChatService {
    db: Db,
}

fn message_from_row(row: &PgRow) -> ServiceResult<Message> {
    let kind: String = row.get("kind");
    let kind = MessageKind::from_db(&kind)
        .ok_or_else(|| ServiceError::Validation(format!("unknown message kind: {kind}")))?;

    Ok(Message {
        id: row.get("id"),
        conversation_id: row.get("conversation_id"),
        sender_id: row.get("sender_id"),
        content: row.get("content"),
        kind,
        status: row.get("status"),
        created_at: row.get("created_at"),
    })
}

fn conversation_from_row(row: &PgRow) -> ServiceResult<Conversation> {
    let kind: String = row.get("kind");
    let kind = ConversationKind::from_db(&kind)
        .ok_or_else(|| ServiceError::Validation(format!("unknown conversation kind: {kind}")))?;

    Ok(Conversation {
        id: row.get("id"),
        user_a: row.get("user_a"),
        user_b: row.get("user_b"),
        kind,
        last_message: row.get("last_message"),
        unread_count: row.get("unread_count"),
        created_at: row.get("created_at"),
    })
}

impl ChatService {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Append a message to the conversation between sender and receiver,
    /// creating the conversation on first contact. The pair is stored in
    /// canonical order, so concurrent first contact from both sides
    /// resolves to the same row: the insert loser falls through to the
    /// lookup. Returns the new message id.
    pub async fn send_message(
        &self,
        sender_id: i64,
        receiver_id: i64,
        content: String,
        kind: MessageKind,
    ) -> ServiceResult<i64> {
        if sender_id == receiver_id {
            return Err(ServiceError::Validation(
                "cannot send a message to yourself".into(),
            ));
        }

        let receiver_exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
                .bind(receiver_id)
                .fetch_one(self.db.pool())
                .await?;
        if !receiver_exists {
            return Err(ServiceError::NotFound("user"));
        }

        let (user_a, user_b) = canonical_pair(sender_id, receiver_id);

        let mut tx = self.db.pool().begin().await?;

        sqlx::query(
            "INSERT INTO conversations (user_a, user_b, kind) VALUES ($1, $2, $3) \
             ON CONFLICT DO NOTHING",
        )
        .bind(user_a)
        .bind(user_b)
        .bind(ConversationKind::User.as_db())
        .execute(&mut *tx)
        .await?;

        let conversation_id: i64 = sqlx::query_scalar(
            "SELECT id FROM conversations WHERE user_a = $1 AND user_b = $2 AND kind = $3",
        )
        .bind(user_a)
        .bind(user_b)
        .bind(ConversationKind::User.as_db())
        .fetch_one(&mut *tx)
        .await?;

        let message_id: i64 = sqlx::query_scalar(
            "INSERT INTO messages (conversation_id, sender_id, content, kind) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id",
        )
        .bind(conversation_id)
        .bind(sender_id)
        .bind(&content)
        .bind(kind.as_db())
        .fetch_one(&mut *tx)
        .await?;

        // Full content is stored; truncation is a display concern.
        sqlx::query(
            "UPDATE conversations SET last_message = $2, unread_count = unread_count + 1 \
             WHERE id = $1",
        )
        .bind(conversation_id)
        .bind(&content)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(message_id)
    }

    pub async fn get_conversation(&self, conversation_id: i64) -> ServiceResult<Option<Conversation>> {
        let row = sqlx::query(
            "SELECT id, user_a, user_b, kind, last_message, unread_count, created_at \
             FROM conversations WHERE id = $1",
        )
        .bind(conversation_id)
        .fetch_optional(self.db.pool())
        .await?;

        match row {
            Some(row) => Ok(Some(conversation_from_row(&row)?)),
            None => Ok(None),
        }
    }

    /// Participant-only, reverse-chronological message history with total
    /// count.
    pub async fn get_history(
        &self,
        conversation_id: i64,
        caller_id: i64,
        page: i64,
        page_size: i64,
    ) -> ServiceResult<(Vec<Message>, i64)> {
        let conversation = self
            .get_conversation(conversation_id)
            .await?
            .ok_or(ServiceError::NotFound("conversation"))?;

        if !conversation.has_participant(caller_id) {
            return Err(ServiceError::Forbidden("not a participant"));
        }

        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM messages WHERE conversation_id = $1")
                .bind(conversation_id)
                .fetch_one(self.db.pool())
                .await?;

        let offset = (page - 1) * page_size;
        let rows = sqlx::query(
            "SELECT id, conversation_id, sender_id, content, kind, status, created_at \
             FROM messages \
             WHERE conversation_id = $1 \
             ORDER BY created_at DESC, id DESC \
             LIMIT $2 OFFSET $3",
        )
        .bind(conversation_id)
        .bind(page_size)
        .bind(offset)
        .fetch_all(self.db.pool())
        .await?;

        let mut messages = Vec::with_capacity(rows.len());
        for row in &rows {
            messages.push(message_from_row(row)?);
        }

        Ok((messages, total))
    }
}
