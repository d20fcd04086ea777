use crate::app::error::{ServiceError, ServiceResult};
use crate::domain::subject::SubjectType;
use crate::infra::db::Db;

/// Owns like/unlike facts and the denormalized `like_count` on every
/// subject type. The fact row and the counter are always written inside
/// one transaction; the `FOR UPDATE` lock on the subject row serializes
/// concurrent toggles on the same subject.
#[derive(Clone)]
pub struct EngagementService {
    db: Db,
}

fn lock_subject_sql(subject: SubjectType) -> &'static str {
    match subject {
        SubjectType::Question => "SELECT id FROM questions WHERE id = $1 FOR UPDATE",
        SubjectType::Note => "SELECT id FROM notes WHERE id = $1 FOR UPDATE",
        SubjectType::Post => "SELECT id FROM posts WHERE id = $1 FOR UPDATE",
        SubjectType::Comment => {
            "SELECT id FROM comments WHERE id = $1 AND status = 1 FOR UPDATE"
        }
    }
}

fn increment_count_sql(subject: SubjectType) -> &'static str {
    match subject {
        SubjectType::Question => "UPDATE questions SET like_count = like_count + 1 WHERE id = $1",
        SubjectType::Note => "UPDATE notes SET like_count = like_count + 1 WHERE id = $1",
        SubjectType::Post => "UPDATE posts SET like_count = like_count + 1 WHERE id = $1",
        SubjectType::Comment => "UPDATE comments SET like_count = like_count + 1 WHERE id = $1",
    }
}

// like_count never goes below zero.
fn decrement_count_sql(subject: SubjectType) -> &'static str {
    match subject {
        SubjectType::Question => {
            "UPDATE questions SET like_count = GREATEST(like_count - 1, 0) WHERE id = $1"
        }
        SubjectType::Note => {
            "UPDATE notes SET like_count = GREATEST(like_count - 1, 0) WHERE id = $1"
        }
        SubjectType::Post => {
            "UPDATE posts SET like_count = GREATEST(like_count - 1, 0) WHERE id = $1"
        }
        SubjectType::Comment => {
            "UPDATE comments SET like_count = GREATEST(like_count - 1, 0) WHERE id = $1"
        }
    }
}

fn subject_name(subject: SubjectType) -> &'static str {
    match subject {
        SubjectType::Question => "question",
        SubjectType::Note => "note",
        SubjectType::Post => "post",
        SubjectType::Comment => "comment",
    }
}

impl EngagementService {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    pub async fn like(
        &self,
        subject: SubjectType,
        subject_id: i64,
        user_id: i64,
    ) -> ServiceResult<()> {
        let mut tx = self.db.pool().begin().await?;

        let exists = sqlx::query(lock_subject_sql(subject))
            .bind(subject_id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Err(ServiceError::NotFound(subject_name(subject)));
        }

        let inserted = sqlx::query(
            "INSERT INTO likes (subject_type, subject_id, user_id) VALUES ($1, $2, $3) \
             ON CONFLICT DO NOTHING",
        )
        .bind(subject.as_db())
        .bind(subject_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        if inserted.rows_affected() == 0 {
            // Dropping the transaction rolls back the lock.
            return Err(ServiceError::Conflict("already liked"));
        }

        sqlx::query(increment_count_sql(subject))
            .bind(subject_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }

    pub async fn unlike(
        &self,
        subject: SubjectType,
        subject_id: i64,
        user_id: i64,
    ) -> ServiceResult<()> {
        let mut tx = self.db.pool().begin().await?;

        let exists = sqlx::query(lock_subject_sql(subject))
            .bind(subject_id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Err(ServiceError::NotFound(subject_name(subject)));
        }

        let deleted = sqlx::query(
            "DELETE FROM likes WHERE subject_type = $1 AND subject_id = $2 AND user_id = $3",
        )
        .bind(subject.as_db())
        .bind(subject_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        if deleted.rows_affected() == 0 {
            return Err(ServiceError::Conflict("not liked"));
        }

        sqlx::query(decrement_count_sql(subject))
            .bind(subject_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }
}
