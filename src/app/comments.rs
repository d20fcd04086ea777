use sqlx::postgres::PgRow;
use sqlx::Row;

use crate::app::error::{ServiceError, ServiceResult};
use crate::domain::comment::Comment;
use crate::domain::subject::SubjectType;
use crate::infra::db::Db;

const COMMENT_COLUMNS: &str =
    "id, target_type, target_id, author_id, content, parent_id, like_count, created_at";

#[derive(Clone)]
pub struct CommentService {
    db: Db,
}

fn target_exists_sql(target: SubjectType) -> &'static str {
    match target {
        SubjectType::Question => "SELECT EXISTS (SELECT 1 FROM questions WHERE id = $1)",
        SubjectType::Note => "SELECT EXISTS (SELECT 1 FROM notes WHERE id = $1)",
        SubjectType::Post => "SELECT EXISTS (SELECT 1 FROM posts WHERE id = $1)",
        SubjectType::Comment => {
            "SELECT EXISTS (SELECT 1 FROM comments WHERE id = $1 AND status = 1)"
        }
    }
}

fn comment_from_row(row: &PgRow) -> ServiceResult<Comment> {
    let target_type: String = row.get("target_type");
    let target_type = SubjectType::from_db(&target_type)
        .ok_or_else(|| ServiceError::Validation(format!("unknown target type: {target_type}")))?;

    Ok(Comment {
        id: row.get("id"),
        target_type,
        target_id: row.get("target_id"),
        author_id: row.get("author_id"),
        content: row.get("content"),
        parent_id: row.get("parent_id"),
        like_count: row.get("like_count"),
        created_at: row.get("created_at"),
    })
}

impl CommentService {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Create a top-level comment, or a reply when `parent_id` is given.
    /// Replies inherit the parent's target regardless of what the caller
    /// supplied.
    pub async fn create(
        &self,
        author_id: i64,
        target_type: SubjectType,
        target_id: i64,
        content: String,
        parent_id: Option<i64>,
    ) -> ServiceResult<Comment> {
        if let Some(parent_id) = parent_id {
            return self.reply(author_id, parent_id, content).await;
        }

        let exists: bool = sqlx::query_scalar(target_exists_sql(target_type))
            .bind(target_id)
            .fetch_one(self.db.pool())
            .await?;
        if !exists {
            return Err(ServiceError::NotFound("target"));
        }

        let row = sqlx::query(&format!(
            "INSERT INTO comments (target_type, target_id, author_id, content) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COMMENT_COLUMNS}",
        ))
        .bind(target_type.as_db())
        .bind(target_id)
        .bind(author_id)
        .bind(content)
        .fetch_one(self.db.pool())
        .await?;

        comment_from_row(&row)
    }

    /// Reply to a top-level comment. Nesting depth is capped at one:
    /// replying to a reply is rejected.
    pub async fn reply(
        &self,
        author_id: i64,
        parent_id: i64,
        content: String,
    ) -> ServiceResult<Comment> {
        let parent = sqlx::query(
            "SELECT target_type, target_id, parent_id FROM comments \
             WHERE id = $1 AND status = 1",
        )
        .bind(parent_id)
        .fetch_optional(self.db.pool())
        .await?;

        let Some(parent) = parent else {
            return Err(ServiceError::NotFound("comment"));
        };

        let parent_parent: Option<i64> = parent.get("parent_id");
        if parent_parent.is_some() {
            return Err(ServiceError::Validation(
                "replies cannot be nested more than one level".into(),
            ));
        }

        let target_type: String = parent.get("target_type");
        let target_id: i64 = parent.get("target_id");

        let row = sqlx::query(&format!(
            "INSERT INTO comments (target_type, target_id, author_id, content, parent_id) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COMMENT_COLUMNS}",
        ))
        .bind(&target_type)
        .bind(target_id)
        .bind(author_id)
        .bind(content)
        .bind(parent_id)
        .fetch_one(self.db.pool())
        .await?;

        comment_from_row(&row)
    }

    /// Fetch a single active comment by id.
    pub async fn get(&self, comment_id: i64) -> ServiceResult<Comment> {
        let row = sqlx::query(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE id = $1 AND status = 1",
        ))
        .bind(comment_id)
        .fetch_optional(self.db.pool())
        .await?;

        let Some(row) = row else {
            return Err(ServiceError::NotFound("comment"));
        };

        comment_from_row(&row)
    }

    /// One flat reverse-chronological page of active comments (top-level
    /// and replies mixed), plus the total active count for the target.
    pub async fn list(
        &self,
        target_type: SubjectType,
        target_id: i64,
        page: i64,
        page_size: i64,
    ) -> ServiceResult<(Vec<Comment>, i64)> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM comments \
             WHERE target_type = $1 AND target_id = $2 AND status = 1",
        )
        .bind(target_type.as_db())
        .bind(target_id)
        .fetch_one(self.db.pool())
        .await?;

        let offset = (page - 1) * page_size;
        let rows = sqlx::query(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments \
             WHERE target_type = $1 AND target_id = $2 AND status = 1 \
             ORDER BY created_at DESC, id DESC \
             LIMIT $3 OFFSET $4",
        ))
        .bind(target_type.as_db())
        .bind(target_id)
        .bind(page_size)
        .bind(offset)
        .fetch_all(self.db.pool())
        .await?;

        let mut comments = Vec::with_capacity(rows.len());
        for row in &rows {
            comments.push(comment_from_row(row)?);
        }

        Ok((comments, total))
    }

    /// Author-only soft delete. Replies under a deleted parent stay
    /// visible.
    pub async fn delete(&self, comment_id: i64, caller_id: i64) -> ServiceResult<()> {
        let row = sqlx::query("SELECT author_id FROM comments WHERE id = $1 AND status = 1")
            .bind(comment_id)
            .fetch_optional(self.db.pool())
            .await?;

        let Some(row) = row else {
            return Err(ServiceError::NotFound("comment"));
        };

        let author_id: i64 = row.get("author_id");
        if author_id != caller_id {
            return Err(ServiceError::Forbidden("not the comment author"));
        }

        sqlx::query("UPDATE comments SET status = 0 WHERE id = $1")
            .bind(comment_id)
            .execute(self.db.pool())
            .await?;

        Ok(())
    }
}
