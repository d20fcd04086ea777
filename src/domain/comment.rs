use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::domain::subject::SubjectType;

/// A comment attached to any subject type. `parent_id` is set on replies;
/// nesting is capped at one level, so a parent is always top-level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub target_type: SubjectType,
    pub target_id: i64,
    pub author_id: i64,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
    pub like_count: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}
