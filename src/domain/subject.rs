use serde::{Deserialize, Serialize};

/// A content type that can receive likes and comments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubjectType {
    Question,
    Note,
    Post,
    Comment,
}

impl SubjectType {
    pub fn from_db(value: &str) -> Option<Self> {
        match value {
            "question" => Some(Self::Question),
            "note" => Some(Self::Note),
            "post" => Some(Self::Post),
            "comment" => Some(Self::Comment),
            _ => None,
        }
    }

    pub fn as_db(&self) -> &'static str {
        match self {
            Self::Question => "question",
            Self::Note => "note",
            Self::Post => "post",
            Self::Comment => "comment",
        }
    }
}
