//! Reactions on posts, comments and group posts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Kind of content a reaction points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReactionTargetKind {
    Post,
    Comment,
    GroupPost,
}

impl ReactionTargetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReactionTargetKind::Post => "post",
            ReactionTargetKind::Comment => "comment",
            ReactionTargetKind::GroupPost => "group_post",
        }
    }
}

impl FromStr for ReactionTargetKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "post" => Ok(ReactionTargetKind::Post),
            "comment" => Ok(ReactionTargetKind::Comment),
            "group_post" => Ok(ReactionTargetKind::GroupPost),
            _ => Err(format!("Invalid reaction target: {}", s)),
        }
    }
}

impl fmt::Display for ReactionTargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The content a reaction belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ReactionTarget {
    Post(Uuid),
    Comment(Uuid),
    GroupPost(Uuid),
}

impl ReactionTarget {
    pub fn from_parts(kind: ReactionTargetKind, id: Uuid) -> Self {
        match kind {
            ReactionTargetKind::Post => ReactionTarget::Post(id),
            ReactionTargetKind::Comment => ReactionTarget::Comment(id),
            ReactionTargetKind::GroupPost => ReactionTarget::GroupPost(id),
        }
    }

    pub fn kind(&self) -> ReactionTargetKind {
        match self {
            ReactionTarget::Post(_) => ReactionTargetKind::Post,
            ReactionTarget::Comment(_) => ReactionTargetKind::Comment,
            ReactionTarget::GroupPost(_) => ReactionTargetKind::GroupPost,
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            ReactionTarget::Post(id) | ReactionTarget::Comment(id) | ReactionTarget::GroupPost(id) => {
                *id
            }
        }
    }
}

/// One user's reaction to one piece of content.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Reaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub target: ReactionTarget,
    pub created_at: DateTime<Utc>,
}

impl Reaction {
    pub fn new(user_id: Uuid, target: ReactionTarget) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            target,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_parts() {
        let id = Uuid::new_v4();
        let target = ReactionTarget::from_parts(ReactionTargetKind::GroupPost, id);
        assert_eq!(target, ReactionTarget::GroupPost(id));
        assert_eq!(target.kind(), ReactionTargetKind::GroupPost);
        assert_eq!(target.id(), id);
    }

    #[test]
    fn test_target_serializes_tagged() {
        let json = serde_json::to_value(ReactionTarget::Comment(Uuid::nil())).unwrap();
        assert_eq!(json["kind"], "comment");
        assert_eq!(json["id"], Uuid::nil().to_string());
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!(
            ReactionTargetKind::from_str("group_post").unwrap(),
            ReactionTargetKind::GroupPost
        );
        assert!(ReactionTargetKind::from_str("share").is_err());
    }
}
