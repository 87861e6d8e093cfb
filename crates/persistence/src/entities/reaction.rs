//! Reaction entity (database row mapping).

use domain::models::ReactionTargetKind;

/// Database enum for reaction_target_kind that maps to PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "reaction_target_kind", rename_all = "snake_case")]
pub enum ReactionTargetKindDb {
    Post,
    Comment,
    GroupPost,
}

impl From<ReactionTargetKind> for ReactionTargetKindDb {
    fn from(kind: ReactionTargetKind) -> Self {
        match kind {
            ReactionTargetKind::Post => ReactionTargetKindDb::Post,
            ReactionTargetKind::Comment => ReactionTargetKindDb::Comment,
            ReactionTargetKind::GroupPost => ReactionTargetKindDb::GroupPost,
        }
    }
}

impl From<ReactionTargetKindDb> for ReactionTargetKind {
    fn from(db: ReactionTargetKindDb) -> Self {
        match db {
            ReactionTargetKindDb::Post => ReactionTargetKind::Post,
            ReactionTargetKindDb::Comment => ReactionTargetKind::Comment,
            ReactionTargetKindDb::GroupPost => ReactionTargetKind::GroupPost,
        }
    }
}
