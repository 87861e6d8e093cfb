//! Group domain models for parish community groups.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

/// Privacy level of a group. Governs default visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GroupPrivacy {
    Public,
    #[default]
    ParishOnly,
    Private,
    InviteOnly,
}

impl GroupPrivacy {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupPrivacy::Public => "public",
            GroupPrivacy::ParishOnly => "parish_only",
            GroupPrivacy::Private => "private",
            GroupPrivacy::InviteOnly => "invite_only",
        }
    }

    /// Returns true if only active members may see the group.
    pub fn is_members_only(&self) -> bool {
        matches!(self, GroupPrivacy::Private | GroupPrivacy::InviteOnly)
    }
}

impl FromStr for GroupPrivacy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "public" => Ok(GroupPrivacy::Public),
            "parish_only" => Ok(GroupPrivacy::ParishOnly),
            "private" => Ok(GroupPrivacy::Private),
            "invite_only" => Ok(GroupPrivacy::InviteOnly),
            _ => Err(format!("Invalid group privacy: {}", s)),
        }
    }
}

impl fmt::Display for GroupPrivacy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind of community a group represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GroupType {
    Ministry,
    Committee,
    #[default]
    Interest,
    AgeBased,
    Study,
    Service,
    Prayer,
    Social,
}

impl GroupType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupType::Ministry => "ministry",
            GroupType::Committee => "committee",
            GroupType::Interest => "interest",
            GroupType::AgeBased => "age_based",
            GroupType::Study => "study",
            GroupType::Service => "service",
            GroupType::Prayer => "prayer",
            GroupType::Social => "social",
        }
    }
}

impl FromStr for GroupType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ministry" => Ok(GroupType::Ministry),
            "committee" => Ok(GroupType::Committee),
            "interest" => Ok(GroupType::Interest),
            "age_based" => Ok(GroupType::AgeBased),
            "study" => Ok(GroupType::Study),
            "service" => Ok(GroupType::Service),
            "prayer" => Ok(GroupType::Prayer),
            "social" => Ok(GroupType::Social),
            _ => Err(format!("Invalid group type: {}", s)),
        }
    }
}

impl fmt::Display for GroupType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Role within a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupRole {
    Admin,
    Moderator,
    Member,
}

impl GroupRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupRole::Admin => "admin",
            GroupRole::Moderator => "moderator",
            GroupRole::Member => "member",
        }
    }

    /// Returns true if this role can edit group settings
    pub fn can_edit_group(&self) -> bool {
        matches!(self, GroupRole::Admin)
    }

    /// Returns true if this role can invite users and decide join requests
    pub fn can_manage_members(&self) -> bool {
        matches!(self, GroupRole::Admin | GroupRole::Moderator)
    }

    /// Returns true if this role can promote or demote members
    pub fn can_change_roles(&self) -> bool {
        matches!(self, GroupRole::Admin)
    }

    /// Returns true if this role can pin, approve and announce posts
    pub fn can_moderate_content(&self) -> bool {
        matches!(self, GroupRole::Admin | GroupRole::Moderator)
    }

    /// Returns true if this role may remove a member holding `target`.
    pub fn can_remove(&self, target: GroupRole) -> bool {
        match self {
            GroupRole::Admin => true,
            GroupRole::Moderator => target != GroupRole::Admin,
            GroupRole::Member => false,
        }
    }
}

impl FromStr for GroupRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(GroupRole::Admin),
            "moderator" => Ok(GroupRole::Moderator),
            "member" => Ok(GroupRole::Member),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

impl fmt::Display for GroupRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Represents a parish community group.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Group {
    pub id: Uuid,
    pub parish_id: Uuid,
    pub name: String,
    pub description: String,
    pub group_type: GroupType,
    pub privacy: GroupPrivacy,
    pub created_by: Uuid,
    pub is_active: bool,
    pub is_featured: bool,
    pub allow_member_posts: bool,
    pub require_approval: bool,
    pub max_members: Option<i32>,
    pub member_count: i32,
    pub post_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Group {
    /// Returns true if the group has reached its capacity limit.
    pub fn is_full(&self) -> bool {
        self.max_members
            .map(|max| self.member_count >= max)
            .unwrap_or(false)
    }
}

/// Request payload for creating a group.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateGroupRequest {
    /// Target parish. Defaults to the creator's parish.
    pub parish_id: Option<Uuid>,

    #[validate(length(
        min = 1,
        max = 100,
        message = "Name must be between 1 and 100 characters"
    ))]
    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    pub name: String,

    #[validate(length(
        min = 1,
        max = 5000,
        message = "Description must be between 1 and 5000 characters"
    ))]
    pub description: String,

    pub group_type: Option<GroupType>,
    pub privacy: Option<GroupPrivacy>,
    pub require_approval: Option<bool>,
    pub allow_member_posts: Option<bool>,

    #[validate(range(min = 1, message = "Max members must be at least 1"))]
    pub max_members: Option<i32>,
}

/// Request payload for updating a group.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct UpdateGroupRequest {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Name must be between 1 and 100 characters"
    ))]
    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    pub name: Option<String>,

    #[validate(length(
        min = 1,
        max = 5000,
        message = "Description must be between 1 and 5000 characters"
    ))]
    pub description: Option<String>,

    pub group_type: Option<GroupType>,
    pub privacy: Option<GroupPrivacy>,
    pub require_approval: Option<bool>,
    pub allow_member_posts: Option<bool>,

    #[validate(range(min = 1, message = "Max members must be at least 1"))]
    pub max_members: Option<i32>,

    /// Only superusers may change this flag.
    pub is_featured: Option<bool>,
}

impl UpdateGroupRequest {
    /// Applies the requested changes to `group`.
    pub fn apply_to(&self, group: &mut Group) {
        if let Some(name) = &self.name {
            group.name = name.trim().to_string();
        }
        if let Some(description) = &self.description {
            group.description = description.clone();
        }
        if let Some(group_type) = self.group_type {
            group.group_type = group_type;
        }
        if let Some(privacy) = self.privacy {
            group.privacy = privacy;
        }
        if let Some(require_approval) = self.require_approval {
            group.require_approval = require_approval;
        }
        if let Some(allow_member_posts) = self.allow_member_posts {
            group.allow_member_posts = allow_member_posts;
        }
        if let Some(max_members) = self.max_members {
            group.max_members = Some(max_members);
        }
        if let Some(is_featured) = self.is_featured {
            group.is_featured = is_featured;
        }
    }
}

/// Query parameters for listing groups.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ListGroupsQuery {
    pub group_type: Option<GroupType>,
    pub privacy: Option<GroupPrivacy>,
    pub parish_id: Option<Uuid>,
    pub featured: Option<bool>,
    pub search: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Group as seen by a particular actor.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct GroupResponse {
    #[serde(flatten)]
    pub group: Group,
    pub your_role: Option<GroupRole>,
    pub can_join: bool,
}

/// Response for group listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ListGroupsResponse {
    pub data: Vec<Group>,
    pub pagination: shared::pagination::Pagination,
}
