//! REST request and response bodies.
//!
//! Request bodies are validated before anything is dispatched. Response
//! bodies are built from the query service replies.

use crate::domain::error::ApiError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared_types::events::{
    GroupCreate, GroupUpdate, MembershipCreate, MembershipUpdate, UserCreate, UserUpdate,
};
use shared_types::queries::{
    AuthenticateRes, Group, GroupMembership, Membership, SearchGroupRes, SearchRes, User,
    UserMembership, GetGroupMembershipRes, GetUserMembershipRes, ValidateRes,
};
use shared_types::{MembershipStatus, Role};
use thiserror::Error;
use uuid::Uuid;

/// Max length of names, emails, descriptions and usernames.
pub const MAX_TEXT_LEN: usize = 255;
/// Max length of passwords.
pub const MAX_PASSWORD_LEN: usize = 5000;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_SIZE: i64 = 10;
pub const MAX_SIZE: i64 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::bad_request(err.to_string())
    }
}

pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

fn required(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "is required"));
    }
    if value.chars().count() > max {
        return Err(ValidationError::new(field, format!("must be at most {max} characters")));
    }
    Ok(())
}

/// Path id as a UUID.
pub fn parse_id(raw: &str) -> Result<Uuid, ValidationError> {
    Uuid::parse_str(raw).map_err(|_| ValidationError::new("id", "must be a UUID"))
}

// =============================================================================
// Requests
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserDto {
    pub email: String,
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub active: bool,
}

impl Validate for CreateUserDto {
    fn validate(&self) -> Result<(), ValidationError> {
        required("email", &self.email, MAX_TEXT_LEN)?;
        required("username", &self.username, MAX_TEXT_LEN)?;
        required("password", &self.password, MAX_PASSWORD_LEN)
    }
}

impl CreateUserDto {
    pub fn into_record(self, id: Uuid) -> UserCreate {
        UserCreate {
            id: id.to_string(),
            email: self.email,
            username: self.username,
            password: self.password,
            root: false,
            active: self.active,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateUserDto {
    pub email: String,
    pub username: String,
}

impl Validate for UpdateUserDto {
    fn validate(&self) -> Result<(), ValidationError> {
        required("email", &self.email, MAX_TEXT_LEN)?;
        required("username", &self.username, MAX_TEXT_LEN)
    }
}

impl UpdateUserDto {
    pub fn to_record(&self, id: Uuid) -> UserUpdate {
        UserUpdate {
            id: id.to_string(),
            email: self.email.clone(),
            username: self.username.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateGroupDto {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub active: bool,
}

impl Validate for CreateGroupDto {
    fn validate(&self) -> Result<(), ValidationError> {
        required("name", &self.name, MAX_TEXT_LEN)?;
        required("description", &self.description, MAX_TEXT_LEN)
    }
}

impl CreateGroupDto {
    pub fn into_record(self, id: Uuid, creator_id: &str) -> GroupCreate {
        GroupCreate {
            id: id.to_string(),
            name: self.name,
            description: self.description,
            creator_id: creator_id.to_string(),
            active: self.active,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateGroupDto {
    pub name: String,
    pub description: String,
}

impl Validate for UpdateGroupDto {
    fn validate(&self) -> Result<(), ValidationError> {
        required("name", &self.name, MAX_TEXT_LEN)?;
        required("description", &self.description, MAX_TEXT_LEN)
    }
}

impl UpdateGroupDto {
    pub fn to_record(&self, id: Uuid) -> GroupUpdate {
        GroupUpdate {
            id: id.to_string(),
            name: self.name.clone(),
            description: self.description.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateMembershipDto {
    #[serde(rename = "userID")]
    pub user_id: Uuid,
    #[serde(rename = "groupID")]
    pub group_id: Uuid,
    pub status: MembershipStatus,
    pub role: Role,
}

impl Validate for CreateMembershipDto {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.user_id.is_nil() {
            return Err(ValidationError::new("userID", "is required"));
        }
        if self.group_id.is_nil() {
            return Err(ValidationError::new("groupID", "is required"));
        }
        Ok(())
    }
}

impl CreateMembershipDto {
    pub fn into_record(self, id: Uuid) -> MembershipCreate {
        MembershipCreate {
            id: id.to_string(),
            user_id: self.user_id.to_string(),
            group_id: self.group_id.to_string(),
            status: self.status.into(),
            role: self.role.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateMembershipDto {
    pub status: MembershipStatus,
    pub role: Role,
}

/// Status and role are range-checked when the body is parsed.
impl Validate for UpdateMembershipDto {
    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

impl UpdateMembershipDto {
    pub fn to_record(&self, id: Uuid) -> MembershipUpdate {
        MembershipUpdate {
            id: id.to_string(),
            status: self.status.into(),
            role: self.role.into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthenticateDto {
    pub email: String,
    pub password: String,
}

impl Validate for AuthenticateDto {
    fn validate(&self) -> Result<(), ValidationError> {
        required("email", &self.email, MAX_TEXT_LEN)?;
        required("password", &self.password, MAX_PASSWORD_LEN)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordDto {
    pub current_password: String,
    pub new_password: String,
}

impl Validate for UpdatePasswordDto {
    fn validate(&self) -> Result<(), ValidationError> {
        required("currentPassword", &self.current_password, MAX_PASSWORD_LEN)?;
        required("newPassword", &self.new_password, MAX_PASSWORD_LEN)
    }
}

/// `?search=&page=&size=`. Unparsable numbers fall back to the defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub search: String,
    pub page: Option<String>,
    pub size: Option<String>,
}

impl PageQuery {
    pub fn page(&self) -> i64 {
        self.page
            .as_deref()
            .and_then(|p| p.trim().parse::<i64>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(DEFAULT_PAGE)
    }

    pub fn size(&self) -> i64 {
        self.size
            .as_deref()
            .and_then(|s| s.trim().parse::<i64>().ok())
            .filter(|s| *s >= 1)
            .map_or(DEFAULT_SIZE, |s| s.min(MAX_SIZE))
    }
}

// =============================================================================
// Responses
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdResponse {
    pub id: Uuid,
}

fn timestamp(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub username: String,
    pub root: bool,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            username: user.username,
            root: user.root,
            active: user.active,
            created_at: timestamp(user.created_at),
            updated_at: timestamp(user.updated_at),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsersListResponse {
    pub total_count: i64,
    pub total_pages: i64,
    pub page: i64,
    pub size: i64,
    pub has_more: bool,
    pub users: Vec<UserResponse>,
}

impl From<SearchRes> for UsersListResponse {
    fn from(res: SearchRes) -> Self {
        Self {
            total_count: res.total_count,
            total_pages: res.total_pages,
            page: res.page,
            size: res.size,
            has_more: res.has_more,
            users: res.users.into_iter().map(UserResponse::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupResponse {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(rename = "creatorID")]
    pub creator_id: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Group> for GroupResponse {
    fn from(group: Group) -> Self {
        Self {
            id: group.id,
            name: group.name,
            description: group.description,
            creator_id: group.creator_id,
            active: group.active,
            created_at: timestamp(group.created_at),
            updated_at: timestamp(group.updated_at),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupsListResponse {
    pub total_count: i64,
    pub total_pages: i64,
    pub page: i64,
    pub size: i64,
    pub has_more: bool,
    pub groups: Vec<GroupResponse>,
}

impl From<SearchGroupRes> for GroupsListResponse {
    fn from(res: SearchGroupRes) -> Self {
        Self {
            total_count: res.total_count,
            total_pages: res.total_pages,
            page: res.page,
            size: res.size,
            has_more: res.has_more,
            groups: res.groups.into_iter().map(GroupResponse::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipResponse {
    pub id: String,
    #[serde(rename = "userID")]
    pub user_id: String,
    #[serde(rename = "groupID")]
    pub group_id: String,
    pub status: i64,
    pub role: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Membership> for MembershipResponse {
    fn from(m: Membership) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            group_id: m.group_id,
            status: m.status,
            role: m.role,
            created_at: timestamp(m.created_at),
            updated_at: timestamp(m.updated_at),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserMembershipResponse {
    pub id: String,
    #[serde(rename = "groupID")]
    pub group_id: String,
    #[serde(rename = "userID")]
    pub user_id: String,
    #[serde(rename = "membershipID")]
    pub membership_id: String,
    pub email: String,
    pub username: String,
    pub status: i64,
    pub role: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserMembership> for UserMembershipResponse {
    fn from(m: UserMembership) -> Self {
        Self {
            id: m.id,
            group_id: m.group_id,
            user_id: m.user_id,
            membership_id: m.membership_id,
            email: m.email,
            username: m.username,
            status: m.status,
            role: m.role,
            created_at: timestamp(m.created_at),
            updated_at: timestamp(m.updated_at),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserMembershipsListResponse {
    pub total_count: i64,
    pub total_pages: i64,
    pub page: i64,
    pub size: i64,
    pub has_more: bool,
    pub user_memberships: Vec<UserMembershipResponse>,
}

impl From<GetUserMembershipRes> for UserMembershipsListResponse {
    fn from(res: GetUserMembershipRes) -> Self {
        Self {
            total_count: res.total_count,
            total_pages: res.total_pages,
            page: res.page,
            size: res.size,
            has_more: res.has_more,
            user_memberships: res
                .user_memberships
                .into_iter()
                .map(UserMembershipResponse::from)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupMembershipResponse {
    pub id: String,
    #[serde(rename = "userID")]
    pub user_id: String,
    #[serde(rename = "groupID")]
    pub group_id: String,
    #[serde(rename = "membershipID")]
    pub membership_id: String,
    pub name: String,
    pub description: String,
    pub status: i64,
    pub role: i64,
    pub creator: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<GroupMembership> for GroupMembershipResponse {
    fn from(m: GroupMembership) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            group_id: m.group_id,
            membership_id: m.membership_id,
            name: m.name,
            description: m.description,
            status: m.status,
            role: m.role,
            creator: m.creator,
            created_at: timestamp(m.created_at),
            updated_at: timestamp(m.updated_at),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupMembershipsListResponse {
    pub total_count: i64,
    pub total_pages: i64,
    pub page: i64,
    pub size: i64,
    pub has_more: bool,
    pub group_memberships: Vec<GroupMembershipResponse>,
}

impl From<GetGroupMembershipRes> for GroupMembershipsListResponse {
    fn from(res: GetGroupMembershipRes) -> Self {
        Self {
            total_count: res.total_count,
            total_pages: res.total_pages,
            page: res.page,
            size: res.size,
            has_more: res.has_more,
            group_memberships: res
                .group_memberships
                .into_iter()
                .map(GroupMembershipResponse::from)
                .collect(),
        }
    }
}

/// Reply of the authenticate and validate operations.
#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub user: Option<UserResponse>,
    pub status: i64,
}

impl From<AuthenticateRes> for AuthResponse {
    fn from(res: AuthenticateRes) -> Self {
        Self {
            user: res.user.map(UserResponse::from),
            status: res.status,
        }
    }
}

impl From<ValidateRes> for AuthResponse {
    fn from(res: ValidateRes) -> Self {
        Self {
            user: res.user.map(UserResponse::from),
            status: res.status,
        }
    }
}
