//! # Query Service Messages
//!
//! Request and response messages of the backend query services, plus the
//! fully qualified gRPC method paths they are served under. Timestamps are
//! Unix seconds.

/// Fully qualified `/package.Service/Method` paths.
pub mod methods {
    pub const GET_USER_BY_ID: &str = "/userQueryService.userQueryService/GetUserById";
    pub const SEARCH_USER: &str = "/userQueryService.userQueryService/SearchUser";

    pub const GET_GROUP_BY_ID: &str = "/groupQueryService.groupQueryService/GetGroupById";
    pub const SEARCH_GROUP: &str = "/groupQueryService.groupQueryService/SearchGroup";

    pub const GET_MEMBERSHIP_BY_ID: &str =
        "/membershipQueryService.membershipQueryService/GetMembershipById";
    /// Users that belong to a group.
    pub const GET_USER_MEMBERSHIP: &str =
        "/membershipQueryService.membershipQueryService/GetUserMembership";
    /// Groups a user belongs to.
    pub const GET_GROUP_MEMBERSHIP: &str =
        "/membershipQueryService.membershipQueryService/GetGroupMembership";

    pub const AUTHENTICATE: &str = "/authQueryService.authQueryService/Authenticate";
    pub const VALIDATE: &str = "/authQueryService.authQueryService/Validate";
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct User {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub email: String,
    #[prost(string, tag = "3")]
    pub username: String,
    #[prost(bool, tag = "4")]
    pub root: bool,
    #[prost(bool, tag = "5")]
    pub active: bool,
    #[prost(int64, tag = "6")]
    pub created_at: i64,
    #[prost(int64, tag = "7")]
    pub updated_at: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetUserByIdReq {
    #[prost(string, tag = "1")]
    pub id: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetUserByIdRes {
    #[prost(message, optional, tag = "1")]
    pub user: Option<User>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SearchReq {
    #[prost(string, tag = "1")]
    pub search: String,
    #[prost(int64, tag = "2")]
    pub page: i64,
    #[prost(int64, tag = "3")]
    pub size: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SearchRes {
    #[prost(int64, tag = "1")]
    pub total_count: i64,
    #[prost(int64, tag = "2")]
    pub total_pages: i64,
    #[prost(int64, tag = "3")]
    pub page: i64,
    #[prost(int64, tag = "4")]
    pub size: i64,
    #[prost(bool, tag = "5")]
    pub has_more: bool,
    #[prost(message, repeated, tag = "6")]
    pub users: Vec<User>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Group {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub name: String,
    #[prost(string, tag = "3")]
    pub description: String,
    #[prost(string, tag = "4")]
    pub creator_id: String,
    #[prost(bool, tag = "5")]
    pub active: bool,
    #[prost(int64, tag = "6")]
    pub created_at: i64,
    #[prost(int64, tag = "7")]
    pub updated_at: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetGroupByIdReq {
    #[prost(string, tag = "1")]
    pub id: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetGroupByIdRes {
    #[prost(message, optional, tag = "1")]
    pub group: Option<Group>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SearchGroupReq {
    #[prost(string, tag = "1")]
    pub search: String,
    #[prost(int64, tag = "2")]
    pub page: i64,
    #[prost(int64, tag = "3")]
    pub size: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SearchGroupRes {
    #[prost(int64, tag = "1")]
    pub total_count: i64,
    #[prost(int64, tag = "2")]
    pub total_pages: i64,
    #[prost(int64, tag = "3")]
    pub page: i64,
    #[prost(int64, tag = "4")]
    pub size: i64,
    #[prost(bool, tag = "5")]
    pub has_more: bool,
    #[prost(message, repeated, tag = "6")]
    pub groups: Vec<Group>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Membership {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub user_id: String,
    #[prost(string, tag = "3")]
    pub group_id: String,
    #[prost(int64, tag = "4")]
    pub status: i64,
    #[prost(int64, tag = "5")]
    pub role: i64,
    #[prost(int64, tag = "6")]
    pub created_at: i64,
    #[prost(int64, tag = "7")]
    pub updated_at: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetMembershipByIdReq {
    #[prost(string, tag = "1")]
    pub id: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetMembershipByIdRes {
    #[prost(message, optional, tag = "1")]
    pub membership: Option<Membership>,
}

/// A user as seen from one of their groups.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UserMembership {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub group_id: String,
    #[prost(string, tag = "3")]
    pub user_id: String,
    #[prost(string, tag = "4")]
    pub membership_id: String,
    #[prost(string, tag = "5")]
    pub email: String,
    #[prost(string, tag = "6")]
    pub username: String,
    #[prost(int64, tag = "7")]
    pub status: i64,
    #[prost(int64, tag = "8")]
    pub role: i64,
    #[prost(int64, tag = "9")]
    pub created_at: i64,
    #[prost(int64, tag = "10")]
    pub updated_at: i64,
}

/// A group as seen from one of its members.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GroupMembership {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub user_id: String,
    #[prost(string, tag = "3")]
    pub group_id: String,
    #[prost(string, tag = "4")]
    pub membership_id: String,
    #[prost(string, tag = "5")]
    pub name: String,
    #[prost(string, tag = "6")]
    pub description: String,
    #[prost(int64, tag = "7")]
    pub status: i64,
    #[prost(int64, tag = "8")]
    pub role: i64,
    #[prost(bool, tag = "9")]
    pub creator: bool,
    #[prost(int64, tag = "10")]
    pub created_at: i64,
    #[prost(int64, tag = "11")]
    pub updated_at: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetUserMembershipReq {
    #[prost(string, tag = "1")]
    pub group_id: String,
    #[prost(int64, tag = "2")]
    pub page: i64,
    #[prost(int64, tag = "3")]
    pub size: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetUserMembershipRes {
    #[prost(int64, tag = "1")]
    pub total_count: i64,
    #[prost(int64, tag = "2")]
    pub total_pages: i64,
    #[prost(int64, tag = "3")]
    pub page: i64,
    #[prost(int64, tag = "4")]
    pub size: i64,
    #[prost(bool, tag = "5")]
    pub has_more: bool,
    #[prost(message, repeated, tag = "6")]
    pub user_memberships: Vec<UserMembership>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetGroupMembershipReq {
    #[prost(string, tag = "1")]
    pub user_id: String,
    #[prost(int64, tag = "2")]
    pub page: i64,
    #[prost(int64, tag = "3")]
    pub size: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetGroupMembershipRes {
    #[prost(int64, tag = "1")]
    pub total_count: i64,
    #[prost(int64, tag = "2")]
    pub total_pages: i64,
    #[prost(int64, tag = "3")]
    pub page: i64,
    #[prost(int64, tag = "4")]
    pub size: i64,
    #[prost(bool, tag = "5")]
    pub has_more: bool,
    #[prost(message, repeated, tag = "6")]
    pub group_memberships: Vec<GroupMembership>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AuthenticateReq {
    #[prost(string, tag = "1")]
    pub email: String,
    #[prost(string, tag = "2")]
    pub password: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AuthenticateRes {
    #[prost(message, optional, tag = "1")]
    pub user: Option<User>,
    #[prost(int64, tag = "2")]
    pub status: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ValidateReq {
    #[prost(string, tag = "1")]
    pub user_id: String,
    #[prost(string, tag = "2")]
    pub access_token: String,
    #[prost(int64, tag = "3")]
    pub validation_type: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ValidateRes {
    #[prost(message, optional, tag = "1")]
    pub user: Option<User>,
    #[prost(int64, tag = "2")]
    pub status: i64,
}
