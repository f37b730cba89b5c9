//! Read operations.
//!
//! A query is a backend request message bound to its RPC method, its reply
//! type and the service that answers it.

use crate::rpc::transport::QueryService;
use prost::Message;
use shared_types::queries::{
    methods, AuthenticateReq, AuthenticateRes, GetGroupByIdReq, GetGroupByIdRes,
    GetGroupMembershipReq, GetGroupMembershipRes, GetMembershipByIdReq, GetMembershipByIdRes,
    GetUserByIdReq, GetUserByIdRes, GetUserMembershipReq, GetUserMembershipRes, SearchGroupReq,
    SearchGroupRes, SearchReq, SearchRes, ValidateReq, ValidateRes,
};

pub trait Query: Message + Send + Sync {
    type Response: Message + Default + Send;

    /// Fully qualified method path.
    const METHOD: &'static str;
    const SERVICE: QueryService;
}

macro_rules! query {
    ($($req:ty => $res:ty, $method:path, $service:ident;)+) => {
        $(
            impl Query for $req {
                type Response = $res;
                const METHOD: &'static str = $method;
                const SERVICE: QueryService = QueryService::$service;
            }
        )+
    };
}

query! {
    GetUserByIdReq => GetUserByIdRes, methods::GET_USER_BY_ID, Users;
    SearchReq => SearchRes, methods::SEARCH_USER, Users;
    GetGroupByIdReq => GetGroupByIdRes, methods::GET_GROUP_BY_ID, Groups;
    SearchGroupReq => SearchGroupRes, methods::SEARCH_GROUP, Groups;
    GetMembershipByIdReq => GetMembershipByIdRes, methods::GET_MEMBERSHIP_BY_ID, Memberships;
    GetUserMembershipReq => GetUserMembershipRes, methods::GET_USER_MEMBERSHIP, Memberships;
    GetGroupMembershipReq => GetGroupMembershipRes, methods::GET_GROUP_MEMBERSHIP, Memberships;
    AuthenticateReq => AuthenticateRes, methods::AUTHENTICATE, Auth;
    ValidateReq => ValidateRes, methods::VALIDATE, Auth;
}
