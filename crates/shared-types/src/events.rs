//! # Bus Records
//!
//! Binary records published to the message bus, one per write operation.
//! Records are protobuf-encoded; the schema version and record type travel
//! as message headers (see [`RECORD_VERSION`]).

/// Schema version stamped on every published record.
pub const RECORD_VERSION: u32 = 1;

/// A protobuf record that can be published on the bus.
pub trait BusRecord: prost::Message + Default + Clone + PartialEq {
    /// Record type tag, written to the `event-type` header.
    const EVENT_TYPE: &'static str;

    /// Partition key. Records about the same entity share a key so the
    /// broker keeps them ordered.
    fn key(&self) -> &str;
}

macro_rules! bus_record {
    ($ty:ty, $tag:literal) => {
        impl BusRecord for $ty {
            const EVENT_TYPE: &'static str = $tag;

            fn key(&self) -> &str {
                &self.id
            }
        }
    };
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UserCreate {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub email: String,
    #[prost(string, tag = "3")]
    pub username: String,
    #[prost(string, tag = "4")]
    pub password: String,
    #[prost(bool, tag = "5")]
    pub root: bool,
    #[prost(bool, tag = "6")]
    pub active: bool,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UserUpdate {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub email: String,
    #[prost(string, tag = "3")]
    pub username: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UserDelete {
    #[prost(string, tag = "1")]
    pub id: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GroupCreate {
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
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GroupUpdate {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub name: String,
    #[prost(string, tag = "3")]
    pub description: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GroupDelete {
    #[prost(string, tag = "1")]
    pub id: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MembershipCreate {
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
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MembershipUpdate {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(int64, tag = "2")]
    pub status: i64,
    #[prost(int64, tag = "3")]
    pub role: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MembershipDelete {
    #[prost(string, tag = "1")]
    pub id: String,
}

/// Revokes an access token before its natural expiry.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TokenBlacklist {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub access_token: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PasswordUpdate {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub current_password: String,
    #[prost(string, tag = "3")]
    pub new_password: String,
}

bus_record!(UserCreate, "UserCreate");
bus_record!(UserUpdate, "UserUpdate");
bus_record!(UserDelete, "UserDelete");
bus_record!(GroupCreate, "GroupCreate");
bus_record!(GroupUpdate, "GroupUpdate");
bus_record!(GroupDelete, "GroupDelete");
bus_record!(MembershipCreate, "MembershipCreate");
bus_record!(MembershipUpdate, "MembershipUpdate");
bus_record!(MembershipDelete, "MembershipDelete");
bus_record!(TokenBlacklist, "TokenBlacklist");
bus_record!(PasswordUpdate, "PasswordUpdate");
