//! Write operations.
//!
//! A command is a bus record tagged with the operation it performs. The
//! operation selects the topic; the record is the payload.

use crate::domain::config::TopicsConfig;
use shared_types::events::{
    GroupCreate, GroupDelete, GroupUpdate, MembershipCreate, MembershipDelete, MembershipUpdate,
    PasswordUpdate, TokenBlacklist, UserCreate, UserDelete, UserUpdate,
};
use shared_types::BusRecord;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    UserCreate,
    UserUpdate,
    UserDelete,
    GroupCreate,
    GroupUpdate,
    GroupDelete,
    MembershipCreate,
    MembershipUpdate,
    MembershipDelete,
    TokenBlacklist,
    PasswordUpdate,
}

impl CommandKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandKind::UserCreate => "user_create",
            CommandKind::UserUpdate => "user_update",
            CommandKind::UserDelete => "user_delete",
            CommandKind::GroupCreate => "group_create",
            CommandKind::GroupUpdate => "group_update",
            CommandKind::GroupDelete => "group_delete",
            CommandKind::MembershipCreate => "membership_create",
            CommandKind::MembershipUpdate => "membership_update",
            CommandKind::MembershipDelete => "membership_delete",
            CommandKind::TokenBlacklist => "token_blacklist",
            CommandKind::PasswordUpdate => "password_update",
        }
    }

    /// Configured topic for this operation.
    pub fn topic<'a>(&self, topics: &'a TopicsConfig) -> &'a str {
        match self {
            CommandKind::UserCreate => &topics.user_create,
            CommandKind::UserUpdate => &topics.user_update,
            CommandKind::UserDelete => &topics.user_delete,
            CommandKind::GroupCreate => &topics.group_create,
            CommandKind::GroupUpdate => &topics.group_update,
            CommandKind::GroupDelete => &topics.group_delete,
            CommandKind::MembershipCreate => &topics.membership_create,
            CommandKind::MembershipUpdate => &topics.membership_update,
            CommandKind::MembershipDelete => &topics.membership_delete,
            CommandKind::TokenBlacklist => &topics.token_blacklist,
            CommandKind::PasswordUpdate => &topics.password_update,
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A bus record that is published as one write operation.
pub trait Command: BusRecord + Send + Sync {
    const KIND: CommandKind;
}

macro_rules! command {
    ($($ty:ident),+ $(,)?) => {
        $(
            impl Command for $ty {
                const KIND: CommandKind = CommandKind::$ty;
            }
        )+
    };
}

command!(
    UserCreate,
    UserUpdate,
    UserDelete,
    GroupCreate,
    GroupUpdate,
    GroupDelete,
    MembershipCreate,
    MembershipUpdate,
    MembershipDelete,
    TokenBlacklist,
    PasswordUpdate,
);
