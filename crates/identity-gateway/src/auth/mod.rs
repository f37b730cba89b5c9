//! Session tokens, the route access table and the authorization decision.

pub mod access;
pub mod authenticator;
pub mod session;

pub use access::{http_route_key, rpc_route_key, AccessControlTable, AccessControlTableBuilder};
pub use authenticator::{bearer_token, AuthError, Authenticator, AUTHORIZATION};
pub use session::{LifetimePolicy, Session, SessionCodec, SessionError};
