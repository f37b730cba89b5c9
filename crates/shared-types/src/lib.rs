//! # Shared Types Crate
//!
//! Wire-level definitions shared between the identity gateway and the
//! identity backends.
//!
//! ## Contents
//!
//! - **Enumerations**: roles, session kinds, membership states and
//!   validation kinds, with their numeric wire values.
//! - **Bus records**: one protobuf record per write operation, published by
//!   the gateway and consumed by the command service.
//! - **Query messages**: request/response messages of the query services and
//!   the gRPC method paths they are served under.

pub mod enums;
pub mod events;
pub mod queries;

pub use enums::*;
pub use events::{BusRecord, RECORD_VERSION};
