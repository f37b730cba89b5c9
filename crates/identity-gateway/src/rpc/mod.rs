//! Outbound RPC to the query services.

pub mod codec;
pub mod transport;

pub use codec::RawCodec;
pub use transport::{
    call, interrupted, GrpcTransport, QueryService, QueryTransport, QueryTransports,
};
