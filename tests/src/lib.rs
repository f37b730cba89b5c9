//! # Identity Gateway Test Suite
//!
//! End-to-end scenarios that drive the REST router, the mediator and the RPC
//! interceptors together, with an in-memory bus and scripted query backends.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── fixtures.rs       # Gateway harness, scripted backend, tokens
//!     ├── auth_flows.rs     # 401/403 paths, login, token revocation
//!     ├── command_flows.rs  # Writes reaching the bus
//!     └── query_flows.rs    # Reads, retries, trace propagation
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p gateway-tests
//! cargo test -p gateway-tests integration::query_flows::
//! ```

pub mod integration;
