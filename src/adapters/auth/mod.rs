//! Identity adapters.
//!
//! Implementations of the `IdentityProvider` port:
//!
//! - `grpc` - client for the SSO service (`proto/sso.proto`)
//! - `mock` - in-memory accounts and tokens for tests

mod grpc;
mod mock;
pub mod proto;

pub use grpc::GrpcIdentityProvider;
pub use mock::MockIdentityProvider;
