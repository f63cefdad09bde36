//! AWS integration for wharf
//!
//! One driver per managed resource kind (RDS database instance, S3
//! bucket), each exposing an `up` and a `down` operation behind the
//! [`ResourceDriver`] trait. The [`dispatch`] module routes a requested
//! operation and service selector to the right driver. No state is
//! persisted between invocations: existence is always decided by a
//! live describe/head call against the AWS APIs.

pub mod client;
pub mod dispatch;
pub mod driver;
pub mod error;
pub mod rds;
pub mod s3;
pub mod waiter;

// Re-exports
pub use driver::ResourceDriver;
pub use error::{AwsError, Result};
pub use rds::RdsDriver;
pub use s3::S3Driver;
