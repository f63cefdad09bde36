//! Provider configuration bag

use serde::{Deserialize, Serialize};

/// All configuration passed from Docker Compose (or a direct caller)
/// into the provider.
///
/// Every field is optional; empty strings mean "not supplied" and the
/// drivers substitute documented defaults. The bag is read-only once it
/// reaches a driver — it is passed by shared reference and never
/// mutated past command-line parsing. Slice-valued fields are pre-split
/// and trimmed by the CLI layer (see `wharf_core::fallback::split_trim`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Options {
    /// Compose project name.
    pub project: String,
    /// Compose service logical name.
    pub name: String,

    /// Service selector: `rds` or `s3`.
    pub service: String,

    // RDS configuration
    pub region: String,
    pub engine: String,
    pub engine_version: String,
    pub instance_class: String,
    /// Allocated storage in GiB; values <= 0 fall back to the default.
    pub allocated_storage: i32,
    pub db_name: String,
    pub username: String,
    pub password: String,

    // RDS networking
    pub subnet_ids: Vec<String>,
    pub security_group_ids: Vec<String>,
    pub publicly_accessible: bool,
    pub multi_az: bool,

    // S3 configuration
    pub bucket_name: String,

    /// When set, missing required fields on `up` become hard errors
    /// instead of reported-but-ignored warnings.
    pub strict: bool,
}
