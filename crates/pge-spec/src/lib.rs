//! PGE Specification Documents
//!
//! Turns the parameters declared by a notebook into the two documents a HySDS
//! cluster needs to run it as a job.
//!
//! # Core Concepts
//!
//! - [`ParameterDescriptor`]: one declared notebook parameter, default kept as source text
//! - [`ParameterValue`]: best-effort decoded default (closed JSON-like union)
//! - [`CanonicalType`]: closed set of hysds-io type tags, see [`map_type`]
//! - [`SystemSpecSet`]: `hysds_`-prefixed parameters that configure the job itself
//! - [`IoSpecDocument`]: submitter-facing `hysds-io.json`
//! - [`JobSpecDocument`]: scheduler-facing `job-spec.json`
//!
//! # Pipeline
//!
//! ```text
//! ParameterMap ──partition──► SystemSpecSet ─┐
//!       │                                    ├─► JobSpecBuilder ──► JobSpecDocument
//!       └──────────────► user parameters ────┤
//!                                            └─► build_io_spec  ──► IoSpecDocument
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use pge_spec::{build_io_spec, partition, JobSpecBuilder};
//!
//! let (system, user) = partition(&parameters);
//! let io = build_io_spec(&user, Some("individual"), None)?;
//! let job = JobSpecBuilder::from_system_specs("notebook_pges/hello.ipynb", &system)
//!     .build(&user)?;
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod error;
pub mod io_spec;
pub mod job_spec;
pub mod parameter;
pub mod reserved;
pub mod types;
pub mod value;

pub use error::{SpecError, SpecResult};
pub use io_spec::{build_io_spec, IoParam, IoSpecDocument, ParamSource, SubmissionType, COMPONENT};
pub use job_spec::{
    build_job_spec, JobParam, JobSpecBuilder, JobSpecDocument, ParamDestination,
    DEFAULT_DISK_USAGE, DEFAULT_SOFT_TIME_LIMIT, DEFAULT_TIME_LIMIT,
};
pub use parameter::{is_reserved, ParameterDescriptor, ParameterMap, RESERVED_PREFIX};
pub use reserved::{extract, partition, SystemSpecSet};
pub use types::{map_type, CanonicalType};
pub use value::{decode_default, decode_or_text, ParameterValue};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Serialize a document the way it is written to disk
///
/// Two-space indentation with a trailing newline. Field order is fixed by the
/// document structs, so identical inputs always yield identical bytes.
///
/// # Errors
/// Returns error if the document cannot be represented as JSON
pub fn to_pretty_json<T: serde::Serialize>(document: &T) -> SpecResult<String> {
    let mut out = serde_json::to_string_pretty(document)?;
    out.push('\n');
    Ok(out)
}
