//! Read-only access to classic Mac OS resource forks.
//!
//! A fork is opened over any [`ByteSource`], its redundant header is
//! validated up front, and the resource map is materialized once on first
//! request. Payloads are only copied out of the source when a
//! [`ResourceEntry`] is explicitly read.

mod fork;
mod mac_roman;
mod resource;
mod source;

pub use fork::{ForkHeader, ResourceFork, ResourceMap, TypeBucket};
pub use mac_roman::{decode_mac_roman, encode_mac_roman};
pub use resource::{ResType, Resource, ResourceEntry};
pub use source::{ByteSource, FileSource, Window, NAMED_FORK_SUFFIX};

use thiserror::Error;

/// Error type for resource fork parsing.
#[derive(Debug, Error)]
pub enum ForkError {
    /// The 16-byte header does not match its copy at the start of the map.
    #[error("not a resource fork: header copy at map offset {map_offset:#x} does not match")]
    InvalidHeader { map_offset: u32 },
    /// Two entries in the type list share the same four-byte code.
    #[error("duplicate resource type {0}")]
    DuplicateResourceType(ResType),
    /// A resource's declared length runs past the end of the source.
    #[error("resource {res_type} #{id} declares {declared} bytes but only {available} are present")]
    TruncatedResource {
        res_type: ResType,
        id: i16,
        declared: u32,
        available: u64,
    },
    /// Underlying byte source failure (including reads past the end).
    #[error("byte source: {0}")]
    Io(#[from] std::io::Error),
}
