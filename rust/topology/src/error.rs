// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for topology construction, attribute lifecycle and the codec.

use std::path::PathBuf;

use crate::keys::{BodyKey, CoEdgeKey, LumpKey, TopologyKey, TopologyType};

/// Result type alias for topology operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an [`Error`].
///
/// Every category is fatal for the operation that produced it; none is ever
/// downgraded to a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Input shape or record breaks a structural invariant.
    MalformedInput,
    /// File header or attribute block carries an unsupported version.
    VersionMismatch,
    /// Index out of bounds, bad magic, truncated or otherwise corrupt bytes.
    Corrupt,
    /// A file handle or stream could not be used.
    Resource,
    /// The caller asked for something the graph does not allow.
    Usage,
}

/// Errors that can occur during topology operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A referenced topology node was not found in the arena.
    #[error("topology node not found: {0:?}")]
    NotFound(TopologyKey),

    /// A loop must have at least one co-edge.
    #[error("loop must have at least one co-edge")]
    EmptyLoop,

    /// A face must own at least one loop.
    #[error("face must own at least one loop")]
    FaceWithoutLoops,

    /// A shell must have at least one face.
    #[error("shell must have at least one face")]
    EmptyShell,

    /// A lump must own at least one shell.
    #[error("lump must own at least one shell")]
    EmptyLump,

    /// Input from the kernel violates a structural invariant.
    #[error("malformed {entity}: {reason}")]
    Malformed {
        entity: TopologyType,
        reason: String,
    },

    /// A co-edge is a single use and cannot join a second loop.
    #[error("co-edge {0:?} already belongs to a loop")]
    CoEdgeInUse(CoEdgeKey),

    /// A lump belongs to exactly one body; detach it first.
    #[error("lump {0:?} already belongs to a body")]
    LumpAlreadyOwned(LumpKey),

    /// Detach was requested for a lump the body does not own.
    #[error("lump {lump:?} is not owned by body {body:?}")]
    LumpNotInBody { lump: LumpKey, body: BodyKey },

    /// Only uniform scaling about the origin is supported on bodies.
    #[error("non-uniform scaling is not supported on bodies")]
    NonUniformScale,

    /// A transform was given a zero-length axis or normal, or a zero scale.
    #[error("degenerate transform: {0}")]
    DegenerateTransform(&'static str),

    /// A typed attribute lost its owner.
    #[error("attribute owner {0:?} no longer exists")]
    OwnerGone(TopologyKey),

    /// A typed attribute was used before being bound to an owner.
    #[error("attribute {0} is not bound to an owner")]
    Unbound(&'static str),

    /// An attribute record does not have the shape its typed wrapper expects.
    #[error("attribute {name}: {reason}")]
    AttributeShape { name: String, reason: String },

    /// File header or attribute block version is not supported.
    #[error("unsupported {block} version {found} (expected {expected}) at byte {offset}")]
    VersionMismatch {
        block: &'static str,
        found: u32,
        expected: u32,
        offset: u64,
    },

    /// A record references an index outside an already-read table.
    #[error(
        "{entity} record {record} references index {index}, but the referenced table has {bound} entries"
    )]
    CorruptIndex {
        entity: TopologyType,
        record: usize,
        index: u32,
        bound: usize,
    },

    /// The byte stream does not describe a valid graph.
    #[error("corrupt {context} at byte {offset}: {reason}")]
    Corrupt {
        context: String,
        offset: u64,
        reason: String,
    },

    /// Reading or writing the stream failed.
    #[error("i/o failure in {context} at byte {offset}: {source}")]
    Stream {
        context: String,
        offset: u64,
        #[source]
        source: std::io::Error,
    },

    /// A file could not be opened, created or flushed.
    #[error("cannot access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Returns the category this error belongs to.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::EmptyLoop
            | Error::FaceWithoutLoops
            | Error::EmptyShell
            | Error::EmptyLump
            | Error::Malformed { .. }
            | Error::AttributeShape { .. } => ErrorCategory::MalformedInput,
            Error::VersionMismatch { .. } => ErrorCategory::VersionMismatch,
            Error::CorruptIndex { .. } | Error::Corrupt { .. } | Error::Serialization(_) => {
                ErrorCategory::Corrupt
            }
            Error::Stream { source, .. } if source.kind() == std::io::ErrorKind::UnexpectedEof => {
                ErrorCategory::Corrupt
            }
            Error::Stream { .. } | Error::Io { .. } => ErrorCategory::Resource,
            Error::NotFound(_)
            | Error::CoEdgeInUse(_)
            | Error::LumpAlreadyOwned(_)
            | Error::LumpNotInBody { .. }
            | Error::NonUniformScale
            | Error::DegenerateTransform(_)
            | Error::OwnerGone(_)
            | Error::Unbound(_) => ErrorCategory::Usage,
        }
    }

    pub(crate) fn malformed(entity: TopologyType, reason: impl Into<String>) -> Self {
        Error::Malformed {
            entity,
            reason: reason.into(),
        }
    }
}
