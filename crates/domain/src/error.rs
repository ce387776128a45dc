//! Error taxonomy shared across the workspace.
//!
//! Each layer defines its own typed errors and converts into [`BridgeError`]
//! via `#[from]` at the port boundary.

use crate::facet::FacetKind;

/// Top-level error crossing port boundaries.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// The hub could not be reached or answered with an error.
    #[error("hub error")]
    Hub(#[from] HubError),

    /// A read was requested for a facet kind with no registered resolver.
    #[error("no resolver registered for facet {0}")]
    NoResolver(FacetKind),

    /// A domain invariant was violated.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// The requested accessory, capability or facet does not exist.
    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// A resolver could not turn its input into a value or command.
    #[error("resolver error")]
    Resolver(#[from] ResolverError),

    /// Failure inside a persistence adapter.
    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Failures talking to the hub.
#[derive(Debug, thiserror::Error)]
pub enum HubError {
    /// The hub is unreachable or the connection broke.
    #[error("hub unreachable")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The hub answered with a non-success status code.
    #[error("hub answered with status {0}")]
    Status(u16),

    /// The delta cursor is expired or unknown to the hub.
    #[error("refresh cursor {0} is expired or invalid")]
    ExpiredCursor(u64),

    /// The hub answered with a body that could not be decoded.
    #[error("malformed hub payload")]
    Decode(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl HubError {
    /// Whether this error asks the poller to resynchronize from cursor `0`.
    #[must_use]
    pub fn is_expired_cursor(&self) -> bool {
        matches!(self, Self::ExpiredCursor(_))
    }
}

/// Domain validation failures.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// A required name was empty.
    #[error("name must not be empty")]
    EmptyName,

    /// A capability subtype string does not have the expected shape.
    #[error("malformed capability subtype {0:?}")]
    MalformedSubtype(String),

    /// An unknown facet kind name was supplied.
    #[error("unknown facet kind {0:?}")]
    UnknownFacet(String),

    /// An unknown capability kind name was supplied.
    #[error("unknown capability kind {0:?}")]
    UnknownCapability(String),

    /// The security variable holds a state the engine does not know.
    #[error("unknown security state {0:?}")]
    UnknownSecurityState(String),

    /// A temperature unit other than `C` or `F`.
    #[error("unknown temperature unit {0:?}")]
    UnknownTemperatureUnit(String),

    /// A written value has the wrong shape for its facet.
    #[error("invalid value for facet {facet}: {reason}")]
    InvalidValue {
        /// Facet being written.
        facet: FacetKind,
        /// What was wrong with it.
        reason: &'static str,
    },
}

/// A lookup that found nothing.
#[derive(Debug, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    /// What kind of thing was looked up (e.g. `"Accessory"`).
    pub entity: &'static str,
    /// The identifier that was searched for.
    pub id: String,
}

/// A resolver rejected its input.
#[derive(Debug, thiserror::Error)]
pub enum ResolverError {
    /// The snapshot lacks the property the resolver needs.
    #[error("property {0:?} missing from snapshot")]
    MissingProperty(&'static str),

    /// The value has the wrong type for the facet.
    #[error("unexpected value for facet {facet}: {value}")]
    UnexpectedValue {
        /// Facet being resolved.
        facet: FacetKind,
        /// Offending value rendered as JSON.
        value: String,
    },
}
