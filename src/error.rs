//! Error types.

use crate::config::RecordKind;
use trust_dns_resolver::error::ResolveError;

/// Error enumerates the possible zonecheck error states.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Returned when a declared record in the [zone file][crate::config::ZoneConfig] sets both
    /// `values` and `alias_target`, or neither. Exactly one must be present.
    #[error("record \"{0}\" {1} must declare exactly one of values or alias_target")]
    InvalidRecord(String, RecordKind),

    /// Returned when a DNS query fails: timeout, NXDOMAIN-class responses, or a transport
    /// error. A query failure never aborts a run; the [check engine][crate::check] converts
    /// it into a warning plus a failed outcome for the affected record group.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Returned when a generic IO error occurs.
    #[error("an IO error occurred")]
    IO(#[from] std::io::Error),

    /// Returned when the zone file content is not valid JSON (e.g. while
    /// [trying to load a `ZoneConfig`][crate::config::ZoneConfig::try_from_file]).
    #[error("invalid JSON")]
    InvalidJSON(#[from] serde_json::Error),
}
