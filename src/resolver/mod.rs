//! The DNS query capability.
//!
//! The [check engine][crate::check] treats "query(name, type) → answers, or failure" as a
//! provided capability behind the [`DnsQuery`] trait.
//!
//! Two implementations are provided, [`live::LiveResolver`] and [`table::TableResolver`].
//! The former issues real queries through the host's resolver configuration (or a public
//! fallback). The latter serves answers from a fixed in-memory table and records every
//! query it sees; tests and offline dry-runs use it so live DNS is never consulted.

use crate::config::RecordKind;
use crate::error::Error;

pub mod live;
pub mod table;

#[allow(clippy::module_name_repetitions)]
pub use live::LiveResolver;
#[allow(clippy::module_name_repetitions)]
pub use table::TableResolver;

/// One answer returned by a DNS query: the rendered record value and its remaining TTL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub value: String,
    pub ttl: u32,
}

impl Answer {
    #[must_use]
    pub fn new(value: impl Into<String>, ttl: u32) -> Self {
        Answer {
            value: value.into(),
            ttl,
        }
    }
}

/// An async trait describing the one-shot DNS query capability: resolve `name` with the
/// given record type, returning the ordered answer list.
///
/// A failed query (timeout, NXDOMAIN-class response, transport error) returns
/// [`Error::Resolve`] with a descriptive message; callers convert it into warnings and
/// failed outcomes rather than aborting a run.
#[async_trait::async_trait]
pub trait DnsQuery: Send + Sync {
    async fn query(&self, name: &str, kind: RecordKind) -> Result<Vec<Answer>, Error>;
}
