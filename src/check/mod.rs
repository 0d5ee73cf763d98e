//! Declared-vs-live DNS reconciliation.
//!
//! # Record groups
//!
//! The declared zone is flattened into groups keyed by `(name, type)`. A group may hold
//! several candidates (weighted or failover variants); it passes when any one candidate
//! matches the live answer set. E.g. with a zone file:
//!
//! ```json
//! {
//!   "hosted_zones": [{
//!     "name": "example.com.",
//!     "records": [
//!       { "name": "www.example.com", "type": "A", "ttl": 300, "values": ["93.184.216.34"] },
//!       { "name": "cdn.example.com", "type": "CNAME", "alias_target": "d123.cloudfront.net" }
//!     ]
//!   }]
//! }
//! ```
//!
//! `www.example.com A` is compared for set equality of normalized values, while
//! `cdn.example.com CNAME` is verified through the CloudFront alias protocol
//! (see [`alias`]).
//!
//! # Wildcards
//!
//! Records whose name contains `*` can't be queried directly; [`probe`] rewrites the
//! wildcard into a concrete randomized probe name per query. Wildcard groups are probed
//! before any literal group so that literal records whose live answers coincide with a
//! covering wildcard's can be flagged (a warning, not a failure — the two are
//! indistinguishable from the resolver's point of view).
//!
//! # TTLs
//!
//! Caches may return a fresher TTL than declared, never a longer one: a group only
//! passes if every observed answer TTL is `<=` the candidate's expected TTL.
//!
//! # Failure containment
//!
//! A DNS query failure (timeout, NXDOMAIN, transport error) fails the affected group and
//! is recorded as a warning; it never aborts the run. [`engine::Checker::run`] processes
//! every declared group exactly once and always returns a complete
//! [`RunReport`][engine::RunReport].

pub mod alias;
pub mod engine;
pub mod normalize;
pub mod probe;
mod validator;

pub use engine::{Checker, RunOptions, RunReport};
