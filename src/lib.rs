//! zonecheck
//!
//! Validates that a declared DNS zone configuration matches what public DNS currently
//! resolves to. Run it after a deployment to catch propagation failures, misconfigured
//! aliases, and drift between declared and live state.
//!
//! Expected records are loaded from a JSON [zone file][config::ZoneConfig], flattened
//! into `(name, type)` groups and checked one by one against live DNS: literal values by
//! normalized set equality, [alias records][check::alias] against managed-endpoint
//! verification protocols (ELB, S3 website, [CloudFront]), with TTL-consistency and
//! wildcard-collision checks along the way. The result is a pass/fail report; nothing is
//! ever written to DNS.
//!
//! [CloudFront]: https://docs.aws.amazon.com/AmazonCloudFront/latest/DeveloperGuide/Introduction.html
//!
#![warn(clippy::pedantic)]

pub mod check;
pub mod config;
pub mod error;
pub mod resolver;

pub use check::{Checker, RunOptions, RunReport};
pub use config::{RecordKind, ZoneConfig};
pub use error::Error;
pub use resolver::{LiveResolver, TableResolver};
