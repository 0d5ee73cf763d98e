//! A fixed-table implementation of the [`DnsQuery`][super::DnsQuery] trait.
//!
//! Serves answers from an in-memory `(name, type)` table instead of the network. Entries
//! whose name contains a wildcard label match any probe name the wildcard expands to, so
//! wildcard records can be exercised without knowing the randomized probe suffix. Every
//! query is appended to a call log that tests can inspect for ordering and retry counts.

use crate::check::probe::wildcard_match;
use crate::config::RecordKind;
use crate::error::Error;
use crate::resolver::{Answer, DnsQuery};
use std::sync::Mutex;
use trust_dns_resolver::error::{ResolveError, ResolveErrorKind};

struct TableEntry {
    name: String,
    kind: RecordKind,
    outcome: Result<Vec<Answer>, String>,
}

/// An in-memory [`DnsQuery`] implementation with deterministic answers.
#[derive(Default)]
#[allow(clippy::module_name_repetitions)]
pub struct TableResolver {
    entries: Vec<TableEntry>,
    log: Mutex<Vec<(String, RecordKind)>>,
}

impl TableResolver {
    #[must_use]
    pub fn new() -> Self {
        TableResolver::default()
    }

    /// Serve the given answers for queries matching `name` and `kind`.
    #[must_use]
    pub fn answer(mut self, name: &str, kind: RecordKind, answers: Vec<Answer>) -> Self {
        self.entries.push(TableEntry {
            name: name.to_string(),
            kind,
            outcome: Ok(answers),
        });
        self
    }

    /// Fail queries matching `name` and `kind` with the given error message.
    #[must_use]
    pub fn fail(mut self, name: &str, kind: RecordKind, message: &str) -> Self {
        self.entries.push(TableEntry {
            name: name.to_string(),
            kind,
            outcome: Err(message.to_string()),
        });
        self
    }

    /// Every query issued so far, in order.
    pub fn queries(&self) -> Vec<(String, RecordKind)> {
        self.log.lock().unwrap().clone()
    }

    fn lookup(&self, name: &str, kind: RecordKind) -> Option<&TableEntry> {
        // Literal entries win over wildcard entries, as in real zone resolution.
        self.entries
            .iter()
            .find(|entry| entry.kind == kind && entry.name == name)
            .or_else(|| {
                self.entries.iter().find(|entry| {
                    entry.kind == kind
                        && entry.name.contains('*')
                        && wildcard_match(&entry.name, name)
                })
            })
    }
}

#[async_trait::async_trait]
impl DnsQuery for TableResolver {
    async fn query(&self, name: &str, kind: RecordKind) -> Result<Vec<Answer>, Error> {
        self.log.lock().unwrap().push((name.to_string(), kind));
        match self.lookup(name, kind) {
            Some(entry) => match &entry.outcome {
                Ok(answers) => Ok(answers.clone()),
                Err(message) => Err(Error::Resolve(ResolveError::from(
                    ResolveErrorKind::Msg(message.clone()),
                ))),
            },
            None => Err(Error::Resolve(ResolveError::from(ResolveErrorKind::Msg(
                format!("no records found for {name} {kind}"),
            )))),
        }
    }
}
