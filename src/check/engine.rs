//! Top-level reconciliation driver.

use crate::check::alias::{AliasVerifier, RetryPolicy, Sleep, TokioSleep};
use crate::check::normalize::normalize;
use crate::check::probe::ProbeNamer;
use crate::check::validator::{validate_group, AsteriskAnswers, GroupOutcome};
use crate::config::{DeclaredRecord, RecordKey, ZoneConfig};
use crate::resolver::DnsQuery;
use is_terminal::IsTerminal;
use std::collections::BTreeMap;
use std::io::Write;

const GREEN: &str = "\x1b[92m";
const RED: &str = "\x1b[91m";
const RESET: &str = "\x1b[0m";

/// Options consumed by a [`Checker`] run.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Suppresses progress markers; `main` also widens log verbosity when set.
    pub debug: bool,
}

/// The externally visible result of one reconciliation run.
#[derive(Debug, Default)]
pub struct RunReport {
    /// Number of `(name, type)` record groups checked, wildcard groups included.
    pub total: usize,
    /// Number of groups that failed validation.
    pub failed: usize,
    /// One block per failed group, listing every non-matching candidate.
    pub error_messages: Vec<String>,
    /// Query failures, unverifiable alias targets, and wildcard collisions.
    pub warning_messages: Vec<String>,
}

impl RunReport {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.failed == 0
    }
}

/// Drives one full declared-vs-live reconciliation pass.
pub struct Checker<'a> {
    resolver: &'a dyn DnsQuery,
    options: RunOptions,
    namer: ProbeNamer,
    sleep: Box<dyn Sleep>,
    retry: RetryPolicy,
}

impl<'a> Checker<'a> {
    #[must_use]
    pub fn new(resolver: &'a dyn DnsQuery, options: RunOptions) -> Self {
        Checker {
            resolver,
            options,
            namer: ProbeNamer::new(),
            sleep: Box::new(TokioSleep),
            retry: RetryPolicy::default(),
        }
    }

    /// Replace the probe-name source, for deterministic wildcard probes in tests.
    #[must_use]
    pub fn with_namer(mut self, namer: ProbeNamer) -> Self {
        self.namer = namer;
        self
    }

    /// Replace the retry schedule used by endpoint verification.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Validate every declared record group against live DNS and aggregate the results.
    ///
    /// Wildcard groups are split off and probed first so the asterisk answer set is
    /// complete before any literal group runs its collision scan. A query failure never
    /// aborts the run: every group is processed exactly once and the returned report is
    /// always complete.
    pub async fn run(&mut self, config: &ZoneConfig) -> RunReport {
        let mut groups = config.flatten();
        let mut report = RunReport {
            total: groups.len(),
            ..RunReport::default()
        };

        let mut wildcard_groups: BTreeMap<RecordKey, Vec<DeclaredRecord>> = BTreeMap::new();
        let wildcard_keys: Vec<RecordKey> =
            groups.keys().filter(|key| key.is_wildcard()).cloned().collect();
        for key in wildcard_keys {
            if let Some(candidates) = groups.remove(&key) {
                wildcard_groups.insert(key, candidates);
            }
        }

        // Probe every wildcard once up front; a failed probe simply yields no entry.
        let mut asterisk_answers = AsteriskAnswers::new();
        for key in wildcard_groups.keys() {
            let probe = self.namer.probe_name(&key.name);
            if let Ok(answers) = self.resolver.query(&probe, key.kind).await {
                let values = answers
                    .iter()
                    .map(|answer| normalize(key.kind, &answer.value))
                    .collect();
                asterisk_answers.insert(key.clone(), values);
            }
        }

        let verifier = AliasVerifier {
            resolver: self.resolver,
            sleep: self.sleep.as_ref(),
            retry: self.retry,
        };

        for (key, candidates) in &wildcard_groups {
            let outcome = validate_group(&verifier, &mut self.namer, key, candidates, None).await;
            absorb(&self.options, outcome, &mut report);
        }
        for (key, candidates) in &groups {
            let outcome = validate_group(
                &verifier,
                &mut self.namer,
                key,
                candidates,
                Some(&asterisk_answers),
            )
            .await;
            absorb(&self.options, outcome, &mut report);
        }

        if !self.options.debug {
            println!();
        }
        for message in &report.error_messages {
            tracing::error!("{message}");
        }
        for message in &report.warning_messages {
            tracing::warn!("WARNING {message}");
        }
        report
    }
}

fn absorb(options: &RunOptions, outcome: GroupOutcome, report: &mut RunReport) {
    if !outcome.passed {
        report.failed += 1;
    }
    print_marker(options, outcome.passed);
    report.error_messages.extend(outcome.errors);
    report.warning_messages.extend(outcome.warnings);
}

/// One marker per checked group: green `.` on success, red `F` on failure.
fn print_marker(options: &RunOptions, passed: bool) {
    if options.debug {
        return;
    }
    let marker = if passed { "." } else { "F" };
    if std::io::stdout().is_terminal() {
        let color = if passed { GREEN } else { RED };
        print!("{color}{marker}{RESET}");
    } else {
        print!("{marker}");
    }
    let _ = std::io::stdout().flush();
}
