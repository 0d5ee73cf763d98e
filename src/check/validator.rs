//! Single record-group validation.

use crate::check::alias::{AliasEndpoint, AliasVerifier};
use crate::check::normalize::normalize;
use crate::check::probe::{wildcard_match, ProbeNamer};
use crate::config::{DeclaredRecord, RecordKey};
use std::collections::BTreeMap;

/// Normalized live values recorded per wildcard key during the probe pass. Fully built
/// before any literal group is validated; collision detection reads it, never writes.
pub(crate) type AsteriskAnswers = BTreeMap<RecordKey, Vec<String>>;

/// Everything observed while checking one record group. The engine merges outcomes into
/// the run totals; group checks share no mutable state with each other.
#[derive(Debug, Default)]
pub(crate) struct GroupOutcome {
    pub(crate) passed: bool,
    pub(crate) errors: Vec<String>,
    pub(crate) warnings: Vec<String>,
}

/// Check one `(name, type)` group of declared candidates against live DNS.
///
/// The group passes if any candidate matches the live answer set: literal candidates by
/// set equality of normalized values, alias candidates by their endpoint protocol. Either
/// way every observed answer TTL must stay within the candidate's expected bound. For
/// literal groups the completed [`AsteriskAnswers`] is scanned afterwards for wildcard
/// records this group is indistinguishable from; collisions warn but never fail.
pub(crate) async fn validate_group(
    verifier: &AliasVerifier<'_>,
    namer: &mut ProbeNamer,
    key: &RecordKey,
    candidates: &[DeclaredRecord],
    asterisk_answers: Option<&AsteriskAnswers>,
) -> GroupOutcome {
    let mut outcome = GroupOutcome::default();
    let name = namer.probe_name(&key.name);
    let kind = key.kind;
    tracing::debug!("check DNS {name} {kind}");

    let answers = match verifier.resolver.query(&name, kind).await {
        Ok(answers) => answers,
        Err(err) => {
            outcome.warnings.push(format!("{name} {kind}: {err}"));
            return outcome;
        }
    };

    let actual_values: Vec<String> = {
        let mut values: Vec<String> = answers
            .iter()
            .map(|answer| normalize(kind, &answer.value))
            .collect();
        values.sort();
        values
    };
    let actual_ttls: Vec<u32> = answers.iter().map(|answer| answer.ttl).collect();
    let actual_message = answers
        .iter()
        .map(|answer| format!("{}({})", normalize(kind, &answer.value), answer.ttl))
        .collect::<Vec<_>>()
        .join(",");

    let mut diagnostics = Vec::new();
    let mut passed = false;
    for candidate in candidates {
        let expected_ttl = candidate.expected_ttl();
        let (mut matched, expected_message) = if let Some(values) = &candidate.values {
            let mut expected: Vec<String> =
                values.iter().map(|value| normalize(kind, value)).collect();
            expected.sort();
            let message = expected
                .iter()
                .map(|value| format!("{value}({expected_ttl})"))
                .collect::<Vec<_>>()
                .join(",");
            (expected == actual_values, message)
        } else if let Some(target) = &candidate.alias_target {
            let message = format!("{target}({expected_ttl})");
            let matched = match AliasEndpoint::classify(target) {
                Some(endpoint) => {
                    verifier
                        .verify(endpoint, target, &answers, &mut outcome.warnings)
                        .await
                }
                None => {
                    outcome
                        .warnings
                        .push(format!("{name} {kind}: cannot verify `{target}`"));
                    true
                }
            };
            (matched, message)
        } else {
            // Rejected at zone load time.
            continue;
        };

        if matched && !actual_ttls.iter().all(|ttl| *ttl <= expected_ttl) {
            matched = false;
        }

        tracing::debug!("  expected={expected_message}\n  actual={actual_message}");

        if matched {
            passed = true;
            break;
        }
        diagnostics.push(expected_message);
    }

    if let Some(asterisk_answers) = asterisk_answers {
        for (asterisk_key, asterisk_values) in asterisk_answers {
            if wildcard_match(&asterisk_key.name, &name)
                && actual_values
                    .iter()
                    .any(|value| asterisk_values.contains(value))
            {
                outcome
                    .warnings
                    .push(format!("{name} {kind}: same as `{}`", asterisk_key.name));
            }
        }
    }

    outcome.passed = passed;
    if !passed {
        for expected_message in diagnostics {
            outcome.errors.push(format!(
                "{name} {kind}:\n  expected={expected_message}\n  actual={actual_message}"
            ));
        }
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::alias::{RetryPolicy, TokioSleep};
    use crate::config::RecordKind;
    use crate::resolver::{Answer, TableResolver};

    fn literal(name: &str, kind: RecordKind, ttl: u32, values: &[&str]) -> DeclaredRecord {
        DeclaredRecord {
            name: name.to_string(),
            kind,
            ttl: Some(ttl),
            values: Some(values.iter().map(ToString::to_string).collect()),
            alias_target: None,
        }
    }

    fn alias(name: &str, kind: RecordKind, target: &str) -> DeclaredRecord {
        DeclaredRecord {
            name: name.to_string(),
            kind,
            ttl: Some(300),
            values: None,
            alias_target: Some(target.to_string()),
        }
    }

    async fn check(
        resolver: &TableResolver,
        key: &RecordKey,
        candidates: &[DeclaredRecord],
        asterisk_answers: Option<&AsteriskAnswers>,
    ) -> GroupOutcome {
        let verifier = AliasVerifier {
            resolver,
            sleep: &TokioSleep,
            retry: RetryPolicy::default(),
        };
        let mut namer = ProbeNamer::seeded(1);
        validate_group(&verifier, &mut namer, key, candidates, asterisk_answers).await
    }

    #[tokio::test]
    async fn matching_values_and_ttls_pass_without_diagnostics() {
        let resolver = TableResolver::new().answer(
            "www.example.com",
            RecordKind::A,
            vec![Answer::new("1.2.3.4", 300)],
        );
        let key = RecordKey::new("www.example.com", RecordKind::A);
        let candidates = [literal("www.example.com", RecordKind::A, 300, &["1.2.3.4"])];

        let outcome = check(&resolver, &key, &candidates, None).await;
        assert!(outcome.passed);
        assert!(outcome.errors.is_empty());
        assert!(outcome.warnings.is_empty());
    }

    #[tokio::test]
    async fn a_live_ttl_above_the_declared_bound_fails() {
        let resolver = TableResolver::new().answer(
            "www.example.com",
            RecordKind::A,
            vec![Answer::new("1.2.3.4", 600)],
        );
        let key = RecordKey::new("www.example.com", RecordKind::A);
        let candidates = [literal("www.example.com", RecordKind::A, 300, &["1.2.3.4"])];

        let outcome = check(&resolver, &key, &candidates, None).await;
        assert!(!outcome.passed);
        assert_eq!(outcome.errors.len(), 1);
        assert!(outcome.errors[0].contains("expected=1.2.3.4(300)"));
        assert!(outcome.errors[0].contains("actual=1.2.3.4(600)"));
    }

    #[tokio::test]
    async fn ttls_exactly_at_the_bound_pass_and_one_second_over_fails() {
        let key = RecordKey::new("www.example.com", RecordKind::A);
        let candidates = [literal("www.example.com", RecordKind::A, 300, &["1.2.3.4"])];

        let at_bound = TableResolver::new().answer(
            "www.example.com",
            RecordKind::A,
            vec![Answer::new("1.2.3.4", 300)],
        );
        assert!(check(&at_bound, &key, &candidates, None).await.passed);

        let over_bound = TableResolver::new().answer(
            "www.example.com",
            RecordKind::A,
            vec![Answer::new("1.2.3.4", 301)],
        );
        assert!(!check(&over_bound, &key, &candidates, None).await.passed);
    }

    #[tokio::test]
    async fn comparison_is_order_independent() {
        let resolver = TableResolver::new().answer(
            "www.example.com",
            RecordKind::A,
            vec![Answer::new("5.6.7.8", 300), Answer::new("1.2.3.4", 300)],
        );
        let key = RecordKey::new("www.example.com", RecordKind::A);
        let candidates = [literal(
            "www.example.com",
            RecordKind::A,
            300,
            &["1.2.3.4", "5.6.7.8"],
        )];

        assert!(check(&resolver, &key, &candidates, None).await.passed);
    }

    #[tokio::test]
    async fn any_matching_candidate_satisfies_the_group() {
        let resolver = TableResolver::new().answer(
            "www.example.com",
            RecordKind::A,
            vec![Answer::new("5.6.7.8", 300)],
        );
        let key = RecordKey::new("www.example.com", RecordKind::A);
        let candidates = [
            literal("www.example.com", RecordKind::A, 300, &["1.2.3.4"]),
            literal("www.example.com", RecordKind::A, 300, &["5.6.7.8"]),
        ];

        let outcome = check(&resolver, &key, &candidates, None).await;
        assert!(outcome.passed);
        // Diagnostics from earlier non-matching candidates are discarded on a pass.
        assert!(outcome.errors.is_empty());
    }

    #[tokio::test]
    async fn failed_groups_report_every_non_matching_candidate() {
        let resolver = TableResolver::new().answer(
            "www.example.com",
            RecordKind::A,
            vec![Answer::new("9.9.9.9", 300)],
        );
        let key = RecordKey::new("www.example.com", RecordKind::A);
        let candidates = [
            literal("www.example.com", RecordKind::A, 300, &["1.2.3.4"]),
            literal("www.example.com", RecordKind::A, 300, &["5.6.7.8"]),
        ];

        let outcome = check(&resolver, &key, &candidates, None).await;
        assert!(!outcome.passed);
        assert_eq!(outcome.errors.len(), 2);
    }

    #[tokio::test]
    async fn query_failures_warn_and_fail_the_group() {
        let resolver = TableResolver::new().fail(
            "missing.example.com",
            RecordKind::A,
            "no records found for missing.example.com. A",
        );
        let key = RecordKey::new("missing.example.com", RecordKind::A);
        let candidates = [literal("missing.example.com", RecordKind::A, 300, &["1.2.3.4"])];

        let outcome = check(&resolver, &key, &candidates, None).await;
        assert!(!outcome.passed);
        assert!(outcome.errors.is_empty());
        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.warnings[0].contains("no records found"));
    }

    #[tokio::test]
    async fn hostname_values_compare_case_and_dot_insensitively() {
        let resolver = TableResolver::new().answer(
            "mail.example.com",
            RecordKind::Mx,
            vec![Answer::new("10 MX1.Example.COM.", 300)],
        );
        let key = RecordKey::new("mail.example.com", RecordKind::Mx);
        let candidates = [literal(
            "mail.example.com",
            RecordKind::Mx,
            300,
            &["10 mx1.example.com"],
        )];

        assert!(check(&resolver, &key, &candidates, None).await.passed);
    }

    #[tokio::test]
    async fn cloudfront_alias_passes_via_reverse_resolution() {
        let resolver = TableResolver::new()
            .answer(
                "cdn.example.com",
                RecordKind::Cname,
                vec![Answer::new("203.0.113.20", 60)],
            )
            .answer(
                "203.0.113.20",
                RecordKind::Ptr,
                vec![Answer::new("x.cloudfront.net.", 60)],
            );
        let key = RecordKey::new("cdn.example.com", RecordKind::Cname);
        let candidates = [alias(
            "cdn.example.com",
            RecordKind::Cname,
            "d123.cloudfront.net",
        )];

        let outcome = check(&resolver, &key, &candidates, None).await;
        assert!(outcome.passed);
        assert!(outcome.warnings.is_empty());
    }

    #[tokio::test]
    async fn alias_answers_are_held_to_the_fixed_ttl_bound() {
        // Declared TTL is 300, but alias answers must still come in at or under 60.
        let resolver = TableResolver::new()
            .answer(
                "cdn.example.com",
                RecordKind::Cname,
                vec![Answer::new("203.0.113.20", 300)],
            )
            .answer(
                "203.0.113.20",
                RecordKind::Ptr,
                vec![Answer::new("x.cloudfront.net.", 60)],
            );
        let key = RecordKey::new("cdn.example.com", RecordKind::Cname);
        let candidates = [alias(
            "cdn.example.com",
            RecordKind::Cname,
            "d123.cloudfront.net",
        )];

        let outcome = check(&resolver, &key, &candidates, None).await;
        assert!(!outcome.passed);
        assert!(outcome.errors[0].contains("d123.cloudfront.net(60)"));
    }

    #[tokio::test]
    async fn unrecognized_alias_targets_warn_and_pass() {
        let resolver = TableResolver::new().answer(
            "app.example.com",
            RecordKind::A,
            vec![Answer::new("203.0.113.30", 60)],
        );
        let key = RecordKey::new("app.example.com", RecordKind::A);
        let candidates = [alias(
            "app.example.com",
            RecordKind::A,
            "ec2-1-2-3-4.compute.amazonaws.com",
        )];

        let outcome = check(&resolver, &key, &candidates, None).await;
        assert!(outcome.passed);
        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.warnings[0].contains("cannot verify `ec2-1-2-3-4.compute.amazonaws.com`"));
    }

    #[tokio::test]
    async fn literal_groups_warn_when_shadowed_by_a_wildcard() {
        let resolver = TableResolver::new().answer(
            "foo.example.com",
            RecordKind::A,
            vec![Answer::new("9.9.9.9", 60)],
        );
        let key = RecordKey::new("foo.example.com", RecordKind::A);
        let candidates = [literal("foo.example.com", RecordKind::A, 60, &["9.9.9.9"])];

        let mut asterisk_answers = AsteriskAnswers::new();
        asterisk_answers.insert(
            RecordKey::new("*.example.com", RecordKind::A),
            vec!["9.9.9.9".to_string()],
        );

        let outcome = check(&resolver, &key, &candidates, Some(&asterisk_answers)).await;
        assert!(outcome.passed);
        assert_eq!(
            outcome.warnings,
            vec!["foo.example.com A: same as `*.example.com`".to_string()]
        );
    }

    #[tokio::test]
    async fn non_intersecting_wildcards_do_not_warn() {
        let resolver = TableResolver::new().answer(
            "foo.example.com",
            RecordKind::A,
            vec![Answer::new("1.2.3.4", 60)],
        );
        let key = RecordKey::new("foo.example.com", RecordKind::A);
        let candidates = [literal("foo.example.com", RecordKind::A, 60, &["1.2.3.4"])];

        let mut asterisk_answers = AsteriskAnswers::new();
        asterisk_answers.insert(
            RecordKey::new("*.example.com", RecordKind::A),
            vec!["9.9.9.9".to_string()],
        );
        asterisk_answers.insert(
            RecordKey::new("*.other.com", RecordKind::A),
            vec!["1.2.3.4".to_string()],
        );

        let outcome = check(&resolver, &key, &candidates, Some(&asterisk_answers)).await;
        assert!(outcome.passed);
        assert!(outcome.warnings.is_empty());
    }
}
