//! Alias-target verification against managed cloud endpoints.
//!
//! Managed endpoints expose only indirect evidence of correctness: their forward records
//! are provider-internal and rotate. Each endpoint family therefore substitutes its best
//! available indirect signal for exact value equality.

use crate::config::RecordKind;
use crate::resolver::{Answer, DnsQuery};
use std::time::Duration;

/// Endpoint families with a known verification protocol, in dispatch priority order.
/// Targets outside these families are reported as unverifiable and pass best-effort.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AliasEndpoint {
    /// `*.elb.amazonaws.com`: every answer must reverse-resolve into EC2 space.
    LoadBalancer,
    /// `s3-website-<region>.amazonaws.com`: answers must share their leading two octets
    /// with a fresh lookup of the endpoint itself.
    S3Website,
    /// `*.cloudfront.net`: every answer must reverse-resolve to a CloudFront hostname.
    Cdn,
}

impl AliasEndpoint {
    /// Classify an alias target hostname, case-insensitively and ignoring a trailing dot.
    #[must_use]
    pub fn classify(target: &str) -> Option<AliasEndpoint> {
        let host = target.strip_suffix('.').unwrap_or(target).to_lowercase();
        if host.ends_with(".elb.amazonaws.com") {
            Some(AliasEndpoint::LoadBalancer)
        } else if is_s3_website_endpoint(&host) {
            Some(AliasEndpoint::S3Website)
        } else if host.ends_with(".cloudfront.net") {
            Some(AliasEndpoint::Cdn)
        } else {
            None
        }
    }
}

/// The whole host must be `s3-website-<region>.amazonaws.com` with a single-label region.
fn is_s3_website_endpoint(host: &str) -> bool {
    host.strip_prefix("s3-website-")
        .and_then(|rest| rest.strip_suffix(".amazonaws.com"))
        .map_or(false, |region| !region.is_empty() && !region.contains('.'))
}

/// Suspension capability used between verification retries; injectable so tests can run
/// against a controlled clock.
#[async_trait::async_trait]
pub trait Sleep: Send + Sync {
    async fn pause(&self, duration: Duration);
}

/// Timer-backed sleep used outside tests.
pub struct TokioSleep;

#[async_trait::async_trait]
impl Sleep for TokioSleep {
    async fn pause(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Bounded retry schedule for protocols that tolerate propagation lag.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    /// Three attempts, three seconds apart; the s3-website endpoint class converges
    /// slowly after deployment.
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 3,
            backoff: Duration::from_secs(3),
        }
    }
}

/// Runs the verification protocol for one alias candidate against the answers already
/// resolved for its record group. Nested query failures are appended to `warnings` and
/// count as a non-match.
pub(crate) struct AliasVerifier<'a> {
    pub(crate) resolver: &'a dyn DnsQuery,
    pub(crate) sleep: &'a dyn Sleep,
    pub(crate) retry: RetryPolicy,
}

impl AliasVerifier<'_> {
    pub(crate) async fn verify(
        &self,
        endpoint: AliasEndpoint,
        target: &str,
        answers: &[Answer],
        warnings: &mut Vec<String>,
    ) -> bool {
        match endpoint {
            AliasEndpoint::LoadBalancer => {
                self.verify_reverse(answers, ".compute.amazonaws.com", warnings)
                    .await
            }
            AliasEndpoint::S3Website => self.verify_s3_website(target, answers, warnings).await,
            AliasEndpoint::Cdn => self.verify_reverse(answers, ".cloudfront.net", warnings).await,
        }
    }

    /// Every resolved answer must reverse-resolve, and every PTR hostname must carry the
    /// expected provider suffix.
    async fn verify_reverse(
        &self,
        answers: &[Answer],
        suffix: &str,
        warnings: &mut Vec<String>,
    ) -> bool {
        for answer in answers {
            match self.resolver.query(&answer.value, RecordKind::Ptr).await {
                Ok(pointers) => {
                    let all_match = pointers.iter().all(|ptr| {
                        let host = ptr.value.strip_suffix('.').unwrap_or(&ptr.value);
                        host.ends_with(suffix)
                    });
                    if !all_match {
                        return false;
                    }
                }
                Err(err) => {
                    warnings.push(format!("{} PTR: {err}", answer.value));
                    return false;
                }
            }
        }
        true
    }

    /// At least one resolved answer must share its leading two IPv4 octets with an
    /// address obtained by a fresh forward query on the endpoint itself. Retried on a
    /// bounded schedule to tolerate propagation lag; the first success short-circuits.
    async fn verify_s3_website(
        &self,
        target: &str,
        answers: &[Answer],
        warnings: &mut Vec<String>,
    ) -> bool {
        let answer_prefixes: Vec<String> = answers
            .iter()
            .filter_map(|answer| leading_octets(&answer.value))
            .collect();

        for attempt in 0..self.retry.max_attempts {
            if attempt > 0 {
                self.sleep.pause(self.retry.backoff).await;
                tracing::debug!("retry endpoint check for {target}");
            }
            match self.resolver.query(target, RecordKind::A).await {
                Ok(endpoint_answers) if !endpoint_answers.is_empty() => {
                    let overlap = endpoint_answers
                        .iter()
                        .filter_map(|answer| leading_octets(&answer.value))
                        .any(|prefix| answer_prefixes.contains(&prefix));
                    if overlap {
                        return true;
                    }
                }
                Ok(_) => {}
                Err(err) => warnings.push(format!("{target} A: {err}")),
            }
        }
        false
    }
}

/// The first two dot-separated octets of an IPv4 address string.
fn leading_octets(ip: &str) -> Option<String> {
    let mut parts = ip.split('.');
    match (parts.next(), parts.next()) {
        (Some(first), Some(second)) => Some(format!("{first}.{second}")),
        _ => None,
    }
}
