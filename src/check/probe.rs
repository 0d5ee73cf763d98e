//! Wildcard name handling: probe-name synthesis and glob matching.

use rand::distributions::Alphanumeric;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Prefix of the concrete label substituted for `*` when probing a wildcard record.
pub(crate) const ASTERISK_PREFIX: &str = "asterisk-of-wildcard";

const SUFFIX_LEN: usize = 8;

/// Generates concrete, resolvable probe names for wildcard records.
///
/// Every invocation draws a fresh random suffix so a probe name can't collide with other
/// labels declared in the zone. [`ProbeNamer::seeded`] gives tests deterministic names
/// without weakening production randomness.
pub struct ProbeNamer {
    rng: StdRng,
}

impl ProbeNamer {
    #[must_use]
    pub fn new() -> Self {
        ProbeNamer {
            rng: StdRng::from_entropy(),
        }
    }

    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        ProbeNamer {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Names without a wildcard label pass through unchanged; otherwise every `*` is
    /// replaced with the same freshly drawn probe label.
    pub fn probe_name(&mut self, name: &str) -> String {
        if !name.contains('*') {
            return name.to_string();
        }
        let suffix: String = (&mut self.rng)
            .sample_iter(&Alphanumeric)
            .take(SUFFIX_LEN)
            .map(char::from)
            .collect();
        name.replace('*', &format!("{ASTERISK_PREFIX}-{suffix}"))
    }
}

impl Default for ProbeNamer {
    fn default() -> Self {
        ProbeNamer::new()
    }
}

/// Wildcard-as-glob name matching: `*` stands for one or more characters, everything else
/// is literal. Case-sensitive; a single trailing dot on either side is ignored.
#[must_use]
pub fn wildcard_match(pattern: &str, name: &str) -> bool {
    let pattern = pattern.strip_suffix('.').unwrap_or(pattern);
    let name = name.strip_suffix('.').unwrap_or(name);
    glob_match(pattern.as_bytes(), name.as_bytes())
}

fn glob_match(pattern: &[u8], name: &[u8]) -> bool {
    match pattern.split_first() {
        None => name.is_empty(),
        Some((b'*', rest)) => (1..=name.len()).any(|skip| glob_match(rest, &name[skip..])),
        Some((c, rest)) => name.first() == Some(c) && glob_match(rest, &name[1..]),
    }
}
