use crate::error::Error;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Default TTL applied to zones that don't declare one.
pub const DEFAULT_TTL: u32 = 300;

/// TTL bound used for alias records. Aliases resolve through a provider-managed short-TTL
/// indirection, so the declared TTL does not apply to them.
pub const ALIAS_TTL: u32 = 60;

/// The DNS record types zonecheck can validate.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordKind {
    A,
    Aaaa,
    Cname,
    Mx,
    Ns,
    Ptr,
    Txt,
    Spf,
    Soa,
    Srv,
}

impl RecordKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            RecordKind::A => "A",
            RecordKind::Aaaa => "AAAA",
            RecordKind::Cname => "CNAME",
            RecordKind::Mx => "MX",
            RecordKind::Ns => "NS",
            RecordKind::Ptr => "PTR",
            RecordKind::Txt => "TXT",
            RecordKind::Spf => "SPF",
            RecordKind::Soa => "SOA",
            RecordKind::Srv => "SRV",
        }
    }

    /// Types whose values are free-form text assembled from quoted segments.
    pub(crate) fn is_text(self) -> bool {
        matches!(self, RecordKind::Txt | RecordKind::Spf)
    }

    /// Types whose values are hostnames, compared case- and trailing-dot-insensitively.
    pub(crate) fn is_hostname(self) -> bool {
        matches!(
            self,
            RecordKind::Ns | RecordKind::Ptr | RecordKind::Mx | RecordKind::Cname
        )
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies one group of declared records sharing a `(name, type)` pair.
///
/// Multiple [`DeclaredRecord`]s may share a key (e.g. weighted or failover variants); the
/// group passes validation when any one of them matches live DNS.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordKey {
    pub name: String,
    pub kind: RecordKind,
}

impl RecordKey {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: RecordKind) -> Self {
        RecordKey {
            name: name.into(),
            kind,
        }
    }

    /// Wildcard keys are probed with a synthesized concrete name and checked for collisions
    /// against literal records, see [`crate::check`].
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        self.name.contains('*')
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.kind)
    }
}

/// One expected record-set entry from the zone file.
///
/// Exactly one of `values` and `alias_target` is set; [`ZoneConfig::try_from_file`] rejects
/// records that violate this.
#[derive(Deserialize, Debug, Clone)]
pub struct DeclaredRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: RecordKind,
    #[serde(default)]
    pub ttl: Option<u32>,
    #[serde(default)]
    pub values: Option<Vec<String>>,
    #[serde(default)]
    pub alias_target: Option<String>,
}

impl DeclaredRecord {
    /// The TTL bound live answers are held to: every answer TTL must be `<=` this value
    /// (caches may return a fresher TTL than declared, never a longer one).
    #[must_use]
    pub fn expected_ttl(&self) -> u32 {
        if self.alias_target.is_some() {
            ALIAS_TTL
        } else {
            self.ttl.unwrap_or(DEFAULT_TTL)
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct HostedZone {
    pub name: String,
    #[serde(default = "default_zone_ttl")]
    pub default_ttl: u32,
    pub records: Vec<DeclaredRecord>,
}

fn default_zone_ttl() -> u32 {
    DEFAULT_TTL
}

/// The declared zone configuration: every hosted zone with its expected record sets.
#[derive(Deserialize, Debug, Clone)]
pub struct ZoneConfig {
    pub hosted_zones: Vec<HostedZone>,
}

impl ZoneConfig {
    /// Load a zone file from the JSON document at the given path, or return an Error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IO`] if the path can't be opened or read, [`Error::InvalidJSON`] if
    /// the content isn't valid JSON, and [`Error::InvalidRecord`] if a record declares both
    /// or neither of `values` / `alias_target`.
    pub fn try_from_file(p: impl AsRef<Path>) -> Result<Self, Error> {
        let f = File::open(p)?;
        let reader = BufReader::new(f);
        let conf: ZoneConfig = serde_json::from_reader(reader)?;
        conf.validate()?;
        Ok(conf)
    }

    fn validate(&self) -> Result<(), Error> {
        for zone in &self.hosted_zones {
            for record in &zone.records {
                if record.values.is_some() == record.alias_target.is_some() {
                    return Err(Error::InvalidRecord(record.name.clone(), record.kind));
                }
            }
        }
        Ok(())
    }

    /// Flatten every zone into `(name, type)` groups, resolving each record's TTL against
    /// its zone default. Group order is deterministic (sorted by name, then type).
    #[must_use]
    pub fn flatten(&self) -> BTreeMap<RecordKey, Vec<DeclaredRecord>> {
        let mut groups: BTreeMap<RecordKey, Vec<DeclaredRecord>> = BTreeMap::new();
        for zone in &self.hosted_zones {
            for record in &zone.records {
                let mut record = record.clone();
                record.ttl = record.ttl.or(Some(zone.default_ttl));
                groups
                    .entry(RecordKey::new(record.name.clone(), record.kind))
                    .or_default()
                    .push(record);
            }
        }
        groups
    }
}
