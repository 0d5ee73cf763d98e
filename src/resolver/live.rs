//! Live DNS resolution backed by `trust-dns-resolver`.

use crate::config::RecordKind;
use crate::error::Error;
use crate::resolver::{Answer, DnsQuery};
use lazy_static::lazy_static;
use std::net::{IpAddr, SocketAddr};
use trust_dns_resolver::config::{NameServerConfig, Protocol, ResolverConfig, ResolverOpts};
use trust_dns_resolver::proto::rr::{RData, RecordType};
use trust_dns_resolver::system_conf::read_system_conf;
use trust_dns_resolver::TokioAsyncResolver;

/// Public nameservers used when the host has no usable resolver configuration.
const DEFAULT_NAMESERVERS: [&str; 2] = ["8.8.8.8", "8.8.4.4"];

const DNS_PORT: u16 = 53;

lazy_static! {
    static ref FALLBACK_ADDRS: Vec<SocketAddr> = DEFAULT_NAMESERVERS
        .iter()
        .map(|ip| SocketAddr::new(ip.parse().unwrap(), DNS_PORT))
        .collect();
}

/// A [`DnsQuery`] implementation that queries public DNS through the host's own resolver
/// configuration, falling back to [`DEFAULT_NAMESERVERS`] when none is usable.
pub struct LiveResolver {
    inner: TokioAsyncResolver,
}

impl LiveResolver {
    /// Build a resolver from the host configuration when present. Construction never
    /// aborts: with no usable host configuration the public fallback nameservers are
    /// used, and an unreachable nameserver surfaces later as per-query
    /// [`Error::Resolve`] failures.
    #[must_use]
    pub fn open() -> Self {
        let (config, opts) = match read_system_conf() {
            Ok(pair) => pair,
            Err(err) => {
                tracing::debug!("no usable system resolver config ({err}); using fallback nameservers");
                let mut config = ResolverConfig::new();
                for addr in FALLBACK_ADDRS.iter() {
                    config.add_name_server(NameServerConfig::new(*addr, Protocol::Udp));
                }
                (config, ResolverOpts::default())
            }
        };
        LiveResolver {
            inner: TokioAsyncResolver::tokio(config, opts)
                .expect("trust-dns 0.22 resolver construction is infallible in practice"),
        }
    }
}

fn record_type(kind: RecordKind) -> RecordType {
    match kind {
        RecordKind::A => RecordType::A,
        RecordKind::Aaaa => RecordType::AAAA,
        RecordKind::Cname => RecordType::CNAME,
        RecordKind::Mx => RecordType::MX,
        RecordKind::Ns => RecordType::NS,
        RecordKind::Ptr => RecordType::PTR,
        RecordKind::Txt => RecordType::TXT,
        // SPF (RFC 7208, type 99) has no first-class rdata in trust-dns.
        RecordKind::Spf => RecordType::Unknown(99),
        RecordKind::Soa => RecordType::SOA,
        RecordKind::Srv => RecordType::SRV,
    }
}

/// Render one rdata as the textual value the comparison engine operates on.
fn rdata_text(rdata: &RData) -> String {
    match rdata {
        RData::A(ipv4) => ipv4.to_string(),
        RData::AAAA(ipv6) => ipv6.to_string(),
        RData::CNAME(name) => name.to_string(),
        RData::MX(mx) => format!("{} {}", mx.preference(), mx.exchange()),
        RData::NS(ns) => ns.to_string(),
        RData::PTR(ptr) => ptr.to_string(),
        RData::TXT(txt) => txt
            .txt_data()
            .iter()
            .map(|segment| String::from_utf8_lossy(segment).into_owned())
            .collect::<String>(),
        RData::SOA(soa) => format!(
            "{} {} {} {} {} {} {}",
            soa.mname(),
            soa.rname(),
            soa.serial(),
            soa.refresh(),
            soa.retry(),
            soa.expire(),
            soa.minimum()
        ),
        RData::SRV(srv) => format!(
            "{} {} {} {}",
            srv.priority(),
            srv.weight(),
            srv.port(),
            srv.target()
        ),
        other => format!("{other:?}"),
    }
}

#[async_trait::async_trait]
impl DnsQuery for LiveResolver {
    async fn query(&self, name: &str, kind: RecordKind) -> Result<Vec<Answer>, Error> {
        // Reverse lookups arrive with the raw address as the query name.
        let lookup = match (kind, name.parse::<IpAddr>()) {
            (RecordKind::Ptr, Ok(ip)) => self.inner.reverse_lookup(ip).await?.as_lookup().clone(),
            _ => self.inner.lookup(name, record_type(kind)).await?,
        };
        Ok(lookup
            .record_iter()
            .filter_map(|record| {
                record
                    .data()
                    .map(|rdata| Answer::new(rdata_text(rdata), record.ttl()))
            })
            .collect())
    }
}
