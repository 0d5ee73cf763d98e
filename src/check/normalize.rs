//! Per-type canonicalization of record values before comparison.

use crate::config::RecordKind;

/// Canonicalize one record value. Applied identically to declared and live values, so two
/// values are considered equal iff their canonical forms are; idempotent.
///
/// Hostname-valued types (NS, PTR, MX, CNAME) are lowercased with a single trailing dot
/// stripped. Text types (TXT, SPF) have the contents of their quoted segments extracted
/// and concatenated (declared form), then whitespace runs collapsed; resolved text arrives
/// already flattened and only needs the collapse. Everything else is trimmed.
#[must_use]
pub fn normalize(kind: RecordKind, raw: &str) -> String {
    if kind.is_hostname() {
        let value = raw.trim().to_lowercase();
        value.strip_suffix('.').unwrap_or(&value).to_string()
    } else if kind.is_text() {
        if raw.contains('"') {
            collapse_whitespace(&quoted_segments(raw))
        } else {
            collapse_whitespace(raw)
        }
    } else {
        raw.trim().to_string()
    }
}

/// Concatenate the contents of every `"…"` segment of a declared text value.
fn quoted_segments(raw: &str) -> String {
    let mut out = String::new();
    let mut rest = raw;
    while let Some(start) = rest.find('"') {
        let tail = &rest[start + 1..];
        match tail.find('"') {
            Some(end) => {
                out.push_str(&tail[..end]);
                rest = &tail[end + 1..];
            }
            None => break,
        }
    }
    out
}

fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hostnames_lowercase_and_lose_one_trailing_dot() {
        assert_eq!(
            normalize(RecordKind::Cname, "Mail.Example.COM."),
            "mail.example.com"
        );
        assert_eq!(normalize(RecordKind::Ns, " ns1.example.com "), "ns1.example.com");
        assert_eq!(
            normalize(RecordKind::Mx, "10 MAIL.example.com."),
            "10 mail.example.com"
        );
    }

    #[test]
    fn declared_text_is_rebuilt_from_quoted_segments() {
        assert_eq!(
            normalize(RecordKind::Txt, "\"v=spf1  include:example.com\" \" ~all\""),
            "v=spf1 include:example.com ~all"
        );
        assert_eq!(normalize(RecordKind::Spf, "\"v=spf1 +mx\""), "v=spf1 +mx");
    }

    #[test]
    fn resolved_text_only_collapses_whitespace() {
        assert_eq!(
            normalize(RecordKind::Txt, "  v=spf1   include:example.com ~all "),
            "v=spf1 include:example.com ~all"
        );
    }

    #[test]
    fn other_types_are_trimmed_only() {
        assert_eq!(normalize(RecordKind::A, " 1.2.3.4 "), "1.2.3.4");
        assert_eq!(
            normalize(RecordKind::Aaaa, "2001:DB8::1"),
            "2001:DB8::1"
        );
    }

    #[test]
    fn normalization_is_idempotent() {
        let samples = [
            (RecordKind::Cname, "Mail.Example.COM."),
            (RecordKind::Ns, "ns1.example.com"),
            (RecordKind::Txt, "\"hello\" \"  world \""),
            (RecordKind::Spf, "v=spf1   ~all"),
            (RecordKind::A, " 1.2.3.4 "),
            (RecordKind::Srv, "0 5 5060 sip.example.com."),
        ];
        for (kind, raw) in samples {
            let once = normalize(kind, raw);
            assert_eq!(normalize(kind, &once), once, "{kind} {raw:?}");
        }
    }
}
