//! Gateway checksum — canonicalization and tamper-evidence.
//!
//! The gateway authenticates every parameter set (outbound initiation and
//! inbound callback) with an MD5 digest over a canonical string:
//!
//! 1. Drop empty-valued parameters and the checksum parameter itself.
//! 2. Sort the rest by key, ASCII order.
//! 3. Assemble `HashKey=<key>&k1=v1&...&HashIV=<iv>`.
//! 4. Percent-encode the whole string, leaving only alphanumerics and
//!    `!()*-._` bare, then lowercase it. Space encodes to `%20`.
//! 5. MD5, uppercase hex.
//!
//! The encode set and the lowercase step are load-bearing: the remote side
//! computes the identical string, so any deviation produces a digest that
//! never matches.

use std::collections::BTreeMap;

use md5::{Digest, Md5};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use tracing::error;

use vendora_types::constants::CHECKSUM_FIELD;

/// Everything outside this set is percent-encoded, `=` and `&` included.
const CANONICAL_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'!')
    .remove(b'(')
    .remove(b')')
    .remove(b'*')
    .remove(b'-')
    .remove(b'.')
    .remove(b'_');

/// Build the lowercased, percent-encoded canonical string.
fn canonicalize(params: &BTreeMap<String, String>, hash_key: &str, hash_iv: &str) -> String {
    // BTreeMap iteration is already byte-ordered; re-collect to apply the
    // empty-value and checksum-field filters.
    let filtered: BTreeMap<&str, &str> = params
        .iter()
        .filter(|(k, v)| !v.is_empty() && !k.eq_ignore_ascii_case(CHECKSUM_FIELD))
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();

    let mut raw = format!("HashKey={hash_key}");
    for (key, value) in &filtered {
        raw.push('&');
        raw.push_str(key);
        raw.push('=');
        raw.push_str(value);
    }
    raw.push_str("&HashIV=");
    raw.push_str(hash_iv);

    utf8_percent_encode(&raw, CANONICAL_ENCODE_SET)
        .to_string()
        .to_lowercase()
}

/// Compute the checksum for a parameter set.
#[must_use]
pub fn compute_checksum(
    params: &BTreeMap<String, String>,
    hash_key: &str,
    hash_iv: &str,
) -> String {
    let canonical = canonicalize(params, hash_key, hash_iv);
    let digest = Md5::digest(canonical.as_bytes());
    hex::encode(digest).to_uppercase()
}

/// Validate the checksum carried in a parameter set.
///
/// Returns `false` when no checksum parameter is present, or when the
/// received value does not case-insensitively equal the computed one. A
/// mismatch logs both digests for forensic comparison.
#[must_use]
pub fn verify_checksum(
    params: &BTreeMap<String, String>,
    hash_key: &str,
    hash_iv: &str,
) -> bool {
    let Some(received) = params.get(CHECKSUM_FIELD) else {
        return false;
    };

    let computed = compute_checksum(params, hash_key, hash_iv);
    let valid = received.eq_ignore_ascii_case(&computed);
    if !valid {
        error!(
            received = %received,
            computed = %computed,
            "gateway checksum mismatch; possible forged request"
        );
    }
    valid
}
