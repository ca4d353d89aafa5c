//! Deterministic request signing
//!
//! Every API call carries a `sig` parameter binding the request parameters
//! to the current access token. The signature is an MD5 digest over the
//! sorted parameter list plus a digest of `access_token + secret_key`, so
//! the secret key itself is never transmitted.

use std::collections::{BTreeMap, HashMap};

use md5::{Digest, Md5};

/// Compute the `sig` parameter for an API request.
///
/// Algorithm:
/// 1. Copy `parameters`, add `application_key` and `method`
/// 2. Concatenate `key=value` for every entry sorted by key ascending
///    (ordinal comparison), no separator between entries
/// 3. Append `md5_hex(access_token + secret_key)`
/// 4. Return `md5_hex` of the whole concatenation, lowercase
///
/// Pure function: deterministic and independent of the iteration order of
/// the input map. The caller's map is not mutated.
pub fn sign(
    method: &str,
    parameters: &HashMap<String, String>,
    access_token: &str,
    app_public_key: &str,
    app_secret_key: &str,
) -> String {
    let mut sorted: BTreeMap<&str, &str> = parameters
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    sorted.insert("application_key", app_public_key);
    sorted.insert("method", method);

    let mut base = String::new();
    for (key, value) in &sorted {
        base.push_str(key);
        base.push('=');
        base.push_str(value);
    }
    base.push_str(&md5_hex(&format!("{access_token}{app_secret_key}")));
    md5_hex(&base)
}

/// Lowercase hex MD5 of a string.
fn md5_hex(input: &str) -> String {
    format!("{:x}", Md5::digest(input.as_bytes()))
}
