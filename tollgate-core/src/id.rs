//! Prefixed random identifiers
//!
//! Account, history and session ids look like `acc_3q2-9xK...`: a short
//! type prefix followed by at least 96 bits of URL-safe base64.

use base64::{Engine, prelude::BASE64_URL_SAFE_NO_PAD};
use rand::RngCore;

const MIN_ID_BYTES: usize = 12;

/// Generate `{prefix}_{random}` with 96 bits of entropy.
pub fn generate_prefixed_id(prefix: &str) -> String {
    let mut bytes = [0u8; MIN_ID_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    format!("{prefix}_{}", BASE64_URL_SAFE_NO_PAD.encode(bytes))
}

/// Check that `id` carries `expected_prefix` and enough random payload.
pub fn validate_prefixed_id(id: &str, expected_prefix: &str) -> bool {
    let Some(random_part) = id
        .strip_prefix(expected_prefix)
        .and_then(|rest| rest.strip_prefix('_'))
    else {
        return false;
    };

    BASE64_URL_SAFE_NO_PAD
        .decode(random_part)
        .map(|decoded| decoded.len() >= MIN_ID_BYTES)
        .unwrap_or(false)
}
