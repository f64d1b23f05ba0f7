//! Admin key verification.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Compares a presented key against the configured one in constant time.
///
/// Both sides are hashed first so the comparison always runs over two
/// 32-byte digests, independent of the presented key's length.
pub fn keys_match(presented: &str, expected: &str) -> bool {
    if expected.is_empty() {
        return false;
    }

    let presented = Sha256::digest(presented.as_bytes());
    let expected = Sha256::digest(expected.as_bytes());
    presented.as_slice().ct_eq(expected.as_slice()).into()
}
