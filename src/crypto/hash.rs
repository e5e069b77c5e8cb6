use ethers::types::U256;
use sha3::{Digest, Keccak256};

/// Keccak256 digest of raw bytes.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Keccak256 digest as a 0x-prefixed hex string.
pub fn keccak256_hex(data: &[u8]) -> String {
    format!("0x{}", hex::encode(keccak256(data)))
}

/// Deterministic uint256 cast id derived from the Farcaster cast hash string,
/// interpreting the keccak digest big-endian (the `getBigInt(id(hash))`
/// derivation the contract expects).
pub fn cast_id_from_hash(cast_hash: &str) -> U256 {
    U256::from_big_endian(&keccak256(cast_hash.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keccak256_hex_matches_empty_string_vector() {
        let digest = keccak256_hex(b"");
        assert_eq!(
            digest,
            "0xc5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
        assert_eq!(digest.len(), 66);
    }

    #[test]
    fn cast_id_is_big_endian_keccak_of_the_hash_string() {
        let id = cast_id_from_hash("");
        let expected = U256::from_str_radix(
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470",
            16,
        )
        .unwrap();
        assert_eq!(id, expected);
    }

    #[test]
    fn cast_id_is_deterministic_and_hash_sensitive() {
        let a = cast_id_from_hash("0xabc123");
        let b = cast_id_from_hash("0xabc123");
        let c = cast_id_from_hash("0xabc124");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
