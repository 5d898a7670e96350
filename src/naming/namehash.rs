//! ENS name hashing (EIP-137).

use alloy::primitives::{keccak256, B256, U256};

/// Recursive name hash: `namehash("") = 0`, `namehash(label.rest) = keccak(namehash(rest) ++ keccak(label))`.
///
/// Expects a name already passed through
/// [`normalize_name`](crate::naming::classifier::normalize_name); labels are hashed as given.
pub fn namehash(name: &str) -> B256 {
    let mut node = B256::ZERO;
    if name.is_empty() {
        return node;
    }

    for label in name.rsplit('.') {
        let mut buf = [0u8; 64];
        buf[..32].copy_from_slice(node.as_slice());
        buf[32..].copy_from_slice(labelhash(label).as_slice());
        node = keccak256(buf);
    }
    node
}

/// Hash of a single label.
pub fn labelhash(label: &str) -> B256 {
    keccak256(label.as_bytes())
}

/// ERC-721 token id a registrar assigns to the first label of `name`.
pub fn token_id(name: &str) -> U256 {
    let label = name.split('.').next().unwrap_or_default();
    U256::from_be_bytes(labelhash(label).0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::b256;

    #[test]
    fn test_empty_name() {
        assert_eq!(namehash(""), B256::ZERO);
    }

    #[test]
    fn test_known_vectors() {
        assert_eq!(
            namehash("eth"),
            b256!("93cdeb708b7545dc668eb9280176169d1c33cfd8ed6f04690a0bcc88a93fc4ae")
        );
        assert_eq!(
            namehash("foo.eth"),
            b256!("de9b09fd7c5f901e23a3f19fecc54828e9c848539801e86591bd9801b019f84f")
        );
    }

    #[test]
    fn test_token_id_uses_first_label() {
        assert_eq!(token_id("bob.base"), token_id("bob"));
        assert_eq!(token_id("bob.base"), U256::from_be_bytes(keccak256("bob").0));
        assert_ne!(token_id("bob.base"), token_id("alice.base"));
    }
}
