//! Capability introspection
//!
//! Identifiers are 4-byte ABI selectors (first four bytes of Keccak-256 of
//! the function signature) so external tooling can probe the controller
//! with the same ids it uses for any other registrar.

use sha3::{Digest, Keccak256};

pub type InterfaceId = [u8; 4];

/// `supportsInterface(bytes4)`
pub const INTERFACE_META_ID: InterfaceId = [0x01, 0xff, 0xc9, 0xa7];

/// Entry points summarized by [`commitment_controller_id`]
pub const COMMITMENT_CONTROLLER_SIGNATURES: [&str; 6] = [
    "rentPrice(string,uint256)",
    "available(string)",
    "makeCommitment(string,bytes32)",
    "commit(bytes32)",
    "register(string,address,uint256,bytes32)",
    "renew(string,uint256)",
];

/// First four bytes of Keccak-256 over a function signature
pub fn selector(signature: &str) -> InterfaceId {
    let digest = Keccak256::digest(signature.as_bytes());
    [digest[0], digest[1], digest[2], digest[3]]
}

/// XOR of the controller entry-point selectors
pub fn commitment_controller_id() -> InterfaceId {
    COMMITMENT_CONTROLLER_SIGNATURES
        .iter()
        .map(|sig| selector(sig))
        .fold([0u8; 4], |acc, sel| {
            [acc[0] ^ sel[0], acc[1] ^ sel[1], acc[2] ^ sel[2], acc[3] ^ sel[3]]
        })
}

pub fn supports_interface(id: InterfaceId) -> bool {
    id == INTERFACE_META_ID || id == commitment_controller_id()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meta_id_is_selector() {
        assert_eq!(selector("supportsInterface(bytes4)"), INTERFACE_META_ID);
    }

    #[test]
    fn test_known_selector() {
        // transfer(address,uint256)
        assert_eq!(selector("transfer(address,uint256)"), [0xa9, 0x05, 0x9c, 0xbb]);
    }

    #[test]
    fn test_supports() {
        assert!(supports_interface(INTERFACE_META_ID));
        assert!(supports_interface(commitment_controller_id()));
        assert!(!supports_interface([0xff, 0xff, 0xff, 0xff]));
        assert!(!supports_interface(selector("commit(bytes32)")));
    }
}
