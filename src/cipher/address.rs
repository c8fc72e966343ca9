use super::PublicKey;
use crate::error::AddressError;
use crate::utils::{base58_decode, base58_encode, ripemd160_digest, sha256_digest};
use std::fmt;
use std::str::FromStr;

pub const ADDRESS_VERSION: u8 = 0x00;
pub const ADDRESS_CHECK_SUM_LEN: usize = 4;
const ADDRESS_KEY_LEN: usize = 20;
const ADDRESS_BYTES_LEN: usize = ADDRESS_KEY_LEN + 1 + ADDRESS_CHECK_SUM_LEN;

/// 20-byte public key hash. On the wire and on disk only the hash is
/// written; the text form adds the version byte and a checksum.
#[derive(
    Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, bincode::Encode, bincode::Decode,
)]
pub struct Address {
    pub key: [u8; 20],
}

impl Address {
    pub fn from_pubkey(pubkey: &PublicKey) -> Address {
        let inner = sha256_digest(&sha256_digest(&pubkey.0));
        Address {
            key: ripemd160_digest(&inner),
        }
    }

    fn checksum(&self) -> [u8; ADDRESS_CHECK_SUM_LEN] {
        let mut payload = [0u8; ADDRESS_KEY_LEN + 1];
        payload[..ADDRESS_KEY_LEN].copy_from_slice(&self.key);
        payload[ADDRESS_KEY_LEN] = ADDRESS_VERSION;
        let digest = sha256_digest(&payload);
        let mut out = [0u8; ADDRESS_CHECK_SUM_LEN];
        out.copy_from_slice(&digest[..ADDRESS_CHECK_SUM_LEN]);
        out
    }

    /// `key || version || checksum`
    pub fn to_bytes(&self) -> [u8; ADDRESS_BYTES_LEN] {
        let mut out = [0u8; ADDRESS_BYTES_LEN];
        out[..ADDRESS_KEY_LEN].copy_from_slice(&self.key);
        out[ADDRESS_KEY_LEN] = ADDRESS_VERSION;
        out[ADDRESS_KEY_LEN + 1..].copy_from_slice(&self.checksum());
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Address, AddressError> {
        if bytes.len() != ADDRESS_BYTES_LEN {
            return Err(AddressError::InvalidLength(bytes.len()));
        }
        let mut key = [0u8; ADDRESS_KEY_LEN];
        key.copy_from_slice(&bytes[..ADDRESS_KEY_LEN]);
        let version = bytes[ADDRESS_KEY_LEN];
        if version != ADDRESS_VERSION {
            return Err(AddressError::InvalidVersion(version));
        }
        let address = Address { key };
        if address.checksum() != bytes[ADDRESS_KEY_LEN + 1..] {
            return Err(AddressError::InvalidChecksum);
        }
        Ok(address)
    }

    pub fn encode(&self) -> String {
        base58_encode(&self.to_bytes())
    }

    pub fn decode(s: &str) -> Result<Address, AddressError> {
        let bytes = base58_decode(s).ok_or(AddressError::InvalidBase58)?;
        Address::from_bytes(&bytes)
    }
}

pub fn validate_address(address: &str) -> bool {
    Address::decode(address).is_ok()
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.encode())
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::decode(s)
    }
}

impl serde::Serialize for Address {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encode())
    }
}

impl<'de> serde::Deserialize<'de> for Address {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = <String as serde::Deserialize>::deserialize(deserializer)?;
        Address::decode(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cipher::generate_key_pair;
    use crate::config::DISTRIBUTION_ADDRESSES;

    #[test]
    fn test_address_roundtrip() {
        let (_, pk) = generate_key_pair();
        let address = Address::from_pubkey(&pk);
        let text = address.encode();
        assert!(validate_address(&text));
        assert_eq!(Address::decode(&text).unwrap(), address);
    }

    #[test]
    fn test_same_key_same_address() {
        let (_, pk) = generate_key_pair();
        assert_eq!(Address::from_pubkey(&pk), pk.to_address());
    }

    #[test]
    fn test_invalid_checksum() {
        let (_, pk) = generate_key_pair();
        let mut bytes = pk.to_address().to_bytes();
        bytes[24] ^= 0xff;
        assert_eq!(
            Address::decode(&base58_encode(&bytes)),
            Err(AddressError::InvalidChecksum)
        );
    }

    #[test]
    fn test_invalid_length() {
        let (_, pk) = generate_key_pair();
        let bytes = pk.to_address().to_bytes();
        assert_eq!(
            Address::decode(&base58_encode(&bytes[..24])),
            Err(AddressError::InvalidLength(24))
        );
        assert_eq!(Address::decode("0"), Err(AddressError::InvalidBase58));
    }

    #[test]
    fn test_production_addresses_decode() {
        assert!(validate_address("47YHfeSspQp6Ap8MHi9rZHWCtFp7kszzYu"));
        for text in DISTRIBUTION_ADDRESSES.iter() {
            let address = Address::decode(text).unwrap();
            assert_eq!(&address.encode(), text);
        }
    }

    #[test]
    fn test_wire_form_is_twenty_bytes() {
        let (_, pk) = generate_key_pair();
        let encoded = crate::utils::serialize(&pk.to_address()).unwrap();
        assert_eq!(encoded.len(), 20);
    }
}
