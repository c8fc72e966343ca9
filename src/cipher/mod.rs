//! Cryptographic primitives
//!
//! secp256k1 keys with 65-byte recoverable signatures, SHA-256 identities
//! and base58check addresses. Everything here is pure and safe to call
//! from any task without locking.

macro_rules! impl_hex_serde {
    ($ty:ty) => {
        impl serde::Serialize for $ty {
            fn serialize<S: serde::Serializer>(
                &self,
                serializer: S,
            ) -> std::result::Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_hex())
            }
        }

        impl<'de> serde::Deserialize<'de> for $ty {
            fn deserialize<D: serde::Deserializer<'de>>(
                deserializer: D,
            ) -> std::result::Result<Self, D::Error> {
                let s = <String as serde::Deserialize>::deserialize(deserializer)?;
                <$ty>::from_hex(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}
pub(crate) use impl_hex_serde;

pub mod address;
pub mod hash;
pub mod keys;

pub use address::{validate_address, Address, ADDRESS_CHECK_SUM_LEN, ADDRESS_VERSION};
pub use hash::Sha256;
pub use keys::{
    generate_key_pair, pubkey_from_seckey, pubkey_from_sig, sign_hash, verify_address_signature,
    verify_signature, PublicKey, SecretKey, Sig,
};
