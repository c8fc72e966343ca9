use super::{Address, Sha256};
use crate::error::{BlockchainError, Result};
use data_encoding::HEXLOWER;
use once_cell::sync::Lazy;
use secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
use secp256k1::{All, Message, Secp256k1};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

static SECP: Lazy<Secp256k1<All>> = Lazy::new(Secp256k1::new);

/// 32-byte secp256k1 secret key, wiped from memory on drop
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SecretKey([u8; 32]);

/// 33-byte compressed secp256k1 public key
#[derive(Clone, Copy, PartialEq, Eq, Hash, bincode::Encode, bincode::Decode)]
pub struct PublicKey(pub [u8; 33]);

/// 65-byte compact recoverable signature, `r || s || recovery id`
#[derive(Clone, Copy, PartialEq, Eq, Hash, bincode::Encode, bincode::Decode)]
pub struct Sig(pub [u8; 65]);

impl SecretKey {
    pub fn from_bytes(bytes: &[u8]) -> Result<SecretKey> {
        let sk = secp256k1::SecretKey::from_slice(bytes)
            .map_err(|e| BlockchainError::Crypto(format!("invalid secret key: {e}")))?;
        Ok(SecretKey(sk.secret_bytes()))
    }

    pub fn from_hex(s: &str) -> Result<SecretKey> {
        let mut bytes = hex::decode(s)
            .map_err(|e| BlockchainError::Crypto(format!("invalid secret key hex: {e}")))?;
        let key = SecretKey::from_bytes(&bytes);
        bytes.zeroize();
        key
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        HEXLOWER.encode(&self.0)
    }

    fn inner(&self) -> Result<secp256k1::SecretKey> {
        secp256k1::SecretKey::from_slice(&self.0)
            .map_err(|e| BlockchainError::Crypto(format!("invalid secret key: {e}")))
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(<redacted>)")
    }
}

impl PublicKey {
    /// Parses and validates a compressed point
    pub fn from_bytes(bytes: &[u8]) -> Result<PublicKey> {
        let pk = secp256k1::PublicKey::from_slice(bytes)
            .map_err(|e| BlockchainError::Crypto(format!("invalid public key: {e}")))?;
        Ok(PublicKey(pk.serialize()))
    }

    pub fn from_hex(s: &str) -> Result<PublicKey> {
        let bytes = hex::decode(s)
            .map_err(|e| BlockchainError::Crypto(format!("invalid public key hex: {e}")))?;
        PublicKey::from_bytes(&bytes)
    }

    pub fn to_hex(&self) -> String {
        HEXLOWER.encode(&self.0)
    }

    pub fn to_address(&self) -> Address {
        Address::from_pubkey(self)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.to_hex())
    }
}

impl Sig {
    pub fn from_hex(s: &str) -> Result<Sig> {
        let bytes = hex::decode(s)
            .map_err(|e| BlockchainError::Crypto(format!("invalid signature hex: {e}")))?;
        let arr: [u8; 65] = bytes.try_into().map_err(|b: Vec<u8>| {
            BlockchainError::Crypto(format!("signature must be 65 bytes, got {}", b.len()))
        })?;
        Ok(Sig(arr))
    }

    pub fn to_hex(&self) -> String {
        HEXLOWER.encode(&self.0)
    }

    fn recoverable(&self) -> Result<RecoverableSignature> {
        let rid = RecoveryId::from_i32(i32::from(self.0[64]))
            .map_err(|e| BlockchainError::Crypto(format!("invalid recovery id: {e}")))?;
        RecoverableSignature::from_compact(&self.0[..64], rid)
            .map_err(|e| BlockchainError::Crypto(format!("invalid signature: {e}")))
    }
}

impl fmt::Debug for Sig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sig({})", self.to_hex())
    }
}

super::impl_hex_serde!(PublicKey);
super::impl_hex_serde!(Sig);

pub fn generate_key_pair() -> (SecretKey, PublicKey) {
    let sk = secp256k1::SecretKey::new(&mut rand::thread_rng());
    let pk = secp256k1::PublicKey::from_secret_key(&*SECP, &sk);
    (SecretKey(sk.secret_bytes()), PublicKey(pk.serialize()))
}

pub fn pubkey_from_seckey(seckey: &SecretKey) -> Result<PublicKey> {
    let sk = seckey.inner()?;
    Ok(PublicKey(
        secp256k1::PublicKey::from_secret_key(&*SECP, &sk).serialize(),
    ))
}

pub fn sign_hash(hash: &Sha256, seckey: &SecretKey) -> Result<Sig> {
    let sk = seckey.inner()?;
    let msg = Message::from_digest(hash.0);
    let (rid, compact) = SECP
        .sign_ecdsa_recoverable(&msg, &sk)
        .serialize_compact();
    let mut out = [0u8; 65];
    out[..64].copy_from_slice(&compact);
    out[64] = rid.to_i32() as u8;
    Ok(Sig(out))
}

/// Recovers the public key that produced `sig` over `hash`
pub fn pubkey_from_sig(sig: &Sig, hash: &Sha256) -> Result<PublicKey> {
    let rsig = sig.recoverable()?;
    let msg = Message::from_digest(hash.0);
    let pk = SECP
        .recover_ecdsa(&msg, &rsig)
        .map_err(|e| BlockchainError::Crypto(format!("signature recovery failed: {e}")))?;
    Ok(PublicKey(pk.serialize()))
}

pub fn verify_signature(pubkey: &PublicKey, sig: &Sig, hash: &Sha256) -> bool {
    let Ok(rsig) = sig.recoverable() else {
        return false;
    };
    let Ok(pk) = secp256k1::PublicKey::from_slice(&pubkey.0) else {
        return false;
    };
    let msg = Message::from_digest(hash.0);
    SECP.verify_ecdsa(&msg, &rsig.to_standard(), &pk).is_ok()
        && matches!(pubkey_from_sig(sig, hash), Ok(recovered) if recovered == *pubkey)
}

/// Checks that `sig` was produced by the owner of `address`
pub fn verify_address_signature(address: &Address, sig: &Sig, hash: &Sha256) -> bool {
    match pubkey_from_sig(sig, hash) {
        Ok(pk) => Address::from_pubkey(&pk) == *address && verify_signature(&pk, sig, hash),
        Err(_) => false,
    }
}
