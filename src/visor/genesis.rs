//! Construction and checking of the genesis block

use crate::cipher::{verify_signature, PublicKey, SecretKey};
use crate::config::GenesisParams;
use crate::core::{Block, SignedBlock};
use crate::error::{Result, ValidationError};

/// Builds the unsigned genesis block for the configured parameters. Every
/// node with the same parameters builds the same bytes.
pub fn genesis_block(params: &GenesisParams) -> Result<Block> {
    Block::new_genesis_block(params.address, params.coin_volume, params.timestamp)
}

/// Signs the genesis block; used once by the chain authority to produce
/// the signature that every other node is configured with
pub fn sign_genesis(params: &GenesisParams, seckey: &SecretKey) -> Result<SignedBlock> {
    genesis_block(params)?.sign(seckey)
}

/// Checks that `candidate` is exactly the expected genesis block and is
/// signed by the chain authority
pub fn verify_genesis(
    candidate: &SignedBlock,
    expected: &Block,
    pubkey: &PublicKey,
) -> Result<()> {
    if &candidate.block != expected {
        return Err(ValidationError::GenesisMismatch.into());
    }
    if !verify_signature(pubkey, &candidate.sig, &expected.hash()?) {
        return Err(ValidationError::BadBlockSignature.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cipher::{generate_key_pair, Sha256};
    use crate::error::BlockchainError;

    fn params(address: crate::cipher::Address) -> GenesisParams {
        GenesisParams {
            address,
            signature: None,
            timestamp: 1502217329,
            coin_volume: 1_000_000,
        }
    }

    #[test]
    fn test_genesis_is_deterministic() {
        let (_, pk) = generate_key_pair();
        let p = params(pk.to_address());
        let a = genesis_block(&p).unwrap();
        let b = genesis_block(&p).unwrap();
        assert_eq!(a.hash().unwrap(), b.hash().unwrap());
        assert_eq!(a.seq(), 0);
        assert_eq!(a.head.prev_hash, Sha256::ZERO);
    }

    #[test]
    fn test_verify_genesis() {
        let (sk, pk) = generate_key_pair();
        let p = params(pk.to_address());
        let expected = genesis_block(&p).unwrap();
        let signed = sign_genesis(&p, &sk).unwrap();
        verify_genesis(&signed, &expected, &pk).unwrap();

        let (_, other) = generate_key_pair();
        let err = verify_genesis(&signed, &expected, &other).unwrap_err();
        assert_eq!(err.validation(), Some(&ValidationError::BadBlockSignature));

        let mut shifted = p.clone();
        shifted.timestamp += 1;
        let forged = sign_genesis(&shifted, &sk).unwrap();
        assert!(matches!(
            verify_genesis(&forged, &expected, &pk),
            Err(BlockchainError::Rejected(ValidationError::GenesisMismatch))
        ));
    }
}
