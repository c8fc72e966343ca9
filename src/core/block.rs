use crate::cipher::{sign_hash, verify_signature, Address, PublicKey, SecretKey, Sha256, Sig};
use crate::core::merkle::merkle_root;
use crate::core::transaction::{Transaction, TransactionOutput};
use crate::error::{Result, ValidationError};
use crate::utils::{deserialize, serialize};
use serde::{Deserialize, Serialize};

pub const BLOCK_VERSION: u32 = 0;

/// Coin hours assigned to the genesis output
pub const GENESIS_COIN_HOURS: u64 = 1_000 * 1_000;

#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode,
)]
pub struct BlockHeader {
    pub version: u32,
    pub time: u64,
    pub seq: u64,
    pub fee: u64, // coin hours burned by the body
    pub prev_hash: Sha256,
    pub body_hash: Sha256,
    pub merkle_root: Sha256,
}

#[derive(
    Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, bincode::Encode, bincode::Decode,
)]
pub struct BlockBody {
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode)]
pub struct Block {
    pub head: BlockHeader,
    pub body: BlockBody,
}

/// A block together with the authority's signature over its header hash
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode)]
pub struct SignedBlock {
    pub block: Block,
    pub sig: Sig,
}

impl BlockHeader {
    pub fn hash(&self) -> Result<Sha256> {
        Sha256::of(self)
    }
}

impl BlockBody {
    pub fn hash(&self) -> Result<Sha256> {
        Sha256::of(self)
    }

    pub fn merkle_root(&self) -> Sha256 {
        let hashes: Vec<Sha256> = self.transactions.iter().map(Transaction::hash).collect();
        merkle_root(&hashes)
    }
}

impl Block {
    /// Builds the block that follows `prev`
    pub fn new_block(prev: &BlockHeader, time: u64, fee: u64, body: BlockBody) -> Result<Block> {
        let head = BlockHeader {
            version: BLOCK_VERSION,
            time,
            seq: prev.seq + 1,
            fee,
            prev_hash: prev.hash()?,
            body_hash: body.hash()?,
            merkle_root: body.merkle_root(),
        };
        Ok(Block { head, body })
    }

    /// The genesis block pays the whole supply to a single address
    pub fn new_genesis_block(address: Address, coins: u64, time: u64) -> Result<Block> {
        let tx = Transaction::new(
            vec![],
            vec![TransactionOutput {
                address,
                coins,
                hours: GENESIS_COIN_HOURS,
            }],
        )?;
        let body = BlockBody {
            transactions: vec![tx],
        };
        let head = BlockHeader {
            version: BLOCK_VERSION,
            time,
            seq: 0,
            fee: 0,
            prev_hash: Sha256::ZERO,
            body_hash: body.hash()?,
            merkle_root: body.merkle_root(),
        };
        Ok(Block { head, body })
    }

    pub fn hash(&self) -> Result<Sha256> {
        self.head.hash()
    }

    pub fn seq(&self) -> u64 {
        self.head.seq
    }

    pub fn time(&self) -> u64 {
        self.head.time
    }

    pub fn get_transactions(&self) -> &[Transaction] {
        &self.body.transactions
    }

    /// Checks that the header commits to the body
    pub fn verify_body(&self) -> Result<()> {
        if self.body.hash()? != self.head.body_hash {
            return Err(ValidationError::BadBodyHash.into());
        }
        if self.body.merkle_root() != self.head.merkle_root {
            return Err(ValidationError::BadMerkleRoot.into());
        }
        Ok(())
    }

    pub fn sign(self, seckey: &SecretKey) -> Result<SignedBlock> {
        let sig = sign_hash(&self.hash()?, seckey)?;
        Ok(SignedBlock { block: self, sig })
    }

    pub fn serialize(&self) -> Result<Vec<u8>> {
        serialize(self)
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Block> {
        deserialize(bytes)
    }
}

impl SignedBlock {
    pub fn seq(&self) -> u64 {
        self.block.head.seq
    }

    pub fn hash(&self) -> Result<Sha256> {
        self.block.hash()
    }

    pub fn verify_signature(&self, pubkey: &PublicKey) -> Result<()> {
        if verify_signature(pubkey, &self.sig, &self.block.hash()?) {
            Ok(())
        } else {
            Err(ValidationError::BadBlockSignature.into())
        }
    }

    pub fn serialize(&self) -> Result<Vec<u8>> {
        serialize(self)
    }

    pub fn deserialize(bytes: &[u8]) -> Result<SignedBlock> {
        deserialize(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cipher::generate_key_pair;

    fn genesis() -> Block {
        let (_, pk) = generate_key_pair();
        Block::new_genesis_block(pk.to_address(), 1_000_000, 1502217329).unwrap()
    }

    #[test]
    fn test_genesis_commits_to_body() {
        let block = genesis();
        assert_eq!(block.seq(), 0);
        assert!(block.head.prev_hash.is_zero());
        assert_eq!(block.head.merkle_root, block.body.transactions[0].hash());
        block.verify_body().unwrap();
    }

    #[test]
    fn test_new_block_links_to_previous() {
        let g = genesis();
        let next = Block::new_block(&g.head, g.time() + 10, 0, BlockBody::default()).unwrap();
        assert_eq!(next.seq(), 1);
        assert_eq!(next.head.prev_hash, g.hash().unwrap());
        assert!(next.head.merkle_root.is_zero());
        next.verify_body().unwrap();
    }

    #[test]
    fn test_tampered_body_detected() {
        let mut block = genesis();
        block.body.transactions[0].outputs[0].coins += 1;
        assert!(block.verify_body().is_err());
    }

    #[test]
    fn test_signed_block_roundtrip_and_signature() {
        let (sk, pk) = generate_key_pair();
        let g = genesis();
        let empty = Block::new_block(&g.head, g.time() + 1, 0, BlockBody::default()).unwrap();
        let signed = empty.sign(&sk).unwrap();
        signed.verify_signature(&pk).unwrap();

        let bytes = signed.serialize().unwrap();
        let decoded = SignedBlock::deserialize(&bytes).unwrap();
        assert_eq!(decoded, signed);
        assert_eq!(decoded.serialize().unwrap(), bytes);

        let (_, other) = generate_key_pair();
        assert!(signed.verify_signature(&other).is_err());
    }

    #[test]
    fn test_block_decode_rejects_trailing_bytes() {
        let mut bytes = genesis().serialize().unwrap();
        bytes.push(1);
        assert!(Block::deserialize(&bytes).is_err());
    }
}
