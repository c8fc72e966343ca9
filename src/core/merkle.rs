use crate::cipher::Sha256;

/// Merkle root over transaction hashes.
///
/// Each level pairs adjacent nodes as `sha256(left || right)`. An odd node
/// at the end of a level moves up unchanged, and an empty list yields the
/// zero hash.
pub fn merkle_root(hashes: &[Sha256]) -> Sha256 {
    if hashes.is_empty() {
        return Sha256::ZERO;
    }
    let mut level: Vec<Sha256> = hashes.to_vec();
    while level.len() > 1 {
        level = level
            .chunks(2)
            .map(|pair| match pair {
                [left, right] => left.concat(right),
                _ => pair[0],
            })
            .collect();
    }
    level[0]
}
