use std::ops;

use log::trace;
use serde::{Deserialize, Serialize};

use crate::hash::{Algorithm, Digest, Sha256Algorithm};
use crate::merkle::midpoint_path;

/// Merkle tree inclusion proof for one data item.
///
/// Lemma layout, leaf to root, root excluded:
///
/// ```text
/// [ h1x h2y h3z ... ]
/// ```
///
/// The proof carries no indices or sides. The verifier is given the leaf
/// index and the number of leafs and derives the side of each sibling from
/// them.
#[derive(Debug, Clone, Eq, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Proof {
    lemma: Vec<Digest>,
}

impl Proof {
    /// Creates new MT inclusion proof from sibling digests, leaf first.
    pub fn new(lemma: Vec<Digest>) -> Proof {
        Proof { lemma }
    }

    /// Returns the lemma of this proof.
    pub fn lemma(&self) -> &[Digest] {
        &self.lemma
    }

    /// Consumes the proof, returning its sibling digests.
    pub fn into_lemma(self) -> Vec<Digest> {
        self.lemma
    }

    /// Verifies MT inclusion proof of `item` at leaf `index` of a tree with
    /// `leafs` leafs and root `root`.
    pub fn validate<D: AsRef<[u8]>>(
        &self,
        root: &Digest,
        item: D,
        index: usize,
        leafs: usize,
    ) -> bool {
        verify_proof(root, item, &self.lemma, index, leafs)
    }
}

impl ops::Deref for Proof {
    type Target = [Digest];

    fn deref(&self) -> &[Digest] {
        &self.lemma
    }
}

impl From<Vec<Digest>> for Proof {
    fn from(lemma: Vec<Digest>) -> Self {
        Proof { lemma }
    }
}

impl FromIterator<Digest> for Proof {
    fn from_iter<I: IntoIterator<Item = Digest>>(into: I) -> Self {
        Proof {
            lemma: into.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Proof {
    type Item = &'a Digest;
    type IntoIter = std::slice::Iter<'a, Digest>;

    fn into_iter(self) -> Self::IntoIter {
        self.lemma.iter()
    }
}

/// How a verifier decides whether each sibling sits left or right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProofLayout {
    /// Sides follow the midpoint-split shape of [`MerkleTree`] for the given
    /// number of leafs. The proof must have exactly one sibling per level of
    /// the leaf's path.
    ///
    /// [`MerkleTree`]: crate::merkle::MerkleTree
    #[default]
    Midpoint,

    /// Sides follow the parity of the leaf index, halved at each level, and
    /// the proof length is not checked. Agrees with `Midpoint` only for trees
    /// whose leaf count is a power of two.
    IndexParity,
}

/// Verifier settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifyConfig {
    /// Sibling orientation rule.
    pub layout: ProofLayout,
}

/// Verifies that `item` is leaf `index` of the tree with `leafs` leafs
/// committed to by `root`, using the default [`VerifyConfig`].
///
/// Malformed or tampered input yields `false`; nothing panics.
pub fn verify_proof<D: AsRef<[u8]>>(
    root: &Digest,
    item: D,
    proof: &[Digest],
    index: usize,
    leafs: usize,
) -> bool {
    verify_proof_with_config(root, item, proof, index, leafs, &VerifyConfig::default())
}

/// Same as [`verify_proof`] with an explicit sibling orientation rule.
pub fn verify_proof_with_config<D: AsRef<[u8]>>(
    root: &Digest,
    item: D,
    proof: &[Digest],
    index: usize,
    leafs: usize,
    config: &VerifyConfig,
) -> bool {
    let mut a = Sha256Algorithm::default();
    let mut h = a.leaf(item.as_ref());

    match config.layout {
        ProofLayout::Midpoint => {
            if index >= leafs {
                trace!("rejecting proof: index {} of {} leafs", index, leafs);
                return false;
            }
            let path = midpoint_path(index, leafs);
            if path.len() != proof.len() {
                trace!(
                    "rejecting proof: {} siblings, leaf {} of {} needs {}",
                    proof.len(),
                    index,
                    leafs,
                    path.len()
                );
                return false;
            }
            for (sibling, is_left) in proof.iter().zip(path) {
                h = if is_left {
                    a.node(&h, sibling)
                } else {
                    a.node(sibling, &h)
                };
            }
        }
        ProofLayout::IndexParity => {
            let mut j = index;
            for sibling in proof {
                h = if j & 1 == 0 {
                    a.node(&h, sibling)
                } else {
                    a.node(sibling, &h)
                };
                j >>= 1;
            }
        }
    }

    h == *root
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merkle::MerkleTree;
    use crate::test_common::{get_items, get_tree};

    // Break one element inside the proof.
    fn modify_proof(proof: &mut Proof) {
        use rand::prelude::*;

        let mut rng = thread_rng();
        let i = rng.gen_range(0..proof.lemma.len());
        let mut bytes = *proof.lemma[i].as_bytes();
        let bit = rng.gen_range(0..256);
        bytes[bit / 8] ^= 1 << (bit % 8);
        proof.lemma[i] = Digest::new(bytes);
    }

    #[test]
    fn test_proofs() {
        let items = get_items(1000);
        let tree = MerkleTree::new(&items).unwrap();
        let root = tree.root();

        for (i, item) in items.iter().enumerate() {
            let mut p = tree.gen_proof(i).unwrap();
            assert!(p.validate(&root, item, i, tree.leafs()));

            // Break the proof here and assert negative validation.
            modify_proof(&mut p);
            assert!(!p.validate(&root, item, i, tree.leafs()));
        }
    }

    #[test]
    fn test_length_checked() {
        let items = get_items(8);
        let tree = MerkleTree::new(&items).unwrap();
        let root = tree.root();
        let proof = tree.gen_proof(3).unwrap();

        let mut longer = proof.clone().into_lemma();
        longer.push(root);
        assert!(!verify_proof(&root, &items[3], &longer, 3, 8));
        assert!(!verify_proof(&root, &items[3], &proof[..2], 3, 8));
        assert!(!verify_proof(&root, &items[3], &proof, 8, 8));
        assert!(!verify_proof(&root, &items[3], &proof, 3, 0));
    }

    #[test]
    fn test_huge_leaf_counts() {
        let tree = get_tree(2);
        let root = tree.root();
        let item = crate::test_common::item(0);
        let proof = tree.gen_proof(0).unwrap();
        let deep = vec![root; usize::BITS as usize];

        for leafs in [usize::MAX, usize::MAX - 1, usize::MAX / 2 + 2] {
            assert!(!verify_proof(&root, &item, &proof, 0, leafs));
            assert!(!verify_proof(&root, &item, &proof, leafs - 1, leafs));
            assert!(!verify_proof(&root, &item, &deep, 0, leafs));
            assert!(!verify_proof(&root, &item, &deep, leafs / 2, leafs));
        }
        assert!(!verify_proof(&root, &item, &proof, usize::MAX, usize::MAX));

        let parity = VerifyConfig {
            layout: ProofLayout::IndexParity,
        };
        assert!(!verify_proof_with_config(
            &root,
            &item,
            &deep,
            usize::MAX,
            usize::MAX,
            &parity
        ));
    }

    #[test]
    fn test_parity_layout_on_power_of_two() {
        let parity = VerifyConfig {
            layout: ProofLayout::IndexParity,
        };
        for leafs in [1, 2, 4, 8, 16, 64] {
            let items = get_items(leafs);
            let tree = MerkleTree::new(&items).unwrap();
            for (i, item) in items.iter().enumerate() {
                let proof = tree.gen_proof(i).unwrap();
                assert!(verify_proof_with_config(
                    &tree.root(),
                    item,
                    &proof,
                    i,
                    leafs,
                    &parity
                ));
            }
        }
    }

    #[test]
    fn test_parity_layout_ignores_leaf_count() {
        // leaf count is not consulted
        let tree = get_tree(2);
        let proof = tree.gen_proof(0).unwrap();
        let parity = VerifyConfig {
            layout: ProofLayout::IndexParity,
        };
        assert!(verify_proof_with_config(
            &tree.root(),
            crate::test_common::item(0),
            &proof,
            0,
            0,
            &parity
        ));
    }

    #[test]
    fn test_proof_collections() {
        let tree = get_tree(6);
        let proof = tree.gen_proof(4).unwrap();
        let copy: Proof = proof.iter().copied().collect();
        assert_eq!(copy, proof);
        assert_eq!(Proof::from(proof.lemma().to_vec()), proof);
        assert_eq!((&proof).into_iter().count(), proof.len());
    }

    #[test]
    fn test_serde() {
        let tree = get_tree(5);
        let proof = tree.gen_proof(2).unwrap();

        let json = serde_json::to_string(&proof).unwrap();
        assert!(json.starts_with("[\""));
        let back: Proof = serde_json::from_str(&json).unwrap();
        assert_eq!(back, proof);

        let config: VerifyConfig = serde_json::from_str(r#"{"layout":"index_parity"}"#).unwrap();
        assert_eq!(config.layout, ProofLayout::IndexParity);
        let config: VerifyConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, VerifyConfig::default());
        assert_eq!(
            serde_json::to_string(&VerifyConfig::default()).unwrap(),
            r#"{"layout":"midpoint"}"#
        );
    }
}
