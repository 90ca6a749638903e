use log::{debug, trace};

use crate::error::{MerkleError, Result};
use crate::hash::{Algorithm, Digest, Sha256Algorithm};
use crate::proof::{verify_proof, Proof};

/// Merkle Tree.
///
/// All leafs and nodes are stored in a linear array (vec) and refer to their
/// children by position in it.
///
/// A merkle tree is a tree in which every non-leaf node is the hash of its
/// children nodes. A diagram depicting how it works:
///
/// ```text
///         root = h1234 = h(h12 + h34)
///        /                           \
///  h12 = h(h1 + h2)            h34 = h(h3 + h4)
///   /            \              /            \
/// h1 = h(tx1)  h2 = h(tx2)    h3 = h(tx3)  h4 = h(tx4)
/// ```
///
/// In memory layout, leafs first, interior nodes in post-order:
///
/// ```text
///     [h1 h2 h3 h4 h12 h34 root]
/// ```
///
/// Merkle root is always the last element in the array.
///
/// The number of inputs is not always a power of two. The leaf range
/// `[start, end]` is split at `start + (end - start) / 2`, the left subtree
/// taking `[start, mid]` and the right one `[mid + 1, end]`, so the left side
/// gets the extra leaf and nothing is padded:
///
/// ```text
///            root
///          /      \
///       h123      h45
///      /    \    /   \
///    h12    h3  h4   h5
///   /   \
///  h1   h2
/// ```
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct MerkleTree {
    nodes: Vec<Node>,
    leafs: usize,
    depth: usize,

    // Cached copy of the last node's digest.
    root: Digest,
}

#[derive(Debug, Clone, Eq, PartialEq)]
struct Node {
    digest: Digest,
    children: Option<(usize, usize)>,
}

impl Node {
    fn leaf(digest: Digest) -> Node {
        Node {
            digest,
            children: None,
        }
    }
}

enum Frame {
    // Build the subtree over leafs `[start, end]`.
    Split { start: usize, end: usize },
    // Pop two built subtrees and hash them into a parent.
    Join,
}

impl MerkleTree {
    /// Creates new merkle tree from a list of items, committing to each one.
    ///
    /// Fails with [`MerkleError::EmptyInput`] when `data` yields nothing.
    pub fn new<D: AsRef<[u8]>, I: IntoIterator<Item = D>>(data: I) -> Result<MerkleTree> {
        let mut a = Sha256Algorithm::default();
        let leafs = data
            .into_iter()
            .map(|item| a.leaf(item.as_ref()))
            .collect::<Vec<Digest>>();
        Self::from_leafs(leafs)
    }

    /// Creates new merkle tree from already committed leaf digests.
    pub fn from_leafs(leafs: Vec<Digest>) -> Result<MerkleTree> {
        if leafs.is_empty() {
            return Err(MerkleError::EmptyInput);
        }

        let count = leafs.len();
        let depth = ceil_log2(count);

        let mut nodes: Vec<Node> = Vec::with_capacity(2 * count - 1);
        nodes.extend(leafs.into_iter().map(Node::leaf));

        let mut a = Sha256Algorithm::default();
        let mut pending = vec![Frame::Split {
            start: 0,
            end: count - 1,
        }];
        let mut built: Vec<usize> = Vec::with_capacity(depth + 1);

        while let Some(frame) = pending.pop() {
            match frame {
                Frame::Split { start, end } if start == end => built.push(start),
                Frame::Split { start, end } => {
                    let mid = midpoint(start, end);
                    // left subtree is built first, so it is pushed last
                    pending.push(Frame::Join);
                    pending.push(Frame::Split {
                        start: mid + 1,
                        end,
                    });
                    pending.push(Frame::Split { start, end: mid });
                }
                Frame::Join => {
                    let right = built.pop().expect("join without right subtree");
                    let left = built.pop().expect("join without left subtree");
                    let digest = a.node(&nodes[left].digest, &nodes[right].digest);
                    nodes.push(Node {
                        digest,
                        children: Some((left, right)),
                    });
                    built.push(nodes.len() - 1);
                }
            }
        }

        debug_assert_eq!(built, vec![nodes.len() - 1]);
        debug_assert_eq!(nodes.len(), 2 * count - 1);

        let root = nodes[nodes.len() - 1].digest;
        debug!(
            "built merkle tree: leafs {}, nodes {}, depth {}",
            count,
            nodes.len(),
            depth
        );

        Ok(MerkleTree {
            nodes,
            leafs: count,
            depth,
            root,
        })
    }

    /// Generate merkle tree inclusion proof for leaf `i`.
    ///
    /// The proof lists sibling digests from the leaf up to, not including,
    /// the root. Siblings are read off the tree itself, so the proof follows
    /// the midpoint-split shape for any number of leafs.
    pub fn gen_proof(&self, i: usize) -> Result<Proof> {
        if i >= self.leafs {
            return Err(MerkleError::IndexOutOfRange {
                index: i,
                leafs: self.leafs,
            });
        }

        let mut lemma: Vec<Digest> = Vec::with_capacity(self.depth);
        let mut node = self.nodes.len() - 1;
        let (mut start, mut end) = (0, self.leafs - 1);

        while let Some((left, right)) = self.nodes[node].children {
            let mid = midpoint(start, end);
            if i <= mid {
                lemma.push(self.nodes[right].digest);
                node = left;
                end = mid;
            } else {
                lemma.push(self.nodes[left].digest);
                node = right;
                start = mid + 1;
            }
        }
        debug_assert_eq!(node, i);

        // collected root-first
        lemma.reverse();
        trace!("generated proof for leaf {}: {} siblings", i, lemma.len());

        Ok(Proof::new(lemma))
    }

    /// Checks that `item` sits at leaf `i` of this tree according to `proof`.
    pub fn verify<D: AsRef<[u8]>>(&self, item: D, i: usize, proof: &[Digest]) -> bool {
        verify_proof(&self.root, item, proof, i, self.leafs)
    }

    /// Returns merkle root
    #[inline]
    pub fn root(&self) -> Digest {
        self.root
    }

    /// Returns original number of elements the tree was built upon.
    #[inline]
    pub fn leafs(&self) -> usize {
        self.leafs
    }

    /// Returns the length of the longest leaf-to-root path, `ceil(log2(leafs))`.
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Returns number of nodes in the tree, leafs included.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the committed digest of leaf `i`.
    pub fn leaf(&self, i: usize) -> Option<Digest> {
        if i < self.leafs {
            Some(self.nodes[i].digest)
        } else {
            None
        }
    }
}

/// Split point of the leaf range `[start, end]`; the left half ends at it.
#[inline]
pub(crate) fn midpoint(start: usize, end: usize) -> usize {
    start + (end - start) / 2
}

/// Sides of the path from leaf `index` to the root of a tree of `leafs`
/// leafs, leaf first. `true` marks a left child.
///
/// Requires `index < leafs`.
pub(crate) fn midpoint_path(index: usize, leafs: usize) -> Vec<bool> {
    debug_assert!(index < leafs);

    let mut path = Vec::with_capacity(ceil_log2(leafs));
    let (mut start, mut end) = (0, leafs - 1);
    while start < end {
        let mid = midpoint(start, end);
        if index <= mid {
            path.push(true);
            end = mid;
        } else {
            path.push(false);
            start = mid + 1;
        }
    }
    path.reverse();
    path
}

/// `ceil(log2(n))` for `n >= 1`.
#[inline]
pub(crate) fn ceil_log2(n: usize) -> usize {
    debug_assert!(n >= 1);
    // next_power_of_two would overflow once n passes the top power of two
    (usize::BITS - (n - 1).leading_zeros()) as usize
}
