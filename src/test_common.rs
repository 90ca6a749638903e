use crate::merkle::MerkleTree;

/// Distinct item `i`.
pub fn item(i: usize) -> Vec<u8> {
    format!("item {}", i * 93).into_bytes()
}

pub fn get_items(leafs: usize) -> Vec<Vec<u8>> {
    (0..leafs).map(item).collect()
}

pub fn get_tree(leafs: usize) -> MerkleTree {
    MerkleTree::new(get_items(leafs)).expect("failed to create tree from items")
}
