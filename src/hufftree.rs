use tracing::trace;

use crate::config::MAX_CODE_LEN;
use crate::error::{Error, Result};
use crate::min_heap::{HeapErr, MinHeap};

/// Index of a node in the tree arena.
pub type NodeId = usize;

/// A variable-length code: the low `len` bits of `code`, sent most significant first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Vlc {
    pub code: u64,
    pub len: u32,
}

impl Vlc {
    pub fn new(code: u64, len: u32) -> Self {
        Vlc { code, len }
    }

    /// True if `self` is a bit-prefix of `other` (or equal to it).
    pub fn is_prefix_of(&self, other: &Vlc) -> bool {
        self.len <= other.len && other.code >> (other.len - self.len) == self.code
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HuffNode {
    Leaf {
        weight: u64,
        leaf: usize,
    },
    Internal {
        weight: u64,
        left: NodeId,
        right: NodeId,
    },
}

impl HuffNode {
    pub fn weight(&self) -> u64 {
        match self {
            HuffNode::Leaf { weight, .. } => *weight,
            HuffNode::Internal { weight, .. } => *weight,
        }
    }
}

/// Huffman tree stored as an arena. Leaves occupy ids `0..leaf_count` in
/// insertion order; merged nodes follow in creation order.
#[derive(Debug, Clone)]
pub struct HuffmanTree {
    nodes: Vec<HuffNode>,
    root: NodeId,
    leaf_count: usize,
}

impl HuffmanTree {
    /// Build a tree with one leaf per entry of `frequencies`.
    ///
    /// Nodes are ordered by `(weight, id)`, so among equal weights leaves pop
    /// before merged nodes and earlier insertions before later ones.
    pub fn from_frequencies(frequencies: &[u64]) -> Result<Self> {
        if frequencies.is_empty() {
            return Err(Error::configuration("cannot build a tree over an empty alphabet"));
        }

        let leaf_count = frequencies.len();
        let mut nodes = Vec::with_capacity(2 * leaf_count - 1);
        nodes.extend(
            frequencies
                .iter()
                .enumerate()
                .map(|(leaf, &weight)| HuffNode::Leaf { weight, leaf }),
        );

        let heap = MinHeap::build(
            nodes
                .iter()
                .enumerate()
                .map(|(id, node)| (node.weight(), id))
                .collect(),
        );
        let root = Self::build_from_heap(&mut nodes, heap)?;

        Ok(HuffmanTree {
            nodes,
            root,
            leaf_count,
        })
    }

    fn build_from_heap(nodes: &mut Vec<HuffNode>, mut heap: MinHeap<(u64, NodeId)>) -> Result<NodeId> {
        let mut merges = 0usize;
        while heap.heap_size() > 1 {
            // x is the smaller node and goes left
            let (x_weight, x) = heap.extract_min()?;
            let &(y_weight, y) = heap.peek_min().ok_or(HeapErr::HeapUnderflow)?;

            let weight = x_weight
                .checked_add(y_weight)
                .ok_or_else(|| Error::configuration("total frequency overflows u64"))?;
            let z = nodes.len();
            nodes.push(HuffNode::Internal {
                weight,
                left: x,
                right: y,
            });

            heap.pop(Some((weight, z)))?;
            merges += 1;
        }

        let (_, root) = heap.extract_min()?;
        trace!(merges, nodes = nodes.len(), "merged huffman tree");
        Ok(root)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Option<&HuffNode> {
        self.nodes.get(id)
    }

    pub fn leaf_count(&self) -> usize {
        self.leaf_count
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Total weight of the alphabet.
    pub fn weight(&self) -> u64 {
        self.nodes[self.root].weight()
    }

    /// Depth-first pass giving every leaf its depth and path (left = 0,
    /// right = 1). Returns the codes indexed by leaf and the deepest length.
    ///
    /// A lone leaf gets the one-bit code `0`, since a zero-length code cannot
    /// be written to a stream.
    pub fn assign_codes(&self) -> Result<(Vec<Vlc>, u32)> {
        let mut codes = vec![Vlc::default(); self.leaf_count];

        if let HuffNode::Leaf { leaf, .. } = self.nodes[self.root] {
            codes[leaf] = Vlc::new(0, 1);
            return Ok((codes, 1));
        }

        let mut max_len = 0;
        let mut stack = vec![(self.root, Vlc::default())];
        while let Some((id, path)) = stack.pop() {
            match self.nodes[id] {
                HuffNode::Leaf { leaf, .. } => {
                    max_len = max_len.max(path.len);
                    codes[leaf] = path;
                }
                HuffNode::Internal { left, right, .. } => {
                    if path.len >= MAX_CODE_LEN {
                        return Err(Error::configuration(format!(
                            "alphabet needs codes longer than {} bits",
                            MAX_CODE_LEN
                        )));
                    }
                    stack.push((right, Vlc::new((path.code << 1) | 1, path.len + 1)));
                    stack.push((left, Vlc::new(path.code << 1, path.len + 1)));
                }
            }
        }

        Ok((codes, max_len))
    }
}
