//! Subnet division tree rooted at a base network.
//!
//! Nodes are addressed by the `(address, mask)` pair shown in the leaf
//! listing. Every walk derives positions from the base; nothing about a
//! node's address is cached.

use crate::error::{Result, SubnetError};
use crate::models::{
    address_count, netmask, parse_address, parse_mask, usable_range, Ipv4, Metrics, SubnetNode,
    MAX_LENGTH,
};
use crate::processing::codec::{pack, unpack};
use std::collections::HashSet;
use std::net::Ipv4Addr;

/// One undivided subnet as the presentation layer sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeafRow {
    pub subnet: Ipv4,
    pub usable_first: u32,
    pub usable_last: u32,
    pub total_addresses: u64,
    pub usable_host_count: u64,
    pub netmask: u32,
}

impl LeafRow {
    fn new(subnet: Ipv4) -> Result<LeafRow> {
        let network = subnet.lo()?;
        let usable = usable_range(network, subnet.mask)?;
        Ok(LeafRow {
            subnet,
            usable_first: usable.first,
            usable_last: usable.last,
            total_addresses: address_count(subnet.mask)?,
            usable_host_count: usable.hosts,
            netmask: netmask(subnet.mask)?,
        })
    }

    pub fn network(&self) -> u32 {
        self.subnet.bits()
    }

    pub fn broadcast(&self) -> u32 {
        // total_addresses >= 1 and the block fits in u32
        (u64::from(self.network()) + self.total_addresses - 1) as u32
    }

    /// Label key of this row.
    pub fn key(&self) -> String {
        self.subnet.key()
    }
}

/// An enclosing node a leaf row is the first row of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinGroup {
    pub subnet: Ipv4,
    /// Rows spanned by the group.
    pub leaf_count: usize,
}

/// Result of [`build_tree`]: the tree and the address the user typed.
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    pub tree: Tree,
    pub requested: Ipv4Addr,
}

impl BuildOutcome {
    /// The aligned network address when the requested one had host bits set.
    pub fn corrected(&self) -> Option<Ipv4Addr> {
        let base = self.tree.base().addr;
        (base != self.requested).then_some(base)
    }
}

/// Parse network and mask text and create a single-leaf tree on the aligned
/// network.
///
/// # Examples
/// ```
/// use subnet_calc::processing::build_tree;
/// let outcome = build_tree("10.0.0.5", "24").unwrap();
/// assert_eq!(outcome.corrected().unwrap().to_string(), "10.0.0.0");
/// ```
pub fn build_tree(network_text: &str, mask_text: &str) -> Result<BuildOutcome> {
    let addr = parse_address(network_text.trim())?;
    let mask = parse_mask(mask_text)?;
    let requested = Ipv4::from_parts(addr, mask);
    let tree = Tree::new(requested)?;
    if tree.base().addr != requested.addr {
        log::warn!(
            "{requested} is not on a network boundary, using {}",
            tree.base()
        );
    }
    Ok(BuildOutcome {
        tree,
        requested: requested.addr,
    })
}

/// Leaves of `root` in address order, with the subnet each one covers.
pub fn traverse_leaves(
    root: &SubnetNode,
    base_address: u32,
    base_mask: u8,
) -> Vec<(Ipv4, &SubnetNode)> {
    let mut out = Vec::new();
    collect_leaves(root, Ipv4::from_parts(base_address, base_mask), &mut out);
    out
}

fn collect_leaves<'a>(
    node: &'a SubnetNode,
    subnet: Ipv4,
    out: &mut Vec<(Ipv4, &'a SubnetNode)>,
) {
    match (node.children(), subnet.halves()) {
        (Some((left, right)), Some((lo, hi))) => {
            collect_leaves(left, lo, out);
            collect_leaves(right, hi, out);
        }
        _ => out.push((subnet, node)),
    }
}

fn goes_right(addr: u32, depth: u8) -> bool {
    (addr >> (31 - depth)) & 1 == 1
}

fn descend(node: &SubnetNode, addr: u32, depth: u8, target: u8) -> Option<&SubnetNode> {
    if depth == target {
        return Some(node);
    }
    let (left, right) = node.children()?;
    let child = if goes_right(addr, depth) { right } else { left };
    descend(child, addr, depth + 1, target)
}

fn descend_mut(
    node: &mut SubnetNode,
    addr: u32,
    depth: u8,
    target: u8,
) -> Option<&mut SubnetNode> {
    if depth == target {
        return Some(node);
    }
    match node {
        SubnetNode::Leaf => None,
        SubnetNode::Split { left, right } => {
            let child = if goes_right(addr, depth) { right } else { left };
            descend_mut(child, addr, depth + 1, target)
        }
    }
}

/// A division tree and the base network it is rooted at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tree {
    base: Ipv4,
    root: SubnetNode,
}

impl Tree {
    /// Single-leaf tree on `base`, with host bits cleared.
    pub fn new(base: Ipv4) -> Result<Tree> {
        Ok(Tree {
            base: base.aligned()?,
            root: SubnetNode::leaf(),
        })
    }

    /// Rebuild a tree from a share token, failing on a bad token.
    pub fn try_from_token(base: Ipv4, token: &str) -> Result<Tree> {
        let mut tree = Tree::new(base)?;
        let bits = unpack(token)?;
        let (root, rest) = SubnetNode::deserialize_shape(&bits)?;
        if !rest.is_empty() {
            log::warn!("ignoring {} trailing bits in token '{token}'", rest.len());
        }
        let height = root.height();
        let room = usize::from(MAX_LENGTH - tree.base.mask);
        if height > room {
            return Err(SubnetError::Codec(format!(
                "token divides {} beyond /32",
                tree.base
            )));
        }
        tree.root = root;
        Ok(tree)
    }

    /// Rebuild a tree from a share token. An empty or malformed token gives
    /// a single-leaf tree.
    pub fn from_token(base: Ipv4, token: &str) -> Result<Tree> {
        let token = token.trim();
        if token.is_empty() {
            return Tree::new(base);
        }
        match Tree::try_from_token(base, token) {
            Ok(tree) => Ok(tree),
            Err(SubnetError::Codec(e)) => {
                log::warn!("unusable division token, starting over: {e}");
                Tree::new(base)
            }
            Err(e) => Err(e),
        }
    }

    pub fn base(&self) -> Ipv4 {
        self.base
    }

    /// Drop every division.
    pub fn reset(&mut self) {
        self.root = SubnetNode::leaf();
    }

    pub fn root(&self) -> &SubnetNode {
        &self.root
    }

    /// Leaf count and height of the whole tree.
    pub fn metrics(&self) -> Metrics {
        self.root.metrics()
    }

    /// Preorder shape string of the tree.
    pub fn shape(&self) -> String {
        self.root.serialize_shape()
    }

    pub fn to_token(&self) -> String {
        pack(&self.shape())
    }

    /// Ordered leaf listing.
    pub fn leaves(&self) -> Result<Vec<LeafRow>> {
        traverse_leaves(&self.root, self.base.bits(), self.base.mask)
            .into_iter()
            .map(|(subnet, _)| LeafRow::new(subnet))
            .collect()
    }

    /// Label keys of all current leaves.
    pub fn leaf_keys(&self) -> HashSet<String> {
        traverse_leaves(&self.root, self.base.bits(), self.base.mask)
            .into_iter()
            .map(|(subnet, _)| subnet.key())
            .collect()
    }

    fn check_within(&self, subnet: &Ipv4) -> Result<()> {
        if !subnet.is_aligned() {
            return Err(SubnetError::InvalidOperation(format!(
                "{subnet} is not on a network boundary"
            )));
        }
        if !self.base.contains(subnet) {
            return Err(SubnetError::InvalidOperation(format!(
                "{subnet} is outside {}",
                self.base
            )));
        }
        Ok(())
    }

    /// The node at `subnet`, which must exist in the current shape.
    pub fn node(&self, subnet: &Ipv4) -> Result<&SubnetNode> {
        self.check_within(subnet)?;
        descend(&self.root, subnet.bits(), self.base.mask, subnet.mask)
            .ok_or_else(|| SubnetError::InvalidOperation(format!("no subnet {subnet} in tree")))
    }

    fn node_mut(&mut self, subnet: &Ipv4) -> Result<&mut SubnetNode> {
        self.check_within(subnet)?;
        descend_mut(&mut self.root, subnet.bits(), self.base.mask, subnet.mask)
            .ok_or_else(|| SubnetError::InvalidOperation(format!("no subnet {subnet} in tree")))
    }

    /// Split the leaf at `subnet` into two halves.
    pub fn divide(&mut self, subnet: &Ipv4) -> Result<()> {
        log::debug!("divide {subnet}");
        self.node_mut(subnet)?.divide(subnet.mask)
    }

    /// Merge everything below `subnet` back into one leaf.
    pub fn join(&mut self, subnet: &Ipv4) -> Result<()> {
        log::debug!("join {subnet}");
        self.node_mut(subnet)?.join()
    }

    /// Enclosing groups the leaf at `subnet` opens, outermost first, ending
    /// with the leaf itself.
    pub fn join_groups(&self, subnet: &Ipv4) -> Result<Vec<JoinGroup>> {
        let leaf = self.node(subnet)?;
        if !leaf.is_leaf() {
            return Err(SubnetError::InvalidOperation(format!("{subnet} is divided")));
        }

        let mut groups = vec![JoinGroup {
            subnet: self.base,
            leaf_count: self.root.leaf_count(),
        }];
        let mut node = &self.root;
        let mut current = self.base;
        while let (Some((left, right)), Some((lo, hi))) = (node.children(), current.halves()) {
            if goes_right(subnet.bits(), current.mask) {
                // a right half starts its own rows
                groups.clear();
                node = right;
                current = hi;
            } else {
                node = left;
                current = lo;
            }
            groups.push(JoinGroup {
                subnet: current,
                leaf_count: node.leaf_count(),
            });
        }
        Ok(groups)
    }

    /// Leaf subnets that contain or lie inside `subnet`.
    pub fn related(&self, subnet: &Ipv4) -> Result<Vec<Ipv4>> {
        Ok(self
            .leaves()?
            .into_iter()
            .map(|row| row.subnet)
            .filter(|leaf| leaf.contains(subnet) || subnet.contains(leaf))
            .collect())
    }
}
