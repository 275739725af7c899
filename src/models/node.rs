//! Binary subnet division tree node.
//!
//! A node never stores its own address. Position is derived while walking:
//! the left child keeps the parent's address with mask + 1, the right child
//! starts one half-block later.

use super::ipv4::MAX_LENGTH;
use crate::error::{Result, SubnetError};

/// A node of the division tree: either an undivided subnet or one split
/// into exactly two halves.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SubnetNode {
    #[default]
    Leaf,
    Split {
        left: Box<SubnetNode>,
        right: Box<SubnetNode>,
    },
}

/// Derived shape metrics of a subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metrics {
    /// Number of leaves below (1 for a leaf).
    pub leaf_count: usize,
    /// Height of the subtree (0 for a leaf).
    pub height: usize,
}

impl SubnetNode {
    /// A fresh undivided node.
    pub fn leaf() -> SubnetNode {
        SubnetNode::Leaf
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, SubnetNode::Leaf)
    }

    /// Left and right children of a split node.
    pub fn children(&self) -> Option<(&SubnetNode, &SubnetNode)> {
        match self {
            SubnetNode::Leaf => None,
            SubnetNode::Split { left, right } => Some((&**left, &**right)),
        }
    }

    /// Split a leaf sitting at `mask` into two fresh leaves.
    pub fn divide(&mut self, mask: u8) -> Result<()> {
        if mask >= MAX_LENGTH {
            return Err(SubnetError::InvalidOperation(format!("cannot divide a /{mask}")));
        }
        if !self.is_leaf() {
            return Err(SubnetError::InvalidOperation(
                "subnet is already divided".to_string(),
            ));
        }
        *self = SubnetNode::Split {
            left: Box::default(),
            right: Box::default(),
        };
        Ok(())
    }

    /// Drop both children, turning the node back into a leaf.
    pub fn join(&mut self) -> Result<()> {
        if self.is_leaf() {
            return Err(SubnetError::InvalidOperation(
                "subnet is not divided".to_string(),
            ));
        }
        *self = SubnetNode::Leaf;
        Ok(())
    }

    /// Full top-down recomputation of leaf count and height.
    pub fn metrics(&self) -> Metrics {
        match self {
            SubnetNode::Leaf => Metrics {
                leaf_count: 1,
                height: 0,
            },
            SubnetNode::Split { left, right } => {
                let l = left.metrics();
                let r = right.metrics();
                Metrics {
                    leaf_count: l.leaf_count + r.leaf_count,
                    height: 1 + l.height.max(r.height),
                }
            }
        }
    }

    pub fn leaf_count(&self) -> usize {
        self.metrics().leaf_count
    }

    pub fn height(&self) -> usize {
        self.metrics().height
    }

    /// Preorder shape string: `1` for a split node, `0` for a leaf.
    pub fn serialize_shape(&self) -> String {
        let mut out = String::new();
        self.write_shape(&mut out);
        out
    }

    fn write_shape(&self, out: &mut String) {
        match self {
            SubnetNode::Leaf => out.push('0'),
            SubnetNode::Split { left, right } => {
                out.push('1');
                left.write_shape(out);
                right.write_shape(out);
            }
        }
    }

    /// Build one node from the front of a shape string, returning the node
    /// and the unconsumed remainder.
    ///
    /// Trees deeper than 32 levels cannot exist for IPv4 and are rejected.
    pub fn deserialize_shape(bits: &str) -> Result<(SubnetNode, &str)> {
        Self::read_shape(bits, 0)
    }

    fn read_shape(bits: &str, depth: u8) -> Result<(SubnetNode, &str)> {
        let mut chars = bits.chars();
        match chars.next() {
            Some('0') => Ok((SubnetNode::Leaf, chars.as_str())),
            Some('1') => {
                if depth >= MAX_LENGTH {
                    return Err(SubnetError::Codec(
                        "shape is deeper than 32 levels".to_string(),
                    ));
                }
                let (left, rest) = Self::read_shape(chars.as_str(), depth + 1)?;
                let (right, rest) = Self::read_shape(rest, depth + 1)?;
                Ok((
                    SubnetNode::Split {
                        left: Box::new(left),
                        right: Box::new(right),
                    },
                    rest,
                ))
            }
            Some(c) => Err(SubnetError::Codec(format!("unexpected character '{c}' in shape"))),
            None => Err(SubnetError::Codec(
                "shape ended before the node was complete".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_divide_join() {
        let mut node = SubnetNode::leaf();
        node.divide(24).unwrap();
        assert!(!node.is_leaf());
        assert_eq!(node.leaf_count(), 2);
        assert!(node.divide(24).is_err());

        node.join().unwrap();
        assert_eq!(node, SubnetNode::Leaf);
        assert!(node.join().is_err());
    }

    #[test]
    fn test_divide_mask_32() {
        let mut node = SubnetNode::leaf();
        assert!(matches!(
            node.divide(32),
            Err(SubnetError::InvalidOperation(_))
        ));
        assert!(node.is_leaf());
        node.divide(31).unwrap();
    }

    #[test]
    fn test_metrics_unbalanced() {
        let mut node = SubnetNode::leaf();
        node.divide(0).unwrap();
        if let SubnetNode::Split { left, .. } = &mut node {
            left.divide(1).unwrap();
            if let SubnetNode::Split { right, .. } = &mut **left {
                right.divide(2).unwrap();
            }
        }
        let m = node.metrics();
        assert_eq!(m.leaf_count, 4);
        assert_eq!(m.height, 3);
        assert_eq!(node.serialize_shape(), "1101000");
    }

    #[test]
    fn test_shape_round_trip() {
        let (node, rest) = SubnetNode::deserialize_shape("1101000").unwrap();
        assert_eq!(rest, "");
        assert_eq!(node.serialize_shape(), "1101000");

        let (node, rest) = SubnetNode::deserialize_shape("0111").unwrap();
        assert!(node.is_leaf());
        assert_eq!(rest, "111");
    }

    #[test]
    fn test_shape_truncated() {
        assert!(matches!(
            SubnetNode::deserialize_shape("10"),
            Err(SubnetError::Codec(_))
        ));
        assert!(matches!(
            SubnetNode::deserialize_shape(""),
            Err(SubnetError::Codec(_))
        ));
        assert!(matches!(
            SubnetNode::deserialize_shape("1x0"),
            Err(SubnetError::Codec(_))
        ));
    }

    #[test]
    fn test_shape_too_deep() {
        let deep = format!("{}{}", "1".repeat(33), "0".repeat(34));
        assert!(SubnetNode::deserialize_shape(&deep).is_err());
        let ok = format!("{}{}", "1".repeat(32), "0".repeat(33));
        let (node, rest) = SubnetNode::deserialize_shape(&ok).unwrap();
        assert_eq!(rest, "");
        assert_eq!(node.height(), 32);
    }
}
