//! Property tests for address math, the division tree and the share token

use proptest::prelude::*;
use subnet_calc::models::{format_address, last_address, parse_address, Ipv4, SubnetNode};
use subnet_calc::processing::{pack, unpack, Tree};

/// A walk of divide/join steps. Each step picks a leaf (divide) or an
/// enclosing group (join) by index, modulo what exists at that moment.
fn apply_steps(tree: &mut Tree, steps: &[(bool, usize)]) {
    for &(divide, pick) in steps {
        let leaves = tree.leaves().unwrap();
        let leaf = leaves[pick % leaves.len()].subnet;
        if divide {
            // /32 leaves refuse, which is fine for the walk
            let _ = tree.divide(&leaf);
        } else {
            let groups = tree.join_groups(&leaf).unwrap();
            let group = groups[pick % groups.len()].subnet;
            let _ = tree.join(&group);
        }
    }
}

fn check_counts(node: &SubnetNode) -> usize {
    match node.children() {
        None => {
            assert_eq!(node.leaf_count(), 1);
            assert_eq!(node.height(), 0);
            1
        }
        Some((left, right)) => {
            let total = check_counts(left) + check_counts(right);
            assert_eq!(node.leaf_count(), total);
            assert_eq!(node.height(), 1 + left.height().max(right.height()));
            total
        }
    }
}

proptest! {
    /// Property: dotted-quad formatting and parsing round trip
    #[test]
    fn address_round_trip(addr in any::<u32>()) {
        prop_assert_eq!(parse_address(&format_address(addr)).unwrap(), addr);
    }

    /// Property: the token round trip reproduces the shape exactly
    #[test]
    fn token_round_trip(
        mask in 0u8..=30,
        steps in prop::collection::vec((any::<bool>(), any::<usize>()), 0..40),
    ) {
        let base = Ipv4::from_parts(0x0A00_0000, mask).aligned().unwrap();
        let mut tree = Tree::new(base).unwrap();
        apply_steps(&mut tree, &steps);

        let shape = tree.shape();
        prop_assert_eq!(unpack(&pack(&shape)).unwrap(), shape.clone());

        let restored = Tree::try_from_token(base, &tree.to_token()).unwrap();
        prop_assert_eq!(&restored, &tree);
        prop_assert_eq!(restored.metrics(), tree.metrics());
    }

    /// Property: leaves partition the base block and match the leaf count
    #[test]
    fn leaves_partition_base(
        mask in 0u8..=32,
        steps in prop::collection::vec((any::<bool>(), any::<usize>()), 0..40),
    ) {
        let base = Ipv4::from_parts(0xC0A8_0000, mask).aligned().unwrap();
        let mut tree = Tree::new(base).unwrap();
        apply_steps(&mut tree, &steps);

        let leaves = tree.leaves().unwrap();
        prop_assert_eq!(leaves.len(), tree.metrics().leaf_count);
        prop_assert_eq!(check_counts(tree.root()), leaves.len());

        let mut next = u64::from(base.bits());
        for row in &leaves {
            prop_assert_eq!(u64::from(row.network()), next);
            next += row.total_addresses;
        }
        let last = last_address(base.bits(), base.mask).unwrap();
        prop_assert_eq!(next, u64::from(last) + 1);
    }

    /// Property: joining a freshly divided leaf restores a leaf
    #[test]
    fn divide_then_join_is_identity(mask in 0u8..32) {
        let base = Ipv4::from_parts(0, mask);
        let mut tree = Tree::new(base).unwrap();
        let before = tree.clone();
        tree.divide(&base).unwrap();
        tree.join(&base).unwrap();
        prop_assert_eq!(tree, before);
    }
}
