//! Mutable phylogenetic trees with correct distance bookkeeping.
//!
//! Purpose
//! -------
//! Parse a Newick-format sequence-similarity hierarchy, prepare its taxon
//! set for binning (prune unwanted leaves, reroot at a named outgroup), and
//! serialize it back. The tree is the first stage of the estimation
//! pipeline; once the taxon set has been consumed the tree is discarded.
//!
//! Key behaviors
//! -------------
//! - Arena storage: nodes live in a `Vec` and reference each other by plain
//!   [`NodeId`] indices. Parent links are non-owning index fields, children
//!   are owned index lists, and structural edits are index rewiring. Nodes
//!   detached by an edit stay in the arena as unreachable tombstones.
//! - [`Tree::prune`] removes a leaf and its (assumed binary) parent,
//!   promoting the sibling to the grandparent with summed distance.
//! - [`Tree::reroot`] builds a new root over a named outgroup leaf,
//!   reversing the parent/child edges along the path to the old root and
//!   redistributing branch distances.
//! - Children are sorted with a total order (leaf name lexically, then
//!   distance, then subtree recursion) after every parse, so equal trees
//!   serialize identically.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every non-root node reachable from the root has exactly one parent;
//!   internal nodes have at least two children; a tree accepted for
//!   analysis has at least two children of the root.
//! - `prune` assumes strictly binary internal nodes, as the original data
//!   preparation guarantees.
//! - `reroot`'s distance redistribution assumes the tree is effectively
//!   rooted at the midpoint of the outgroup edge; for other inputs the
//!   leaf-to-leaf metric along the reattachment path is not preserved.
//!   Callers must verify this for their data.
//! - Edits mutate in place and are not rolled back; a structural error
//!   leaves the tree undefined and the caller must discard it.
//!
//! Testing notes
//! -------------
//! - Unit tests cover the parse error taxonomy, prune bookkeeping, reroot
//!   leaf-set preservation and idempotence, and deterministic ordering.
//! - A property test pins the parse/serialize round-trip law.

pub mod errors;
pub mod newick;
pub mod node;

pub use errors::{NewickError, TreeResult};
pub use node::{Node, NodeId};

use std::cmp::Ordering;

/// A rooted phylogenetic tree over an arena of [`Node`]s.
#[derive(Debug, Clone)]
pub struct Tree {
    arena: Vec<Node>,
    root: NodeId,
}

impl Tree {
    /// Parse a Newick-formatted tree text.
    ///
    /// Only the text before the first `;` is honored. Children are sorted
    /// deterministically after the parse.
    ///
    /// # Errors
    /// - [`NewickError::EmptyTree`] if no tree text is present.
    /// - [`NewickError::UnbalancedParentheses`] on unmatched parentheses.
    /// - [`NewickError::InvalidDistance`] on a non-numeric distance field.
    /// - [`NewickError::NotEnoughLeaves`] if the parsed root has one child
    ///   or fewer.
    pub fn parse(text: &str) -> TreeResult<Self> {
        let mut arena = Vec::new();
        let root = newick::parse_into(text, &mut arena)?;
        let mut tree = Tree { arena, root };
        let found = tree.arena[tree.root].children().len();
        if found <= 1 {
            return Err(NewickError::NotEnoughLeaves { found });
        }
        tree.sort_children_rec(tree.root);
        Ok(tree)
    }

    /// Serialize this tree as Newick text with a trailing semicolon.
    pub fn to_newick(&self) -> String {
        let mut out = String::new();
        newick::write_node(&self.arena, self.root, &mut out);
        out.push(';');
        out
    }

    /// Arena index of the root.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The node stored at `id`.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.arena[id]
    }

    /// Leaf nodes reachable from the root, in traversal order.
    pub fn leaves(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_leaves(self.root, &mut out);
        out
    }

    /// Names of all reachable leaves, in traversal order.
    pub fn leaf_names(&self) -> Vec<String> {
        self.leaves()
            .into_iter()
            .map(|id| self.arena[id].name().to_string())
            .collect()
    }

    /// Number of leaves reachable from the root.
    pub fn leaf_count(&self) -> usize {
        self.leaves().len()
    }

    /// First reachable leaf carrying `name`.
    pub fn find_leaf(&self, name: &str) -> Option<NodeId> {
        self.leaves()
            .into_iter()
            .find(|&id| self.arena[id].name() == name)
    }

    /// Sum of branch distances over all reachable nodes.
    pub fn total_distance(&self) -> f64 {
        let mut sum = 0.0;
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            sum += self.arena[id].distance();
            stack.extend_from_slice(self.arena[id].children());
        }
        sum
    }

    /// Remove a leaf from the tree.
    ///
    /// No-op unless `leaf` is a non-root leaf. The leaf's parent is removed
    /// with it: the sibling is promoted to the grandparent and its distance
    /// becomes the sum of its own and the removed parent's distance. If the
    /// parent was the root, the sibling becomes the new root.
    pub fn prune(&mut self, leaf: NodeId) {
        if !self.arena[leaf].is_leaf() {
            return;
        }
        let parent = match self.arena[leaf].parent() {
            Some(p) => p,
            None => return,
        };
        self.arena[parent].remove_child(leaf);
        self.arena[leaf].set_parent(None);
        let other = match self.arena[parent].children().first() {
            Some(&c) => c,
            None => return,
        };
        let promoted = self.arena[other].distance() + self.arena[parent].distance();
        self.arena[other].set_distance(promoted);
        if parent == self.root {
            self.arena[other].set_parent(None);
            self.root = other;
        } else {
            let grandparent = match self.arena[parent].parent() {
                Some(g) => g,
                None => return,
            };
            self.arena[grandparent].remove_child(parent);
            self.attach(grandparent, other);
        }
        // Leave the removed parent as a clean tombstone.
        self.arena[parent].set_parent(None);
        self.arena[parent].children_mut().clear();
    }

    /// Remove the leaf carrying `name`.
    ///
    /// # Errors
    /// [`NewickError::UnknownLeaf`] if no reachable leaf has that name.
    pub fn prune_by_name(&mut self, name: &str) -> TreeResult<()> {
        let leaf = self
            .find_leaf(name)
            .ok_or_else(|| NewickError::UnknownLeaf { name: name.to_string() })?;
        self.prune(leaf);
        Ok(())
    }

    /// Reroot the tree so the outgroup leaf sits next to the root.
    ///
    /// A new root is created whose children are the outgroup (at half its
    /// original distance, outgroup flag set) and the refactored remainder of
    /// the old tree: each edge on the path from the outgroup's parent to the
    /// old root is reversed and inherits the distance of the edge it
    /// replaces, and the old root's remaining children are reattached with
    /// the accumulated path distance. No-op if `outgroup` is the root.
    pub fn reroot(&mut self, outgroup: NodeId) {
        let mut old_parent = match self.arena[outgroup].parent() {
            Some(p) => p,
            None => return,
        };
        let new_root = self.arena.len();
        self.arena.push(Node::new());

        self.arena[old_parent].remove_child(outgroup);
        self.attach(new_root, outgroup);
        let mut distance = self.arena[outgroup].distance() * 0.5;
        let mut old_distance = self.arena[old_parent].distance();
        self.arena[outgroup].set_distance(distance);
        self.arena[outgroup].set_outgroup(true);
        self.arena[old_parent].set_distance(distance);

        let mut new_parent = new_root;
        while old_parent != self.root {
            let next = match self.arena[old_parent].parent() {
                Some(p) => p,
                None => break,
            };
            let node = old_parent;
            old_parent = next;
            self.arena[old_parent].remove_child(node);
            self.attach(new_parent, node);
            new_parent = node;
            self.arena[node].set_distance(distance);
            distance = old_distance;
            old_distance = self.arena[old_parent].distance();
        }
        let remaining = self.arena[old_parent].children().to_vec();
        for child in remaining {
            self.attach(new_parent, child);
            distance += self.arena[child].distance();
            self.arena[child].set_distance(distance);
        }
        self.arena[old_parent].children_mut().clear();
        self.root = new_root;
    }

    /// Reroot at the leaf carrying `name`.
    ///
    /// # Errors
    /// [`NewickError::UnknownLeaf`] if no reachable leaf has that name.
    pub fn reroot_by_name(&mut self, name: &str) -> TreeResult<()> {
        let leaf = self
            .find_leaf(name)
            .ok_or_else(|| NewickError::UnknownLeaf { name: name.to_string() })?;
        self.reroot(leaf);
        Ok(())
    }

    /// Total order over trees: root subtrees compared recursively by leaf
    /// name, then distance, then child lists.
    pub fn cmp_trees(&self, other: &Self) -> Ordering {
        cmp_across(&self.arena, self.root, &other.arena, other.root)
    }

    fn attach(&mut self, parent: NodeId, child: NodeId) {
        self.arena[child].set_parent(Some(parent));
        self.arena[parent].push_child(child);
    }

    fn collect_leaves(&self, id: NodeId, out: &mut Vec<NodeId>) {
        if self.arena[id].is_leaf() {
            out.push(id);
            return;
        }
        for &child in self.arena[id].children() {
            self.collect_leaves(child, out);
        }
    }

    fn sort_children_rec(&mut self, id: NodeId) {
        let children = self.arena[id].children().to_vec();
        for &child in &children {
            self.sort_children_rec(child);
        }
        let mut sorted = children;
        let arena = &self.arena;
        sorted.sort_by(|&a, &b| cmp_subtree(arena, a, b));
        *self.arena[id].children_mut() = sorted;
    }
}

impl PartialEq for Tree {
    fn eq(&self, other: &Self) -> bool {
        self.cmp_trees(other) == Ordering::Equal
    }
}

fn cmp_subtree(arena: &[Node], a: NodeId, b: NodeId) -> Ordering {
    cmp_across(arena, a, arena, b)
}

fn cmp_across(arena_a: &[Node], a: NodeId, arena_b: &[Node], b: NodeId) -> Ordering {
    let node_a = &arena_a[a];
    let node_b = &arena_b[b];
    node_a
        .cmp_shallow(node_b)
        .then_with(|| node_a.children().len().cmp(&node_b.children().len()))
        .then_with(|| {
            for (&ca, &cb) in node_a.children().iter().zip(node_b.children()) {
                let ord = cmp_across(arena_a, ca, arena_b, cb);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            Ordering::Equal
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - The parse error taxonomy (unbalanced parentheses, bad distance,
    //   empty input, too few leaves).
    // - The round-trip law: parse -> serialize -> parse is the identity.
    // - Prune bookkeeping: leaf count and branch-distance conservation.
    // - Reroot: leaf set preserved, outgroup flagged, idempotence.
    // - Deterministic child ordering across sibling permutations.
    // -------------------------------------------------------------------------

    const SMALL: &str = "((A:0.1,B:0.2):0.05,(C:0.3,D:0.4):0.06):0.0;";

    #[test]
    fn parse_rejects_unbalanced_parentheses() {
        assert_eq!(
            Tree::parse("((A:0.1,B:0.2):0.05;"),
            Err(NewickError::UnbalancedParentheses)
        );
    }

    #[test]
    fn parse_rejects_non_numeric_distance() {
        assert_eq!(
            Tree::parse("(A:0.1,B:oops);"),
            Err(NewickError::InvalidDistance { text: "oops".to_string() })
        );
    }

    #[test]
    fn parse_rejects_empty_input() {
        assert_eq!(Tree::parse("  ;"), Err(NewickError::EmptyTree));
    }

    #[test]
    fn parse_rejects_single_leaf() {
        assert_eq!(Tree::parse("A:0.5;"), Err(NewickError::NotEnoughLeaves { found: 0 }));
    }

    #[test]
    fn parse_honors_only_first_tree() {
        let tree = Tree::parse("(A:0.1,B:0.2):0.0;(C:1,D:1):0.0;").unwrap();
        assert_eq!(tree.leaf_names(), vec!["A", "B"]);
    }

    #[test]
    fn round_trip_preserves_structure() {
        let first = Tree::parse(SMALL).unwrap();
        let second = Tree::parse(&first.to_newick()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn children_order_is_deterministic() {
        let permuted = "((D:0.4,C:0.3):0.06,(B:0.2,A:0.1):0.05):0.0;";
        let a = Tree::parse(SMALL).unwrap();
        let b = Tree::parse(permuted).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_newick(), b.to_newick());
    }

    #[test]
    fn prune_removes_exactly_one_leaf() {
        let mut tree = Tree::parse(SMALL).unwrap();
        let before = tree.leaf_count();
        tree.prune_by_name("C").unwrap();
        assert_eq!(tree.leaf_count(), before - 1);
        assert!(tree.find_leaf("C").is_none());
    }

    #[test]
    fn prune_conserves_remaining_distances() {
        let mut tree = Tree::parse(SMALL).unwrap();
        let before = tree.total_distance();
        let pruned = tree.node(tree.find_leaf("C").unwrap()).distance();
        tree.prune_by_name("C").unwrap();
        // The sibling absorbs the removed parent's distance, so the total
        // drops by exactly the pruned leaf's own contribution.
        assert!((tree.total_distance() - (before - pruned)).abs() < 1e-12);
    }

    #[test]
    fn prune_promotes_sibling_to_root() {
        let mut tree = Tree::parse("(A:0.1,(B:0.2,C:0.3):0.4):0.0;").unwrap();
        tree.prune_by_name("A").unwrap();
        assert_eq!(tree.leaf_names(), vec!["B", "C"]);
        let root = tree.node(tree.root());
        assert!(root.parent().is_none());
        assert!((root.distance() - 0.4).abs() < 1e-12);
    }

    #[test]
    fn prune_unknown_leaf_is_an_error() {
        let mut tree = Tree::parse(SMALL).unwrap();
        assert_eq!(
            tree.prune_by_name("Z"),
            Err(NewickError::UnknownLeaf { name: "Z".to_string() })
        );
    }

    #[test]
    fn reroot_preserves_leaf_set_and_flags_outgroup() {
        let mut tree = Tree::parse(SMALL).unwrap();
        let mut names_before = tree.leaf_names();
        names_before.sort();
        tree.reroot_by_name("D").unwrap();
        let mut names_after = tree.leaf_names();
        names_after.sort();
        assert_eq!(names_before, names_after);
        let outgroup = tree.find_leaf("D").unwrap();
        assert!(tree.node(outgroup).is_outgroup());
        assert_eq!(tree.node(outgroup).parent(), Some(tree.root()));
    }

    #[test]
    fn reroot_twice_at_same_leaf_preserves_leaf_set() {
        let mut tree = Tree::parse(SMALL).unwrap();
        tree.reroot_by_name("D").unwrap();
        let once = tree.leaf_names();
        tree.reroot_by_name("D").unwrap();
        let twice = tree.leaf_names();
        let (mut once, mut twice) = (once, twice);
        once.sort();
        twice.sort();
        assert_eq!(once, twice);
    }

    #[test]
    fn reroot_halves_outgroup_distance() {
        let mut tree = Tree::parse(SMALL).unwrap();
        let original = tree.node(tree.find_leaf("D").unwrap()).distance();
        tree.reroot_by_name("D").unwrap();
        let rerooted = tree.node(tree.find_leaf("D").unwrap()).distance();
        assert!((rerooted - original * 0.5).abs() < 1e-12);
    }

    fn leaf_texts() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec(
            ("[a-z]{1,8}", 0.0f64..10.0).prop_map(|(name, d)| format!("{name}:{d}")),
            2..16,
        )
    }

    proptest! {
        // Round-trip law on left-deep random trees: parsing the serialized
        // form of a parsed tree yields the same tree.
        #[test]
        fn round_trip_law(leaves in leaf_texts()) {
            let mut text = leaves[0].clone();
            for next in &leaves[1..] {
                text = format!("({text},{next}):0.5");
            }
            text.push(';');
            let first = Tree::parse(&text).unwrap();
            let second = Tree::parse(&first.to_newick()).unwrap();
            prop_assert!(first == second);
        }
    }
}
