//! Newick text parsing and serialization.
//!
//! Purpose
//! -------
//! Translate between nested-parenthesis Newick text and the arena
//! representation in [`Tree`](crate::phylogeny::Tree). The grammar is
//!
//! ```text
//! tree  := '(' child (',' child)* ')' meta?
//! child := tree | meta
//! meta  := name? (':' distance)?
//! ```
//!
//! Key behaviors
//! -------------
//! - Recursive descent: a node opening with `(` scans to its balanced
//!   closing parenthesis, splits the enclosed text on top-level commas
//!   (commas inside nested parentheses never split), and recurses into each
//!   sibling; the text after the closing parenthesis is the node's own meta.
//! - Leaf versus internal is a structural check (leading parenthesis), never
//!   inferred from a failed parse.
//! - Serialization emits `name:distance` meta for every node and a trailing
//!   semicolon, so parse-serialize-parse is the identity on structure and
//!   distances.
//!
//! Invariants & assumptions
//! ------------------------
//! - Input whitespace is stripped before parsing and only the text before
//!   the first `;` is honored (tree files may concatenate several trees).
//! - Malformed input fails with a [`NewickError`]; no partial arena escapes
//!   a failed parse because the caller discards it.

use crate::phylogeny::errors::{NewickError, TreeResult};
use crate::phylogeny::node::{Node, NodeId};

/// Parse the tree text into `arena`, returning the root index.
///
/// `arena` must be empty; all nodes of the parse land in it.
pub(crate) fn parse_into(text: &str, arena: &mut Vec<Node>) -> TreeResult<NodeId> {
    // Only the first tree of a concatenated file is honored.
    let tree = match text.split_once(';') {
        Some((first, _)) => first,
        None => text,
    };
    let cleaned: String = tree.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.is_empty() {
        return Err(NewickError::EmptyTree);
    }
    parse_node(&cleaned, arena)
}

fn parse_node(text: &str, arena: &mut Vec<Node>) -> TreeResult<NodeId> {
    let id = arena.len();
    arena.push(Node::new());

    let meta = if text.starts_with('(') {
        let close = matching_paren(text)?;
        let inner = &text[1..close];
        // Split the enclosed text on top-level commas only.
        let mut depth = 0usize;
        let mut start = 0usize;
        for (i, c) in inner.char_indices() {
            match c {
                '(' => depth += 1,
                ')' => {
                    depth = depth
                        .checked_sub(1)
                        .ok_or(NewickError::UnbalancedParentheses)?;
                }
                ',' if depth == 0 => {
                    let child = parse_node(&inner[start..i], arena)?;
                    attach(arena, id, child);
                    start = i + 1;
                }
                _ => {}
            }
        }
        let child = parse_node(&inner[start..], arena)?;
        attach(arena, id, child);
        &text[close + 1..]
    } else {
        text
    };

    if !meta.is_empty() {
        let (name, distance) = match meta.split_once(':') {
            Some((name, distance)) => (name, Some(distance)),
            None => (meta, None),
        };
        if !name.is_empty() {
            arena[id].set_name(name.to_string());
        }
        if let Some(distance) = distance {
            let parsed: f64 = distance
                .parse()
                .map_err(|_| NewickError::InvalidDistance { text: distance.to_string() })?;
            arena[id].set_distance(parsed);
        }
    }
    Ok(id)
}

/// Index of the `)` matching the `(` at position 0.
fn matching_paren(text: &str) -> TreeResult<usize> {
    let mut open = 0usize;
    for (i, c) in text.char_indices() {
        match c {
            '(' => open += 1,
            ')' => {
                open -= 1;
                if open == 0 {
                    return Ok(i);
                }
            }
            _ => {}
        }
    }
    Err(NewickError::UnbalancedParentheses)
}

fn attach(arena: &mut [Node], parent: NodeId, child: NodeId) {
    arena[child].set_parent(Some(parent));
    arena[parent].push_child(child);
}

/// Serialize the subtree under `id` into `out`, without the semicolon.
pub(crate) fn write_node(arena: &[Node], id: NodeId, out: &mut String) {
    let node = &arena[id];
    if !node.is_leaf() {
        out.push('(');
        for (i, &child) in node.children().iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            write_node(arena, child, out);
        }
        out.push(')');
    }
    out.push_str(node.name());
    out.push(':');
    // f64 Display is the shortest decimal form that round-trips.
    out.push_str(&format!("{}", node.distance()));
}
