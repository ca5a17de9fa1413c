use crate::language::is_transparent;
use tree_sitter::{Node, Tree};

/// Find the node a stack-trace line points at
///
/// Returns the first node, in pre-order (parents before children), whose
/// start byte is at or after `offset`. Comments and grouping-only containers
/// are looked through. Stack-trace lines mark the line holding the call, so
/// the match is either the call's statement or the enclosing declaration.
pub fn locate(tree: &Tree, offset: usize) -> Option<Node<'_>> {
    let mut cursor = tree.walk();

    loop {
        let node = cursor.node();
        if node.is_named() && !is_transparent(node) && node.start_byte() >= offset {
            return Some(node);
        }

        // Subtrees ending before the offset cannot hold a match.
        let descend = node.end_byte() > offset || node.start_byte() >= offset;
        if descend && cursor.goto_first_child() {
            continue;
        }

        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return None;
            }
        }
    }
}
