use crate::error::{AugmentError, Result};
use crate::language::node_text;
use tree_sitter::Node;

/// Reduce a type expression to the name that selects a decoding rule
///
/// One leading pointer and one package qualifier are stripped, so `*Foo`,
/// `pkg.Foo` and `*pkg.Foo` all give `Foo`. What remains must be a bare type
/// identifier.
pub fn base_name(type_node: Node, source: &[u8]) -> Result<String> {
    let mut node = unparen(type_node);

    if node.kind() == "pointer_type" {
        node = node
            .named_child(0)
            .map(unparen)
            .ok_or_else(|| unsupported(node))?;
    }

    if node.kind() == "qualified_type" {
        node = node
            .child_by_field_name("name")
            .ok_or_else(|| unsupported(node))?;
    }

    match node.kind() {
        "type_identifier" | "identifier" => Ok(node_text(node, source).to_string()),
        _ => Err(unsupported(node)),
    }
}

fn unparen(mut node: Node) -> Node {
    while node.kind() == "parenthesized_type" {
        match node.named_child(0) {
            Some(inner) => node = inner,
            None => break,
        }
    }
    node
}

fn unsupported(node: Node) -> AugmentError {
    AugmentError::UnsupportedType {
        kind: node.kind().to_string(),
    }
}
