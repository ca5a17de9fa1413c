//! Go grammar binding and node-kind classification.

use crate::error::{AugmentError, Result};
use tree_sitter::{Node, Parser};

/// Tree-sitter language instance for Go
pub fn go_language() -> tree_sitter::Language {
    tree_sitter_go::LANGUAGE.into()
}

/// Create a parser configured for Go
pub fn go_parser() -> Result<Parser> {
    let mut parser = Parser::new();
    parser
        .set_language(&go_language())
        .map_err(|e| AugmentError::tree_sitter(format!("Failed to set language: {e}")))?;
    Ok(parser)
}

/// Shape of the node the locator landed on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallSiteKind {
    /// Statement consisting of one expression
    ExpressionStatement,
    /// Call expression reached directly
    CallExpression,
    /// Enclosing function or method declaration
    FunctionDeclaration,
    Other,
}

impl CallSiteKind {
    #[must_use]
    pub fn of(node: Node) -> Self {
        match node.kind() {
            "expression_statement" => Self::ExpressionStatement,
            "call_expression" => Self::CallExpression,
            "function_declaration" | "method_declaration" => Self::FunctionDeclaration,
            _ => Self::Other,
        }
    }
}

/// Shape of one actual argument of a call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentKind {
    Identifier,
    /// Value embedded in the call text; the runtime prints no word for it
    Literal,
    Binary,
    Call,
    Other,
}

impl ArgumentKind {
    #[must_use]
    pub fn of(node: Node) -> Self {
        match node.kind() {
            "identifier" => Self::Identifier,
            "int_literal" | "float_literal" | "imaginary_literal" | "rune_literal"
            | "interpreted_string_literal" | "raw_string_literal" | "nil" | "true"
            | "false" | "iota" => Self::Literal,
            "binary_expression" => Self::Binary,
            "call_expression" => Self::Call,
            _ => Self::Other,
        }
    }
}

/// Node kinds that open a function scope
pub fn is_function_scope(kind: &str) -> bool {
    matches!(
        kind,
        "function_declaration" | "method_declaration" | "func_literal"
    )
}

/// Nodes the locator looks through: comments and grouping-only containers
pub fn is_transparent(node: Node) -> bool {
    node.is_extra() || matches!(node.kind(), "comment" | "statement_list")
}

/// Source text covered by `node`
pub fn node_text<'s>(node: Node, source: &'s [u8]) -> &'s str {
    node.utf8_text(source).unwrap_or_default()
}

/// Named children, with `statement_list` / `*_spec_list` containers flattened
pub fn flattened_children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut out = Vec::new();
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if matches!(
            child.kind(),
            "statement_list" | "var_spec_list" | "const_spec_list"
        ) {
            out.extend(flattened_children(child));
        } else if child.kind() != "comment" {
            out.push(child);
        }
    }
    out
}

/// Identifier nodes held in the `name` field(s) of `node`
pub fn declared_names<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    let names = node.children_by_field_name("name", &mut cursor).collect();
    names
}
