use crate::language::{declared_names, flattened_children, node_text};
use tree_sitter::Node;

/// Where an identifier used as a call argument was declared
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Declaration<'t> {
    /// Function parameter, receiver or named result
    Parameter { type_node: Node<'t> },
    /// `var` or `const` specification; the type is absent when inferred
    Value { type_node: Option<Node<'t>> },
    /// Binding with no usable declared type
    Unclassifiable(&'static str),
}

const CAPTURED: &str = "captured by closure";
const ASSIGNED: &str = "assignment target";

/// Follow `ident` to its declaration within the same file
///
/// Scopes are searched innermost first: blocks (declarations before the use),
/// statement initializers, function literals, the enclosing function's
/// signature, then package-level declarations.
pub fn resolve<'t>(ident: Node<'t>, source: &[u8]) -> Declaration<'t> {
    let name = node_text(ident, source);
    let at = ident.start_byte();
    let mut captured = false;
    let mut current = ident;

    while let Some(scope) = current.parent() {
        let found = match scope.kind() {
            "block" | "expression_case" | "type_case" | "default_case" | "communication_case" => {
                find_in_block(scope, name, at, source)
            }
            "if_statement" | "expression_switch_statement" | "type_switch_statement" => {
                find_in_initializer(scope, name, source)
            }
            "for_statement" => find_in_for_header(scope, name, source),
            "func_literal" => {
                let own = find_in_signature(scope, name, source);
                if own.is_none() {
                    captured = true;
                }
                own
            }
            "function_declaration" | "method_declaration" => {
                match find_in_signature(scope, name, source) {
                    Some(decl) => Some(decl),
                    None => return find_in_package(name, source, scope),
                }
            }
            "source_file" => return find_in_package(name, source, scope),
            _ => None,
        };

        if let Some(decl) = found {
            if captured {
                return Declaration::Unclassifiable(CAPTURED);
            }
            return decl;
        }
        current = scope;
    }

    Declaration::Unclassifiable("unresolved identifier")
}

/// Last declaration of `name` in a block or case clause that starts before `at`
fn find_in_block<'t>(block: Node<'t>, name: &str, at: usize, source: &[u8]) -> Option<Declaration<'t>> {
    let mut found = None;
    for stmt in flattened_children(block) {
        if stmt.start_byte() >= at {
            break;
        }
        match stmt.kind() {
            "var_declaration" | "const_declaration" => {
                if let Some(decl) = find_value_spec(stmt, name, source) {
                    found = Some(decl);
                }
            }
            "short_var_declaration" => {
                if binds(stmt.child_by_field_name("left"), name, source) {
                    found = Some(Declaration::Unclassifiable(ASSIGNED));
                }
            }
            // `case v := <-ch:` in a select
            "receive_statement" if declares(stmt) => {
                if binds(stmt.child_by_field_name("left"), name, source) {
                    found = Some(Declaration::Unclassifiable(ASSIGNED));
                }
            }
            _ => {}
        }
    }
    found
}

fn declares(stmt: Node) -> bool {
    let mut cursor = stmt.walk();
    let short = stmt.children(&mut cursor).any(|c| c.kind() == ":=");
    short
}

fn find_value_spec<'t>(decl: Node<'t>, name: &str, source: &[u8]) -> Option<Declaration<'t>> {
    flattened_children(decl)
        .into_iter()
        .filter(|spec| matches!(spec.kind(), "var_spec" | "const_spec"))
        .find(|spec| has_name(*spec, name, source))
        .map(|spec| Declaration::Value {
            type_node: spec.child_by_field_name("type"),
        })
}

fn find_in_initializer<'t>(stmt: Node<'t>, name: &str, source: &[u8]) -> Option<Declaration<'t>> {
    let init_binds = stmt
        .child_by_field_name("initializer")
        .filter(|init| init.kind() == "short_var_declaration")
        .is_some_and(|init| binds(init.child_by_field_name("left"), name, source));
    let alias_binds = binds(stmt.child_by_field_name("alias"), name, source);

    (init_binds || alias_binds).then_some(Declaration::Unclassifiable(ASSIGNED))
}

fn find_in_for_header<'t>(stmt: Node<'t>, name: &str, source: &[u8]) -> Option<Declaration<'t>> {
    let mut cursor = stmt.walk();
    let header_binds = stmt.named_children(&mut cursor).any(|child| match child.kind() {
        "range_clause" => binds(child.child_by_field_name("left"), name, source),
        "for_clause" => child
            .child_by_field_name("initializer")
            .filter(|init| init.kind() == "short_var_declaration")
            .is_some_and(|init| binds(init.child_by_field_name("left"), name, source)),
        _ => false,
    });

    header_binds.then_some(Declaration::Unclassifiable(ASSIGNED))
}

/// Parameters, receiver and named results of a function or function literal
fn find_in_signature<'t>(func: Node<'t>, name: &str, source: &[u8]) -> Option<Declaration<'t>> {
    ["receiver", "parameters", "result"]
        .into_iter()
        .filter_map(|field| func.child_by_field_name(field))
        .filter(|list| list.kind() == "parameter_list")
        .find_map(|list| find_in_parameter_list(list, name, source))
}

fn find_in_parameter_list<'t>(list: Node<'t>, name: &str, source: &[u8]) -> Option<Declaration<'t>> {
    let mut cursor = list.walk();
    let params: Vec<_> = list.named_children(&mut cursor).collect();

    params
        .into_iter()
        .filter(|param| has_name(*param, name, source))
        .find_map(|param| match param.kind() {
            "parameter_declaration" => param
                .child_by_field_name("type")
                .map(|type_node| Declaration::Parameter { type_node }),
            "variadic_parameter_declaration" => {
                Some(Declaration::Unclassifiable("variadic parameter"))
            }
            _ => None,
        })
}

fn find_in_package<'t>(name: &str, source: &[u8], from: Node<'t>) -> Declaration<'t> {
    let mut root = from;
    while let Some(parent) = root.parent() {
        root = parent;
    }

    for decl in flattened_children(root) {
        match decl.kind() {
            "var_declaration" | "const_declaration" => {
                if let Some(found) = find_value_spec(decl, name, source) {
                    return found;
                }
            }
            "function_declaration" if has_name(decl, name, source) => {
                return Declaration::Unclassifiable("function value");
            }
            "type_declaration" => {
                let is_type = flattened_children(decl)
                    .into_iter()
                    .any(|spec| has_name(spec, name, source));
                if is_type {
                    return Declaration::Unclassifiable("type name");
                }
            }
            _ => {}
        }
    }

    Declaration::Unclassifiable("unresolved identifier")
}

fn has_name(node: Node, name: &str, source: &[u8]) -> bool {
    declared_names(node)
        .into_iter()
        .any(|n| node_text(n, source) == name)
}

/// Whether an expression list on the left of `:=` or `range` binds `name`
fn binds(list: Option<Node>, name: &str, source: &[u8]) -> bool {
    let Some(list) = list else {
        return false;
    };
    if list.kind() == "identifier" {
        return node_text(list, source) == name;
    }
    let mut cursor = list.walk();
    let bound = list
        .named_children(&mut cursor)
        .any(|n| n.kind() == "identifier" && node_text(n, source) == name);
    bound
}
