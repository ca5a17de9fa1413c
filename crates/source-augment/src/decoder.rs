use crate::cache::ParsedSource;
use crate::error::{AugmentError, Result};
use crate::language::{
    declared_names, is_function_scope, node_text, ArgumentKind, CallSiteKind,
};
use crate::resolve::{resolve, Declaration};
use crate::rules::TypeRule;
use crate::type_name::base_name;
use stack_model::{Arg, Call};
use tree_sitter::Node;

/// Appended to `processed` when an argument's declaration has no usable type
pub const UNCLASSIFIABLE_MARKER: &str = "<unclassifiable>";

/// Result of decoding one call
#[derive(Debug)]
pub enum DecodeOutcome {
    /// Every argument was handled (the list may be empty)
    Decoded(Vec<String>),
    /// The located node is not something the decoder understands
    Skipped(AugmentError),
    /// Decoding stopped at `error`; `partial` holds what came before it
    Failed {
        partial: Vec<String>,
        error: AugmentError,
    },
}

/// Cursor over the raw words of a call
///
/// Kept apart from the argument index because one argument can span
/// several words.
struct WordCursor<'a> {
    values: &'a [Arg],
    next: usize,
}

impl<'a> WordCursor<'a> {
    const fn new(values: &'a [Arg]) -> Self {
        Self { values, next: 0 }
    }

    fn take(&mut self, count: usize) -> Option<Vec<u64>> {
        let words = self.values.get(self.next..self.next + count)?;
        self.next += count;
        Some(words.iter().map(|a| a.value).collect())
    }

    const fn remaining(&self) -> usize {
        self.values.len() - self.next
    }
}

/// Turns the raw words of a call into typed strings using the source file
pub struct ArgumentDecoder<'a> {
    file: &'a ParsedSource,
    signature_completion: bool,
}

impl<'a> ArgumentDecoder<'a> {
    #[must_use]
    pub const fn new(file: &'a ParsedSource, signature_completion: bool) -> Self {
        Self {
            file,
            signature_completion,
        }
    }

    /// Decode `call` against the node the locator found for it
    pub fn decode(&self, node: Node, call: &Call) -> DecodeOutcome {
        match CallSiteKind::of(node) {
            CallSiteKind::ExpressionStatement => {
                match node.named_child(0).filter(|n| n.kind() == "call_expression") {
                    Some(call_expr) => self.decode_call_site(call_expr, call),
                    None => DecodeOutcome::Skipped(AugmentError::UnhandledNode {
                        kind: format!(
                            "expression_statement({})",
                            node.named_child(0).map_or("empty", |n| n.kind())
                        ),
                    }),
                }
            }
            CallSiteKind::CallExpression => self.decode_call_site(node, call),
            CallSiteKind::FunctionDeclaration => {
                self.log_parameters(node);
                DecodeOutcome::Decoded(Vec::new())
            }
            CallSiteKind::Other => DecodeOutcome::Skipped(AugmentError::UnhandledNode {
                kind: node.kind().to_string(),
            }),
        }
    }

    fn decode_call_site(&self, call_expr: Node, call: &Call) -> DecodeOutcome {
        let source = self.file.source();
        let callee = call_expr
            .child_by_field_name("function")
            .map_or("?", |f| node_text(f, source));
        log::debug!("Call {callee} ({} raw words)", call.args.values.len());

        let mut words = WordCursor::new(&call.args.values);
        let mut processed = Vec::new();

        let arguments = call_expr
            .child_by_field_name("arguments")
            .map(|list| {
                let mut cursor = list.walk();
                let args: Vec<_> = list
                    .named_children(&mut cursor)
                    .filter(|n| !n.is_extra())
                    .collect();
                args
            })
            .unwrap_or_default();

        for arg in arguments {
            match ArgumentKind::of(arg) {
                ArgumentKind::Identifier => {
                    let name = node_text(arg, source);
                    let type_node = match resolve(arg, source) {
                        Declaration::Parameter { type_node }
                        | Declaration::Value {
                            type_node: Some(type_node),
                        } => type_node,
                        Declaration::Value { type_node: None } => {
                            return unclassifiable(processed, name, "untyped value declaration");
                        }
                        Declaration::Unclassifiable(reason) => {
                            return unclassifiable(processed, name, reason);
                        }
                    };
                    if let Err(error) = self.decode_typed(type_node, &mut words, &mut processed) {
                        return DecodeOutcome::Failed {
                            partial: processed,
                            error,
                        };
                    }
                }
                ArgumentKind::Literal | ArgumentKind::Binary | ArgumentKind::Call => {
                    log::debug!("  {}: {}", arg.kind(), node_text(arg, source));
                }
                ArgumentKind::Other => {
                    return DecodeOutcome::Failed {
                        partial: processed,
                        error: AugmentError::UnhandledArgument {
                            kind: arg.kind().to_string(),
                        },
                    };
                }
            }
        }

        if words.remaining() > 0 && self.signature_completion {
            if let Some(func) = enclosing_function(call_expr) {
                self.check_frame(func, call);
                match self.decode_signature(func, call) {
                    Ok(signature) => return DecodeOutcome::Decoded(signature),
                    Err(err) => log::debug!("Signature of enclosing function not decodable: {err}"),
                }
            }
        }

        DecodeOutcome::Decoded(processed)
    }

    /// Decode the frame's own receiver and parameters in declaration order
    fn decode_signature(&self, func: Node, call: &Call) -> Result<Vec<String>> {
        let source = self.file.source();
        let mut words = WordCursor::new(&call.args.values);
        let mut processed = Vec::new();

        for list in ["receiver", "parameters"]
            .into_iter()
            .filter_map(|field| func.child_by_field_name(field))
        {
            let mut cursor = list.walk();
            let params: Vec<_> = list
                .named_children(&mut cursor)
                .filter(|n| !n.is_extra())
                .collect();

            for param in params {
                match param.kind() {
                    "parameter_declaration" => {
                        let type_node = param.child_by_field_name("type").ok_or_else(|| {
                            AugmentError::UnsupportedType {
                                kind: "parameter_declaration".to_string(),
                            }
                        })?;
                        // `a, b int` declares two arguments; `int` alone one.
                        let count = declared_names(param).len().max(1);
                        for _ in 0..count {
                            self.decode_typed(type_node, &mut words, &mut processed)?;
                        }
                    }
                    "variadic_parameter_declaration" => {
                        return Err(AugmentError::Unclassifiable {
                            name: node_text(param, source).to_string(),
                            reason: "variadic parameter",
                        });
                    }
                    other => {
                        return Err(AugmentError::UnhandledArgument {
                            kind: other.to_string(),
                        })
                    }
                }
            }
        }

        Ok(processed)
    }

    fn decode_typed(
        &self,
        type_node: Node,
        words: &mut WordCursor,
        processed: &mut Vec<String>,
    ) -> Result<()> {
        let name = base_name(type_node, self.file.source())?;
        let rule = TypeRule::for_name(&name);
        let available = words.remaining();
        let raw = words
            .take(rule.words())
            .ok_or_else(|| AugmentError::MissingWords {
                type_name: name.clone(),
                needed: rule.words(),
                available,
            })?;

        processed.push(rule.format(&name, &raw));
        Ok(())
    }

    fn check_frame(&self, func: Node, call: &Call) {
        if func.kind() == "func_literal" {
            return;
        }
        if let Some(name) = func.child_by_field_name("name") {
            let declared = node_text(name, self.file.source());
            if declared != call.function_name() {
                log::debug!(
                    "Frame {} resolved to enclosing function {declared}",
                    call.func
                );
            }
        }
    }

    fn log_parameters(&self, func: Node) {
        if !log::log_enabled!(log::Level::Debug) {
            return;
        }
        let source = self.file.source();
        let name = func
            .child_by_field_name("name")
            .map_or("?", |n| node_text(n, source));
        log::debug!("Function declaration {name}");

        if let Some(params) = func.child_by_field_name("parameters") {
            let mut cursor = params.walk();
            for param in params.named_children(&mut cursor) {
                let ty = param
                    .child_by_field_name("type")
                    .map_or("?", |t| node_text(t, source));
                log::debug!("  param {}: {ty}", param.kind());
            }
        }
    }
}

fn unclassifiable(mut processed: Vec<String>, name: &str, reason: &'static str) -> DecodeOutcome {
    processed.push(UNCLASSIFIABLE_MARKER.to_string());
    DecodeOutcome::Failed {
        partial: processed,
        error: AugmentError::Unclassifiable {
            name: name.to_string(),
            reason,
        },
    }
}

/// Innermost function, method or function literal containing `node`
fn enclosing_function(node: Node) -> Option<Node> {
    let mut current = node.parent();
    while let Some(n) = current {
        if is_function_scope(n.kind()) {
            return Some(n);
        }
        current = n.parent();
    }
    None
}
