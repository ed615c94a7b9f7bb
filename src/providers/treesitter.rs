//! Symbol provider backed by tree-sitter grammars
//!
//! Parses the document text and keeps only the nodes that matter for
//! function size: callables (functions, methods, constructors) and the
//! class-like containers that nest them.

use super::language::{Language, NodeRole};
use super::SymbolProvider;
use crate::document::{Document, LineSource};
use crate::error::ProviderError;
use crate::models::{Position, Range, Symbol, SymbolKind};
use async_trait::async_trait;
use tracing::trace;
use tree_sitter::{Node, Parser, Point};

const ANONYMOUS: &str = "<anonymous>";

/// Parses documents on demand; no state is kept between calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeSitterProvider;

impl TreeSitterProvider {
    pub fn new() -> Self {
        Self
    }

    /// Parse `document` synchronously.
    ///
    /// Returns `Ok(None)` when the document's extension maps to no supported
    /// language.
    pub fn parse_symbols(&self, document: &Document) -> Result<Option<Vec<Symbol>>, ProviderError> {
        let Some(language) = document
            .extension()
            .as_deref()
            .and_then(Language::from_extension)
        else {
            return Ok(None);
        };
        parse_with(language, document).map(Some)
    }
}

#[async_trait]
impl SymbolProvider for TreeSitterProvider {
    async fn document_symbols(
        &self,
        document: &Document,
    ) -> Result<Option<Vec<Symbol>>, ProviderError> {
        let provider = *self;
        let document = document.clone();
        tokio::task::spawn_blocking(move || provider.parse_symbols(&document))
            .await
            .map_err(|e| ProviderError::Other(format!("parser task failed: {}", e)))?
    }
}

fn parse_with(language: Language, document: &Document) -> Result<Vec<Symbol>, ProviderError> {
    let mut parser = Parser::new();
    parser
        .set_language(&language.grammar())
        .map_err(|e| ProviderError::Grammar {
            language: language.name().to_string(),
            message: e.to_string(),
        })?;

    let tree = parser
        .parse(document.text(), None)
        .ok_or_else(|| ProviderError::ParseFailed(document.uri().to_string()))?;

    let walk = Walk {
        language,
        source: document.text().as_bytes(),
        document,
    };
    let mut symbols = Vec::new();
    walk.collect(tree.root_node(), None, &mut symbols);
    trace!(
        "{} top-level symbols in {} ({})",
        symbols.len(),
        document.uri(),
        language.name()
    );
    Ok(symbols)
}

struct Walk<'a> {
    language: Language,
    source: &'a [u8],
    document: &'a Document,
}

impl Walk<'_> {
    /// Append the symbols found below `node` to `out`.
    ///
    /// Nodes without a role are transparent: their descendants attach to the
    /// nearest enclosing symbol.
    fn collect(&self, node: Node<'_>, enclosing: Option<(NodeRole, &str)>, out: &mut Vec<Symbol>) {
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            match self.language.node_role(&child) {
                Some(role) => {
                    let symbol = self.build(&child, role, enclosing);
                    let mut nested = Vec::new();
                    self.collect(child, Some((role, symbol.name.as_str())), &mut nested);
                    out.push(symbol.with_children(nested));
                }
                None => self.collect(child, enclosing, out),
            }
        }
    }

    fn build(&self, node: &Node<'_>, role: NodeRole, enclosing: Option<(NodeRole, &str)>) -> Symbol {
        let name_node = self.language.name_node(node);
        let name = name_node
            .and_then(|n| n.utf8_text(self.source).ok())
            .unwrap_or(ANONYMOUS)
            .to_string();

        let full_range = Range::new(
            self.position(node.start_position()),
            self.position(node.end_position()),
        );
        let signature_start =
            self.position(name_node.map_or(node.start_position(), |n| n.start_position()));

        let (kind, signature_end) = match role {
            NodeRole::Container => (
                SymbolKind::Other,
                self.position(name_node.map_or(node.start_position(), |n| n.end_position())),
            ),
            NodeRole::Callable(base) => {
                let end = match self.language.body_node(node) {
                    Some(body) => self.position(
                        body.prev_sibling()
                            .map_or(body.start_position(), |prev| prev.end_position()),
                    ),
                    None => full_range.end,
                };
                (self.language.refine_kind(base, &name, enclosing), end)
            }
        };

        Symbol::new(
            name,
            kind,
            full_range,
            Range::new(signature_start, signature_end.max(signature_start)),
        )
    }

    /// Convert a tree-sitter point (byte column) to a UTF-16 column position.
    fn position(&self, point: Point) -> Position {
        let line = point.row as u32;
        let character = self
            .document
            .line(line)
            .and_then(|text| text.get(..point.column))
            .map_or(point.column, |prefix| prefix.encode_utf16().count());
        Position::new(line, character as u32)
    }
}
