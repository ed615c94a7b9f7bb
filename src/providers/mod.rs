//! Symbol tree providers
//!
//! The metric engine never parses source code. It asks a [`SymbolProvider`]
//! for the tree of named, ranged constructs in a document:
//! - [`TreeSitterProvider`] parses the document text with tree-sitter
//! - [`StaticProvider`] replays a fixed tree, e.g. `DocumentSymbol` JSON
//!   exported from another language server

mod language;
mod treesitter;

pub use language::Language;
pub use treesitter::TreeSitterProvider;

use crate::document::Document;
use crate::error::ProviderError;
use crate::models::Symbol;
use async_trait::async_trait;
use tower_lsp::lsp_types::{DocumentSymbol, DocumentSymbolResponse};

/// Source of symbol trees.
///
/// `Ok(None)` means the provider has nothing for this document (unsupported
/// language, not ready yet). Callers treat it the same as an empty tree.
#[async_trait]
pub trait SymbolProvider: Send + Sync {
    async fn document_symbols(
        &self,
        document: &Document,
    ) -> Result<Option<Vec<Symbol>>, ProviderError>;
}

/// Provider that returns the same tree for every document.
#[derive(Debug, Clone, Default)]
pub struct StaticProvider {
    symbols: Vec<Symbol>,
}

impl StaticProvider {
    pub fn new(symbols: Vec<Symbol>) -> Self {
        Self { symbols }
    }

    /// Build from a `textDocument/documentSymbol` response body.
    ///
    /// Accepts the nested `DocumentSymbol[]` form. A `null` result or an
    /// empty array means the document has no symbols. Non-empty flat
    /// `SymbolInformation[]` responses carry no signature range and are
    /// rejected.
    pub fn from_lsp_json(json: &str) -> crate::error::Result<Self> {
        let response: Option<DocumentSymbolResponse> = serde_json::from_str(json)?;
        let nested: Vec<DocumentSymbol> = match response {
            None => Vec::new(),
            Some(DocumentSymbolResponse::Nested(symbols)) => symbols,
            // `[]` matches the flat variant first
            Some(DocumentSymbolResponse::Flat(symbols)) if symbols.is_empty() => Vec::new(),
            Some(DocumentSymbolResponse::Flat(_)) => {
                return Err(crate::error::FuncLocError::Config(
                    "flat SymbolInformation responses are not supported, \
                     request hierarchical document symbols"
                        .to_string(),
                ))
            }
        };
        Ok(Self::new(nested.iter().map(Symbol::from).collect()))
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }
}

#[async_trait]
impl SymbolProvider for StaticProvider {
    async fn document_symbols(
        &self,
        _document: &Document,
    ) -> Result<Option<Vec<Symbol>>, ProviderError> {
        if self.symbols.is_empty() {
            return Ok(None);
        }
        Ok(Some(self.symbols.clone()))
    }
}
