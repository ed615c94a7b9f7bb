//! Function size metrics
//!
//! The engine behind every surface of funcloc:
//! - [`lines`] decides which lines count
//! - [`loc`] measures a single function-like symbol
//! - [`aggregate`] walks a symbol tree and deduplicates by identity
//! - [`category`] maps a LOC value onto a severity tier
//!
//! [`collect_metrics`] ties them to a [`SymbolProvider`].

pub mod aggregate;
pub mod category;
pub mod lines;
pub mod loc;

pub use aggregate::analyze;
pub use category::{classify, LOW_MAX, MEDIUM_MAX};
pub use lines::is_ignorable;
pub use loc::{count_loc, is_function_like};

use crate::document::Document;
use crate::models::FunctionMetric;
use crate::providers::SymbolProvider;
use tracing::{debug, warn};

/// Fetch the symbol tree for `document` and measure it.
///
/// A provider that fails or has nothing to say yields an empty list; the
/// caller then clears whatever it displayed before.
pub async fn collect_metrics(
    provider: &dyn SymbolProvider,
    document: &Document,
) -> Vec<FunctionMetric> {
    let symbols = match provider.document_symbols(document).await {
        Ok(Some(symbols)) => symbols,
        Ok(None) => {
            debug!("No symbols for {}", document.uri());
            return Vec::new();
        }
        Err(e) => {
            warn!("Symbol provider failed for {}: {}", document.uri(), e);
            return Vec::new();
        }
    };

    let metrics = analyze(&symbols, document);
    debug!(
        "Measured {} functions in {} (v{})",
        metrics.len(),
        document.uri(),
        document.version()
    );
    metrics
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;
    use crate::models::{Position, Range, Symbol, SymbolKind};
    use crate::providers::StaticProvider;
    use async_trait::async_trait;
    use tower_lsp::lsp_types::Url;

    struct BrokenProvider;

    #[async_trait]
    impl SymbolProvider for BrokenProvider {
        async fn document_symbols(
            &self,
            _document: &Document,
        ) -> Result<Option<Vec<Symbol>>, ProviderError> {
            Err(ProviderError::Other("language server crashed".to_string()))
        }
    }

    fn document() -> Document {
        Document::new(
            Url::parse("file:///tmp/demo.js").unwrap(),
            1,
            "function f() {\n  return 1;\n}\n",
        )
    }

    #[tokio::test]
    async fn test_provider_failure_yields_empty_list() {
        assert!(collect_metrics(&BrokenProvider, &document()).await.is_empty());
    }

    #[tokio::test]
    async fn test_provider_without_symbols_yields_empty_list() {
        let provider = StaticProvider::new(Vec::new());
        assert!(collect_metrics(&provider, &document()).await.is_empty());
    }

    #[tokio::test]
    async fn test_collect_measures_provider_symbols() {
        let provider = StaticProvider::new(vec![Symbol::new(
            "f",
            SymbolKind::Function,
            Range::new(Position::new(0, 0), Position::new(2, 1)),
            Range::new(Position::new(0, 9), Position::new(0, 10)),
        )]);
        let metrics = collect_metrics(&provider, &document()).await;
        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics[0].loc, 2);
    }
}
