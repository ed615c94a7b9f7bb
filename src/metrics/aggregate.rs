//! Symbol tree traversal and metric deduplication.

use crate::document::LineSource;
use crate::metrics::loc::{count_loc, is_function_like};
use crate::models::{FunctionMetric, IdentityKey, Symbol};
use indexmap::IndexMap;
use tracing::trace;

/// Measure every function-like symbol in `symbols`, one metric per identity.
///
/// All nodes are visited, including the children of non-function containers
/// such as classes and namespaces. When two symbols share a signature range
/// the later one wins; the result keeps the order in which each identity was
/// first seen.
pub fn analyze<L: LineSource + ?Sized>(symbols: &[Symbol], lines: &L) -> Vec<FunctionMetric> {
    let mut metrics: IndexMap<IdentityKey, FunctionMetric> = IndexMap::new();
    for symbol in symbols {
        visit(symbol, lines, &mut metrics);
    }
    metrics.into_values().collect()
}

fn visit<L: LineSource + ?Sized>(
    symbol: &Symbol,
    lines: &L,
    metrics: &mut IndexMap<IdentityKey, FunctionMetric>,
) {
    if is_function_like(symbol) {
        let key = symbol.identity();
        let metric = FunctionMetric {
            name: symbol.name.clone(),
            range: symbol.full_range,
            signature_position: symbol.signature_range.end,
            loc: count_loc(lines, symbol),
        };
        if metrics.insert(key, metric).is_some() {
            trace!("Duplicate symbol at {} replaced", key);
        }
    }

    for child in &symbol.children {
        visit(child, lines, metrics);
    }
}
