//! Per-function LOC counting.

use crate::document::LineSource;
use crate::metrics::lines::is_ignorable;
use crate::models::Symbol;

/// Whether a symbol is a measurable function-like unit.
pub fn is_function_like(symbol: &Symbol) -> bool {
    symbol.kind.is_function_like()
}

/// Last line of the signature, clamped so it never precedes the symbol.
///
/// Some providers report signature ranges that start before the full range;
/// clamping keeps those symbols measurable instead of rejecting them.
pub fn signature_end_line(symbol: &Symbol) -> u32 {
    symbol
        .signature_range
        .end
        .line
        .max(symbol.full_range.start.line)
}

/// Count the body lines of `symbol` that are neither blank nor comments.
///
/// Counting starts strictly after the signature's last line and runs to the
/// last line of the full range inclusive. Lines missing from `lines` count
/// as blank.
pub fn count_loc<L: LineSource + ?Sized>(lines: &L, symbol: &Symbol) -> u32 {
    let signature_end = signature_end_line(symbol);
    let body_end = symbol.full_range.end.line;
    if body_end <= signature_end {
        return 0;
    }

    (signature_end + 1..=body_end)
        .filter(|&index| {
            lines
                .line(index)
                .is_some_and(|text| !is_ignorable(text))
        })
        .count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Position, Range, SymbolKind};

    fn function(full: (u32, u32), signature: (u32, u32)) -> Symbol {
        Symbol::new(
            "f",
            SymbolKind::Function,
            Range::lines(full.0, full.1),
            Range::new(Position::new(signature.0, 3), Position::new(signature.1, 10)),
        )
    }

    #[test]
    fn test_filter_accepts_only_function_kinds() {
        let mut sym = function((0, 1), (0, 0));
        assert!(is_function_like(&sym));
        sym.kind = SymbolKind::Method;
        assert!(is_function_like(&sym));
        sym.kind = SymbolKind::Constructor;
        assert!(is_function_like(&sym));
        sym.kind = SymbolKind::Other;
        assert!(!is_function_like(&sym));
    }

    #[test]
    fn test_ten_line_function_with_two_blank_lines() {
        let lines = vec![
            "function demo() {",
            "  const a = 1;",
            "",
            "  const b = 2;",
            "  const c = a + b;",
            "   ",
            "  log(a);",
            "  log(b);",
            "  return c;",
            "}",
        ];
        let sym = function((0, 9), (0, 0));
        assert_eq!(count_loc(&lines, &sym), 7);
        assert_eq!(crate::metrics::classify(7), crate::models::Category::Low);
    }

    #[test]
    fn test_signature_only_function_is_zero() {
        let lines = vec!["fn f() {}"];
        assert_eq!(count_loc(&lines, &function((0, 0), (0, 0))), 0);
    }

    #[test]
    fn test_body_ending_on_signature_line_is_zero() {
        let lines = vec!["fn f(", "    a: u32,", ") {}"];
        assert_eq!(count_loc(&lines, &function((0, 2), (0, 2))), 0);
    }

    #[test]
    fn test_multiline_signature_lines_are_not_counted() {
        let lines = vec![
            "fn long(",
            "    a: u32,",
            "    b: u32,",
            ") -> u32 {",
            "    a + b",
            "}",
        ];
        assert_eq!(count_loc(&lines, &function((0, 5), (0, 3))), 2);
    }

    #[test]
    fn test_comment_lines_are_skipped() {
        let lines = vec![
            "def f():",
            "    # explain",
            "    x = 1",
            "    /* block */",
            "    return x",
        ];
        assert_eq!(count_loc(&lines, &function((0, 4), (0, 0))), 2);
    }

    #[test]
    fn test_signature_before_full_range_is_clamped() {
        let lines = vec!["a", "fn f() {", "    body();", "}"];
        // Signature claims to end on line 0, before the symbol starts on line 1
        let sym = function((1, 3), (0, 0));
        assert_eq!(signature_end_line(&sym), 1);
        assert_eq!(count_loc(&lines, &sym), 2);
    }

    #[test]
    fn test_lines_past_document_end_are_blank() {
        let lines = vec!["fn f() {", "    body();"];
        assert_eq!(count_loc(&lines, &function((0, 20), (0, 0))), 1);
    }

    #[test]
    fn test_count_ignores_symbol_kind() {
        let lines = vec!["class A {", "  x = 1;", "}"];
        let mut sym = function((0, 2), (0, 0));
        sym.kind = SymbolKind::Other;
        assert_eq!(count_loc(&lines, &sym), 2);
    }
}
