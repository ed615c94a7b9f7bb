//! Core data models for funcloc
//!
//! These models are shared by the metric engine, the symbol providers and
//! the outer surfaces (language server, CLI reporters).

use serde::{Deserialize, Serialize};

/// Zero-indexed line/column position inside a document.
///
/// Columns are UTF-16 code units, as in LSP. The metric engine only looks
/// at lines; columns matter for identity and label placement.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    pub const fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

impl From<tower_lsp::lsp_types::Position> for Position {
    fn from(pos: tower_lsp::lsp_types::Position) -> Self {
        Self::new(pos.line, pos.character)
    }
}

impl From<Position> for tower_lsp::lsp_types::Position {
    fn from(pos: Position) -> Self {
        Self::new(pos.line, pos.character)
    }
}

/// Inclusive span between two positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Range covering whole lines `start_line..=end_line`, columns zero.
    pub const fn lines(start_line: u32, end_line: u32) -> Self {
        Self::new(Position::new(start_line, 0), Position::new(end_line, 0))
    }
}

impl From<tower_lsp::lsp_types::Range> for Range {
    fn from(range: tower_lsp::lsp_types::Range) -> Self {
        Self::new(range.start.into(), range.end.into())
    }
}

impl From<Range> for tower_lsp::lsp_types::Range {
    fn from(range: Range) -> Self {
        Self::new(range.start.into(), range.end.into())
    }
}

/// Construct kinds the metric engine distinguishes.
///
/// Hosts report a much wider set of kinds; everything that is not a
/// function, method or constructor collapses to `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    Function,
    Method,
    Constructor,
    #[default]
    Other,
}

impl SymbolKind {
    /// Map an LSP symbol kind onto the closed set.
    pub fn from_lsp(kind: tower_lsp::lsp_types::SymbolKind) -> Self {
        use tower_lsp::lsp_types::SymbolKind as Lsp;
        match kind {
            Lsp::FUNCTION => SymbolKind::Function,
            Lsp::METHOD => SymbolKind::Method,
            Lsp::CONSTRUCTOR => SymbolKind::Constructor,
            _ => SymbolKind::Other,
        }
    }

    /// Whether symbols of this kind are measured.
    pub fn is_function_like(self) -> bool {
        matches!(
            self,
            SymbolKind::Function | SymbolKind::Method | SymbolKind::Constructor
        )
    }
}

impl std::fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SymbolKind::Function => write!(f, "function"),
            SymbolKind::Method => write!(f, "method"),
            SymbolKind::Constructor => write!(f, "constructor"),
            SymbolKind::Other => write!(f, "other"),
        }
    }
}

/// A named, ranged construct reported by a symbol provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Symbol {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub kind: SymbolKind,
    /// Whole construct, signature and body.
    pub full_range: Range,
    /// Name/signature portion only.
    pub signature_range: Range,
    #[serde(default)]
    pub children: Vec<Symbol>,
}

impl Symbol {
    pub fn new(
        name: impl Into<String>,
        kind: SymbolKind,
        full_range: Range,
        signature_range: Range,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            full_range,
            signature_range,
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<Symbol>) -> Self {
        self.children = children;
        self
    }

    /// Deduplication key for this symbol.
    pub fn identity(&self) -> IdentityKey {
        IdentityKey::from_range(&self.signature_range)
    }
}

impl From<&tower_lsp::lsp_types::DocumentSymbol> for Symbol {
    fn from(sym: &tower_lsp::lsp_types::DocumentSymbol) -> Self {
        let children = sym
            .children
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(Symbol::from)
            .collect();
        Symbol::new(
            sym.name.clone(),
            SymbolKind::from_lsp(sym.kind),
            sym.range.into(),
            sym.selection_range.into(),
        )
        .with_children(children)
    }
}

/// Identity of a function derived from its signature range.
///
/// Providers may report the same function more than once (overloads sharing
/// a body, duplicate traversal paths); equal keys collapse to one metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IdentityKey {
    pub start_line: u32,
    pub start_character: u32,
    pub end_line: u32,
    pub end_character: u32,
}

impl IdentityKey {
    pub fn from_range(range: &Range) -> Self {
        Self {
            start_line: range.start.line,
            start_character: range.start.character,
            end_line: range.end.line,
            end_character: range.end.character,
        }
    }
}

impl std::fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}-{}:{}",
            self.start_line, self.start_character, self.end_line, self.end_character
        )
    }
}

/// Severity tier of a function, derived from its LOC.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Low,
    Medium,
    High,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Low, Category::Medium, Category::High];
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Low => write!(f, "low"),
            Category::Medium => write!(f, "medium"),
            Category::High => write!(f, "high"),
        }
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(Category::Low),
            "medium" => Ok(Category::Medium),
            "high" => Ok(Category::High),
            other => Err(format!("unknown category '{}'", other)),
        }
    }
}

/// Measured size of one function.
///
/// Created fresh on every analysis pass and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionMetric {
    pub name: String,
    /// Full span, used for whole-region highlighting.
    pub range: Range,
    /// End of the signature, anchor for the inline label.
    pub signature_position: Position,
    pub loc: u32,
}

/// Summary of metrics by category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
    pub total: usize,
}

impl CategorySummary {
    pub fn record(&mut self, category: Category) {
        match category {
            Category::Low => self.low += 1,
            Category::Medium => self.medium += 1,
            Category::High => self.high += 1,
        }
        self.total += 1;
    }
}

/// One function as shown by the CLI reporters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionReport {
    pub name: String,
    /// 1-based line of the signature.
    pub line: u32,
    /// 1-based last line of the function.
    pub end_line: u32,
    pub loc: u32,
    pub category: Category,
}

impl From<&FunctionMetric> for FunctionReport {
    fn from(metric: &FunctionMetric) -> Self {
        Self {
            name: metric.name.clone(),
            line: metric.range.start.line + 1,
            end_line: metric.range.end.line + 1,
            loc: metric.loc,
            category: crate::metrics::classify(metric.loc),
        }
    }
}

/// Measured functions of a single file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReport {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    pub functions: Vec<FunctionReport>,
}

/// Result of `funcloc analyze`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub files: Vec<FileReport>,
    pub summary: CategorySummary,
}

impl AnalysisReport {
    /// Build a report, keeping only functions at or above `min_category`.
    ///
    /// The summary counts what is shown, not what was measured.
    pub fn new(
        files: Vec<(String, Option<String>, Vec<FunctionMetric>)>,
        min_category: Category,
    ) -> Self {
        let mut summary = CategorySummary::default();
        let files = files
            .into_iter()
            .map(|(path, language, metrics)| {
                let functions: Vec<FunctionReport> = metrics
                    .iter()
                    .map(FunctionReport::from)
                    .filter(|f| f.category >= min_category)
                    .collect();
                for f in &functions {
                    summary.record(f.category);
                }
                FileReport {
                    path,
                    language,
                    functions,
                }
            })
            .collect();
        Self { files, summary }
    }
}
