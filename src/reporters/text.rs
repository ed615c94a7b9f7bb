//! Text (terminal) reporter with colors and formatting

use crate::models::{AnalysisReport, Category};
use anyhow::Result;
use console::{style, StyledObject};
use std::fmt::Write;

fn category_style(category: Category, text: String) -> StyledObject<String> {
    match category {
        Category::Low => style(text).green(),
        Category::Medium => style(text).yellow(),
        Category::High => style(text).red().bold(),
    }
}

/// Render report as formatted terminal output
pub fn render(report: &AnalysisReport) -> Result<String> {
    let mut out = String::new();

    for file in &report.files {
        let language = file
            .language
            .as_deref()
            .map_or(String::new(), |l| format!(" ({})", l));
        writeln!(out, "\n{}{}", style(&file.path).cyan().bold(), style(language).dim())?;

        if file.functions.is_empty() {
            writeln!(out, "  {}", style("no functions").dim())?;
            continue;
        }

        let name_width = file
            .functions
            .iter()
            .map(|f| f.name.chars().count())
            .max()
            .unwrap_or(0);
        for f in &file.functions {
            writeln!(
                out,
                "  {:>5}  {:<width$}  {:>4} LOC  {}",
                style(f.line).dim(),
                f.name,
                f.loc,
                category_style(f.category, f.category.to_string()),
                width = name_width
            )?;
        }
    }

    let summary = &report.summary;
    writeln!(
        out,
        "\n{} {} functions: {} low, {} medium, {} high",
        style("Summary:").bold(),
        summary.total,
        category_style(Category::Low, summary.low.to_string()),
        category_style(Category::Medium, summary.medium.to_string()),
        category_style(Category::High, summary.high.to_string()),
    )?;

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporters::tests::test_report;

    #[test]
    fn test_text_render_lists_functions() {
        console::set_colors_enabled(false);
        let out = render(&test_report()).expect("render text");
        assert!(out.contains("src/parser.rs (rust)"));
        assert!(out.contains("parse_expr"));
        assert!(out.contains("  48 LOC  medium"));
        assert!(out.contains("no functions"));
        assert!(out.contains("3 functions: 1 low, 1 medium, 1 high"));
    }
}
