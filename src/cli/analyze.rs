//! Analyze command - measure functions in files and directories

use crate::document::Document;
use crate::metrics::analyze;
use crate::models::{AnalysisReport, Category, FunctionMetric};
use crate::providers::{Language, StaticProvider, TreeSitterProvider};
use crate::reporters::{self, OutputFormat};
use anyhow::{Context, Result};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Run the analyze command
pub fn run(
    paths: &[PathBuf],
    format: OutputFormat,
    symbols: Option<&Path>,
    min_category: Category,
) -> Result<()> {
    let files = match symbols {
        Some(symbols_path) => vec![analyze_with_symbols(paths, symbols_path)?],
        None => {
            let files = collect_files(paths)?;
            debug!("Analyzing {} files", files.len());
            let mut measured: Vec<_> = files
                .par_iter()
                .filter_map(|path| match measure_file(path) {
                    Ok(Some(metrics)) => {
                        Some((path.display().to_string(), language_name(path), metrics))
                    }
                    Ok(None) => None,
                    Err(e) => {
                        warn!("Skipping {}: {:#}", path.display(), e);
                        None
                    }
                })
                .collect();
            measured.sort_by(|a, b| a.0.cmp(&b.0));
            measured
        }
    };

    let report = AnalysisReport::new(files, min_category);
    print!("{}", reporters::report(&report, format)?);
    Ok(())
}

/// Measure one file with the tree-sitter provider.
///
/// `Ok(None)` when the file's language is not supported.
pub(crate) fn measure_file(path: &Path) -> Result<Option<Vec<FunctionMetric>>> {
    let document = Document::from_path(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let Some(symbols) = TreeSitterProvider::new().parse_symbols(&document)? else {
        return Ok(None);
    };
    Ok(Some(analyze(&symbols, &document)))
}

fn analyze_with_symbols(
    paths: &[PathBuf],
    symbols_path: &Path,
) -> Result<(String, Option<String>, Vec<FunctionMetric>)> {
    let [path] = paths else {
        anyhow::bail!("--symbols requires exactly one source file");
    };
    let json = std::fs::read_to_string(symbols_path)
        .with_context(|| format!("Failed to read {}", symbols_path.display()))?;
    let provider = StaticProvider::from_lsp_json(&json)
        .with_context(|| format!("Invalid symbols in {}", symbols_path.display()))?;
    let document = Document::from_path(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let metrics = analyze(provider.symbols(), &document);
    Ok((path.display().to_string(), language_name(path), metrics))
}

fn language_name(path: &Path) -> Option<String> {
    language_of(path).map(|lang| lang.name().to_string())
}

pub(crate) fn language_of(path: &Path) -> Option<Language> {
    path.extension()
        .and_then(|e| e.to_str())
        .and_then(|ext| Language::from_extension(&ext.to_lowercase()))
}

/// Expand directories into supported source files.
///
/// Files named explicitly must be supported; files found while walking are
/// filtered silently. Walks honor .gitignore.
pub(crate) fn collect_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if !path.exists() {
            anyhow::bail!("Path does not exist: {}", path.display());
        }
        if path.is_file() {
            if language_of(path).is_none() {
                anyhow::bail!(
                    "Unsupported file type: {} (supported extensions: {})",
                    path.display(),
                    Language::supported_extensions().join(", ")
                );
            }
            files.push(path.clone());
            continue;
        }

        let walker = ignore::WalkBuilder::new(path)
            .hidden(true)
            .git_ignore(true)
            .build();
        for entry in walker.filter_map(|e| e.ok()) {
            let entry_path = entry.path();
            if entry_path.is_file() && language_of(entry_path).is_some() {
                files.push(entry_path.to_path_buf());
            }
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_collect_files_filters_walk() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/lib.rs"), "fn a() {}\n").unwrap();
        fs::write(dir.path().join("src/notes.txt"), "hello\n").unwrap();
        fs::write(dir.path().join("app.py"), "def f():\n    pass\n").unwrap();

        let files = collect_files(&[dir.path().to_path_buf()]).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| language_of(f).is_some()));
    }

    #[test]
    fn test_collect_files_rejects_unsupported_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, "hello\n").unwrap();
        assert!(collect_files(&[path]).is_err());
        assert!(collect_files(&[dir.path().join("missing.rs")]).is_err());
    }

    #[test]
    fn test_measure_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("calc.py");
        fs::write(
            &path,
            "def add(a, b):\n    # sum\n    total = a + b\n\n    return total\n",
        )
        .unwrap();
        let metrics = measure_file(&path).unwrap().unwrap();
        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics[0].name, "add");
        assert_eq!(metrics[0].loc, 2);
    }

    #[test]
    fn test_symbols_need_single_file() {
        let dir = tempfile::tempdir().unwrap();
        let symbols = dir.path().join("symbols.json");
        fs::write(&symbols, "[]").unwrap();
        let paths = [dir.path().join("a.rs"), dir.path().join("b.rs")];
        assert!(analyze_with_symbols(&paths, &symbols).is_err());
    }
}
