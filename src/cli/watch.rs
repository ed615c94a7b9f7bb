//! `funcloc watch` - re-measure files as they are saved
//!
//! Prints what changed per function: new functions, removed ones and LOC
//! deltas, highlighting tier changes.

use crate::cli::analyze::{collect_files, language_of, measure_file};
use crate::models::{Category, FunctionReport};
use crate::scheduler::QUIESCENCE_WINDOW;
use anyhow::{Context, Result};
use console::style;
use notify::RecursiveMode;
use notify_debouncer_full::{new_debouncer, DebounceEventResult};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use tracing::{debug, warn};

pub fn run(path: &Path) -> Result<()> {
    let root = std::fs::canonicalize(path)
        .with_context(|| format!("Path does not exist: {}", path.display()))?;

    // Baseline so the first save only reports what actually changed
    let mut previous: HashMap<PathBuf, Vec<FunctionReport>> = HashMap::new();
    for file in collect_files(std::slice::from_ref(&root))? {
        if let Ok(Some(reports)) = measure(&file) {
            previous.insert(file, reports);
        }
    }

    println!(
        "\n{} {} ({} files)\n",
        style("Watching").bold(),
        style(root.display()).cyan(),
        previous.len()
    );
    println!("  {} Save a file to re-measure its functions", style("→").dim());
    println!("  {} Press Ctrl+C to stop\n", style("→").dim());

    let (tx, rx) = mpsc::channel();
    let mut debouncer = new_debouncer(
        QUIESCENCE_WINDOW,
        None,
        move |result: DebounceEventResult| match result {
            Ok(events) => {
                let _ = tx.send(events);
            }
            Err(errors) => {
                for e in errors {
                    warn!("Watch error: {}", e);
                }
            }
        },
    )?;
    debouncer.watch(&root, RecursiveMode::Recursive)?;

    while let Ok(events) = rx.recv() {
        let changed: HashSet<PathBuf> = events
            .iter()
            .flat_map(|event| event.paths.iter())
            .filter(|p| language_of(p).is_some() && !is_ignored_path(p, &root))
            .cloned()
            .collect();

        for file in changed {
            let current = if file.exists() {
                match measure(&file) {
                    Ok(Some(reports)) => reports,
                    Ok(None) => continue,
                    Err(e) => {
                        debug!("Could not measure {}: {:#}", file.display(), e);
                        continue;
                    }
                }
            } else {
                Vec::new()
            };

            let before = previous.remove(&file).unwrap_or_default();
            let changes = diff(&before, &current);
            if !changes.is_empty() {
                print_changes(file.strip_prefix(&root).unwrap_or(&file), &changes);
            }
            if file.exists() {
                previous.insert(file, current);
            }
        }
    }

    Ok(())
}

fn measure(path: &Path) -> Result<Option<Vec<FunctionReport>>> {
    Ok(measure_file(path)?.map(|metrics| metrics.iter().map(FunctionReport::from).collect()))
}

/// Check if path should be ignored (build dirs, dependencies, VCS)
fn is_ignored_path(path: &Path, root: &Path) -> bool {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components().any(|c| {
        let part = c.as_os_str().to_string_lossy();
        part.starts_with('.')
            || matches!(
                part.as_ref(),
                "target" | "node_modules" | "__pycache__" | "dist" | "build"
            )
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Change {
    Added {
        name: String,
        loc: u32,
        category: Category,
    },
    Removed {
        name: String,
    },
    Resized {
        name: String,
        from: u32,
        to: u32,
        from_category: Category,
        to_category: Category,
    },
}

/// Per-function differences, matched by name in order of appearance.
fn diff(before: &[FunctionReport], after: &[FunctionReport]) -> Vec<Change> {
    let mut remaining: HashMap<&str, Vec<&FunctionReport>> = HashMap::new();
    for f in before.iter().rev() {
        remaining.entry(f.name.as_str()).or_default().push(f);
    }

    let mut changes = Vec::new();
    for f in after {
        match remaining.get_mut(f.name.as_str()).and_then(Vec::pop) {
            Some(old) if old.loc != f.loc => changes.push(Change::Resized {
                name: f.name.clone(),
                from: old.loc,
                to: f.loc,
                from_category: old.category,
                to_category: f.category,
            }),
            Some(_) => {}
            None => changes.push(Change::Added {
                name: f.name.clone(),
                loc: f.loc,
                category: f.category,
            }),
        }
    }

    for f in before {
        if remaining
            .get_mut(f.name.as_str())
            .and_then(Vec::pop)
            .is_some()
        {
            changes.push(Change::Removed {
                name: f.name.clone(),
            });
        }
    }
    changes
}

fn print_changes(rel_path: &Path, changes: &[Change]) {
    let time = chrono::Local::now().format("%H:%M:%S");
    println!(
        "{} {}",
        style(format!("[{}]", time)).dim(),
        style(rel_path.display()).cyan().bold()
    );

    for change in changes {
        match change {
            Change::Added { name, loc, category } => {
                println!("  {} {} {} LOC ({})", style("+").green(), name, loc, category);
            }
            Change::Removed { name } => {
                println!("  {} {}", style("-").red(), style(name).strikethrough());
            }
            Change::Resized {
                name,
                from,
                to,
                from_category,
                to_category,
            } => {
                let tier = if from_category == to_category {
                    style(to_category.to_string()).dim()
                } else if to_category > from_category {
                    style(format!("{} → {}", from_category, to_category)).red().bold()
                } else {
                    style(format!("{} → {}", from_category, to_category)).green()
                };
                println!("  {} {} {} → {} LOC ({})", style("~").yellow(), name, from, to, tier);
            }
        }
    }
    println!();
}
