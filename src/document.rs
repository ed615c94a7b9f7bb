//! Open document text and the line source consumed by the LOC counter.

use dashmap::DashMap;
use std::path::Path;
use std::sync::Arc;
use tower_lsp::lsp_types::{Position, TextDocumentContentChangeEvent, Url};
use tracing::warn;

/// Zero-indexed access to the physical lines of a document.
///
/// Lines never carry their trailing newline.
pub trait LineSource {
    fn line(&self, index: u32) -> Option<&str>;
    fn line_count(&self) -> u32;
}

impl<S: AsRef<str>> LineSource for [S] {
    fn line(&self, index: u32) -> Option<&str> {
        self.get(index as usize).map(AsRef::as_ref)
    }

    fn line_count(&self) -> u32 {
        self.len() as u32
    }
}

impl<S: AsRef<str>> LineSource for Vec<S> {
    fn line(&self, index: u32) -> Option<&str> {
        self.as_slice().line(index)
    }

    fn line_count(&self) -> u32 {
        self.len() as u32
    }
}

/// Immutable snapshot of a document's text.
///
/// Edits produce a new snapshot, so an analysis pass always sees the text it
/// started with even if the user keeps typing.
#[derive(Debug, Clone)]
pub struct Document {
    uri: Url,
    version: i32,
    text: String,
    lines: Vec<String>,
}

impl Document {
    pub fn new(uri: Url, version: i32, text: impl Into<String>) -> Self {
        let text = text.into();
        let lines = split_lines(&text);
        Self {
            uri,
            version,
            text,
            lines,
        }
    }

    /// Load a document from disk, version 0.
    pub fn from_path(path: &Path) -> crate::error::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let absolute = std::fs::canonicalize(path)?;
        let uri = Url::from_file_path(&absolute).map_err(|_| {
            crate::error::FuncLocError::Config(format!(
                "cannot build a file URI for {}",
                absolute.display()
            ))
        })?;
        Ok(Self::new(uri, 0, text))
    }

    pub fn uri(&self) -> &Url {
        &self.uri
    }

    pub fn version(&self) -> i32 {
        self.version
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// File extension of the document path, used for language detection.
    pub fn extension(&self) -> Option<String> {
        let path = self.uri.path();
        let file_name = path.rsplit('/').next()?;
        let (_, ext) = file_name.rsplit_once('.')?;
        Some(ext.to_ascii_lowercase())
    }

    /// Apply LSP content changes, returning the new snapshot.
    ///
    /// Changes without a range replace the whole text. Ranged changes whose
    /// positions fall outside the text are skipped with a warning.
    pub fn apply_changes(&self, changes: &[TextDocumentContentChangeEvent], version: i32) -> Self {
        let mut text = self.text.clone();
        for change in changes {
            match change.range {
                Some(range) => {
                    let start = position_to_offset(&text, range.start);
                    let end = position_to_offset(&text, range.end);
                    match (start, end) {
                        (Some(start), Some(end)) if start <= end => {
                            text.replace_range(start..end, &change.text);
                        }
                        _ => warn!(
                            "Skipping out-of-range edit {:?} in {}",
                            range, self.uri
                        ),
                    }
                }
                None => text = change.text.clone(),
            }
        }
        Self::new(self.uri.clone(), version, text)
    }
}

impl LineSource for Document {
    fn line(&self, index: u32) -> Option<&str> {
        self.lines.line(index)
    }

    fn line_count(&self) -> u32 {
        self.lines.line_count()
    }
}

/// Split text into physical lines, tolerating CRLF endings.
///
/// A trailing newline yields a final empty line, matching how editors number
/// lines.
fn split_lines(text: &str) -> Vec<String> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
        .collect()
}

/// Convert an LSP position (UTF-16 columns) to a byte offset.
fn position_to_offset(text: &str, pos: Position) -> Option<usize> {
    let mut offset = 0;
    for (i, line) in text.split('\n').enumerate() {
        if i == pos.line as usize {
            let content = line.strip_suffix('\r').unwrap_or(line);
            return utf16_to_byte_offset(content, pos.character).map(|col| offset + col);
        }
        offset += line.len() + 1;
    }
    None
}

fn utf16_to_byte_offset(line: &str, character: u32) -> Option<usize> {
    let mut units = 0u32;
    for (byte_idx, ch) in line.char_indices() {
        if units >= character {
            return Some(byte_idx);
        }
        units += ch.len_utf16() as u32;
    }
    (units >= character).then_some(line.len())
}

/// Snapshots of every open document, keyed by URI.
#[derive(Debug, Default, Clone)]
pub struct DocumentStore {
    documents: Arc<DashMap<Url, Arc<Document>>>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&self, document: Document) -> Arc<Document> {
        let doc = Arc::new(document);
        self.documents.insert(doc.uri().clone(), Arc::clone(&doc));
        doc
    }

    /// Apply changes to an open document. Returns `None` if it is not open.
    pub fn change(
        &self,
        uri: &Url,
        changes: &[TextDocumentContentChangeEvent],
        version: i32,
    ) -> Option<Arc<Document>> {
        let mut entry = self.documents.get_mut(uri)?;
        let updated = Arc::new(entry.apply_changes(changes, version));
        *entry = Arc::clone(&updated);
        Some(updated)
    }

    pub fn close(&self, uri: &Url) -> Option<Arc<Document>> {
        self.documents.remove(uri).map(|(_, doc)| doc)
    }

    pub fn get(&self, uri: &Url) -> Option<Arc<Document>> {
        self.documents.get(uri).map(|entry| Arc::clone(entry.value()))
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
