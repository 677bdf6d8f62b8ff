//! Local document extraction and case-insensitive substring search.

use std::path::{Path, PathBuf};
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::error::KnowledgeError;

/// File extensions the local source can read
pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["txt", "pdf", "docx"];

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default()
}

/// Supported files directly inside `dir`, sorted by path.
pub fn supported_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && SUPPORTED_EXTENSIONS.contains(&extension_of(&path).as_str()) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Extract the full text of a supported document.
pub fn extract_text(path: &Path) -> Result<String, KnowledgeError> {
    match extension_of(path).as_str() {
        "txt" => extract_txt(path),
        "pdf" => pdf_extract::extract_text(path).map_err(|e| KnowledgeError::extraction(path, e)),
        "docx" => extract_docx(path),
        other => Err(KnowledgeError::extraction(
            path,
            format!("unsupported extension '{}'", other),
        )),
    }
}

/// UTF-8 first, Latin-1 otherwise (every byte maps to one char).
fn extract_txt(path: &Path) -> Result<String, KnowledgeError> {
    let bytes = std::fs::read(path)?;
    Ok(match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            debug!(path = %path.display(), "Not valid UTF-8, decoding as Latin-1");
            e.into_bytes().into_iter().map(char::from).collect()
        }
    })
}

fn extract_docx(path: &Path) -> Result<String, KnowledgeError> {
    use quick_xml::events::Event;

    let file = std::fs::File::open(path)?;
    let mut archive =
        zip::ZipArchive::new(file).map_err(|e| KnowledgeError::extraction(path, e))?;

    let mut doc_xml = String::new();
    {
        let mut entry = archive
            .by_name("word/document.xml")
            .map_err(|_| KnowledgeError::extraction(path, "missing word/document.xml"))?;
        std::io::Read::read_to_string(&mut entry, &mut doc_xml)?;
    }

    // Text lives in <w:t> runs; </w:p> closes a paragraph
    let mut reader = quick_xml::Reader::from_str(&doc_xml);
    let mut paragraphs: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_text = false;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                if e.local_name().as_ref() == b"t" {
                    in_text = true;
                }
            }
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" => paragraphs.push(std::mem::take(&mut current)),
                _ => {}
            },
            Ok(Event::Text(ref e)) if in_text => {
                if let Ok(text) = e.unescape() {
                    current.push_str(&text);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(KnowledgeError::extraction(path, e)),
            _ => {}
        }
        buf.clear();
    }
    if !current.is_empty() {
        paragraphs.push(current);
    }

    Ok(paragraphs.join("\n"))
}

/// Lowercase each char to exactly one char so positions line up with the original.
fn fold(text: &str) -> Vec<char> {
    text.chars()
        .map(|c| c.to_lowercase().next().unwrap_or(c))
        .collect()
}

/// One extracted document, ready for searching.
#[derive(Debug, Clone)]
pub struct LocalDocument {
    pub file_name: String,
    chars: Vec<char>,
    folded: Vec<char>,
}

impl LocalDocument {
    pub fn new(file_name: &str, text: &str) -> Self {
        Self {
            file_name: file_name.to_string(),
            chars: text.chars().collect(),
            folded: fold(text),
        }
    }

    /// Snippet around the first case-insensitive occurrence of `query`,
    /// formatted as `"<file>: <window>..."`.
    pub fn snippet_for(&self, query: &str, before: usize, after: usize) -> Option<String> {
        let needle = fold(query);
        if needle.is_empty() || needle.len() > self.folded.len() {
            return None;
        }
        let pos = self
            .folded
            .windows(needle.len())
            .position(|window| window == needle.as_slice())?;

        let start = pos.saturating_sub(before);
        let end = (pos + after).min(self.chars.len());
        let window: String = self.chars[start..end]
            .iter()
            .map(|&c| if c == '\n' || c == '\r' { ' ' } else { c })
            .collect();

        Some(format!("{}: {}...", self.file_name, window.trim()))
    }
}

/// Documents from one directory, extracted once on first search.
#[derive(Debug)]
pub struct DocumentStore {
    dir: PathBuf,
    documents: OnceCell<Vec<LocalDocument>>,
}

impl DocumentStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            documents: OnceCell::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Count supported documents, logging when there are none.
    pub fn check_directory(&self) -> usize {
        match supported_files(&self.dir) {
            Ok(files) if files.is_empty() => {
                warn!(
                    dir = %self.dir.display(),
                    "No document files (.pdf, .docx, .txt) found; fallback sources will be used"
                );
                0
            }
            Ok(files) => {
                info!(dir = %self.dir.display(), count = files.len(), "Found document files");
                files.len()
            }
            Err(e) => {
                warn!(dir = %self.dir.display(), error = %e, "Document directory not readable");
                0
            }
        }
    }

    /// All documents that extracted successfully.
    pub async fn documents(&self) -> &[LocalDocument] {
        self.documents
            .get_or_init(|| async {
                let dir = self.dir.clone();
                match tokio::task::spawn_blocking(move || load_blocking(&dir)).await {
                    Ok(docs) => docs,
                    Err(e) => {
                        warn!(error = %e, "Document loading task failed");
                        Vec::new()
                    }
                }
            })
            .await
    }

    /// One snippet per matching document, in file-name order.
    pub async fn search(&self, query: &str, before: usize, after: usize) -> Vec<String> {
        self.documents()
            .await
            .iter()
            .filter_map(|doc| doc.snippet_for(query, before, after))
            .collect()
    }
}

fn load_blocking(dir: &Path) -> Vec<LocalDocument> {
    let files = match supported_files(dir) {
        Ok(files) => files,
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "Skipping local search");
            return Vec::new();
        }
    };

    files
        .into_iter()
        .filter_map(|path| {
            let name = path.file_name()?.to_string_lossy().into_owned();
            match extract_text(&path) {
                Ok(text) => Some(LocalDocument::new(&name, &text)),
                Err(e) => {
                    warn!(file = %name, error = %e, "Could not read document");
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_snippet_is_case_insensitive_and_windowed() {
        let text = format!("{}Solar Panels are cheap\nnow{}", "a".repeat(150), "b".repeat(400));
        let doc = LocalDocument::new("energy.txt", &text);

        let snippet = doc.snippet_for("solar panels", 100, 300).unwrap();
        assert!(snippet.starts_with("energy.txt: "));
        assert!(snippet.ends_with("..."));
        assert!(snippet.contains("Solar Panels are cheap now"));

        // 100 before + 300 after, plus the "energy.txt: " prefix and "..." suffix
        let body = snippet
            .trim_start_matches("energy.txt: ")
            .trim_end_matches("...");
        assert_eq!(body.chars().count(), 400);
    }

    #[test]
    fn test_no_match_and_empty_query() {
        let doc = LocalDocument::new("a.txt", "nothing relevant");
        assert!(doc.snippet_for("quantum", 100, 300).is_none());
        assert!(doc.snippet_for("", 100, 300).is_none());
    }

    #[test]
    fn test_latin1_fallback() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("legacy.txt");
        // "café" in Latin-1
        std::fs::write(&path, [b'c', b'a', b'f', 0xE9]).unwrap();
        assert_eq!(extract_text(&path).unwrap(), "café");
    }

    #[test]
    fn test_docx_paragraphs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("memo.docx");
        let file = std::fs::File::create(&path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        zip.start_file("word/document.xml", zip::write::SimpleFileOptions::default())
            .unwrap();
        zip.write_all(
            br#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:r><w:t>First line</w:t></w:r></w:p><w:p><w:r><w:t>Second &amp; last</w:t></w:r></w:p></w:body></w:document>"#,
        )
        .unwrap();
        zip.finish().unwrap();

        assert_eq!(extract_text(&path).unwrap(), "First line\nSecond & last");
    }

    #[test]
    fn test_supported_files_filters_extensions() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("b.txt"), "b").unwrap();
        std::fs::write(dir.path().join("a.TXT"), "a").unwrap();
        std::fs::write(dir.path().join("notes.md"), "ignored").unwrap();

        let files = supported_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.TXT", "b.txt"]);
    }

    #[tokio::test]
    async fn test_store_one_snippet_per_document() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("one.txt"), "Reliability matters. reliability again.").unwrap();
        std::fs::write(dir.path().join("two.txt"), "Some RELIABILITY notes").unwrap();
        std::fs::write(dir.path().join("three.txt"), "unrelated").unwrap();

        let store = DocumentStore::new(dir.path());
        assert_eq!(store.check_directory(), 3);

        let hits = store.search("reliability", 100, 300).await;
        assert_eq!(hits.len(), 2);
        assert!(hits[0].starts_with("one.txt: "));
        assert!(hits[1].starts_with("two.txt: "));
    }

    #[tokio::test]
    async fn test_missing_directory_yields_nothing() {
        let store = DocumentStore::new("/definitely/not/here");
        assert_eq!(store.check_directory(), 0);
        assert!(store.search("anything", 100, 300).await.is_empty());
    }
}
