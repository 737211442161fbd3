//! Document abstraction for language analysis.
//!
//! Documents are always held as full text. Every change notification replaces
//! the whole content; there is no incremental sync.

use std::collections::HashMap;

/// A document for language analysis.
#[derive(Debug, Clone)]
pub struct Document {
    /// The document's URI.
    uri: String,
    /// The document content.
    content: String,
    /// Version number for tracking changes (optional, used by LSP).
    version: Option<i32>,
}

impl Document {
    /// Create a new document with the given URI and content.
    pub fn new(uri: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            content: content.into(),
            version: None,
        }
    }

    /// Create a new document with a version number.
    pub fn with_version(uri: impl Into<String>, content: impl Into<String>, version: i32) -> Self {
        Self {
            uri: uri.into(),
            content: content.into(),
            version: Some(version),
        }
    }

    /// Get the document's URI.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Get the document's content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Get the document's version, if set.
    pub fn version(&self) -> Option<i32> {
        self.version
    }

    /// Replace the document content.
    pub fn set_content(&mut self, content: impl Into<String>, version: Option<i32>) {
        self.content = content.into();
        self.version = version;
    }
}

/// In-memory store of the latest full text for every open document.
///
/// Lookups of unknown URIs yield an empty string: for analysis purposes an
/// unknown document and an empty document are the same thing.
#[derive(Debug, Default)]
pub struct DocumentStore {
    documents: HashMap<String, Document>,
}

impl DocumentStore {
    /// Create a new empty document store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a document, replacing any previous content under the same URI.
    pub fn open(&mut self, uri: impl Into<String>, content: impl Into<String>, version: Option<i32>) {
        let uri = uri.into();
        let doc = match version {
            Some(v) => Document::with_version(uri.clone(), content, v),
            None => Document::new(uri.clone(), content),
        };
        self.documents.insert(uri, doc);
    }

    /// Replace a document's content wholesale.
    ///
    /// A change for a URI that was never opened is treated as an open.
    pub fn update(&mut self, uri: &str, content: impl Into<String>, version: Option<i32>) {
        match self.documents.get_mut(uri) {
            Some(doc) => doc.set_content(content, version),
            None => self.open(uri, content, version),
        }
    }

    /// Close a document (remove from store).
    pub fn close(&mut self, uri: &str) -> Option<Document> {
        self.documents.remove(uri)
    }

    /// Get the text of a document, or `""` if the URI is unknown.
    pub fn get(&self, uri: &str) -> &str {
        self.documents.get(uri).map(Document::content).unwrap_or("")
    }

    /// Get a document by URI.
    pub fn document(&self, uri: &str) -> Option<&Document> {
        self.documents.get(uri)
    }

    /// Get all document URIs.
    pub fn uris(&self) -> impl Iterator<Item = &str> {
        self.documents.keys().map(|s| s.as_str())
    }

    /// Check if a document is in the store.
    pub fn contains(&self, uri: &str) -> bool {
        self.documents.contains_key(uri)
    }

    /// Get the number of documents in the store.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_creation() {
        let doc = Document::new("file:///nb.py", "x = 1");
        assert_eq!(doc.uri(), "file:///nb.py");
        assert_eq!(doc.content(), "x = 1");
        assert_eq!(doc.version(), None);
    }

    #[test]
    fn document_update() {
        let mut doc = Document::with_version("nb.py", "old", 1);
        doc.set_content("new", Some(2));
        assert_eq!(doc.content(), "new");
        assert_eq!(doc.version(), Some(2));
    }

    #[test]
    fn document_store_lifecycle() {
        let mut store = DocumentStore::new();

        store.open("file:///a.py", "content a", Some(1));
        store.open("file:///b.py", "content b", Some(1));
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("file:///a.py"), "content a");

        store.update("file:///a.py", "updated a", Some(2));
        assert_eq!(store.get("file:///a.py"), "updated a");
        assert_eq!(store.document("file:///a.py").unwrap().version(), Some(2));

        store.close("file:///a.py");
        assert_eq!(store.len(), 1);
        assert!(!store.contains("file:///a.py"));
        assert!(store.contains("file:///b.py"));
    }

    #[test]
    fn unknown_uri_reads_as_empty() {
        let store = DocumentStore::new();
        assert_eq!(store.get("file:///missing.py"), "");
        assert!(store.is_empty());
    }

    #[test]
    fn update_of_unopened_document_opens_it() {
        let mut store = DocumentStore::new();
        store.update("file:///late.py", "text", None);
        assert_eq!(store.get("file:///late.py"), "text");
    }
}
