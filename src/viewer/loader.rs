//! Document loading from local files and URLs

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use flume::{Receiver, Sender};
use log::{debug, warn};
use mupdf::Document;
use tempfile::NamedTempFile;

/// Magic prefix every PDF starts with
const PDF_MAGIC: &[u8] = b"%PDF-";

/// How many bytes of the file head to inspect for the magic prefix
const MAGIC_PROBE_LEN: usize = 8;

/// Errors from document loading
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("not a PDF file")]
    InvalidFileType,

    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to open document: {0}")]
    Open(#[from] mupdf::Error),

    #[error("document has no pages")]
    EmptyDocument,

    #[error("document not found (missing resource or access denied)")]
    NotFound,

    #[error("unexpected server response: HTTP {status}")]
    UnexpectedStatus { status: u16 },

    #[error("failed to fetch document: {detail}")]
    Fetch { detail: String },
}

/// Opaque handle to a successfully loaded document.
///
/// Replaced wholesale on every load; dropping the previous handle also
/// drops the temp file backing a downloaded document. The render worker
/// re-opens the document by path, so the handle only carries metadata.
pub struct LoadedDocument {
    path: PathBuf,
    page_count: usize,
    title: Option<String>,
    display_name: String,
    /// Keeps a downloaded document on disk for the worker's lifetime
    _temp: Option<NamedTempFile>,
}

impl LoadedDocument {
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn page_count(&self) -> usize {
        self.page_count
    }

    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Name shown in the status bar: document title if present,
    /// otherwise the file name or URL.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.display_name)
    }
}

impl std::fmt::Debug for LoadedDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedDocument")
            .field("path", &self.path)
            .field("page_count", &self.page_count)
            .field("display_name", &self.display_name)
            .finish_non_exhaustive()
    }
}

/// Load a document from a local path.
///
/// The file type is validated by magic prefix before MuPDF sees it, so
/// a mis-selected file is rejected without touching any viewer state.
pub fn load_file(path: &Path) -> Result<LoadedDocument, LoadError> {
    let mut head = [0u8; MAGIC_PROBE_LEN];
    let mut file = std::fs::File::open(path)?;
    let read = file.read(&mut head)?;
    if !head[..read].starts_with(PDF_MAGIC) {
        return Err(LoadError::InvalidFileType);
    }

    let display_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    open_document(path.to_path_buf(), display_name, None)
}

fn open_document(
    path: PathBuf,
    display_name: String,
    temp: Option<NamedTempFile>,
) -> Result<LoadedDocument, LoadError> {
    let doc = Document::open(path.to_string_lossy().as_ref())?;
    let page_count = doc.page_count()? as usize;
    if page_count == 0 {
        return Err(LoadError::EmptyDocument);
    }

    let title = doc
        .metadata(mupdf::MetadataName::Title)
        .ok()
        .filter(|t| !t.is_empty());

    debug!("loaded {display_name:?}: {page_count} pages");

    Ok(LoadedDocument {
        path,
        page_count,
        title,
        display_name,
        _temp: temp,
    })
}

/// Outcome of a URL load attempt
pub type UrlLoadResult = Result<LoadedDocument, LoadError>;

/// Loads documents over HTTP on a background thread.
///
/// At most one fetch is in flight: a second trigger while one is
/// running is ignored entirely - no second network call, no state
/// overwrite when the ignored attempt would have finished later.
pub struct UrlLoader {
    response_tx: Sender<UrlLoadResult>,
    response_rx: Receiver<UrlLoadResult>,
    in_flight: bool,
}

impl Default for UrlLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl UrlLoader {
    #[must_use]
    pub fn new() -> Self {
        let (response_tx, response_rx) = flume::unbounded();
        Self {
            response_tx,
            response_rx,
            in_flight: false,
        }
    }

    /// Whether a fetch is currently in flight
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.in_flight
    }

    /// Start fetching `url`. Returns false if a load is already in
    /// flight and the call was ignored.
    pub fn begin(&mut self, url: &str) -> bool {
        if self.in_flight {
            warn!("url load already in flight, ignoring {url}");
            return false;
        }
        self.in_flight = true;

        let url = url.to_string();
        let tx = self.response_tx.clone();
        std::thread::spawn(move || {
            let _ = tx.send(fetch_document(&url));
        });
        true
    }

    /// Poll for a finished load. Clears the busy flag when a result
    /// arrives.
    pub fn poll(&mut self) -> Option<UrlLoadResult> {
        match self.response_rx.try_recv() {
            Ok(result) => {
                self.in_flight = false;
                Some(result)
            }
            Err(_) => None,
        }
    }
}

/// Fetch a document over HTTP, validate it and persist it to a temp
/// file the render worker can open by path.
fn fetch_document(url: &str) -> UrlLoadResult {
    let agent = ureq::agent();
    let response = agent
        .get(url)
        .set("User-Agent", concat!("pdfolio/", env!("CARGO_PKG_VERSION")))
        .call()
        .map_err(|e| match e {
            ureq::Error::Status(404 | 403, _) => LoadError::NotFound,
            ureq::Error::Status(status, _) => LoadError::UnexpectedStatus { status },
            ureq::Error::Transport(transport) => LoadError::Fetch {
                detail: transport.to_string(),
            },
        })?;

    let mut bytes = Vec::new();
    response.into_reader().read_to_end(&mut bytes)?;

    if !bytes.starts_with(PDF_MAGIC) {
        return Err(LoadError::InvalidFileType);
    }

    let mut temp = tempfile::Builder::new()
        .prefix("pdfolio-")
        .suffix(".pdf")
        .tempfile()?;
    temp.write_all(&bytes)?;
    temp.flush()?;

    let path = temp.path().to_path_buf();
    open_document(path, url.to_string(), Some(temp))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_pdf_file() {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(b"<html>not a pdf</html>").expect("write");

        let err = load_file(file.path()).expect_err("must reject");
        assert!(matches!(err, LoadError::InvalidFileType));
    }

    #[test]
    fn rejects_empty_file() {
        let file = NamedTempFile::new().expect("temp file");

        let err = load_file(file.path()).expect_err("must reject");
        assert!(matches!(err, LoadError::InvalidFileType));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_file(Path::new("/definitely/not/here.pdf")).expect_err("must fail");
        assert!(matches!(err, LoadError::Io(_)));
    }

    #[test]
    fn truncated_pdf_fails_open_not_type_check() {
        // Correct magic but no document body: the type check passes and
        // the engine reports the parse failure
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(b"%PDF-1.7\ngarbage").expect("write");

        let err = load_file(file.path()).expect_err("must fail");
        assert!(matches!(err, LoadError::Open(_) | LoadError::EmptyDocument));
    }

    #[test]
    fn second_begin_while_in_flight_is_ignored() {
        let mut loader = UrlLoader::new();

        // Unroutable per RFC 5737; the fetch thread will sit in connect
        assert!(loader.begin("http://192.0.2.1/sample.pdf"));
        assert!(loader.is_loading());

        assert!(!loader.begin("http://192.0.2.1/other.pdf"));
        assert!(loader.is_loading());
    }
}
