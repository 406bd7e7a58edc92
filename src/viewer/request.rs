//! Render request and response types

use std::sync::Arc;

use super::Rotation;
use super::types::PageData;

/// Unique identifier for render requests
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RequestId(pub u64);

impl RequestId {
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }
}

/// Render generation. Bumped on every state change that repaints the
/// canvas; responses carrying an older generation are discarded so a
/// slow render can never overwrite a newer one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(pub u64);

/// Parameters for rendering a page
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderParams {
    /// Page number (1-based)
    pub page: usize,
    /// Zoom as integer percent
    pub zoom_percent: u16,
    /// View rotation
    pub rotation: Rotation,
}

/// Request sent to the render worker
#[derive(Debug)]
pub enum RenderRequest {
    /// Render a page for display
    Page {
        id: RequestId,
        generation: Generation,
        params: RenderParams,
    },

    /// Prefetch a page into the cache (low priority)
    Prefetch {
        id: RequestId,
        generation: Generation,
        params: RenderParams,
    },

    /// Shutdown the worker
    Shutdown,
}

/// Errors from the render worker
#[derive(Debug, thiserror::Error)]
pub enum RenderFault {
    #[error("PDF engine: {0}")]
    Pdf(#[from] mupdf::Error),

    #[error("page {page} out of range (document has {page_count} pages)")]
    PageOutOfRange { page: usize, page_count: usize },

    #[error("{detail}")]
    Generic { detail: String },
}

impl RenderFault {
    pub fn generic(msg: impl Into<String>) -> Self {
        Self::Generic { detail: msg.into() }
    }
}

/// Response from the render worker
#[derive(Debug)]
pub enum RenderResponse {
    /// Rendered page data
    Page {
        id: RequestId,
        generation: Generation,
        data: Arc<PageData>,
    },

    /// Error during rendering
    Error {
        id: RequestId,
        generation: Generation,
        error: RenderFault,
    },
}
