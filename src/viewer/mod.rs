//! PDF viewing infrastructure
//!
//! State management and orchestration over the MuPDF engine: document
//! loading, view state (page/zoom/rotation), page rasterization into an
//! RGB canvas and the selectable text layer aligned with it.

mod cache;
mod loader;
mod request;
mod service;
mod state;
mod text_layer;
mod types;
mod viewport;
mod worker;

pub use cache::{CacheKey, PageCache};
pub use loader::{LoadError, LoadedDocument, UrlLoadResult, UrlLoader, load_file};
pub use request::{Generation, RenderFault, RenderParams, RenderRequest, RenderResponse, RequestId};
pub use service::RenderService;
pub use state::{Command, Effect, Rotation, ViewerState};
pub use text_layer::{Selection, SelectionPoint, extract_text, selection_rects};
pub use types::{CharInfo, ImageData, LineBounds, PageData};
pub use viewport::Viewport;

/// Rendered pages kept in the LRU cache
pub const DEFAULT_CACHE_SIZE: usize = 16;

/// Neighbouring pages prefetched around the current one
pub const DEFAULT_PREFETCH_RADIUS: usize = 1;
