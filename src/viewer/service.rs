//! Render service - owns the worker thread, cache and render generation

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use flume::{Receiver, Sender};
use log::debug;

use super::cache::{CacheKey, PageCache};
use super::loader::LoadedDocument;
use super::request::{Generation, RenderParams, RenderRequest, RenderResponse, RequestId};
use super::state::{Command, Effect, ViewerState};
use super::types::PageData;
use super::worker::render_worker;
use super::{DEFAULT_CACHE_SIZE, DEFAULT_PREFETCH_RADIUS};

#[derive(Debug)]
enum PendingRequest {
    Page(usize),
    Prefetch(usize),
}

/// Manages rendering for one loaded document.
///
/// A service is built around a document handle and replaced together
/// with it: loading a new document drops this service (shutting down
/// its worker) and constructs a fresh one. State commands are applied
/// here so every committed change immediately triggers its effects.
///
/// Each display render bumps a generation token; responses that carry
/// an older generation are dropped on receipt. A slow render can
/// therefore never repaint over a newer one, it only warms the cache.
pub struct RenderService {
    state: ViewerState,
    request_tx: Sender<RenderRequest>,
    response_rx: Receiver<RenderResponse>,
    next_request_id: u64,
    generation: Generation,
    pending_requests: HashMap<RequestId, PendingRequest>,
    prefetch_in_flight: HashSet<usize>,
    cache: Arc<Mutex<PageCache>>,
    prefetch_radius: usize,
}

impl RenderService {
    /// Create a render service for a loaded document with defaults
    #[must_use]
    pub fn new(document: &LoadedDocument) -> Self {
        Self::with_config(document, DEFAULT_CACHE_SIZE, DEFAULT_PREFETCH_RADIUS)
    }

    /// Create a render service with custom cache and prefetch settings
    #[must_use]
    pub fn with_config(
        document: &LoadedDocument,
        cache_size: usize,
        prefetch_radius: usize,
    ) -> Self {
        let cache = Arc::new(Mutex::new(PageCache::new(cache_size)));

        let (request_tx, request_rx) = flume::unbounded();
        let (response_tx, response_rx) = flume::unbounded();

        // Exactly one worker: pages are rasterized sequentially, in
        // request order.
        let path = document.path().to_path_buf();
        let cache_clone = cache.clone();
        std::thread::spawn(move || {
            render_worker(&path, request_rx, response_tx, cache_clone);
        });

        let mut state = ViewerState::new();
        state.reset_for_document(document.page_count());

        Self {
            state,
            request_tx,
            response_rx,
            next_request_id: 1,
            generation: Generation(0),
            pending_requests: HashMap::new(),
            prefetch_in_flight: HashSet::new(),
            cache,
            prefetch_radius,
        }
    }

    /// Current view state
    #[must_use]
    pub fn state(&self) -> &ViewerState {
        &self.state
    }

    /// Generation of the most recent display render
    #[must_use]
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Apply a command to the view state and execute its effects
    pub fn apply_command(&mut self, cmd: Command) {
        let effects = self.state.apply(cmd);
        self.execute_effects(effects);
    }

    /// Trigger a render of the current page, e.g. right after load
    pub fn render_current_page(&mut self) {
        self.execute_effects(vec![Effect::RenderCurrentPage, Effect::UpdatePrefetch]);
    }

    fn execute_effects(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::RenderCurrentPage => {
                    self.generation.0 += 1;
                    self.request_page(self.state.page);
                }

                Effect::UpdatePrefetch => {
                    self.schedule_prefetch();
                }
            }
        }
    }

    fn request_page(&mut self, page: usize) -> RequestId {
        let id = self.next_id();
        let params = self.params_for(page);

        let _ = self.request_tx.send(RenderRequest::Page {
            id,
            generation: self.generation,
            params,
        });
        self.pending_requests.insert(id, PendingRequest::Page(page));
        self.prefetch_in_flight.remove(&page);

        id
    }

    fn prefetch_page(&mut self, page: usize) -> RequestId {
        let id = self.next_id();
        let params = self.params_for(page);

        let _ = self.request_tx.send(RenderRequest::Prefetch {
            id,
            generation: self.generation,
            params,
        });
        self.pending_requests
            .insert(id, PendingRequest::Prefetch(page));
        self.prefetch_in_flight.insert(page);

        id
    }

    fn schedule_prefetch(&mut self) {
        let current = self.state.page;
        let page_count = self.state.page_count;

        if page_count == 0 {
            return;
        }

        for offset in 1..=self.prefetch_radius {
            if current + offset <= page_count {
                self.maybe_prefetch(current + offset);
            }
            if current > offset {
                self.maybe_prefetch(current - offset);
            }
        }
    }

    fn maybe_prefetch(&mut self, page: usize) {
        if self.is_page_in_flight(page) || self.is_page_cached(page) {
            return;
        }
        self.prefetch_page(page);
    }

    fn is_page_in_flight(&self, page: usize) -> bool {
        if self.prefetch_in_flight.contains(&page) {
            return true;
        }

        self.pending_requests.values().any(|request| match request {
            PendingRequest::Page(p) | PendingRequest::Prefetch(p) => *p == page,
        })
    }

    /// Poll for completed render responses, discarding results from
    /// superseded generations.
    pub fn poll_responses(&mut self) -> Vec<RenderResponse> {
        let mut responses = vec![];

        while let Ok(response) = self.response_rx.try_recv() {
            let (id, generation, page) = match &response {
                RenderResponse::Page {
                    id,
                    generation,
                    data,
                } => (*id, *generation, Some(data.page)),
                RenderResponse::Error { id, generation, .. } => (*id, *generation, None),
            };

            if let Some(PendingRequest::Page(page) | PendingRequest::Prefetch(page)) =
                self.pending_requests.remove(&id)
            {
                self.prefetch_in_flight.remove(&page);
            }

            if generation < self.generation {
                debug!(
                    "discarding stale render response (gen {} < {}, page {page:?})",
                    generation.0, self.generation.0
                );
                continue;
            }

            responses.push(response);
        }

        responses
    }

    /// Check if a page is cached at the current view parameters
    #[must_use]
    pub fn is_page_cached(&self, page: usize) -> bool {
        let key = CacheKey::from_params(&self.params_for(page));
        self.cache
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .contains(&key)
    }

    /// Get a cached page at the current view parameters
    #[must_use]
    pub fn get_cached_page(&self, page: usize) -> Option<Arc<PageData>> {
        let key = CacheKey::from_params(&self.params_for(page));
        self.cache
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(&key)
    }

    fn params_for(&self, page: usize) -> RenderParams {
        let mut params = self.state.render_params();
        params.page = page;
        params
    }

    /// Shutdown the worker
    pub fn shutdown(&self) {
        let _ = self.request_tx.send(RenderRequest::Shutdown);
    }

    fn next_id(&mut self) -> RequestId {
        let id = RequestId::new(self.next_request_id);
        self.next_request_id += 1;
        id
    }
}

impl Drop for RenderService {
    fn drop(&mut self) {
        self.shutdown();
    }
}
