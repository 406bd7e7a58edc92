//! Render worker - runs in a dedicated thread
//!
//! Owns its own MuPDF document handle (opened by path) and drains the
//! request queue sequentially, so pages are never rasterized in
//! parallel. Each request walks the full engine chain: load page,
//! compute viewport, rasterize into RGB, extract the text layer.

use std::path::Path;
use std::sync::{Arc, Mutex};

use flume::{Receiver, Sender};
use log::{debug, error};
use mupdf::text_page::TextBlockType;
use mupdf::{Colorspace, Document, Page, Pixmap, TextPageFlags};

use super::cache::{CacheKey, PageCache};
use super::request::{
    Generation, RenderFault, RenderParams, RenderRequest, RenderResponse, RequestId,
};
use super::types::{CharInfo, ImageData, LineBounds, PageData};
use super::viewport::Viewport;

pub(crate) fn render_worker(
    doc_path: &Path,
    requests: Receiver<RenderRequest>,
    responses: Sender<RenderResponse>,
    cache: Arc<Mutex<PageCache>>,
) {
    let doc = match Document::open(doc_path.to_string_lossy().as_ref()) {
        Ok(doc) => doc,
        Err(e) => {
            error!("render worker failed to open {doc_path:?}: {e}");
            let _ = responses.send(RenderResponse::Error {
                id: RequestId::new(0),
                generation: Generation(0),
                error: RenderFault::Pdf(e),
            });
            return;
        }
    };

    for request in requests {
        match request {
            RenderRequest::Page {
                id,
                generation,
                params,
            }
            | RenderRequest::Prefetch {
                id,
                generation,
                params,
            } => {
                handle_page_request(&doc, id, generation, &params, &cache, &responses);
            }

            RenderRequest::Shutdown => break,
        }
    }
}

fn handle_page_request(
    doc: &Document,
    id: RequestId,
    generation: Generation,
    params: &RenderParams,
    cache: &Arc<Mutex<PageCache>>,
    responses: &Sender<RenderResponse>,
) {
    let key = CacheKey::from_params(params);

    let cached = cache
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
        .get(&key);
    if let Some(cached) = cached {
        let _ = responses.send(RenderResponse::Page {
            id,
            generation,
            data: Arc::clone(&cached),
        });
        return;
    }

    match render_page(doc, params) {
        Ok(data) => {
            let cached = cache
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .insert(key, data);
            let _ = responses.send(RenderResponse::Page {
                id,
                generation,
                data: Arc::clone(&cached),
            });
        }
        Err(error) => {
            let _ = responses.send(RenderResponse::Error {
                id,
                generation,
                error,
            });
        }
    }
}

/// Render a single page at the requested zoom and rotation
pub fn render_page(doc: &Document, params: &RenderParams) -> Result<PageData, RenderFault> {
    let page_count = doc.page_count()? as usize;
    if params.page == 0 || params.page > page_count {
        return Err(RenderFault::PageOutOfRange {
            page: params.page,
            page_count,
        });
    }

    // MuPDF pages are 0-based
    let page = doc.load_page(params.page as i32 - 1)?;
    let bounds = page.bounds()?;

    let viewport = Viewport::compute(
        bounds.x1 - bounds.x0,
        bounds.y1 - bounds.y0,
        params.zoom_percent,
        params.rotation,
    );

    let rgb = Colorspace::device_rgb();
    let pixmap = page.to_pixmap(&viewport.matrix(), &rgb, false, false)?;
    let pixels = pixmap_to_rgb(&pixmap)?;

    let text_lines = extract_text_layer(&page, viewport.scale);

    debug!(
        "rendered page {} at {}%/{}deg: {}x{}, {} text lines",
        params.page,
        params.zoom_percent,
        params.rotation.degrees(),
        pixmap.width(),
        pixmap.height(),
        text_lines.len()
    );

    Ok(PageData {
        img_data: ImageData {
            pixels,
            width_px: pixmap.width(),
            height_px: pixmap.height(),
        },
        page: params.page,
        zoom_percent: params.zoom_percent,
        rotation: params.rotation,
        text_lines,
    })
}

fn pixmap_to_rgb(pixmap: &Pixmap) -> Result<Vec<u8>, RenderFault> {
    let width = pixmap.width() as usize;
    let height = pixmap.height() as usize;
    let n = pixmap.n() as usize;
    let stride = pixmap.stride() as usize;
    let samples = pixmap.samples();

    if n < 3 {
        return Err(RenderFault::generic("unexpected pixmap component count"));
    }
    if samples.len() < stride * height {
        return Err(RenderFault::generic("pixmap buffer size mismatch"));
    }

    let mut out = Vec::with_capacity(width * height * 3);
    for row in samples.chunks(stride).take(height) {
        let row = &row[..width * n];
        if n == 3 {
            out.extend_from_slice(row);
        } else {
            for px in row.chunks_exact(n) {
                out.extend_from_slice(&px[..3]);
            }
        }
    }

    Ok(out)
}

/// Extract the text layer in layout coordinates (scaled, unrotated)
pub(crate) fn extract_text_layer(page: &Page, scale: f32) -> Vec<LineBounds> {
    page.to_text_page(TextPageFlags::empty())
        .map(|text_page| {
            let mut lines = Vec::new();

            for block in text_page.blocks() {
                if block.r#type() != TextBlockType::Text {
                    continue;
                }
                for line in block.lines() {
                    let bbox = line.bounds();
                    let chars: Vec<CharInfo> = line
                        .chars()
                        .filter_map(|ch| {
                            ch.char().map(|c| CharInfo {
                                x: ch.origin().x * scale,
                                c,
                            })
                        })
                        .collect();

                    lines.push(LineBounds {
                        x0: bbox.x0 * scale,
                        y0: bbox.y0 * scale,
                        x1: bbox.x1 * scale,
                        y1: bbox.y1 * scale,
                        chars,
                    });
                }
            }
            lines
        })
        .unwrap_or_default()
}
