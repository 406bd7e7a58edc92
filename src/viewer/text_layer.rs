//! Selectable text layer over the rendered canvas
//!
//! The worker ships per-line bounds with per-character origins in
//! layout coordinates. Selection and extraction are pure functions over
//! that data, so copying text never goes back to the PDF engine.

use super::types::LineBounds;

/// A point in the selection, layout coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SelectionPoint {
    pub x: f32,
    pub y: f32,
}

/// Text selection state
#[derive(Clone, Debug, Default)]
pub struct Selection {
    /// Anchor point of the selection
    pub start: Option<SelectionPoint>,
    /// Head point of the selection
    pub end: Option<SelectionPoint>,
    /// Whether selection is in progress
    pub is_selecting: bool,
}

impl Selection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start selection at a point
    pub fn start_at(&mut self, point: SelectionPoint) {
        self.start = Some(point);
        self.end = Some(point);
        self.is_selecting = true;
    }

    /// Update the head point during selection
    pub fn update_end(&mut self, point: SelectionPoint) {
        if self.is_selecting {
            self.end = Some(point);
        }
    }

    /// Finish selection
    pub fn finish(&mut self) {
        self.is_selecting = false;
    }

    /// Clear selection
    pub fn clear(&mut self) {
        self.start = None;
        self.end = None;
        self.is_selecting = false;
    }

    /// Check if there is an active selection
    #[must_use]
    pub fn has_selection(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }

    /// Get ordered selection bounds (top-left first in reading order)
    #[must_use]
    pub fn ordered_bounds(&self) -> Option<(SelectionPoint, SelectionPoint)> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => {
                let start_first = (start.y, start.x) <= (end.y, end.x);
                if start_first {
                    Some((start, end))
                } else {
                    Some((end, start))
                }
            }
            _ => None,
        }
    }
}

/// Extract the selected text between two ordered points.
///
/// Lines whose vertical extent overlaps the selection are included; the
/// first and last selected lines are clipped by character origin, so a
/// selection that starts or ends mid-line takes only the covered span.
#[must_use]
pub fn extract_text(lines: &[LineBounds], start: SelectionPoint, end: SelectionPoint) -> String {
    let mut selected: Vec<(f32, String)> = Vec::new();

    for line in lines {
        let Some(span) = line_span(line, start, end) else {
            continue;
        };

        let mut line_text = String::new();
        for ch in &line.chars {
            if ch.x >= span.0 && ch.x <= span.1 {
                line_text.push(ch.c);
            }
        }

        if !line_text.is_empty() {
            selected.push((line.y0, line_text));
        }
    }

    selected.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

    let mut text = String::new();
    for (_, line_text) in selected {
        if !text.is_empty() {
            text.push('\n');
        }
        text.push_str(&line_text);
    }
    text
}

/// Highlight rectangles for the selection, layout coordinates.
///
/// One rectangle per selected line, clipped on the first and last line.
#[must_use]
pub fn selection_rects(
    lines: &[LineBounds],
    start: SelectionPoint,
    end: SelectionPoint,
) -> Vec<(f32, f32, f32, f32)> {
    let mut rects: Vec<(f32, f32, f32, f32)> = Vec::new();

    for line in lines {
        let Some(span) = line_span(line, start, end) else {
            continue;
        };
        let x0 = span.0.max(line.x0);
        let x1 = span.1.min(line.x1);
        if x0 < x1 {
            rects.push((x0, line.y0, x1, line.y1));
        }
    }

    rects
}

/// The horizontal span of `line` covered by the selection, or None if
/// the line is outside the selected rows.
fn line_span(line: &LineBounds, start: SelectionPoint, end: SelectionPoint) -> Option<(f32, f32)> {
    if line.y1 < start.y || line.y0 > end.y {
        return None;
    }

    let is_first = line.y0 <= start.y && line.y1 >= start.y;
    let is_last = line.y0 <= end.y && line.y1 >= end.y;

    let from = if is_first { start.x } else { f32::NEG_INFINITY };
    let to = if is_last { end.x } else { f32::INFINITY };
    Some((from, to))
}
