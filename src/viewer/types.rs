//! Core types for page rendering

/// Character position information for text extraction
#[derive(Clone, Debug)]
pub struct CharInfo {
    /// X coordinate in layout pixels
    pub x: f32,
    /// The character
    pub c: char,
}

/// Line bounding box with character information
///
/// Coordinates are in layout pixels: scaled page space before rotation.
/// The viewport transform maps them onto the rotated canvas, so lines
/// stay horizontal here regardless of the view rotation.
#[derive(Clone, Debug)]
pub struct LineBounds {
    /// Left edge X coordinate
    pub x0: f32,
    /// Top edge Y coordinate
    pub y0: f32,
    /// Right edge X coordinate
    pub x1: f32,
    /// Bottom edge Y coordinate
    pub y1: f32,
    /// Characters in this line with their positions
    pub chars: Vec<CharInfo>,
}

/// Raw rendered page image.
///
/// Contains RGB pixel data sized to the viewport. This is the canvas
/// contents: the terminal blit samples from it without rescaling the
/// underlying raster.
#[derive(Clone)]
pub struct ImageData {
    /// Raw RGB pixel data (3 bytes per pixel: R, G, B)
    pub pixels: Vec<u8>,
    /// Image width in pixels
    pub width_px: u32,
    /// Image height in pixels
    pub height_px: u32,
}

impl ImageData {
    /// Sample a single pixel, clamping out-of-range coordinates to the edge.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> (u8, u8, u8) {
        if self.width_px == 0 || self.height_px == 0 {
            return (0, 0, 0);
        }
        let x = x.min(self.width_px - 1) as usize;
        let y = y.min(self.height_px - 1) as usize;
        let idx = (y * self.width_px as usize + x) * 3;
        match self.pixels.get(idx..idx + 3) {
            Some(px) => (px[0], px[1], px[2]),
            None => (0, 0, 0),
        }
    }
}

/// Complete rendered page data
#[derive(Clone)]
pub struct PageData {
    /// Rendered image data
    pub img_data: ImageData,
    /// Page number (1-based)
    pub page: usize,
    /// Zoom percent used for rendering
    pub zoom_percent: u16,
    /// Rotation used for rendering
    pub rotation: super::Rotation,
    /// Text layer lines for selection, layout coordinates
    pub text_lines: Vec<LineBounds>,
}

impl PageData {
    /// The viewport this page was rendered with, reconstructed from
    /// the actual pixmap so overlay math cannot drift from the raster.
    #[must_use]
    pub fn viewport(&self) -> super::Viewport {
        let (width, height) = (self.img_data.width_px as f32, self.img_data.height_px as f32);
        let (layout_width, layout_height) = if self.rotation.is_quarter_turn() {
            (height, width)
        } else {
            (width, height)
        };
        super::Viewport {
            width,
            height,
            scale: f32::from(self.zoom_percent) / 100.0,
            rotation: self.rotation,
            layout_width,
            layout_height,
        }
    }
}

impl std::fmt::Debug for PageData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageData")
            .field("page", &self.page)
            .field("img_data.width_px", &self.img_data.width_px)
            .field("img_data.height_px", &self.img_data.height_px)
            .field("zoom_percent", &self.zoom_percent)
            .field("rotation", &self.rotation)
            .field("text_lines_count", &self.text_lines.len())
            .finish_non_exhaustive()
    }
}
