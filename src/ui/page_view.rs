//! Canvas widget: blits a rendered page into the terminal
//!
//! One terminal cell shows two vertically stacked samples via the upper
//! half block, so the effective pixel grid is `width x 2*height` cells.
//! The page keeps its aspect ratio and is centred in the widget area.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Color;

use crate::viewer::PageData;

const UPPER_HALF_BLOCK: &str = "\u{2580}";

/// Placement of the image inside the widget area, in cells
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlitGeometry {
    pub cell_x0: u16,
    pub cell_y0: u16,
    pub cell_w: u16,
    pub cell_h: u16,
    img_w: u32,
    img_h: u32,
}

impl BlitGeometry {
    /// Fit an image of `img_w` x `img_h` pixels into `area`, preserving
    /// aspect ratio under the 1:2 cell aspect. None when either side is
    /// degenerate.
    #[must_use]
    pub fn compute(area: Rect, img_w: u32, img_h: u32) -> Option<Self> {
        if area.width == 0 || area.height == 0 || img_w == 0 || img_h == 0 {
            return None;
        }

        // Subpixel grid: every cell is one sample wide and two tall
        let grid_w = u32::from(area.width);
        let grid_h = u32::from(area.height) * 2;

        let mut fit_w = grid_w;
        let mut fit_h = (grid_w * img_h).div_ceil(img_w);
        if fit_h > grid_h {
            fit_h = grid_h;
            fit_w = ((grid_h * img_w) / img_h).max(1);
        }
        let fit_h_cells = (fit_h.div_ceil(2)).max(1) as u16;
        let fit_w_cells = (fit_w.max(1)) as u16;

        let cell_x0 = area.x + (area.width - fit_w_cells.min(area.width)) / 2;
        let cell_y0 = area.y + (area.height - fit_h_cells.min(area.height)) / 2;

        Some(Self {
            cell_x0,
            cell_y0,
            cell_w: fit_w_cells.min(area.width),
            cell_h: fit_h_cells.min(area.height),
            img_w,
            img_h,
        })
    }

    /// Horizontal image coordinate sampled for relative cell column `cx`
    #[must_use]
    pub fn sample_x(&self, cx: u16) -> u32 {
        let fx = (f32::from(cx) + 0.5) / f32::from(self.cell_w) * self.img_w as f32;
        (fx as u32).min(self.img_w.saturating_sub(1))
    }

    /// Vertical image coordinate for subrow `sy` (two subrows per cell)
    #[must_use]
    pub fn sample_y(&self, sy: u16) -> u32 {
        let rows = f32::from(self.cell_h) * 2.0;
        let fy = (f32::from(sy) + 0.5) / rows * self.img_h as f32;
        (fy as u32).min(self.img_h.saturating_sub(1))
    }

    /// Map an absolute terminal position to image pixel coordinates.
    /// None when the position is outside the blitted page.
    #[must_use]
    pub fn cell_to_image(&self, column: u16, row: u16) -> Option<(f32, f32)> {
        if column < self.cell_x0
            || row < self.cell_y0
            || column >= self.cell_x0 + self.cell_w
            || row >= self.cell_y0 + self.cell_h
        {
            return None;
        }

        let cx = column - self.cell_x0;
        let cy = row - self.cell_y0;
        let x = (f32::from(cx) + 0.5) / f32::from(self.cell_w) * self.img_w as f32;
        let y = (f32::from(cy) + 0.5) / f32::from(self.cell_h) * self.img_h as f32;
        Some((x, y))
    }
}

/// Renders one page image with an optional selection highlight
pub struct PageView<'a> {
    data: &'a PageData,
    /// Selection rectangles in view coordinates (image pixels)
    selection: &'a [(f32, f32, f32, f32)],
}

impl<'a> PageView<'a> {
    #[must_use]
    pub fn new(data: &'a PageData, selection: &'a [(f32, f32, f32, f32)]) -> Self {
        Self { data, selection }
    }

    /// Geometry the page would occupy inside `area`
    #[must_use]
    pub fn geometry(&self, area: Rect) -> Option<BlitGeometry> {
        BlitGeometry::compute(area, self.data.img_data.width_px, self.data.img_data.height_px)
    }

    pub fn render(&self, f: &mut Frame, area: Rect) {
        let Some(geometry) = self.geometry(area) else {
            return;
        };

        let buf = f.buffer_mut();
        for cy in 0..geometry.cell_h {
            for cx in 0..geometry.cell_w {
                let sx = geometry.sample_x(cx);
                let top_y = geometry.sample_y(cy * 2);
                let bottom_y = geometry.sample_y(cy * 2 + 1);

                let top = self.sample(sx, top_y);
                let bottom = self.sample(sx, bottom_y);

                let position = (geometry.cell_x0 + cx, geometry.cell_y0 + cy);
                if let Some(cell) = buf.cell_mut(position) {
                    cell.set_symbol(UPPER_HALF_BLOCK)
                        .set_fg(Color::Rgb(top.0, top.1, top.2))
                        .set_bg(Color::Rgb(bottom.0, bottom.1, bottom.2));
                }
            }
        }
    }

    /// Pixel sample with the selection highlight applied
    fn sample(&self, x: u32, y: u32) -> (u8, u8, u8) {
        let (r, g, b) = self.data.img_data.pixel(x, y);
        if self.is_selected(x as f32, y as f32) {
            (255 - r, 255 - g, 255 - b)
        } else {
            (r, g, b)
        }
    }

    fn is_selected(&self, x: f32, y: f32) -> bool {
        self.selection
            .iter()
            .any(|&(x0, y0, x1, y1)| x >= x0 && x <= x1 && y >= y0 && y <= y1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geometry_fits_wide_area_by_height() {
        // 100x200 page in a 80x20 cell area: 40 subpixel rows limit the
        // image to 20 samples wide
        let geometry = BlitGeometry::compute(Rect::new(0, 0, 80, 20), 100, 200).expect("fit");
        assert_eq!(geometry.cell_h, 20);
        assert_eq!(geometry.cell_w, 20);
        // Centred horizontally
        assert_eq!(geometry.cell_x0, 30);
        assert_eq!(geometry.cell_y0, 0);
    }

    #[test]
    fn geometry_fits_tall_area_by_width() {
        let geometry = BlitGeometry::compute(Rect::new(0, 0, 30, 100), 300, 300).expect("fit");
        assert_eq!(geometry.cell_w, 30);
        // 30 samples wide -> 30 tall -> 15 cells
        assert_eq!(geometry.cell_h, 15);
    }

    #[test]
    fn degenerate_input_yields_no_geometry() {
        assert!(BlitGeometry::compute(Rect::new(0, 0, 0, 10), 100, 100).is_none());
        assert!(BlitGeometry::compute(Rect::new(0, 0, 10, 10), 0, 100).is_none());
    }

    #[test]
    fn samples_stay_in_image_bounds() {
        let geometry = BlitGeometry::compute(Rect::new(0, 0, 10, 10), 37, 53).expect("fit");
        for cx in 0..geometry.cell_w {
            assert!(geometry.sample_x(cx) < 37);
        }
        for sy in 0..geometry.cell_h * 2 {
            assert!(geometry.sample_y(sy) < 53);
        }
    }

    #[test]
    fn cell_to_image_rejects_outside_positions() {
        let geometry = BlitGeometry::compute(Rect::new(5, 5, 10, 10), 100, 100).expect("fit");
        assert!(geometry.cell_to_image(0, 0).is_none());

        let inside = geometry.cell_to_image(geometry.cell_x0, geometry.cell_y0);
        assert!(inside.is_some());
        let (x, y) = inside.expect("inside");
        assert!(x >= 0.0 && x <= 100.0);
        assert!(y >= 0.0 && y <= 100.0);
    }
}
