//! Viewport computation for page rendering
//!
//! A viewport is the pixel geometry of one page at a given zoom and
//! rotation: the canvas dimensions, the MuPDF transform used to
//! rasterize into them, and the mapping between layout space (scaled,
//! unrotated page pixels — where the text layer lives) and view space
//! (what ends up on screen). Canvas and text layer are both sized from
//! the same viewport so they cannot drift apart.

use mupdf::Matrix;

use super::Rotation;

/// Pixel geometry for one page at a given zoom and rotation
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    /// Canvas width in pixels (after rotation)
    pub width: f32,
    /// Canvas height in pixels (after rotation)
    pub height: f32,
    /// Scale factor applied to page units
    pub scale: f32,
    /// Rotation applied after scaling
    pub rotation: Rotation,
    /// Page width in layout pixels (scaled, unrotated)
    pub layout_width: f32,
    /// Page height in layout pixels (scaled, unrotated)
    pub layout_height: f32,
}

impl Viewport {
    /// Compute the viewport for a page of `page_width` x `page_height`
    /// points at the given zoom percent and rotation.
    #[must_use]
    pub fn compute(page_width: f32, page_height: f32, zoom_percent: u16, rotation: Rotation) -> Self {
        let scale = f32::from(zoom_percent) / 100.0;
        let layout_width = page_width * scale;
        let layout_height = page_height * scale;

        let (width, height) = if rotation.is_quarter_turn() {
            (layout_height, layout_width)
        } else {
            (layout_width, layout_height)
        };

        Self {
            width,
            height,
            scale,
            rotation,
            layout_width,
            layout_height,
        }
    }

    /// The MuPDF transform that rasterizes the page into this viewport.
    #[must_use]
    pub fn matrix(&self) -> Matrix {
        let mut matrix = Matrix::new_scale(self.scale, self.scale);
        matrix.rotate(f32::from(self.rotation.degrees()));
        matrix
    }

    /// Map a layout-space point (scaled page pixels, unrotated) to view
    /// space. Matches the pixmap produced by [`Self::matrix`]: MuPDF
    /// translates the rotated bounding box back to the origin, which is
    /// what the width/height offsets below account for.
    #[must_use]
    pub fn to_view(&self, x: f32, y: f32) -> (f32, f32) {
        match self.rotation {
            Rotation::None => (x, y),
            Rotation::Clockwise90 => (self.width - y, x),
            Rotation::UpsideDown => (self.width - x, self.height - y),
            Rotation::Clockwise270 => (y, self.height - x),
        }
    }

    /// Inverse of [`Self::to_view`]: map a view-space point back into
    /// layout space. Used to interpret mouse positions over the canvas.
    #[must_use]
    pub fn to_layout(&self, x: f32, y: f32) -> (f32, f32) {
        match self.rotation {
            Rotation::None => (x, y),
            Rotation::Clockwise90 => (y, self.width - x),
            Rotation::UpsideDown => (self.width - x, self.height - y),
            Rotation::Clockwise270 => (self.height - y, x),
        }
    }

    /// Map an axis-aligned layout-space rectangle to a normalized view
    /// space rectangle `(x0, y0, x1, y1)`.
    #[must_use]
    pub fn rect_to_view(&self, x0: f32, y0: f32, x1: f32, y1: f32) -> (f32, f32, f32, f32) {
        let (ax, ay) = self.to_view(x0, y0);
        let (bx, by) = self.to_view(x1, y1);
        (ax.min(bx), ay.min(by), ax.max(bx), ay.max(by))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn quarter_rotation_swaps_dimensions() {
        let upright = Viewport::compute(600.0, 800.0, 100, Rotation::None);
        assert!(close(upright.width, 600.0) && close(upright.height, 800.0));

        let turned = Viewport::compute(600.0, 800.0, 100, Rotation::Clockwise90);
        assert!(close(turned.width, 800.0) && close(turned.height, 600.0));

        let flipped = Viewport::compute(600.0, 800.0, 100, Rotation::UpsideDown);
        assert!(close(flipped.width, 600.0) && close(flipped.height, 800.0));
    }

    #[test]
    fn zoom_scales_both_dimensions() {
        let vp = Viewport::compute(500.0, 700.0, 140, Rotation::None);
        assert!(close(vp.width, 700.0));
        assert!(close(vp.height, 980.0));
        assert!(close(vp.scale, 1.4));
    }

    #[test]
    fn clockwise_turn_sends_top_edge_to_right_edge() {
        let vp = Viewport::compute(600.0, 800.0, 100, Rotation::Clockwise90);
        // Top-left corner of the page lands at the top-right of the view
        let (x, y) = vp.to_view(0.0, 0.0);
        assert!(close(x, 800.0) && close(y, 0.0));
        // Top-right corner lands at the bottom-right
        let (x, y) = vp.to_view(600.0, 0.0);
        assert!(close(x, 800.0) && close(y, 600.0));
    }

    #[test]
    fn view_transform_round_trips() {
        for rotation in [
            Rotation::None,
            Rotation::Clockwise90,
            Rotation::UpsideDown,
            Rotation::Clockwise270,
        ] {
            let vp = Viewport::compute(612.0, 792.0, 180, rotation);
            let (vx, vy) = vp.to_view(123.0, 456.0);
            let (lx, ly) = vp.to_layout(vx, vy);
            assert!(close(lx, 123.0), "{rotation:?}: lx={lx}");
            assert!(close(ly, 456.0), "{rotation:?}: ly={ly}");
        }
    }

    #[test]
    fn rect_transform_is_normalized() {
        let vp = Viewport::compute(600.0, 800.0, 100, Rotation::Clockwise90);
        let (x0, y0, x1, y1) = vp.rect_to_view(10.0, 20.0, 110.0, 40.0);
        assert!(x0 <= x1 && y0 <= y1);
        // A horizontal line becomes a vertical strip under a quarter turn
        assert!(close(x1 - x0, 20.0));
        assert!(close(y1 - y0, 100.0));
    }
}
