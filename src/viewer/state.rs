//! View state management
//!
//! Pure state transitions for the viewer: page navigation, zoom and
//! rotation. Each command commits synchronously and returns the effects
//! the render service must execute, so every state change that needs a
//! repaint is explicit.

use super::request::RenderParams;

/// Page rotation, clockwise quarter turns
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Rotation {
    #[default]
    None,
    Clockwise90,
    UpsideDown,
    Clockwise270,
}

impl Rotation {
    /// Rotation angle in degrees, one of 0/90/180/270
    #[must_use]
    pub const fn degrees(self) -> u16 {
        match self {
            Self::None => 0,
            Self::Clockwise90 => 90,
            Self::UpsideDown => 180,
            Self::Clockwise270 => 270,
        }
    }

    /// One quarter turn clockwise
    #[must_use]
    pub const fn clockwise(self) -> Self {
        match self {
            Self::None => Self::Clockwise90,
            Self::Clockwise90 => Self::UpsideDown,
            Self::UpsideDown => Self::Clockwise270,
            Self::Clockwise270 => Self::None,
        }
    }

    /// One quarter turn counterclockwise
    #[must_use]
    pub const fn counterclockwise(self) -> Self {
        match self {
            Self::None => Self::Clockwise270,
            Self::Clockwise90 => Self::None,
            Self::UpsideDown => Self::Clockwise90,
            Self::Clockwise270 => Self::UpsideDown,
        }
    }

    /// True for 90 and 270 degrees, where width and height swap
    #[must_use]
    pub const fn is_quarter_turn(self) -> bool {
        matches!(self, Self::Clockwise90 | Self::Clockwise270)
    }
}

/// Current view state for a loaded document
#[derive(Clone, Debug)]
pub struct ViewerState {
    /// Current page (1-based)
    pub page: usize,

    /// Total page count, 0 while no document is loaded
    pub page_count: usize,

    /// Zoom as integer percent, 100 = natural size
    pub zoom_percent: u16,

    /// Current rotation
    pub rotation: Rotation,
}

impl Default for ViewerState {
    fn default() -> Self {
        Self {
            page: 1,
            page_count: 0,
            zoom_percent: Self::DEFAULT_ZOOM_PERCENT,
            rotation: Rotation::None,
        }
    }
}

impl ViewerState {
    /// Zoom change per step - 20% (a 0.2 scale step)
    pub const ZOOM_STEP_PERCENT: u16 = 20;
    /// Minimum allowed zoom - 25% (0.25)
    pub const MIN_ZOOM_PERCENT: u16 = 25;
    /// Maximum allowed zoom - 300% (3.0)
    pub const MAX_ZOOM_PERCENT: u16 = 300;
    /// Zoom of a freshly loaded document
    pub const DEFAULT_ZOOM_PERCENT: u16 = 100;

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset to the post-load contract: page 1, natural zoom, no rotation.
    pub fn reset_for_document(&mut self, page_count: usize) {
        self.page = 1;
        self.page_count = page_count;
        self.zoom_percent = Self::DEFAULT_ZOOM_PERCENT;
        self.rotation = Rotation::None;
    }

    /// Zoom as a scale factor (1.0 = 100%)
    #[must_use]
    pub fn scale(&self) -> f32 {
        f32::from(self.zoom_percent) / 100.0
    }

    /// Apply a command and return resulting effects
    #[must_use]
    pub fn apply(&mut self, cmd: Command) -> Vec<Effect> {
        match cmd {
            Command::NextPage => {
                if self.page_count > 0 && self.page < self.page_count {
                    self.page += 1;
                    vec![Effect::RenderCurrentPage, Effect::UpdatePrefetch]
                } else {
                    vec![]
                }
            }

            Command::PrevPage => {
                if self.page_count > 0 && self.page > 1 {
                    self.page -= 1;
                    vec![Effect::RenderCurrentPage, Effect::UpdatePrefetch]
                } else {
                    vec![]
                }
            }

            Command::GoToPage(page) => {
                if self.page_count == 0 {
                    return vec![];
                }
                let clamped = page.clamp(1, self.page_count);
                if self.page != clamped {
                    self.page = clamped;
                    vec![Effect::RenderCurrentPage, Effect::UpdatePrefetch]
                } else {
                    vec![]
                }
            }

            Command::ZoomIn => {
                let stepped = self
                    .zoom_percent
                    .saturating_add(Self::ZOOM_STEP_PERCENT)
                    .min(Self::MAX_ZOOM_PERCENT);
                self.set_zoom(stepped)
            }

            Command::ZoomOut => {
                let stepped = self
                    .zoom_percent
                    .saturating_sub(Self::ZOOM_STEP_PERCENT)
                    .max(Self::MIN_ZOOM_PERCENT);
                self.set_zoom(stepped)
            }

            Command::RotateClockwise => {
                self.rotation = self.rotation.clockwise();
                vec![Effect::RenderCurrentPage, Effect::UpdatePrefetch]
            }

            Command::RotateCounterclockwise => {
                self.rotation = self.rotation.counterclockwise();
                vec![Effect::RenderCurrentPage, Effect::UpdatePrefetch]
            }

            Command::SetPageCount(count) => {
                self.page_count = count;
                if count > 0 && self.page > count {
                    self.page = count;
                }
                vec![]
            }
        }
    }

    fn set_zoom(&mut self, zoom_percent: u16) -> Vec<Effect> {
        if self.zoom_percent != zoom_percent {
            self.zoom_percent = zoom_percent;
            vec![Effect::RenderCurrentPage, Effect::UpdatePrefetch]
        } else {
            vec![]
        }
    }

    /// Get render parameters from current state
    #[must_use]
    pub fn render_params(&self) -> RenderParams {
        RenderParams {
            page: self.page,
            zoom_percent: self.zoom_percent,
            rotation: self.rotation,
        }
    }
}

/// Commands that modify view state
#[derive(Clone, Copy, Debug)]
pub enum Command {
    /// Advance one page, no-op on the last page
    NextPage,
    /// Go back one page, no-op on the first page
    PrevPage,
    /// Jump to a specific page (1-based, clamped)
    GoToPage(usize),
    /// Zoom in one step
    ZoomIn,
    /// Zoom out one step
    ZoomOut,
    /// Rotate a quarter turn clockwise
    RotateClockwise,
    /// Rotate a quarter turn counterclockwise
    RotateCounterclockwise,
    /// Update the page count
    SetPageCount(usize),
}

/// Effects produced by state changes
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    /// Render the current page with the committed parameters
    RenderCurrentPage,
    /// Update the prefetch neighbourhood
    UpdatePrefetch,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded_state(page_count: usize) -> ViewerState {
        let mut state = ViewerState::new();
        state.reset_for_document(page_count);
        state
    }

    #[test]
    fn next_page_advances_until_last() {
        let mut state = loaded_state(3);

        assert!(!state.apply(Command::NextPage).is_empty());
        assert!(!state.apply(Command::NextPage).is_empty());
        assert_eq!(state.page, 3);

        // Third call is a no-op at the upper bound
        assert!(state.apply(Command::NextPage).is_empty());
        assert_eq!(state.page, 3);
    }

    #[test]
    fn prev_page_is_noop_on_first_page() {
        let mut state = loaded_state(3);

        assert!(state.apply(Command::PrevPage).is_empty());
        assert_eq!(state.page, 1);

        let _ = state.apply(Command::NextPage);
        let effects = state.apply(Command::PrevPage);
        assert_eq!(
            effects,
            vec![Effect::RenderCurrentPage, Effect::UpdatePrefetch]
        );
        assert_eq!(state.page, 1);
    }

    #[test]
    fn navigation_without_document_is_noop() {
        let mut state = ViewerState::new();

        assert!(state.apply(Command::NextPage).is_empty());
        assert!(state.apply(Command::PrevPage).is_empty());
        assert!(state.apply(Command::GoToPage(5)).is_empty());
        assert_eq!(state.page, 1);
    }

    #[test]
    fn go_to_page_clamps_to_bounds() {
        let mut state = loaded_state(10);

        let _ = state.apply(Command::GoToPage(999));
        assert_eq!(state.page, 10);

        let _ = state.apply(Command::GoToPage(0));
        assert_eq!(state.page, 1);
    }

    #[test]
    fn go_to_same_page_returns_no_effects() {
        let mut state = loaded_state(10);
        let _ = state.apply(Command::GoToPage(4));
        assert!(state.apply(Command::GoToPage(4)).is_empty());
    }

    #[test]
    fn zoom_steps_by_exact_increment() {
        let mut state = loaded_state(1);

        let _ = state.apply(Command::ZoomIn);
        assert_eq!(state.zoom_percent, 120);

        let _ = state.apply(Command::ZoomOut);
        let _ = state.apply(Command::ZoomOut);
        assert_eq!(state.zoom_percent, 80);
    }

    #[test]
    fn zoom_clamps_at_maximum() {
        let mut state = loaded_state(1);

        for _ in 0..20 {
            let _ = state.apply(Command::ZoomIn);
        }
        assert_eq!(state.zoom_percent, ViewerState::MAX_ZOOM_PERCENT);

        // Stepping at the boundary changes nothing and emits no effects
        assert!(state.apply(Command::ZoomIn).is_empty());
        assert_eq!(state.zoom_percent, 300);
    }

    #[test]
    fn zoom_clamps_at_minimum() {
        let mut state = loaded_state(1);

        for _ in 0..20 {
            let _ = state.apply(Command::ZoomOut);
        }
        assert_eq!(state.zoom_percent, ViewerState::MIN_ZOOM_PERCENT);
        assert!(state.apply(Command::ZoomOut).is_empty());
    }

    #[test]
    fn zoom_stays_in_bounds_for_any_sequence() {
        let mut state = loaded_state(1);

        for step in 0..50 {
            let cmd = if step % 3 == 0 {
                Command::ZoomOut
            } else {
                Command::ZoomIn
            };
            let before = state.zoom_percent;
            let _ = state.apply(cmd);
            let delta = i32::from(state.zoom_percent) - i32::from(before);

            assert!(state.zoom_percent >= ViewerState::MIN_ZOOM_PERCENT);
            assert!(state.zoom_percent <= ViewerState::MAX_ZOOM_PERCENT);
            assert!(delta.unsigned_abs() <= u32::from(ViewerState::ZOOM_STEP_PERCENT));
        }
    }

    #[test]
    fn rotation_wraps_full_circle() {
        let mut state = loaded_state(1);

        let _ = state.apply(Command::RotateClockwise);
        assert_eq!(state.rotation.degrees(), 90);

        for _ in 0..3 {
            let _ = state.apply(Command::RotateClockwise);
        }
        assert_eq!(state.rotation, Rotation::None);

        let _ = state.apply(Command::RotateCounterclockwise);
        assert_eq!(state.rotation.degrees(), 270);
    }

    #[test]
    fn rotation_always_triggers_render() {
        let mut state = loaded_state(1);
        let effects = state.apply(Command::RotateClockwise);
        assert_eq!(
            effects,
            vec![Effect::RenderCurrentPage, Effect::UpdatePrefetch]
        );
    }

    #[test]
    fn reset_restores_load_contract() {
        let mut state = loaded_state(5);
        let _ = state.apply(Command::GoToPage(4));
        let _ = state.apply(Command::ZoomIn);
        let _ = state.apply(Command::RotateClockwise);

        state.reset_for_document(8);

        assert_eq!(state.page, 1);
        assert_eq!(state.page_count, 8);
        assert_eq!(state.zoom_percent, ViewerState::DEFAULT_ZOOM_PERCENT);
        assert_eq!(state.rotation, Rotation::None);
    }

    #[test]
    fn set_page_count_clamps_current_page() {
        let mut state = loaded_state(10);
        let _ = state.apply(Command::GoToPage(9));

        let _ = state.apply(Command::SetPageCount(4));
        assert_eq!(state.page, 4);
    }

    #[test]
    fn scale_converts_percent() {
        let mut state = loaded_state(1);
        assert!((state.scale() - 1.0).abs() < f32::EPSILON);

        let _ = state.apply(Command::ZoomIn);
        assert!((state.scale() - 1.2).abs() < 1e-6);
    }
}
