//! Main application: event dispatch, response polling and drawing

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};
use log::{error, info};
use ratatui::Frame;
use ratatui::Terminal;
use ratatui::backend::Backend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::Paragraph;

use crate::config::Config;
use crate::notification::{NotificationLevel, NotificationManager};
use crate::ui::{BlitGeometry, HelpBar, PageView, StatusBar};
use crate::viewer::{
    Command, LoadError, LoadedDocument, PageData, RenderResponse, RenderService, Selection,
    SelectionPoint, UrlLoader, Viewport, extract_text, load_file, selection_rects,
};

const TICK_INTERVAL: Duration = Duration::from_millis(50);

pub struct App {
    config: Config,
    document: Option<LoadedDocument>,
    service: Option<RenderService>,
    /// Last page data accepted for display
    current: Option<Arc<PageData>>,
    selection: Selection,
    url_loader: UrlLoader,
    /// Reload target when the document came from a URL
    url: Option<String>,
    /// Inline URL-load error for the status bar
    url_error: Option<String>,
    notifications: NotificationManager,
    /// Blit geometry of the last drawn frame, for mouse mapping
    page_geometry: Option<(BlitGeometry, Viewport)>,
    should_quit: bool,
}

impl App {
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            document: None,
            service: None,
            current: None,
            selection: Selection::new(),
            url_loader: UrlLoader::new(),
            url: None,
            url_error: None,
            notifications: NotificationManager::new(),
            page_geometry: None,
            should_quit: false,
        }
    }

    #[must_use]
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Open a local file. Failures surface as notifications and leave
    /// the current document untouched.
    pub fn open_file(&mut self, path: &Path) {
        match load_file(path) {
            Ok(document) => self.install_document(document),
            Err(LoadError::InvalidFileType) => {
                // A mis-selected file changes nothing: whatever was
                // loaded stays loaded
                self.notifications
                    .error(format!("{} is not a PDF file", path.display()));
            }
            Err(e) => {
                error!("failed to open {path:?}: {e}");
                self.discard_document();
                self.notifications.error(format!("Failed to open: {e}"));
            }
        }
    }

    /// Trigger a URL load. Ignored while a previous load is in flight.
    pub fn open_url(&mut self, url: &str) {
        if self.url_loader.begin(url) {
            info!("fetching {url}");
            // The old handle is discarded before the new load starts;
            // a failed fetch leaves no document displayed
            self.discard_document();
            self.url = Some(url.to_string());
            self.url_error = None;
        }
    }

    fn discard_document(&mut self) {
        self.document = None;
        self.service = None;
        self.current = None;
        self.selection.clear();
    }

    /// Re-trigger the last URL load
    pub fn reload_url(&mut self) {
        if let Some(url) = self.url.clone() {
            self.open_url(&url);
        }
    }

    fn install_document(&mut self, document: LoadedDocument) {
        info!(
            "document loaded: {} ({} pages)",
            document.display_name(),
            document.page_count()
        );

        let mut service = RenderService::with_config(
            &document,
            self.config.cache_size,
            self.config.prefetch_radius,
        );
        service.render_current_page();

        // Replace wholesale: the old service shuts its worker down on
        // drop, the old handle releases any temp file with it
        self.service = Some(service);
        self.document = Some(document);
        self.current = None;
        self.selection.clear();
        self.url_error = None;
    }

    /// Poll background work: URL loads, render responses, notification
    /// expiry.
    pub fn tick(&mut self) {
        if let Some(result) = self.url_loader.poll() {
            match result {
                Ok(document) => self.install_document(document),
                Err(e) => {
                    error!("url load failed: {e}");
                    self.url_error = Some(e.to_string());
                }
            }
        }

        let mut errors = Vec::new();
        if let Some(service) = &mut self.service {
            let current_page = service.state().page;
            for response in service.poll_responses() {
                match response {
                    RenderResponse::Page { data, .. } => {
                        if data.page == current_page {
                            self.current = Some(data);
                        }
                    }
                    RenderResponse::Error { error, .. } => {
                        error!("render failed: {error}");
                        errors.push(format!("Render failed: {error}"));
                    }
                }
            }
        }
        for message in errors {
            self.notifications.error(message);
        }

        self.notifications.update();
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Esc => {
                if self.selection.has_selection() {
                    self.selection.clear();
                } else {
                    let _ = self.notifications.dismiss_current();
                }
            }

            KeyCode::Char('n' | 'j') | KeyCode::Right | KeyCode::PageDown | KeyCode::Char(' ') => {
                self.dispatch(Command::NextPage);
            }
            KeyCode::Char('p' | 'k') | KeyCode::Left | KeyCode::PageUp => {
                self.dispatch(Command::PrevPage);
            }
            KeyCode::Char('g') | KeyCode::Home => self.dispatch(Command::GoToPage(1)),
            KeyCode::Char('G') | KeyCode::End => {
                let last = self.service.as_ref().map_or(0, |s| s.state().page_count);
                if last > 0 {
                    self.dispatch(Command::GoToPage(last));
                }
            }

            KeyCode::Char('+' | '=') => self.dispatch(Command::ZoomIn),
            KeyCode::Char('-' | '_') => self.dispatch(Command::ZoomOut),

            KeyCode::Char('r') => self.dispatch(Command::RotateClockwise),
            KeyCode::Char('R') => self.dispatch(Command::RotateCounterclockwise),

            KeyCode::Char('u') => self.reload_url(),
            KeyCode::Char('y' | 'c') => self.copy_selection(),

            _ => {}
        }
    }

    fn dispatch(&mut self, cmd: Command) {
        // Any view change invalidates the selection geometry
        self.selection.clear();
        if let Some(service) = &mut self.service {
            service.apply_command(cmd);
        }
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        let Some(point) = self.layout_point(mouse.column, mouse.row) else {
            if matches!(mouse.kind, MouseEventKind::Down(MouseButton::Left)) {
                self.selection.clear();
            }
            return;
        };

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => self.selection.start_at(point),
            MouseEventKind::Drag(MouseButton::Left) => self.selection.update_end(point),
            MouseEventKind::Up(MouseButton::Left) => self.selection.finish(),
            _ => {}
        }
    }

    /// Map a terminal position onto the text layer (layout space)
    fn layout_point(&self, column: u16, row: u16) -> Option<SelectionPoint> {
        let (geometry, viewport) = self.page_geometry.as_ref()?;
        let (vx, vy) = geometry.cell_to_image(column, row)?;

        // The blit is downsampled; view coordinates come back in image
        // pixels already, so only the rotation needs undoing
        let (x, y) = viewport.to_layout(vx, vy);
        Some(SelectionPoint { x, y })
    }

    fn copy_selection(&mut self) {
        let Some(current) = &self.current else {
            return;
        };
        let Some((start, end)) = self.selection.ordered_bounds() else {
            self.notifications.info("Nothing selected");
            return;
        };

        let text = extract_text(&current.text_lines, start, end);
        if text.is_empty() {
            self.notifications.info("Nothing selected");
            return;
        }

        match arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(text.as_str())) {
            Ok(()) => {
                self.notifications
                    .info(format!("Copied {} characters", text.chars().count()));
            }
            Err(e) => {
                error!("clipboard error: {e}");
                self.notifications.error(format!("Clipboard error: {e}"));
            }
        }
    }

    pub fn draw(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .split(f.area());

        self.draw_page(f, chunks[0]);
        self.draw_status(f, chunks[1]);
        HelpBar.render(f, chunks[2]);
        self.draw_notification(f, chunks[0]);
    }

    fn draw_page(&mut self, f: &mut Frame, area: Rect) {
        self.page_geometry = None;
        if area.width == 0 || area.height == 0 {
            return;
        }

        let Some(current) = &self.current else {
            let message = if self.url_loader.is_loading() {
                "Fetching document..."
            } else if self.document.is_some() {
                "Rendering..."
            } else {
                "No document loaded"
            };
            let line = Line::styled(message, Style::default().fg(Color::DarkGray)).centered();
            let y = area.y + area.height / 2;
            f.render_widget(Paragraph::new(line), Rect::new(area.x, y, area.width, 1));
            return;
        };

        let highlight = self.selection_view_rects(current);
        let view = PageView::new(current, &highlight);
        view.render(f, area);

        if let Some(geometry) = view.geometry(area) {
            self.page_geometry = Some((geometry, current.viewport()));
        }
    }

    /// Selection rectangles in view coordinates for the highlight pass
    fn selection_view_rects(&self, current: &PageData) -> Vec<(f32, f32, f32, f32)> {
        let Some((start, end)) = self.selection.ordered_bounds() else {
            return Vec::new();
        };

        let viewport = current.viewport();
        selection_rects(&current.text_lines, start, end)
            .into_iter()
            .map(|(x0, y0, x1, y1)| viewport.rect_to_view(x0, y0, x1, y1))
            .collect()
    }

    fn draw_status(&self, f: &mut Frame, area: Rect) {
        let name = self
            .document
            .as_ref()
            .map_or("pdfolio", |doc| doc.display_name());

        let (page, page_count, zoom_percent, rotation) = match &self.service {
            Some(service) => {
                let state = service.state();
                (
                    state.page,
                    state.page_count,
                    state.zoom_percent,
                    state.rotation,
                )
            }
            None => (1, 0, 100, crate::viewer::Rotation::None),
        };

        StatusBar {
            name,
            page,
            page_count,
            zoom_percent,
            rotation,
            loading: self.url_loader.is_loading(),
            error: self.url_error.as_deref(),
        }
        .render(f, area);
    }

    fn draw_notification(&self, f: &mut Frame, area: Rect) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let Some(notification) = self.notifications.current() else {
            return;
        };

        let style = match notification.level {
            NotificationLevel::Info => Style::default().fg(Color::Black).bg(Color::Gray),
            NotificationLevel::Warning => Style::default().fg(Color::Black).bg(Color::Yellow),
            NotificationLevel::Error => Style::default().fg(Color::White).bg(Color::Red),
        };

        let line = Line::styled(format!(" {} ", notification.message), style).centered();
        f.render_widget(
            Paragraph::new(line),
            Rect::new(area.x, area.y, area.width, 1),
        );
    }
}

/// Run the event loop until the user quits
pub fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    while !app.should_quit() {
        app.tick();
        terminal.draw(|f| app.draw(f))?;

        if event::poll(TICK_INTERVAL)? {
            match event::read()? {
                Event::Key(key) => app.handle_key(key),
                Event::Mouse(mouse) => app.handle_mouse(mouse),
                Event::Resize(_, _) => {}
                _ => {}
            }
        }
    }

    Ok(())
}
