//! Status line: document name, page position, zoom, rotation

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::viewer::Rotation;

pub struct StatusBar<'a> {
    pub name: &'a str,
    pub page: usize,
    pub page_count: usize,
    pub zoom_percent: u16,
    pub rotation: Rotation,
    pub loading: bool,
    /// Inline URL-load error, shown instead of the position info
    pub error: Option<&'a str>,
}

impl StatusBar<'_> {
    pub fn render(&self, f: &mut Frame, area: Rect) {
        let bar_style = Style::default().fg(Color::Gray).bg(Color::DarkGray);

        let mut spans = vec![Span::styled(
            format!(" {} ", self.name),
            bar_style.add_modifier(Modifier::BOLD),
        )];

        if let Some(error) = self.error {
            spans.push(Span::styled(
                format!(" {error} "),
                Style::default()
                    .fg(Color::White)
                    .bg(Color::Red)
                    .add_modifier(Modifier::BOLD),
            ));
        } else if self.loading {
            spans.push(Span::styled(" loading... ", bar_style.add_modifier(Modifier::ITALIC)));
        } else if self.page_count > 0 {
            spans.push(Span::styled(
                format!(" {}/{} ", self.page, self.page_count),
                bar_style,
            ));
            spans.push(Span::styled(format!(" {}% ", self.zoom_percent), bar_style));
            if self.rotation != Rotation::None {
                spans.push(Span::styled(
                    format!(" {}\u{b0} ", self.rotation.degrees()),
                    bar_style,
                ));
            }
        }

        let line = Line::from(spans);
        f.render_widget(Paragraph::new(line).style(bar_style), area);
    }
}

/// One-line key reference shown at the bottom of the screen
pub struct HelpBar;

impl HelpBar {
    pub fn render(&self, f: &mut Frame, area: Rect) {
        let style = Style::default().fg(Color::DarkGray);
        let line = Line::from(vec![Span::styled(
            " n/p page  +/- zoom  r/R rotate  g/G first/last  y copy  u reload  q quit",
            style,
        )]);
        f.render_widget(Paragraph::new(line), area);
    }
}
