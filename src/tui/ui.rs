//! Layout and rendering

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::app::{App, Stroke};
use super::mirror_view::MirrorView;
use crate::canvas::Rgb;
use crate::net::transport::Connector;

/// Draw the whole screen; returns the area the canvas occupies
pub fn render<C: Connector>(frame: &mut Frame, app: &App<C>) -> Rect {
    let [canvas, status] =
        Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(frame.area());

    frame.render_widget(MirrorView::new(app.client().mirror()), canvas);
    frame.render_widget(Paragraph::new(status_line(app)), status);
    canvas
}

fn status_line<C: Connector>(app: &App<C>) -> Line<'static> {
    let client = app.client();
    let brush = app.brush();
    let stats = client.stats();
    let dim = Style::default().fg(Color::DarkGray);
    let swatch = Rgb::from(brush.color).to_ratatui();

    let mut spans = vec![
        Span::styled(
            format!(" {} ", client.connection().endpoint()),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("{} │ ", client.dimensions()), dim),
        Span::raw(format!("{} ", brush.name)),
        Span::styled("██", Style::default().fg(swatch)),
        Span::raw(format!(
            " #{:02x}{:02x}{:02x}{:02x} size {} steady {}",
            brush.color.r, brush.color.g, brush.color.b, brush.color.a, brush.size, brush.stabilization
        )),
        Span::styled(
            format!(
                " │ {} px  {} B  {} reconnects",
                stats.pixels,
                stats.bytes_sent,
                client.connection().reconnects()
            ),
            dim,
        ),
    ];
    if app.stroke() == Some(Stroke::Erase) {
        spans.push(Span::styled(" │ erasing", Style::default().fg(Color::Yellow)));
    }
    if let Some((row, height)) = app.fill_progress() {
        spans.push(Span::styled(
            format!(" │ clearing {row}/{height}"),
            Style::default().fg(Color::Yellow),
        ));
    }
    Line::from(spans)
}
