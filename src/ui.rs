use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use typesprint::{app::App, CharState, CharView, SessionState};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 1;

pub fn draw(app: &App, f: &mut Frame) {
    let area = f.area();
    let session = &app.session;

    let max_chars_per_line = area.width.saturating_sub(HORIZONTAL_MARGIN * 2).max(1);
    let text = session.text();
    let prompt_lines = if text.width() <= max_chars_per_line as usize {
        1
    } else {
        ((text.width() as f64 / max_chars_per_line as f64).ceil() + 1.0) as u16
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1), // metrics
            Constraint::Min(1),
            Constraint::Length(prompt_lines),
            Constraint::Min(1),
            Constraint::Length(1), // result / status
            Constraint::Length(1), // legend
        ])
        .split(area);

    f.render_widget(metrics_bar(app), chunks[0]);

    match session.state() {
        SessionState::Idle => {
            let hint = Paragraph::new(Span::styled(
                "Press Enter to start",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD | Modifier::ITALIC),
            ))
            .alignment(Alignment::Center);
            f.render_widget(hint, chunks[2]);
        }
        SessionState::Running | SessionState::Ended(_) => {
            let spans: Vec<Span> = session.char_states().map(char_span).collect();
            let prompt = Paragraph::new(Line::from(spans))
                .alignment(if prompt_lines == 1 {
                    Alignment::Center
                } else {
                    Alignment::Left
                })
                .wrap(Wrap { trim: true });
            f.render_widget(prompt, chunks[2]);
        }
    }

    render_status(app, f, chunks[4]);

    let legend = Paragraph::new(Span::styled(
        "(enter) start / (tab) new text / (ctrl+r) reset / (esc) quit",
        Style::default().add_modifier(Modifier::ITALIC),
    ));
    f.render_widget(legend, chunks[5]);
}

fn metrics_bar(app: &App) -> Paragraph<'static> {
    let m = app.session.metrics();
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let dim = Style::default().add_modifier(Modifier::DIM);

    Paragraph::new(Line::from(vec![
        Span::styled("WPM ", dim),
        Span::styled(m.wpm.to_string(), bold),
        Span::styled("   Accuracy ", dim),
        Span::styled(m.accuracy_label(), bold),
        Span::styled("   Mistakes ", dim),
        Span::styled(m.mistakes.to_string(), bold),
        Span::styled("   Time ", dim),
        Span::styled(m.remaining_label(), bold),
    ]))
    .alignment(Alignment::Center)
}

fn render_status(app: &App, f: &mut Frame, area: Rect) {
    let line = if let Some(err) = &app.last_error {
        Span::styled(err.clone(), Style::default().fg(Color::Red))
    } else if let Some(summary) = app.session.summary() {
        Span::styled(
            format!("Result: {summary}"),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        return;
    };

    f.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}

fn char_span(view: CharView) -> Span<'static> {
    let bold = Style::default().add_modifier(Modifier::BOLD);

    let mut style = match view.state {
        CharState::Correct => bold.fg(Color::Green),
        CharState::Incorrect => bold.fg(Color::Red),
        CharState::Pending => bold.add_modifier(Modifier::DIM),
    };
    if view.is_cursor {
        style = style.add_modifier(Modifier::UNDERLINED);
    }

    let shown = match (view.state, view.ch) {
        (CharState::Incorrect, ' ') => "·".to_owned(),
        (_, c) => c.to_string(),
    };
    Span::styled(shown, style)
}
