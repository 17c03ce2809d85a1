use crate::app::App;
use crate::conversation::{Message, Phase};
use crate::theme::Palette;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const TITLE: &str = "Chatbot AYOUB";
const SUBTITLE: &str = "Posez-moi une question, je suis là pour vous aider !";
const PLACEHOLDER: &str = "Exemple : Comment fonctionne l'IA ?";

pub fn render(f: &mut Frame, app: &mut App) {
    let palette = app.theme.palette();
    let banner_height = if app.conversation.error().is_some() { 3 } else { 0 };

    f.render_widget(
        Block::default().style(Style::default().bg(palette.background).fg(palette.text)),
        f.area(),
    );

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),             // header
            Constraint::Length(1),             // theme toggle
            Constraint::Length(banner_height), // error banner
            Constraint::Min(0),                // conversation
            Constraint::Length(4),             // input row, two lines of text
        ])
        .split(f.area());

    render_header(f, &palette, chunks[0]);
    render_toggle(f, app, &palette, chunks[1]);
    if let Some(error) = app.conversation.error() {
        render_error(f, error, &palette, chunks[2]);
    }
    render_conversation(f, app, &palette, chunks[3]);
    render_input(f, app, &palette, chunks[4]);
}

fn render_header(f: &mut Frame, palette: &Palette, area: Rect) {
    let text = Text::from(vec![
        Line::from(vec![
            Span::raw("🌐 "),
            Span::styled(
                TITLE,
                Style::default().fg(palette.primary).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(Span::styled(SUBTITLE, Style::default().fg(palette.muted))),
    ]);

    let header = Paragraph::new(text)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Style::default().fg(palette.secondary)),
        );

    f.render_widget(header, area);
}

fn render_toggle(f: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let line = Line::from(vec![
        Span::styled("[Ctrl+T] ", Style::default().fg(palette.muted)),
        Span::styled(app.theme.toggle_label(), Style::default().fg(palette.primary)),
    ]);
    f.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}

fn render_error(f: &mut Frame, error: &str, palette: &Palette, area: Rect) {
    let banner = Paragraph::new(error)
        .style(Style::default().fg(palette.error))
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(palette.error)),
        );
    f.render_widget(banner, area);
}

fn render_conversation(f: &mut Frame, app: &mut App, palette: &Palette, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.secondary));
    let inner = block.inner(area);

    let lines = if app.conversation.messages().is_empty() {
        empty_hint(palette)
    } else {
        conversation_lines(app.conversation.messages(), inner.width, palette)
    };

    let total = u16::try_from(lines.len()).unwrap_or(u16::MAX);
    app.sync_scroll(total.saturating_sub(inner.height));

    let paragraph = Paragraph::new(Text::from(lines))
        .block(block)
        .style(Style::default().bg(palette.background))
        .scroll((app.scroll_offset, 0));

    f.render_widget(paragraph, area);
}

fn empty_hint(palette: &Palette) -> Vec<Line<'static>> {
    let muted = Style::default().fg(palette.muted);
    vec![
        Line::from(""),
        Line::from(Span::styled("💡 Écrivez votre question et appuyez sur Entrée", muted)),
        Line::from(""),
        Line::from(Span::styled(
            "Ctrl+T thème, ↑↓ PgUp PgDn défilement, Ctrl+C quitter",
            muted.add_modifier(Modifier::ITALIC),
        )),
    ]
    .into_iter()
    .map(|line| line.alignment(Alignment::Center))
    .collect()
}

/// Lay out the messages as chat bubbles: questions on the right, answers on
/// the left, each wrapped to three quarters of the pane.
fn conversation_lines(
    messages: &[Message],
    width: u16,
    palette: &Palette,
) -> Vec<Line<'static>> {
    let bubble_width = (usize::from(width) * 3 / 4).max(8);
    let mut lines = Vec::new();

    for message in messages {
        let (style, alignment) = if message.is_user {
            (
                Style::default().fg(palette.text).bg(palette.primary),
                Alignment::Right,
            )
        } else {
            (
                Style::default().fg(palette.text).bg(palette.paper),
                Alignment::Left,
            )
        };

        for (i, row) in wrap_text(&message.text, bubble_width).into_iter().enumerate() {
            let mut spans = Vec::new();
            let marker = match (i, message.is_user) {
                (0, true) => Some("👤"),
                (0, false) => Some("🤖"),
                _ => None,
            };

            if !message.is_user {
                spans.push(Span::raw(format!("{} ", marker.unwrap_or("  "))));
            }
            spans.push(Span::styled(format!(" {} ", row), style));
            if message.is_user {
                spans.push(Span::raw(format!(" {}", marker.unwrap_or("  "))));
            }

            lines.push(Line::from(spans).alignment(alignment));
        }
        lines.push(Line::from(""));
    }

    lines
}

/// Word-wrap `text` to `width` terminal columns, splitting words that do not
/// fit. Explicit newlines are kept.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut rows = Vec::new();

    for paragraph in text.lines() {
        let mut current = String::new();
        let mut current_len = 0;

        for word in paragraph.split_whitespace() {
            let word_len = UnicodeWidthStr::width(word);

            if word_len > width {
                if current_len > 0 {
                    rows.push(std::mem::take(&mut current));
                }
                let mut pieces = split_columns(word, width);
                current = pieces.pop().unwrap_or_default();
                current_len = UnicodeWidthStr::width(current.as_str());
                rows.extend(pieces);
                continue;
            }

            let needed = if current_len == 0 {
                word_len
            } else {
                current_len + 1 + word_len
            };
            if needed > width {
                rows.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if current_len > 0 {
                current.push(' ');
                current_len += 1;
            }
            current_len += word_len;
            current.push_str(word);
        }

        rows.push(current);
    }

    if rows.is_empty() {
        rows.push(String::new());
    }
    rows
}

/// Break `text` into rows of at most `width` columns without looking at word
/// boundaries. Every character is kept, spaces included.
fn split_columns(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut rows = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for c in text.chars() {
        let w = UnicodeWidthChar::width(c).unwrap_or(0);
        if current_len + w > width && current_len > 0 {
            rows.push(std::mem::take(&mut current));
            current_len = 0;
        }
        current.push(c);
        current_len += w;
    }

    rows.push(current);
    rows
}

fn render_input(f: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(75), Constraint::Percentage(25)])
        .split(area);

    let enabled = app.input_enabled();
    let block = Block::default().borders(Borders::ALL).border_style(
        Style::default().fg(if enabled { palette.primary } else { palette.muted }),
    );
    let inner = block.inner(chunks[0]);

    let lines: Vec<Line> = if app.input.is_empty() && enabled {
        let placeholder = Style::default().fg(palette.muted).add_modifier(Modifier::ITALIC);
        vec![Line::from(Span::styled(PLACEHOLDER, placeholder))]
    } else {
        let (text, style) = if enabled {
            (format!("{}_", app.input), Style::default().fg(palette.text))
        } else {
            (app.input.clone(), Style::default().fg(palette.muted))
        };
        // Keep the end of the text, where the cursor is, in view
        let rows = split_columns(&text, usize::from(inner.width));
        let skip = rows.len().saturating_sub(usize::from(inner.height));
        rows.into_iter()
            .skip(skip)
            .map(|row| Line::from(Span::styled(row, style)))
            .collect()
    };

    let input = Paragraph::new(Text::from(lines)).block(block);
    f.render_widget(input, chunks[0]);

    let label = match app.conversation.phase() {
        Phase::Pending => "En cours...",
        Phase::Idle => "Envoyer ➤",
    };
    let button = Paragraph::new(label)
        .alignment(Alignment::Center)
        .style(Style::default().fg(palette.primary).add_modifier(Modifier::BOLD))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(palette.primary)),
        );
    f.render_widget(button, chunks[1]);
}
