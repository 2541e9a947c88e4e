use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{block::Title, Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
};
use unicode_width::UnicodeWidthChar;
use citechat::sources::{self, SOURCES_LABEL, SOURCE_SEPARATOR};
use citechat::Message;
use crate::app::{App, FocusPane, InputMode};

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_landing(app, frame, body_area);
    render_footer(app, frame, footer_area);

    if app.widget.is_open() {
        render_widget(app, frame, body_area);
    } else {
        app.chat_area = None;
        app.sources_area = None;
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" AI Chatbot ", Style::default().fg(Color::Cyan).bold()),
        Span::raw(" "),
        Span::styled(app.client.endpoint().to_string(), Style::default().fg(Color::Gray)),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_landing(app: &App, frame: &mut Frame, area: Rect) {
    let hint = if app.widget.is_open() {
        "Chat is open"
    } else {
        "Press o to open the chatbot"
    };

    let text = Text::from(vec![
        Line::default(),
        Line::from(Span::styled(
            "Welcome to Your Decentralized AI Chatbot!",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Answers come from a knowledge base and cite their sources",
            Style::default().fg(Color::Gray),
        )),
        Line::default(),
        Line::from(Span::styled(hint, Style::default().fg(Color::DarkGray))),
    ]);

    let landing = Paragraph::new(text)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::DarkGray)));
    frame.render_widget(landing, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };
    let mode_text = match app.input_mode {
        InputMode::Normal => " NORMAL ",
        InputMode::Editing => " INSERT ",
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);
    let hint = |key: &'static str, label: &'static str| {
        [Span::styled(key, key_style), Span::styled(label, label_style)]
    };

    let mut hints: Vec<Span> = Vec::new();
    if let Some(status) = &app.status {
        hints.push(Span::styled(format!(" {} ", status), label_style.fg(Color::Yellow)));
    } else if !app.widget.is_open() {
        hints.extend(hint(" o ", " open chat "));
        hints.extend(hint(" q ", " quit "));
    } else if app.input_mode == InputMode::Editing {
        hints.extend(hint(" Enter ", " send "));
        hints.extend(hint(" Esc ", " stop typing "));
    } else {
        hints.extend(hint(" i ", " type "));
        hints.extend(hint(" Tab ", " focus "));
        match app.focus {
            FocusPane::Sources => {
                hints.extend(hint(" j/k ", " nav "));
                hints.extend(hint(" Enter ", " open link "));
            }
            _ => {
                hints.extend(hint(" j/k ", " scroll "));
                hints.extend(hint(" s ", " sources "));
            }
        }
        hints.extend(hint(" Esc ", " close "));
        hints.extend(hint(" q ", " quit "));
    }

    let footer_content = Line::from(
        vec![Span::styled(mode_text, mode_style), Span::styled(" ", label_style)]
            .into_iter()
            .chain(hints)
            .collect::<Vec<_>>(),
    );

    let footer = Paragraph::new(footer_content).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}

/// Lines for one message: role label, content, optional sources line, blank spacer
pub fn message_lines(msg: &Message) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    let (label, color) = if msg.is_user {
        ("You:", Color::Cyan)
    } else if msg.is_error {
        ("AI:", Color::Red)
    } else {
        ("AI:", Color::Yellow)
    };
    lines.push(Line::from(Span::styled(
        label,
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )));

    let content_style = if msg.is_error {
        Style::default().fg(Color::Red)
    } else {
        Style::default()
    };
    for line in msg.content.lines() {
        lines.push(Line::from(Span::styled(line.to_string(), content_style)));
    }

    if !msg.sources.is_empty() {
        lines.push(sources_line(&msg.sources));
    }

    lines.push(Line::default());
    lines
}

/// "Sources: a, b" with each source styled as a link
fn sources_line(raw: &[String]) -> Line<'static> {
    let link_style = Style::default()
        .fg(Color::Blue)
        .add_modifier(Modifier::UNDERLINED);

    let mut spans = vec![Span::styled(SOURCES_LABEL, Style::default().fg(Color::DarkGray))];
    for (i, link) in sources::links(raw).into_iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(SOURCE_SEPARATOR, Style::default().fg(Color::DarkGray)));
        }
        spans.push(Span::styled(link.label, link_style));
    }
    Line::from(spans)
}

fn widget_rect(area: Rect) -> Rect {
    // Anchored to the right like a chat bubble overlay
    let width = (area.width * 3 / 5).max(40).min(area.width);
    let height = area.height.saturating_sub(2).max(10).min(area.height);
    Rect::new(
        area.x + area.width - width,
        area.y + (area.height - height),
        width,
        height,
    )
}

fn render_widget(app: &mut App, frame: &mut Frame, area: Rect) {
    let popup_area = widget_rect(area);
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" AI Chatbot ")
        .title(Title::from(" × Esc ").alignment(Alignment::Right));
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let links = app.source_links();
    let sources_height = if links.is_empty() {
        0
    } else {
        (links.len().min(5) + 2) as u16 // +2 for borders
    };

    let [chat_area, sources_area, input_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(sources_height),
        Constraint::Length(3),
    ])
    .areas(inner);

    app.chat_area = Some(chat_area);
    app.sources_area = if sources_height > 0 { Some(sources_area) } else { None };
    app.chat_height = chat_area.height.saturating_sub(2);
    app.chat_width = chat_area.width.saturating_sub(2);

    render_chat(app, frame, chat_area);
    if sources_height > 0 {
        render_sources(app, frame, sources_area, &links);
    }
    render_input(app, frame, input_area);
}

/// The chat history as drawn, without its border. Scrolling counts lines on this.
pub fn chat_paragraph(app: &App) -> Paragraph<'static> {
    let conversation = app.session.conversation();
    let chat_text = if conversation.is_empty() && !app.is_waiting() {
        Text::from(Span::styled(
            "Ask a question...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let mut lines: Vec<Line<'static>> = conversation.iter().flat_map(message_lines).collect();

        if app.is_waiting() {
            lines.push(Line::from(Span::styled(
                "AI:",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )));
            // Animated ellipsis: cycles through ".", "..", "..."
            let dots = ".".repeat((app.animation_frame as usize) + 1);
            lines.push(Line::from(Span::styled(
                format!("Thinking{}", dots),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )));
        }

        Text::from(lines)
    };

    Paragraph::new(chat_text).wrap(Wrap { trim: false })
}

fn render_chat(app: &App, frame: &mut Frame, area: Rect) {
    let focused = app.focus == FocusPane::Chat;
    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if focused { Color::Cyan } else { Color::DarkGray }));

    let chat = chat_paragraph(app)
        .block(chat_block)
        .scroll((app.chat_scroll, 0));
    frame.render_widget(chat, area);
}

fn render_sources(app: &mut App, frame: &mut Frame, area: Rect, links: &[sources::SourceLink]) {
    let focused = app.focus == FocusPane::Sources;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if focused { Color::Cyan } else { Color::Magenta }))
        .title(" Sources (Enter to open) ");

    let items: Vec<ListItem> = links
        .iter()
        .enumerate()
        .map(|(i, link)| ListItem::new(format!(" {}. {} ", i + 1, link.target)))
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::Magenta)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut app.sources_state);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let editing = app.input_mode == InputMode::Editing;
    let border_color = if editing || app.focus == FocusPane::Input {
        Color::Yellow
    } else {
        Color::DarkGray
    };
    let title = if app.is_waiting() {
        " Waiting for reply... "
    } else {
        " Type your message... "
    };
    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    let (visible_text, cursor_x) = input_view(
        app.session.input(),
        app.input_cursor,
        area.width.saturating_sub(2) as usize,
    );

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(input_block);
    frame.render_widget(input, area);

    if editing {
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

/// Part of the input that fits in `width` columns with the cursor in view,
/// plus the cursor column inside it. Widths are terminal columns.
fn input_view(input: &str, cursor: usize, width: usize) -> (String, u16) {
    if width == 0 {
        return (String::new(), 0);
    }
    let chars: Vec<char> = input.chars().collect();
    let cursor = cursor.min(chars.len());
    let cols = |c: &char| c.width().unwrap_or(0);

    // Scroll back from the cursor, keeping one column for the cursor itself
    let mut start = cursor;
    let mut used = 1;
    while start > 0 && used + cols(&chars[start - 1]) <= width {
        start -= 1;
        used += cols(&chars[start]);
    }

    let cursor_x: usize = chars[start..cursor].iter().map(cols).sum();

    let mut visible = String::new();
    let mut filled = 0;
    for c in &chars[start..] {
        let w = cols(c);
        if filled + w > width {
            break;
        }
        filled += w;
        visible.push(*c);
    }
    (visible, cursor_x as u16)
}
