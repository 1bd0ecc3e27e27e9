use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use infra_assist_core::ChatRole;
use crate::app::App;

/// Most input lines shown before the input box scrolls
const MAX_INPUT_LINES: u16 = 4;

const SEND_LABEL: &str = "[ Send ]";
const CLEAR_LABEL: &str = "[ Clear ]";

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    let input_lines = (app.widget.input().split('\n').count() as u16).clamp(1, MAX_INPUT_LINES);

    // header, chat log, input, buttons + status, footer
    let [header_area, chat_area, input_area, controls_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(input_lines + 2),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_chat(app, frame, chat_area);
    render_input(app, frame, input_area, input_lines);
    render_controls(app, frame, controls_area);
    render_footer(frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" IT Infrastructure Assistant ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(format!(" {} ", app.endpoint), Style::default().fg(Color::DarkGray)),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    frame.render_widget(Paragraph::new(title), area);
}

fn role_style(role: ChatRole) -> Style {
    match role {
        ChatRole::User => Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ChatRole::Assistant => Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
    }
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    app.chat_area = Some(area);

    let mut lines: Vec<Line> = Vec::new();

    for msg in app.widget.messages() {
        lines.push(Line::from(Span::styled(msg.role.label(), role_style(msg.role))));
        for line in msg.content.lines() {
            lines.push(Line::from(line.to_string()));
        }
        lines.push(Line::default());
    }

    // Typing indicator bubble
    if app.widget.is_busy() {
        lines.push(Line::from(Span::styled(
            ChatRole::Assistant.label(),
            role_style(ChatRole::Assistant),
        )));
        lines.push(Line::from(Span::styled(
            thinking_text(app),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Chat ");

    let chat = Paragraph::new(Text::from(lines)).wrap(Wrap { trim: false });

    // Measure the wrapped height at the inner width (borders excluded) so the
    // widget scrolls by the lines actually drawn
    let inner_width = area.width.saturating_sub(2);
    let content_height = u16::try_from(chat.line_count(inner_width)).unwrap_or(u16::MAX);
    app.widget
        .set_layout(area.height.saturating_sub(2), content_height);

    let chat = chat.block(block).scroll((app.widget.scroll(), 0));

    frame.render_widget(chat, area);
}

/// "Thinking" with an ellipsis cycling through ".", "..", "..."
fn thinking_text(app: &App) -> String {
    let base = app.widget.status().text().trim_end_matches('.');
    format!("{}{}", base, ".".repeat(app.animation_frame as usize + 1))
}

/// Line and column (in chars) of the cursor within multi-line input
fn cursor_line_col(input: &str, cursor: usize) -> (usize, usize) {
    let before: String = input.chars().take(cursor).collect();
    let line = before.matches('\n').count();
    let col = before
        .rsplit('\n')
        .next()
        .map(|s| s.chars().count())
        .unwrap_or(0);
    (line, col)
}

fn render_input(app: &App, frame: &mut Frame, area: Rect, visible_lines: u16) {
    let border_color = if app.widget.is_busy() {
        Color::DarkGray
    } else {
        Color::Yellow
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Ask ");

    // Scroll so the cursor stays visible. Inner width = total width - 2 (borders)
    let inner_width = area.width.saturating_sub(2) as usize;
    let (cursor_line, cursor_col) = cursor_line_col(app.widget.input(), app.widget.cursor());

    let scroll_x = if inner_width == 0 || cursor_col < inner_width {
        0
    } else {
        cursor_col - inner_width + 1
    };
    let scroll_y = cursor_line.saturating_sub(visible_lines as usize - 1);

    let input = Paragraph::new(app.widget.input().to_string())
        .style(Style::default().fg(Color::Cyan))
        .block(block)
        .scroll((scroll_y as u16, scroll_x as u16));

    frame.render_widget(input, area);

    frame.set_cursor_position((
        area.x + 1 + (cursor_col - scroll_x) as u16,
        area.y + 1 + (cursor_line - scroll_y) as u16,
    ));
}

fn render_controls(app: &mut App, frame: &mut Frame, area: Rect) {
    let send_width = SEND_LABEL.chars().count() as u16;
    let clear_width = CLEAR_LABEL.chars().count() as u16;

    let [_, send_area, _, clear_area, _, status_area] = Layout::horizontal([
        Constraint::Length(1),
        Constraint::Length(send_width),
        Constraint::Length(1),
        Constraint::Length(clear_width),
        Constraint::Length(2),
        Constraint::Min(0),
    ])
    .areas(area);

    app.send_button = Some(send_area);
    app.clear_button = Some(clear_area);

    let send_style = if app.widget.is_busy() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(Color::Black).bg(Color::Cyan)
    };
    frame.render_widget(Paragraph::new(SEND_LABEL).style(send_style), send_area);
    frame.render_widget(
        Paragraph::new(CLEAR_LABEL).style(Style::default().fg(Color::White).bg(Color::DarkGray)),
        clear_area,
    );

    let status = if app.widget.is_busy() {
        thinking_text(app)
    } else {
        String::new()
    };
    frame.render_widget(
        Paragraph::new(status).style(Style::default().fg(Color::DarkGray).italic()),
        status_area,
    );
}

fn render_footer(frame: &mut Frame, area: Rect) {
    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let hints = Line::from(vec![
        Span::styled(" Enter ", key_style),
        Span::styled(" send ", label_style),
        Span::styled(" Shift+Enter ", key_style),
        Span::styled(" newline ", label_style),
        Span::styled(" Ctrl+L ", key_style),
        Span::styled(" clear ", label_style),
        Span::styled(" PgUp/PgDn ", key_style),
        Span::styled(" scroll ", label_style),
        Span::styled(" Esc ", key_style),
        Span::styled(" quit ", label_style),
    ]);

    frame.render_widget(Paragraph::new(hints), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use infra_assist_core::{AskBackend, AskError};
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;

    struct Never;

    #[async_trait]
    impl AskBackend for Never {
        async fn ask(&self, _question: &str) -> Result<String, AskError> {
            std::future::pending().await
        }
    }

    fn draw(app: &mut App) -> String {
        draw_sized(app, 80, 24)
    }

    fn draw_sized(app: &mut App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| render(app, frame)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_cursor_line_col() {
        assert_eq!(cursor_line_col("", 0), (0, 0));
        assert_eq!(cursor_line_col("héllo", 3), (0, 3));
        assert_eq!(cursor_line_col("ab\ncde", 5), (1, 2));
        assert_eq!(cursor_line_col("ab\n", 3), (1, 0));
    }

    #[test]
    fn test_render_greeting_and_buttons() {
        let mut app = App::new(Arc::new(Never), "http://localhost:8000");
        let screen = draw(&mut app);

        assert!(screen.contains("Assistant:"));
        assert!(screen.contains("IT Infrastructure Assistant"));
        assert!(screen.contains(SEND_LABEL));
        assert!(screen.contains(CLEAR_LABEL));
        assert!(!screen.contains("Thinking"));
        assert!(app.send_button.is_some());
        assert!(app.clear_button.is_some());
    }

    #[tokio::test]
    async fn test_render_thinking_while_busy() {
        let mut app = App::new(Arc::new(Never), "http://localhost:8000");
        app.widget.set_input("What is VDI?");
        app.submit();

        let screen = draw(&mut app);

        assert!(screen.contains("You:"));
        assert!(screen.contains("What is VDI?"));
        assert!(screen.contains("Thinking."));

        if let Some(task) = app.ask_task.take() {
            task.abort();
        }
    }

    #[test]
    fn test_long_answer_tail_is_on_screen() {
        let mut app = App::new(Arc::new(Never), "http://localhost:8000");
        let answer = format!("{}ENDMARK", "virtualization abstracts ".repeat(60));
        app.widget.append_message(answer, ChatRole::Assistant);

        let screen = draw_sized(&mut app, 40, 24);

        assert!(screen.contains("ENDMARK"));
        assert_eq!(app.widget.scroll(), app.widget.max_scroll());
        // word wrapping needs far more rows than characters / width
        assert!(app.widget.content_height() > 48);
    }

    #[test]
    fn test_wide_characters_wrap_by_display_width() {
        let mut app = App::new(Arc::new(Never), "http://localhost:8000");
        let answer = format!("{}\nENDMARK", "仮想化".repeat(100));
        app.widget.append_message(answer, ChatRole::Assistant);

        let screen = draw_sized(&mut app, 40, 24);

        assert!(screen.contains("ENDMARK"));
        assert_eq!(app.widget.scroll(), app.widget.max_scroll());
    }

    #[test]
    fn test_tail_stays_visible_after_resize() {
        let mut app = App::new(Arc::new(Never), "http://localhost:8000");
        let answer = format!("{}ENDMARK", "desktop pools ".repeat(80));
        app.widget.append_message(answer, ChatRole::Assistant);

        assert!(draw_sized(&mut app, 80, 24).contains("ENDMARK"));
        assert!(draw_sized(&mut app, 30, 20).contains("ENDMARK"));
    }
}
