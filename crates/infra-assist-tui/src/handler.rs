use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use crate::app::App;
use crate::tui::AppEvent;

/// Lines moved per mouse wheel notch
const WHEEL_LINES: u16 = 3;

pub fn handle_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Paste(text) => handle_paste(app, &text),
        AppEvent::Resize => {}
        AppEvent::Tick => app.tick_animation(),
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Char('c') if ctrl => app.should_quit = true,
        KeyCode::Esc => app.should_quit = true,
        KeyCode::Char('l') if ctrl => app.clear(),

        // Enter sends; Shift+Enter (or Alt+Enter where the terminal hides Shift) breaks the line
        KeyCode::Enter
            if key
                .modifiers
                .intersects(KeyModifiers::SHIFT | KeyModifiers::ALT) =>
        {
            app.widget.insert_newline()
        }
        KeyCode::Enter => app.submit(),

        // Transcript scrolling
        KeyCode::Up => app.widget.scroll_up(1),
        KeyCode::Down => app.widget.scroll_down(1),
        KeyCode::PageUp => app.widget.scroll_up(page_lines(app)),
        KeyCode::PageDown => app.widget.scroll_down(page_lines(app)),

        // Input editing
        KeyCode::Backspace => app.widget.backspace(),
        KeyCode::Delete => app.widget.delete(),
        KeyCode::Left => app.widget.cursor_left(),
        KeyCode::Right => app.widget.cursor_right(),
        KeyCode::Home => app.widget.cursor_home(),
        KeyCode::End => app.widget.cursor_end(),
        KeyCode::Char(c) if !ctrl => app.widget.insert_char(c),

        _ => {}
    }
}

fn handle_paste(app: &mut App, text: &str) {
    for c in text.replace("\r\n", "\n").chars() {
        match c {
            '\r' => app.widget.insert_newline(),
            c => app.widget.insert_char(c),
        }
    }
}

fn page_lines(app: &App) -> u16 {
    app.chat_area
        .map(|r| r.height.saturating_sub(2) / 2)
        .unwrap_or(5)
        .max(1)
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn hit(area: Option<Rect>, mouse: &MouseEvent) -> bool {
    area.map(|r| point_in_rect(mouse.column, mouse.row, r))
        .unwrap_or(false)
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            if hit(app.send_button, &mouse) {
                app.submit();
            } else if hit(app.clear_button, &mouse) {
                app.clear();
            }
        }
        MouseEventKind::ScrollDown if hit(app.chat_area, &mouse) => {
            app.widget.scroll_down(WHEEL_LINES);
        }
        MouseEventKind::ScrollUp if hit(app.chat_area, &mouse) => {
            app.widget.scroll_up(WHEEL_LINES);
        }
        _ => {}
    }
}
