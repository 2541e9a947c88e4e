use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use crate::app::{App, FocusPane, InputMode};
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize => {}
        AppEvent::Tick => app.tick_animation(),
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    // Any key clears the last status message
    app.status = None;

    match app.input_mode {
        InputMode::Normal if app.widget.is_open() => handle_widget_normal(app, key),
        InputMode::Normal => handle_landing(app, key),
        InputMode::Editing => handle_editing(app, key),
    }
}

fn handle_landing(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('o') | KeyCode::Enter => app.toggle_widget(),
        _ => {}
    }
}

fn handle_widget_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,

        // Close the widget
        KeyCode::Char('o') | KeyCode::Char('x') | KeyCode::Esc => app.toggle_widget(),

        KeyCode::Tab => app.cycle_focus(),

        KeyCode::Char('i') => {
            app.focus = FocusPane::Input;
            app.input_mode = InputMode::Editing;
        }

        KeyCode::Enter => match app.focus {
            FocusPane::Sources => app.open_selected_source(),
            _ => {
                app.focus = FocusPane::Input;
                app.input_mode = InputMode::Editing;
            }
        },

        KeyCode::Char('j') | KeyCode::Down => match app.focus {
            FocusPane::Sources => app.sources_nav_down(),
            _ => app.scroll_chat_down(1),
        },
        KeyCode::Char('k') | KeyCode::Up => match app.focus {
            FocusPane::Sources => app.sources_nav_up(),
            _ => app.scroll_chat_up(1),
        },

        KeyCode::Char('g') => app.chat_scroll = 0,
        KeyCode::Char('G') => app.scroll_chat_to_bottom(),

        KeyCode::Char('s') => {
            if !app.session.conversation().sources().is_empty() {
                app.focus = FocusPane::Sources;
                if app.sources_state.selected().is_none() {
                    app.sources_state.select(Some(0));
                }
            }
        }

        _ => {}
    }
}

fn handle_editing(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => {
            app.send();
        }
        KeyCode::Backspace => {
            if app.input_cursor > 0 {
                app.input_cursor -= 1;
                let input = app.session.input_mut();
                let byte_pos = char_to_byte_index(input, app.input_cursor);
                input.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            let cursor = app.input_cursor;
            let input = app.session.input_mut();
            if cursor < input.chars().count() {
                let byte_pos = char_to_byte_index(input, cursor);
                input.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.input_cursor = app.input_cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.session.input().chars().count();
            app.input_cursor = (app.input_cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            app.input_cursor = 0;
        }
        KeyCode::End => {
            app.input_cursor = app.session.input().chars().count();
        }
        KeyCode::Char(c) => {
            let cursor = app.input_cursor;
            let input = app.session.input_mut();
            let byte_pos = char_to_byte_index(input, cursor);
            input.insert(byte_pos, c);
            app.input_cursor += 1;
        }
        _ => {}
    }
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    if !app.widget.is_open() {
        return;
    }

    let (x, y) = (mouse.column, mouse.row);
    let in_chat = app.chat_area.is_some_and(|r| point_in_rect(x, y, r));
    let in_sources = app.sources_area.is_some_and(|r| point_in_rect(x, y, r));

    match mouse.kind {
        MouseEventKind::ScrollDown => {
            if in_chat {
                app.scroll_chat_down(3);
            } else if in_sources {
                app.sources_nav_down();
            }
        }
        MouseEventKind::ScrollUp => {
            if in_chat {
                app.scroll_chat_up(3);
            } else if in_sources {
                app.sources_nav_up();
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use citechat::Settings;

    fn press(app: &mut App, code: KeyCode) {
        handle_event(app, AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))).unwrap();
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn open_type_and_edit_input() {
        let mut app = App::new(&Settings::default());
        press(&mut app, KeyCode::Char('o'));
        assert!(app.widget.is_open());

        press(&mut app, KeyCode::Char('i'));
        assert_eq!(app.input_mode, InputMode::Editing);

        type_text(&mut app, "héllo");
        press(&mut app, KeyCode::Left);
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.session.input(), "hélo");
        assert_eq!(app.input_cursor, 3);

        press(&mut app, KeyCode::Home);
        press(&mut app, KeyCode::Delete);
        assert_eq!(app.session.input(), "élo");
    }

    #[test]
    fn typing_q_while_editing_does_not_quit() {
        let mut app = App::new(&Settings::default());
        press(&mut app, KeyCode::Char('o'));
        press(&mut app, KeyCode::Char('i'));
        type_text(&mut app, "quit");
        assert!(!app.should_quit);
        assert_eq!(app.session.input(), "quit");
    }

    #[test]
    fn esc_closes_widget_from_normal_mode() {
        let mut app = App::new(&Settings::default());
        press(&mut app, KeyCode::Char('o'));
        press(&mut app, KeyCode::Esc);
        assert!(!app.widget.is_open());
    }

    #[test]
    fn ctrl_c_quits_anywhere() {
        let mut app = App::new(&Settings::default());
        press(&mut app, KeyCode::Char('o'));
        press(&mut app, KeyCode::Char('i'));
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        handle_event(&mut app, AppEvent::Key(key)).unwrap();
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn enter_on_blank_input_sends_nothing() {
        let mut app = App::new(&Settings::default());
        press(&mut app, KeyCode::Char('o'));
        press(&mut app, KeyCode::Char('i'));
        type_text(&mut app, "   ");
        press(&mut app, KeyCode::Enter);
        assert!(app.session.conversation().is_empty());
        assert!(app.dispatch_task.is_none());
    }
}
