//! Key handling for the smelter TUI.
//!
//! Translates key events into calls on the session [`App`]. Key releases and
//! repeats from terminals that report them are ignored so actions fire once.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use smelter_session::{App, Screen};

pub fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind == KeyEventKind::Release {
        return;
    }

    // Ctrl+C always quits, whatever has focus.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.quit();
        return;
    }

    if app.history.is_open() {
        handle_history_key(app, key);
        return;
    }

    match app.screen {
        Screen::Login | Screen::Signup => handle_auth_key(app, key),
        Screen::Dashboard => handle_dashboard_key(app, key),
    }
}

fn handle_history_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.close_history(),
        KeyCode::Up => app.history.select_prev(),
        KeyCode::Down => app.history.select_next(),
        KeyCode::Enter => app.confirm_history_selection(),
        _ => {}
    }
}

fn handle_auth_key(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        if key.code == KeyCode::Char('n') {
            app.switch_auth_screen();
        }
        return;
    }

    match key.code {
        KeyCode::Esc => app.quit(),
        KeyCode::Tab => {
            let screen = app.screen;
            app.form.next_field(screen);
        }
        KeyCode::Enter => app.submit_auth(),
        KeyCode::Backspace => app.form.backspace(),
        KeyCode::Char(ch) => app.form.push_char(ch),
        _ => {}
    }
}

fn handle_dashboard_key(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        if key.code == KeyCode::Char('r') {
            app.start_analysis();
        }
        return;
    }

    match key.code {
        KeyCode::Esc => app.quit(),
        KeyCode::F(5) => app.start_analysis(),
        KeyCode::F(2) => app.open_history(),
        KeyCode::F(3) => app.load_sample(),
        KeyCode::F(8) => app.logout(),
        KeyCode::Enter => app.controller.insert_newline(),
        KeyCode::Backspace => app.controller.backspace(),
        KeyCode::Left => app.controller.move_left(),
        KeyCode::Right => app.controller.move_right(),
        KeyCode::Up => app.controller.move_up(),
        KeyCode::Down => app.controller.move_down(),
        KeyCode::Home => app.controller.move_line_start(),
        KeyCode::End => app.controller.move_line_end(),
        KeyCode::Tab => {
            for _ in 0..4 {
                app.controller.insert_char(' ');
            }
        }
        KeyCode::Char(ch) => app.controller.insert_char(ch),
        _ => {}
    }
}
