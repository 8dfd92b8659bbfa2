pub mod app;
pub mod event;
pub mod theme;
pub mod ui;

pub use app::App;
pub use theme::{resolve_theme, ThemeColors};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use event::{Event, EventHandler};

pub async fn run_tui(mut app: App) -> anyhow::Result<()> {
    // Init terminal (sets up panic hooks automatically)
    let mut terminal = ratatui::init();
    let mut events = EventHandler::new(250);

    let result: anyhow::Result<()> = loop {
        if let Err(e) = terminal.draw(|frame| ui::draw(frame, &mut app)) {
            break Err(e.into());
        }

        match events.next().await {
            Event::Key(key) => handle_key_event(&mut app, key),
            Event::Tick => app.update_flash(),
        }

        if app.should_quit {
            break Ok(());
        }
    };

    ratatui::restore();
    result
}

fn handle_key_event(app: &mut App, key: KeyEvent) {
    match app.input_mode {
        app::InputMode::Normal => match key.code {
            KeyCode::Char('q') => app.should_quit = true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                app.should_quit = true
            }

            KeyCode::Char('j') | KeyCode::Down => app.next_row(),
            KeyCode::Char('k') | KeyCode::Up => app.previous_row(),
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Char('h') | KeyCode::Char('l') => {
                app.toggle_focus()
            }

            KeyCode::Enter | KeyCode::Char('a') => app.start_rating(),
            KeyCode::Char('L') => app.cycle_label(),
            KeyCode::Char('r') => app.reload(),
            KeyCode::Char('?') => app.show_help(),
            _ => {}
        },
        app::InputMode::RatingForm => match key.code {
            KeyCode::Enter => app.confirm_rating(),
            KeyCode::Esc => app.cancel_rating(),
            KeyCode::Tab | KeyCode::Down => app.form.next_field(),
            KeyCode::BackTab | KeyCode::Up => app.form.previous_field(),
            KeyCode::Backspace => app.form.backspace(),
            KeyCode::Char(c) => app.form.push_char(c),
            _ => {}
        },
        app::InputMode::Help => {
            // Any key exits help
            app.dismiss_help();
        }
    }
}
