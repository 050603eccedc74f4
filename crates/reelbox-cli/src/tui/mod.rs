//! Interactive movie browser.
//!
//! Uses `ratatui` + `crossterm` for rendering. Terminal input and session
//! events are multiplexed on one task with `tokio::select!`.

/// Browser view state types.
pub mod state;
mod ui;

use std::io;

use anyhow::{Context, Result};
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use futures::StreamExt;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use reelbox_api::omdb::{CatalogApi, IMDB_TITLE_BASE_URL};
use reelbox_core::SessionCoordinator;

use self::state::{ActivePane, InputMode, ViewState};

/// Runs the browser until the user quits.
///
/// # Errors
///
/// Returns an error if terminal setup or event handling fails.
pub async fn run_browser<C>(mut session: SessionCoordinator<C>) -> Result<()>
where
    C: CatalogApi + Send + Sync + 'static,
{
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    crossterm::execute!(stdout, EnterAlternateScreen)
        .context("failed to enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to create terminal")?;

    let mut view = ViewState::new();
    let result = run_event_loop(&mut terminal, &mut session, &mut view).await;

    // Cleanup (always attempt even if event loop failed)
    disable_raw_mode().context("failed to disable raw mode")?;
    crossterm::execute!(io::stdout(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;

    result
}

/// Main event loop.
async fn run_event_loop<C>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    session: &mut SessionCoordinator<C>,
    view: &mut ViewState,
) -> Result<()>
where
    C: CatalogApi + Send + Sync + 'static,
{
    let mut reader = EventStream::new();

    loop {
        {
            let snapshot = session.snapshot();
            let results_len = snapshot.search.success().map_or(0, Vec::len);
            view.clamp(results_len, snapshot.watched.len());
            terminal
                .draw(|frame| ui::draw(frame, &snapshot, view))
                .context("failed to draw TUI")?;
        }

        tokio::select! {
            maybe_event = reader.next() => match maybe_event {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                    let quit = match view.input_mode {
                        InputMode::Search => {
                            handle_search_input(session, view, key.code);
                            false
                        }
                        InputMode::Normal => handle_normal_input(session, view, key),
                    };
                    if quit {
                        return Ok(());
                    }
                }
                Some(Ok(_)) => {}
                Some(Err(err)) => return Err(err).context("failed to read terminal event"),
                None => return Ok(()),
            },
            Some(event) = session.next_event() => {
                session.handle_event(event);
            }
        }
    }
}

/// Handles key input while editing the query.
fn handle_search_input<C>(session: &mut SessionCoordinator<C>, view: &mut ViewState, key: KeyCode)
where
    C: CatalogApi + Send + Sync + 'static,
{
    match key {
        KeyCode::Esc | KeyCode::Enter => {
            view.input_mode = InputMode::Normal;
        }
        KeyCode::Backspace => {
            let mut query = String::from(session.snapshot().query);
            query.pop();
            session.set_query(query);
        }
        KeyCode::Char(c) => {
            let mut query = String::from(session.snapshot().query);
            query.push(c);
            session.set_query(query);
        }
        _ => {}
    }
}

/// Handles key input in normal mode. Returns `true` to exit.
fn handle_normal_input<C>(
    session: &mut SessionCoordinator<C>,
    view: &mut ViewState,
    key: KeyEvent,
) -> bool
where
    C: CatalogApi + Send + Sync + 'static,
{
    view.status = None;
    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return true,
        KeyCode::Char('/') => view.input_mode = InputMode::Search,
        KeyCode::Up | KeyCode::Char('k') => view.move_up(),
        KeyCode::Down | KeyCode::Char('j') => {
            let snapshot = session.snapshot();
            let len = match view.active_pane {
                ActivePane::Results => snapshot.search.success().map_or(0, Vec::len),
                ActivePane::Watched => snapshot.watched.len(),
            };
            view.move_down(len);
        }
        KeyCode::Tab | KeyCode::BackTab => view.switch_pane(),
        KeyCode::Char('z') => view.toggle_box(),
        KeyCode::Enter => {
            if let Some(id) = cursor_id(session, view) {
                view.reset_stars();
                session.select_id(&id);
            }
        }
        KeyCode::Esc => {
            view.reset_stars();
            session.close_detail();
        }
        KeyCode::Char(c @ '1'..='5') => {
            if let Some(stars) = c.to_digit(10).and_then(|d| u8::try_from(d).ok()) {
                view.pick_stars(stars);
            }
        }
        KeyCode::Char('a') => submit_rating(session, view),
        KeyCode::Char('d') => {
            if view.active_pane == ActivePane::Watched
                && let Some(id) = cursor_id(session, view)
                && session.delete_watched(&id)
            {
                view.set_status(format!("Removed {id} from the watched list"));
            }
        }
        KeyCode::Char('o') => open_imdb_url(session, view),
        _ => {}
    }
    false
}

/// Returns the id under the cursor of the active pane.
fn cursor_id<C>(session: &SessionCoordinator<C>, view: &ViewState) -> Option<String>
where
    C: CatalogApi + Send + Sync + 'static,
{
    let snapshot = session.snapshot();
    match view.active_pane {
        ActivePane::Results => snapshot
            .search
            .success()
            .and_then(|results| results.get(view.results_cursor))
            .map(|item| item.id.clone()),
        ActivePane::Watched => snapshot
            .watched
            .get(view.watched_cursor)
            .map(|entry| entry.id.clone()),
    }
}

/// Adds the open title to the watched list with the picked rating.
fn submit_rating<C>(session: &mut SessionCoordinator<C>, view: &mut ViewState)
where
    C: CatalogApi + Send + Sync + 'static,
{
    if view.stars == 0 {
        view.set_status("Pick a rating with 1-5 first");
        return;
    }
    match session.submit_rating(view.stars) {
        Ok(submitted) => {
            view.reset_stars();
            match submitted.warning {
                Some(warning) => view.set_status(format!(
                    "Added {} with runtime 0: {warning}",
                    submitted.id
                )),
                None => view.set_status(format!("Added {} to the watched list", submitted.id)),
            }
        }
        Err(err) => view.set_status(err.to_string()),
    }
}

/// Opens the IMDb page for the open title, or the one under the cursor.
fn open_imdb_url<C>(session: &SessionCoordinator<C>, view: &mut ViewState)
where
    C: CatalogApi + Send + Sync + 'static,
{
    let id = session
        .snapshot()
        .selected_id
        .map(String::from)
        .or_else(|| cursor_id(session, view));
    let Some(id) = id else {
        return;
    };
    let url = format!("{IMDB_TITLE_BASE_URL}/{id}/");
    if let Err(err) = open::that(&url) {
        tracing::warn!(%url, %err, "failed to open browser");
        view.set_status(format!("Could not open {url}"));
    }
}
