//! TUI rendering logic for the movie browser.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph, Wrap};
use reelbox_core::{DetailRecord, RequestState, Snapshot};

use super::state::{ActivePane, InputMode, ViewState, star_gauge};

/// Height of a collapsed box (borders plus one line).
const COLLAPSED_HEIGHT: u16 = 3;

/// Draws the browser UI.
#[allow(clippy::indexing_slicing)]
pub fn draw(frame: &mut Frame, snapshot: &Snapshot<'_>, view: &ViewState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // search line
            Constraint::Min(8),    // main content
            Constraint::Length(3), // footer
        ])
        .split(frame.area());

    draw_header(frame, chunks[0], snapshot, view);
    draw_main(frame, chunks[1], snapshot, view);
    draw_footer(frame, chunks[2], view);
}

/// Draws the query input and the result count.
#[allow(clippy::indexing_slicing)]
fn draw_header(frame: &mut Frame, area: Rect, snapshot: &Snapshot<'_>, view: &ViewState) {
    let header_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let input_style = if view.input_mode == InputMode::Search {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let input = Paragraph::new(String::from(snapshot.query))
        .style(input_style)
        .block(Block::default().borders(Borders::ALL).title(" Search: / "));
    frame.render_widget(input, header_chunks[0]);

    let (count_text, count_style) = match snapshot.search {
        RequestState::Idle => (String::new(), Style::default()),
        RequestState::Loading => (String::from("Searching..."), Style::default()),
        RequestState::Success(items) => (
            format!("Found {} results", items.len()),
            Style::default().fg(Color::Green),
        ),
        RequestState::Failure(_) => (String::from("Found 0 results"), Style::default()),
    };
    let count = Paragraph::new(count_text)
        .style(count_style)
        .block(Block::default().borders(Borders::ALL).title(" reelbox "));
    frame.render_widget(count, header_chunks[1]);
}

/// Draws results on the left, detail and watched on the right.
#[allow(clippy::indexing_slicing)]
fn draw_main(frame: &mut Frame, area: Rect, snapshot: &Snapshot<'_>, view: &ViewState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([if view.results_open {
            Constraint::Min(COLLAPSED_HEIGHT)
        } else {
            Constraint::Length(COLLAPSED_HEIGHT)
        }])
        .split(columns[0]);
    draw_results(frame, left[0], snapshot, view);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(10),
            if view.watched_open {
                Constraint::Percentage(45)
            } else {
                Constraint::Length(COLLAPSED_HEIGHT)
            },
        ])
        .split(columns[1]);
    draw_detail(frame, right[0], snapshot, view);
    draw_watched(frame, right[1], snapshot, view);
}

/// Returns the border style for a pane.
fn border_style(active: bool) -> Style {
    if active {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    }
}

/// Returns the box title with its collapse marker.
fn box_title(name: &str, open: bool) -> String {
    format!(" {} {name} ", if open { "[-]" } else { "[+]" })
}

/// Draws the search results list.
fn draw_results(frame: &mut Frame, area: Rect, snapshot: &Snapshot<'_>, view: &ViewState) {
    let is_active = view.active_pane == ActivePane::Results;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(is_active))
        .title(box_title("Results", view.results_open));

    if !view.results_open {
        frame.render_widget(block, area);
        return;
    }

    let items: Vec<ListItem> = match snapshot.search {
        RequestState::Idle => Vec::new(),
        RequestState::Loading => vec![ListItem::new("Loading...")],
        RequestState::Failure(message) => vec![ListItem::new(Span::styled(
            message.clone(),
            Style::default().fg(Color::Red),
        ))],
        RequestState::Success(results) if results.is_empty() => {
            vec![ListItem::new("No results found")]
        }
        RequestState::Success(results) => results
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let is_cursor = i == view.results_cursor && is_active;
                let marker = if is_cursor { "\u{25b8} " } else { "  " };
                let style = if snapshot.selected_id == Some(item.id.as_str()) {
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD)
                } else if is_cursor {
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                ListItem::new(Line::from(vec![
                    Span::raw(String::from(marker)),
                    Span::styled(format!("{} ({})", item.title, item.year), style),
                ]))
            })
            .collect(),
    };

    frame.render_widget(List::new(items).block(block), area);
}

/// Draws the detail pane for the selected title.
fn draw_detail(frame: &mut Frame, area: Rect, snapshot: &Snapshot<'_>, view: &ViewState) {
    let block = Block::default().borders(Borders::ALL).title(" Details ");

    let lines = match (snapshot.selected_id, snapshot.detail) {
        (None, _) => vec![Line::styled(
            "Select a movie with Enter to see its details.",
            Style::default().fg(Color::DarkGray),
        )],
        (Some(_), RequestState::Idle | RequestState::Loading) => {
            vec![Line::from("Loading...")]
        }
        (Some(_), RequestState::Failure(message)) => vec![Line::styled(
            message.clone(),
            Style::default().fg(Color::Red),
        )],
        (Some(_), RequestState::Success(record)) => detail_lines(record, snapshot, view),
    };

    let detail = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(block);
    frame.render_widget(detail, area);
}

/// Builds the lines describing a loaded record.
fn detail_lines<'a>(
    record: &'a DetailRecord,
    snapshot: &Snapshot<'_>,
    view: &ViewState,
) -> Vec<Line<'a>> {
    let label = Style::default().fg(Color::Yellow);
    let mut lines = vec![
        Line::styled(
            format!("{} ({})", record.title, record.year),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Line::from(vec![
            Span::styled("Released: ", label),
            Span::raw(record.release_date.as_str()),
            Span::styled("  Runtime: ", label),
            Span::raw(record.runtime.as_str()),
        ]),
        Line::from(vec![
            Span::styled("Genre: ", label),
            Span::raw(record.genre.as_str()),
        ]),
        Line::from(vec![
            Span::styled("IMDb rating: ", label),
            Span::raw(format!("\u{2b50} {:.1}", record.rating)),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            record.plot.as_str(),
            Style::default().add_modifier(Modifier::ITALIC),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("Starring: ", label),
            Span::raw(record.cast.as_str()),
        ]),
        Line::from(vec![
            Span::styled("Directed by: ", label),
            Span::raw(record.director.as_str()),
        ]),
        Line::from(""),
    ];

    if let Some(rating) = snapshot.existing_user_rating {
        lines.push(Line::styled(
            format!(
                "Watched. You rated this movie {} {}",
                star_gauge(rating.get()),
                rating
            ),
            Style::default().fg(Color::Green),
        ));
    } else {
        let hint = if view.stars == 0 {
            "  (1-5 to rate)"
        } else {
            "  (a: add to watched)"
        };
        lines.push(Line::from(vec![
            Span::styled("Your rating: ", label),
            Span::styled(star_gauge(view.stars), Style::default().fg(Color::Yellow)),
            Span::styled(hint, Style::default().fg(Color::DarkGray)),
        ]));
    }
    lines
}

/// Draws the watched summary and list.
fn draw_watched(frame: &mut Frame, area: Rect, snapshot: &Snapshot<'_>, view: &ViewState) {
    let is_active = view.active_pane == ActivePane::Watched;
    let summary = &snapshot.summary;
    let title = format!(
        "{}#{} movies  \u{2b50} {:.2}  \u{1f31f} {:.2}  \u{23f3} {:.0} min ",
        box_title("Watched", view.watched_open),
        summary.count,
        summary.mean_catalog_rating,
        summary.mean_user_rating,
        summary.mean_runtime_minutes,
    );
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(is_active))
        .title(title);

    if !view.watched_open {
        frame.render_widget(block, area);
        return;
    }

    let items: Vec<ListItem> = snapshot
        .watched
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let is_cursor = i == view.watched_cursor && is_active;
            let marker = if is_cursor { "\u{25b8} " } else { "  " };
            let style = if is_cursor {
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(Line::from(vec![
                Span::raw(String::from(marker)),
                Span::styled(
                    format!(
                        "{}  \u{2b50} {:.1}  \u{1f31f} {}  \u{23f3} {} min",
                        entry.title, entry.catalog_rating, entry.user_rating, entry.runtime_minutes
                    ),
                    style,
                ),
            ]))
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}

/// Draws the footer with the status line or key hints.
fn draw_footer(frame: &mut Frame, area: Rect, view: &ViewState) {
    let help_text = if view.input_mode == InputMode::Search {
        "Type to search | Backspace: delete | Enter/Esc: done"
    } else {
        "/: search  \u{2191}\u{2193}/j/k: move  Enter: open  Esc: close  1-5: rate  a: add  d: delete  Tab: pane  z: fold  o: IMDb  q: quit"
    };

    let footer = match &view.status {
        Some(status) => Paragraph::new(vec![Line::styled(
            status.as_str(),
            Style::default().fg(Color::Yellow),
        )]),
        None => Paragraph::new(help_text),
    };
    frame.render_widget(footer.block(Block::default().borders(Borders::ALL)), area);
}
