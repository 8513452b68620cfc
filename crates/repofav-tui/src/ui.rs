// UI rendering logic
use crate::{App, InputMode};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Tabs, Wrap},
    Frame,
};
use repofav_core::{NoticeKind, Repository, ViewMode, ViewState};

pub fn render(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // View tabs
            Constraint::Length(3), // Search input
            Constraint::Min(5),    // Results + details
            Constraint::Length(1), // Pagination / notices
            Constraint::Length(1), // Key help
        ])
        .split(frame.area());

    render_tabs(frame, app, chunks[0]);
    render_search_input(frame, app, chunks[1]);

    // Narrow terminals get more room for the list
    let (list_pct, detail_pct) = if frame.area().width < 100 { (55, 45) } else { (45, 55) };
    let content = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(list_pct),
            Constraint::Percentage(detail_pct),
        ])
        .split(chunks[2]);

    render_results_list(frame, app, content[0]);
    render_details(frame, app, content[1]);
    render_status_bar(frame, app, chunks[3]);
    render_help_bar(frame, app, chunks[4]);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let state = app.state();
    let titles: Vec<Line> = ViewMode::all()
        .iter()
        .enumerate()
        .map(|(i, mode)| {
            let count = match mode {
                ViewMode::Search => state.search_total as usize,
                ViewMode::Favorites => state.favorites.len(),
                ViewMode::Relevant => state.consolidated.len(),
            };
            Line::from(format!(" {} {} ({}) ", i + 1, mode, count))
        })
        .collect();

    let selected = ViewMode::all()
        .iter()
        .position(|m| *m == state.mode)
        .unwrap_or(0);

    let tabs = Tabs::new(titles)
        .block(Block::default().borders(Borders::ALL).title(" RepoFav "))
        .select(selected)
        .style(Style::default().fg(Color::Gray))
        .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));

    frame.render_widget(tabs, area);
}

fn render_search_input(frame: &mut Frame, app: &App, area: Rect) {
    let state = app.state();
    let editing = app.input_mode == InputMode::Editing;

    let border_style = if editing {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };

    // Validation problems show up right on the box
    let title = match &state.validation_error {
        Some(err) => format!(" Search - {} ", err),
        None => " Search ".to_string(),
    };
    let title_style = if state.validation_error.is_some() {
        Style::default().fg(Color::Red)
    } else {
        border_style
    };

    let mut spans = vec![Span::raw(state.query.clone())];
    if editing {
        spans.push(Span::styled("_", Style::default().fg(Color::Yellow)));
    }

    let input = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(Span::styled(title, title_style)),
    );
    frame.render_widget(input, area);
}

fn render_results_list(frame: &mut Frame, app: &mut App, area: Rect) {
    let state = app.controller.state();
    let title = format!(" {} ", state.mode);

    if state.is_loading() {
        let loading = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "  Loading...",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )),
        ])
        .block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(loading, area);
        return;
    }

    let repos = state.displayed();
    if repos.is_empty() {
        let hint = match state.mode {
            ViewMode::Search => "  Press / and type a query",
            ViewMode::Favorites => "  No favorites yet. Press f on a repository.",
            ViewMode::Relevant => "  Nothing here yet. Press r to reload.",
        };
        let empty = Paragraph::new(Span::styled(hint, Style::default().fg(Color::DarkGray)))
            .block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = repos
        .iter()
        .enumerate()
        .map(|(i, repo)| {
            let name_style = if i == app.selected_index {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            };

            let line1 = Line::from(vec![
                Span::styled(
                    if repo.is_favorite { "★ " } else { "  " },
                    Style::default().fg(Color::Rgb(255, 215, 0)),
                ),
                Span::styled(repo.full_name.clone(), name_style),
            ]);

            let line2 = Line::from(vec![
                Span::raw("    "),
                Span::styled(
                    format!("stars {}", format_number(repo.stars)),
                    Style::default().fg(Color::Rgb(255, 215, 0)),
                ),
                Span::raw("  "),
                Span::styled(
                    repo.language.clone().unwrap_or_else(|| "Unknown".to_string()),
                    Style::default().fg(Color::Rgb(147, 112, 219)),
                ),
                Span::raw("  "),
                Span::styled(
                    format!("score {:.1}", repo.relevance_score),
                    Style::default().fg(Color::DarkGray),
                ),
            ]);

            ListItem::new(vec![line1, line2])
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().bg(Color::Rgb(40, 40, 60)));

    frame.render_stateful_widget(list, area, &mut app.list_state);
}

fn render_details(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Details ");

    let Some(repo) = app.selected_repository() else {
        frame.render_widget(Paragraph::new("").block(block), area);
        return;
    };

    let paragraph = Paragraph::new(detail_lines(repo))
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn detail_lines(repo: &Repository) -> Vec<Line<'static>> {
    let label = Style::default().fg(Color::DarkGray);

    let mut lines = vec![
        Line::from(Span::styled(
            repo.full_name.clone(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(
            repo.description
                .clone()
                .unwrap_or_else(|| "No description".to_string()),
        ),
        Line::from(""),
        Line::from(vec![
            Span::styled("Language   ", label),
            Span::raw(repo.language.clone().unwrap_or_else(|| "Unknown".to_string())),
        ]),
        Line::from(vec![
            Span::styled("Stars      ", label),
            Span::raw(format_number(repo.stars)),
        ]),
        Line::from(vec![
            Span::styled("Forks      ", label),
            Span::raw(format_number(repo.forks)),
        ]),
        Line::from(vec![
            Span::styled("Watchers   ", label),
            Span::raw(format_number(repo.watchers)),
        ]),
        Line::from(vec![
            Span::styled("Updated    ", label),
            Span::raw(updated_display(repo)),
        ]),
        Line::from(vec![
            Span::styled("Relevance  ", label),
            Span::raw(format!("{:.2}", repo.relevance_score)),
        ]),
        Line::from(vec![
            Span::styled("Favorite   ", label),
            Span::raw(if repo.is_favorite { "yes" } else { "no" }),
        ]),
        Line::from(""),
    ];

    lines.push(Line::from(Span::styled(
        repo.url.clone(),
        Style::default().fg(Color::Blue).add_modifier(Modifier::UNDERLINED),
    )));
    lines
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let state = app.state();

    let mut spans = vec![Span::styled(page_label(state), Style::default().fg(Color::Gray))];

    if let Some(error) = &app.local_error {
        spans.push(Span::styled(error.clone(), Style::default().fg(Color::Red)));
    } else if let Some(notice) = &state.notice {
        let color = match notice.kind {
            NoticeKind::Info => Color::Green,
            NoticeKind::Error => Color::Red,
        };
        spans.push(Span::styled(
            notice.text.clone(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_help_bar(frame: &mut Frame, app: &App, area: Rect) {
    let help = match app.input_mode {
        InputMode::Editing => Span::styled(
            "SEARCH | type query | ENTER: search | ESC: normal mode",
            Style::default().fg(Color::Yellow),
        ),
        InputMode::Normal => Span::raw(
            "/: search | 1/2/3: views | n/p: page | +/-: page size | f: favorite | r: reload | ENTER: open | q: quit",
        ),
    };
    frame.render_widget(Paragraph::new(Line::from(help)), area);
}

/// "◀ Page 2/3 ▶", arrows only where there is somewhere to go
fn page_label(state: &ViewState) -> String {
    let cursor = state.cursor(state.mode);
    format!(
        " {}Page {}/{}{}  ·  {} per page ",
        if state.has_prev_page() { "◀ " } else { "" },
        cursor.page,
        state.total_pages().max(1),
        if state.has_next_page() { " ▶" } else { "" },
        cursor.per_page
    )
}

fn format_number(num: u32) -> String {
    if num >= 1_000_000 {
        format!("{:.1}M", num as f64 / 1_000_000.0)
    } else if num >= 1_000 {
        format!("{:.1}k", num as f64 / 1_000.0)
    } else {
        num.to_string()
    }
}

fn updated_display(repo: &Repository) -> String {
    let Some(updated) = repo.updated_at_utc() else {
        return if repo.updated_at.is_empty() {
            "unknown".to_string()
        } else {
            repo.updated_at.clone()
        };
    };

    let days_ago = (chrono::Utc::now() - updated).num_days();
    if days_ago <= 0 {
        "today".to_string()
    } else if days_ago == 1 {
        "1d ago".to_string()
    } else if days_ago < 30 {
        format!("{}d ago", days_ago)
    } else if days_ago < 365 {
        format!("{}mo ago", days_ago / 30)
    } else {
        format!("{}y ago", days_ago / 365)
    }
}
