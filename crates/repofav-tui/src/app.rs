// TUI application state and key handling
use crossterm::event::KeyCode;
use ratatui::widgets::ListState;
use repofav_core::{Controller, Msg, Repository, ViewMode, ViewState};
use tracing::debug;

/// Page sizes `+` and `-` step through
pub const PAGE_SIZES: [u32; 5] = [5, 10, 20, 50, 100];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,  // Navigating results
    Editing, // Typing in search box
}

pub struct App {
    pub controller: Controller,
    pub input_mode: InputMode,
    pub selected_index: usize,
    pub list_state: ListState,
    pub should_quit: bool,
    // Local failures that never went through the controller (browser launch)
    pub local_error: Option<String>,
}

impl App {
    pub fn new(controller: Controller) -> Self {
        let mut list_state = ListState::default();
        list_state.select(Some(0));

        Self {
            controller,
            input_mode: InputMode::Editing,
            selected_index: 0,
            list_state,
            should_quit: false,
            local_error: None,
        }
    }

    pub fn state(&self) -> &ViewState {
        self.controller.state()
    }

    pub fn selected_repository(&self) -> Option<&Repository> {
        self.state().displayed().get(self.selected_index)
    }

    pub fn next_result(&mut self) {
        let len = self.state().displayed().len();
        if len > 0 {
            self.selected_index = (self.selected_index + 1).min(len - 1);
            self.list_state.select(Some(self.selected_index));
        }
    }

    pub fn previous_result(&mut self) {
        if self.selected_index > 0 {
            self.selected_index -= 1;
            self.list_state.select(Some(self.selected_index));
        }
    }

    pub fn reset_selection(&mut self) {
        self.selected_index = 0;
        self.list_state = ListState::default();
        self.list_state.select(Some(0));
    }

    /// Apply landed responses and keep the selection on screen
    pub fn sync(&mut self) {
        self.controller.pump();

        if self.controller.take_scroll_reset() {
            self.reset_selection();
        }

        let len = self.state().displayed().len();
        if self.selected_index >= len && len > 0 {
            self.selected_index = len - 1;
            self.list_state.select(Some(self.selected_index));
        }
    }

    fn switch_view(&mut self, msg: Msg) {
        self.controller.dispatch(msg);
        self.reset_selection();
    }

    fn step_page_size(&mut self, up: bool) {
        let mode = self.state().mode;
        let current = self.state().cursor(mode).per_page;

        let next = if up {
            PAGE_SIZES.iter().copied().find(|&s| s > current)
        } else {
            PAGE_SIZES.iter().rev().copied().find(|&s| s < current)
        };

        if let Some(per_page) = next {
            debug!("Page size for {} -> {}", mode, per_page);
            self.controller.dispatch(Msg::SetPageSize { mode, per_page });
        }
    }

    pub fn handle_key(&mut self, code: KeyCode) {
        self.local_error = None;

        match self.input_mode {
            InputMode::Editing => match code {
                KeyCode::Enter => {
                    self.controller.dispatch(Msg::StartSearch);
                    if self.state().validation_error.is_none() {
                        self.input_mode = InputMode::Normal;
                        self.reset_selection();
                    }
                }
                KeyCode::Char(c) => {
                    let mut query = self.state().query.clone();
                    query.push(c);
                    self.controller.dispatch(Msg::SetQuery(query));
                }
                KeyCode::Backspace => {
                    let mut query = self.state().query.clone();
                    query.pop();
                    self.controller.dispatch(Msg::SetQuery(query));
                }
                KeyCode::Esc => {
                    self.input_mode = InputMode::Normal;
                }
                _ => {}
            },
            InputMode::Normal => match code {
                KeyCode::Char('q') => self.should_quit = true,
                KeyCode::Char('/') | KeyCode::Char('i') => {
                    self.input_mode = InputMode::Editing;
                }
                KeyCode::Char('1') => self.switch_view(Msg::BackToSearch),
                KeyCode::Char('2') => self.switch_view(Msg::LoadFavorites),
                KeyCode::Char('3') => self.switch_view(Msg::LoadRelevant),
                KeyCode::Char('r') => {
                    // Reload whatever is on screen
                    let msg = match self.state().mode {
                        ViewMode::Search => Msg::StartSearch,
                        ViewMode::Favorites => Msg::LoadFavorites,
                        ViewMode::Relevant => Msg::LoadRelevant,
                    };
                    self.switch_view(msg);
                }
                KeyCode::Char('n') | KeyCode::Right => self.controller.dispatch(Msg::NextPage),
                KeyCode::Char('p') | KeyCode::Left => self.controller.dispatch(Msg::PrevPage),
                KeyCode::Char('+') | KeyCode::Char('=') => self.step_page_size(true),
                KeyCode::Char('-') => self.step_page_size(false),
                KeyCode::Char('f') | KeyCode::Char(' ') => {
                    if let Some(id) = self.selected_repository().map(|r| r.id) {
                        self.controller.dispatch(Msg::ToggleFavorite(id));
                    }
                }
                KeyCode::Char('j') | KeyCode::Down => self.next_result(),
                KeyCode::Char('k') | KeyCode::Up => self.previous_result(),
                KeyCode::Enter => {
                    if let Some(url) = self.selected_repository().map(|r| r.url.clone()) {
                        if let Err(e) = open::that(&url) {
                            self.local_error = Some(format!("Failed to open browser: {}", e));
                        }
                    }
                }
                _ => {}
            },
        }

        self.sync();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use repofav_core::{Config, Error, RepositoryService, SearchPage};
    use std::sync::Arc;

    /// Backend that answers every listing with the same repositories
    struct Canned(Vec<Repository>);

    #[async_trait]
    impl RepositoryService for Canned {
        async fn search(&self, _query: &str, _page: u32, _per_page: u32) -> repofav_core::Result<SearchPage> {
            Ok(SearchPage {
                items: self.0.clone(),
                total_count: self.0.len() as u64,
            })
        }

        async fn relevant(&self) -> repofav_core::Result<Vec<Repository>> {
            Ok(self.0.clone())
        }

        async fn toggle_favorite(&self, id: u64) -> repofav_core::Result<Repository> {
            let mut repo = self
                .0
                .iter()
                .find(|r| r.id == id)
                .cloned()
                .ok_or_else(|| Error::Server(format!("unknown repository {}", id)))?;
            repo.is_favorite = !repo.is_favorite;
            Ok(repo)
        }
    }

    fn sample(id: u64, score: f64) -> Repository {
        Repository {
            id,
            name: format!("crate-{}", id),
            full_name: format!("someone/crate-{}", id),
            description: None,
            url: format!("https://example.com/{}", id),
            language: None,
            stars: 0,
            forks: 0,
            watchers: 0,
            updated_at: String::new(),
            is_favorite: false,
            relevance_score: score,
        }
    }

    fn app() -> App {
        let repos = vec![sample(1, 3.0), sample(2, 2.0), sample(3, 1.0)];
        let controller = Controller::new(&Config::default(), Arc::new(Canned(repos)), None);
        App::new(controller)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_key(KeyCode::Char(c));
        }
    }

    #[tokio::test]
    async fn test_blank_enter_keeps_editing() {
        let mut app = app();
        app.handle_key(KeyCode::Enter);

        assert_eq!(app.input_mode, InputMode::Editing);
        assert!(app.state().validation_error.is_some());
    }

    #[tokio::test]
    async fn test_typing_and_enter_runs_search() {
        let mut app = app();
        type_text(&mut app, "rustx");
        app.handle_key(KeyCode::Backspace);
        assert_eq!(app.state().query, "rust");

        app.handle_key(KeyCode::Enter);
        assert_eq!(app.input_mode, InputMode::Normal);

        app.controller.settle().await;
        app.sync();
        assert_eq!(app.state().displayed().len(), 3);
        assert_eq!(app.state().active_query(), Some("rust"));
    }

    #[tokio::test]
    async fn test_selection_stays_in_bounds() {
        let mut app = app();
        app.handle_key(KeyCode::Esc);
        app.handle_key(KeyCode::Char('3'));
        app.controller.settle().await;
        app.sync();

        for _ in 0..10 {
            app.handle_key(KeyCode::Char('j'));
        }
        assert_eq!(app.selected_index, 2);

        for _ in 0..10 {
            app.handle_key(KeyCode::Char('k'));
        }
        assert_eq!(app.selected_index, 0);
    }

    #[tokio::test]
    async fn test_favorite_key_toggles_selected_repository() {
        let mut app = app();
        app.handle_key(KeyCode::Esc);
        app.handle_key(KeyCode::Char('3'));
        app.controller.settle().await;
        app.sync();

        app.handle_key(KeyCode::Char('j'));
        app.handle_key(KeyCode::Char('f'));
        app.controller.settle().await;
        app.sync();

        let favorites: Vec<u64> = app.state().favorites.iter().map(|r| r.id).collect();
        assert_eq!(favorites, vec![2]);
    }

    #[tokio::test]
    async fn test_page_size_steps_through_presets() {
        let mut app = app();
        app.handle_key(KeyCode::Esc);
        app.handle_key(KeyCode::Char('3'));

        app.handle_key(KeyCode::Char('+'));
        assert_eq!(app.state().relevant_cursor.per_page, 20);
        app.handle_key(KeyCode::Char('-'));
        app.handle_key(KeyCode::Char('-'));
        assert_eq!(app.state().relevant_cursor.per_page, 5);
        app.handle_key(KeyCode::Char('-'));
        assert_eq!(app.state().relevant_cursor.per_page, 5);
    }

    #[tokio::test]
    async fn test_q_quits_only_in_normal_mode() {
        let mut app = app();
        app.handle_key(KeyCode::Char('q'));
        assert!(!app.should_quit);
        assert_eq!(app.state().query, "q");

        app.handle_key(KeyCode::Esc);
        app.handle_key(KeyCode::Char('q'));
        assert!(app.should_quit);
    }
}
