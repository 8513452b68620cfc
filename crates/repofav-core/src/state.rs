//! View state and the pure transition function that drives it.
//!
//! [`update`] takes the current [`ViewState`] and a [`Msg`] and returns the
//! next state plus the [`Effect`]s the caller has to run (API calls, timers,
//! persistence). Nothing here touches the network or the clock, which keeps
//! every rule testable without a terminal or a server.
//!
//! Responses are matched against the request that is still wanted: each
//! dispatched call gets a [`RequestId`], and a completion whose id is no
//! longer the latest for its kind is dropped. Notices work the same way with
//! [`NoticeId`], so a newer notice is never wiped by an older timer.

use std::collections::HashMap;
use std::time::Duration;

use tracing::debug;

use crate::{
    config::Config,
    consolidate,
    models::{Repository, SearchPage, ViewMode},
    pagination::Cursor,
    Result,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NoticeId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

/// Transient message shown in the status line
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub id: NoticeId,
    pub kind: NoticeKind,
    pub text: String,
}

/// Who asked for the relevant listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingPurpose {
    Favorites,
    Relevant,
    /// Startup fill; applies regardless of the active view
    Preload,
}

impl ListingPurpose {
    fn mode(self) -> Option<ViewMode> {
        match self {
            ListingPurpose::Favorites => Some(ViewMode::Favorites),
            ListingPurpose::Relevant => Some(ViewMode::Relevant),
            ListingPurpose::Preload => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    // User actions
    SetQuery(String),
    StartSearch,
    SetPageSize { mode: ViewMode, per_page: u32 },
    NextPage,
    PrevPage,
    LoadFavorites,
    LoadRelevant,
    BackToSearch,
    ToggleFavorite(u64),
    Startup,

    // Completions
    SearchLoaded {
        request: RequestId,
        page: u32,
        result: Result<SearchPage>,
    },
    ListingLoaded {
        request: RequestId,
        purpose: ListingPurpose,
        result: Result<Vec<Repository>>,
    },
    FavoriteToggled {
        request: RequestId,
        id: u64,
        result: Result<Repository>,
    },
    ClearNotice(NoticeId),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Search {
        request: RequestId,
        query: String,
        page: u32,
        per_page: u32,
    },
    FetchRelevant {
        request: RequestId,
        purpose: ListingPurpose,
    },
    ToggleFavorite {
        request: RequestId,
        id: u64,
    },
    ClearNoticeAfter {
        notice: NoticeId,
        delay: Duration,
    },
    ScrollToTop,
    MarkHasData,
}

/// Everything the screen needs, in one place
#[derive(Debug, Clone)]
pub struct ViewState {
    /// Text in the search box, possibly not yet submitted
    pub query: String,
    pub mode: ViewMode,
    /// Latest server page, in server order
    pub search_results: Vec<Repository>,
    pub search_total: u64,
    /// Every repository seen so far, most relevant first
    pub consolidated: Vec<Repository>,
    pub favorites: Vec<Repository>,
    pub search_cursor: Cursor,
    pub favorites_cursor: Cursor,
    pub relevant_cursor: Cursor,
    pub validation_error: Option<String>,
    pub notice: Option<Notice>,
    pub has_data: bool,

    // Query the current search pages belong to
    active_query: Option<String>,
    notice_ttl: Duration,
    next_request: u64,
    next_notice: u64,
    latest_search: Option<RequestId>,
    latest_listing: Option<RequestId>,
    latest_toggles: HashMap<u64, RequestId>,
    search_pending: bool,
    listing_pending: bool,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::from_config(&Config::default(), false)
    }
}

impl ViewState {
    pub fn from_config(config: &Config, has_data: bool) -> Self {
        Self {
            query: String::new(),
            mode: ViewMode::Search,
            search_results: Vec::new(),
            search_total: 0,
            consolidated: Vec::new(),
            favorites: Vec::new(),
            search_cursor: Cursor::new(config.pagination.search_per_page),
            favorites_cursor: Cursor::new(config.pagination.favorites_per_page),
            relevant_cursor: Cursor::new(config.pagination.relevant_per_page),
            validation_error: None,
            notice: None,
            has_data,
            active_query: None,
            notice_ttl: config.ui.notice_ttl(),
            next_request: 0,
            next_notice: 0,
            latest_search: None,
            latest_listing: None,
            latest_toggles: HashMap::new(),
            search_pending: false,
            listing_pending: false,
        }
    }

    /// The query the search pages on screen were fetched for
    pub fn active_query(&self) -> Option<&str> {
        self.active_query.as_deref()
    }

    /// Whether the active view is waiting on the backend
    pub fn is_loading(&self) -> bool {
        match self.mode {
            ViewMode::Search => self.search_pending,
            ViewMode::Favorites | ViewMode::Relevant => self.listing_pending,
        }
    }

    // Search getters pass the server page straight through

    pub fn displayed_search(&self) -> &[Repository] {
        &self.search_results
    }

    pub fn total_search_pages(&self) -> u32 {
        self.search_cursor.total_pages(self.search_total)
    }

    pub fn has_next_search_page(&self) -> bool {
        self.search_cursor.has_next(self.search_total)
    }

    pub fn has_prev_search_page(&self) -> bool {
        self.search_cursor.has_prev()
    }

    // Favorites and relevant getters slice the local collections

    pub fn displayed_favorites(&self) -> &[Repository] {
        self.favorites_cursor.slice(&self.favorites)
    }

    pub fn total_favorites_pages(&self) -> u32 {
        self.favorites_cursor.total_pages(self.favorites.len() as u64)
    }

    pub fn has_next_favorites_page(&self) -> bool {
        self.favorites_cursor.has_next(self.favorites.len() as u64)
    }

    pub fn has_prev_favorites_page(&self) -> bool {
        self.favorites_cursor.has_prev()
    }

    pub fn displayed_relevant(&self) -> &[Repository] {
        self.relevant_cursor.slice(&self.consolidated)
    }

    pub fn total_relevant_pages(&self) -> u32 {
        self.relevant_cursor.total_pages(self.consolidated.len() as u64)
    }

    pub fn has_next_relevant_page(&self) -> bool {
        self.relevant_cursor.has_next(self.consolidated.len() as u64)
    }

    pub fn has_prev_relevant_page(&self) -> bool {
        self.relevant_cursor.has_prev()
    }

    // Same, for whichever view is active

    pub fn displayed(&self) -> &[Repository] {
        match self.mode {
            ViewMode::Search => self.displayed_search(),
            ViewMode::Favorites => self.displayed_favorites(),
            ViewMode::Relevant => self.displayed_relevant(),
        }
    }

    pub fn cursor(&self, mode: ViewMode) -> &Cursor {
        match mode {
            ViewMode::Search => &self.search_cursor,
            ViewMode::Favorites => &self.favorites_cursor,
            ViewMode::Relevant => &self.relevant_cursor,
        }
    }

    fn cursor_mut(&mut self, mode: ViewMode) -> &mut Cursor {
        match mode {
            ViewMode::Search => &mut self.search_cursor,
            ViewMode::Favorites => &mut self.favorites_cursor,
            ViewMode::Relevant => &mut self.relevant_cursor,
        }
    }

    /// Item count the cursor of `mode` pages over
    pub fn total_items(&self, mode: ViewMode) -> u64 {
        match mode {
            ViewMode::Search => self.search_total,
            ViewMode::Favorites => self.favorites.len() as u64,
            ViewMode::Relevant => self.consolidated.len() as u64,
        }
    }

    pub fn total_pages(&self) -> u32 {
        self.cursor(self.mode).total_pages(self.total_items(self.mode))
    }

    pub fn has_next_page(&self) -> bool {
        self.cursor(self.mode).has_next(self.total_items(self.mode))
    }

    pub fn has_prev_page(&self) -> bool {
        self.cursor(self.mode).has_prev()
    }

    fn next_request_id(&mut self) -> RequestId {
        self.next_request += 1;
        RequestId(self.next_request)
    }

    fn show_notice(&mut self, kind: NoticeKind, text: impl Into<String>) -> Effect {
        self.next_notice += 1;
        let id = NoticeId(self.next_notice);
        self.notice = Some(Notice {
            id,
            kind,
            text: text.into(),
        });
        Effect::ClearNoticeAfter {
            notice: id,
            delay: self.notice_ttl,
        }
    }

    fn dispatch_search(&mut self, effects: &mut Vec<Effect>) {
        let Some(query) = self.active_query.clone() else {
            return;
        };

        let request = self.next_request_id();
        self.latest_search = Some(request);
        self.search_pending = true;
        effects.push(Effect::Search {
            request,
            query,
            page: self.search_cursor.page,
            per_page: self.search_cursor.per_page,
        });
    }

    fn dispatch_listing(&mut self, purpose: ListingPurpose, effects: &mut Vec<Effect>) {
        let request = self.next_request_id();
        self.latest_listing = Some(request);
        self.listing_pending = true;
        effects.push(Effect::FetchRelevant { request, purpose });
    }

    /// Bring the favorites list in line with the consolidated flags of `ids`
    fn sync_favorites_for(&mut self, ids: &[u64]) {
        for id in ids {
            if let Some(repo) = self.consolidated.iter().find(|r| r.id == *id) {
                consolidate::sync_favorite(&mut self.favorites, repo);
            }
        }
    }
}

/// Apply one message. Returns the next state and the effects to run.
pub fn update(mut state: ViewState, msg: Msg) -> (ViewState, Vec<Effect>) {
    let mut effects = Vec::new();

    match msg {
        Msg::SetQuery(query) => {
            state.query = query;
            state.validation_error = None;
        }

        Msg::StartSearch => {
            let query = state.query.trim().to_string();
            if query.is_empty() {
                state.validation_error = Some("Type something to search for".to_string());
                return (state, effects);
            }

            state.validation_error = None;
            state.mode = ViewMode::Search;
            state.search_cursor.reset();
            state.active_query = Some(query);
            state.dispatch_search(&mut effects);
        }

        Msg::SetPageSize { mode, per_page } => {
            state.cursor_mut(mode).set_per_page(per_page);
            match mode {
                // Only worth a round trip if there is a search to redo
                ViewMode::Search => state.dispatch_search(&mut effects),
                ViewMode::Favorites | ViewMode::Relevant => effects.push(Effect::ScrollToTop),
            }
        }

        Msg::NextPage => {
            let mode = state.mode;
            let total = state.total_items(mode);
            if state.cursor_mut(mode).next(total) {
                page_changed(&mut state, mode, &mut effects);
            }
        }

        Msg::PrevPage => {
            let mode = state.mode;
            if state.cursor_mut(mode).prev() {
                page_changed(&mut state, mode, &mut effects);
            }
        }

        Msg::LoadFavorites => {
            state.mode = ViewMode::Favorites;
            state.favorites_cursor.reset();
            state.dispatch_listing(ListingPurpose::Favorites, &mut effects);
        }

        Msg::LoadRelevant => {
            state.mode = ViewMode::Relevant;
            state.relevant_cursor.reset();
            state.dispatch_listing(ListingPurpose::Relevant, &mut effects);
        }

        Msg::BackToSearch => {
            state.mode = ViewMode::Search;
        }

        Msg::ToggleFavorite(id) => {
            let request = state.next_request_id();
            state.latest_toggles.insert(id, request);
            effects.push(Effect::ToggleFavorite { request, id });
        }

        Msg::Startup => {
            if state.has_data {
                state.dispatch_listing(ListingPurpose::Preload, &mut effects);
            }
        }

        Msg::SearchLoaded {
            request,
            page,
            result,
        } => {
            if state.latest_search != Some(request) {
                debug!("Dropping stale search response {:?}", request);
                return (state, effects);
            }
            state.search_pending = false;

            match result {
                Ok(search_page) => {
                    if page == 1 {
                        state.consolidated.clear();
                    }
                    consolidate::merge(&mut state.consolidated, &search_page.items);

                    let ids: Vec<u64> = search_page.items.iter().map(|r| r.id).collect();
                    state.sync_favorites_for(&ids);
                    state.favorites_cursor.clamp(state.favorites.len() as u64);

                    state.search_results = search_page.items;
                    state.search_total = search_page.total_count;
                    effects.push(Effect::ScrollToTop);

                    if !state.has_data {
                        state.has_data = true;
                        effects.push(Effect::MarkHasData);
                    }
                }
                Err(err) => {
                    state.search_results.clear();
                    state.search_total = 0;
                    state.search_cursor.clamp(0);
                    let clear = state.show_notice(NoticeKind::Error, err.user_message());
                    effects.push(clear);
                }
            }
        }

        Msg::ListingLoaded {
            request,
            purpose,
            result,
        } => {
            if state.latest_listing != Some(request) {
                debug!("Dropping superseded listing response {:?}", request);
                return (state, effects);
            }
            state.listing_pending = false;

            match purpose.mode() {
                Some(wanted) if wanted != state.mode => {
                    debug!("Dropping {:?} listing, view is now {}", purpose, state.mode);
                    return (state, effects);
                }
                // A search started after the preload owns the consolidated list now
                None if state.latest_search.is_some_and(|search| search > request) => {
                    debug!("Dropping preload {:?}, a search went out after it", request);
                    return (state, effects);
                }
                _ => {}
            }

            match result {
                Ok(items) => {
                    state.consolidated = consolidate::from_listing(&items);
                    state.favorites = consolidate::favorites_of(&state.consolidated);
                    state.favorites_cursor.clamp(state.favorites.len() as u64);
                    state.relevant_cursor.clamp(state.consolidated.len() as u64);
                    if purpose != ListingPurpose::Preload {
                        effects.push(Effect::ScrollToTop);
                    }
                }
                Err(err) => {
                    let clear = state.show_notice(NoticeKind::Error, err.user_message());
                    effects.push(clear);
                }
            }
        }

        Msg::FavoriteToggled {
            request,
            id,
            result,
        } => {
            if state.latest_toggles.get(&id) != Some(&request) {
                debug!("Dropping stale toggle response for {}", id);
                return (state, effects);
            }
            state.latest_toggles.remove(&id);

            match result {
                Ok(updated) => {
                    if let Some(slot) = state.search_results.iter_mut().find(|r| r.id == updated.id) {
                        *slot = updated.clone();
                    }
                    consolidate::upsert(&mut state.consolidated, &updated);
                    consolidate::sync_favorite(&mut state.favorites, &updated);
                    state.favorites_cursor.clamp(state.favorites.len() as u64);

                    let text = if updated.is_favorite {
                        "Added to favorites!"
                    } else {
                        "Removed from favorites!"
                    };
                    let clear = state.show_notice(NoticeKind::Info, text);
                    effects.push(clear);
                }
                Err(err) => {
                    let clear = state.show_notice(NoticeKind::Error, err.user_message());
                    effects.push(clear);
                }
            }
        }

        Msg::ClearNotice(id) => {
            if state.notice.as_ref().map(|n| n.id) == Some(id) {
                state.notice = None;
            }
        }
    }

    (state, effects)
}

fn page_changed(state: &mut ViewState, mode: ViewMode, effects: &mut Vec<Effect>) {
    match mode {
        // Scroll resets once the new page lands
        ViewMode::Search => state.dispatch_search(effects),
        ViewMode::Favorites | ViewMode::Relevant => effects.push(Effect::ScrollToTop),
    }
}
