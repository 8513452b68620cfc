// Runs the effects `update` asks for and feeds completions back in
use std::sync::Arc;

use repofav_store::SessionStore;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::{
    config::Config,
    service::RepositoryService,
    state::{update, Effect, Msg, ViewState},
};

/// Owner of the view state.
///
/// API calls and timers run on tokio tasks. Their results come back over a
/// channel and are applied one at a time through [`Controller::dispatch`], so
/// the state is only ever touched from the caller's task.
pub struct Controller {
    state: ViewState,
    service: Arc<dyn RepositoryService>,
    store: Option<SessionStore>,
    tx: mpsc::UnboundedSender<Msg>,
    rx: mpsc::UnboundedReceiver<Msg>,
    in_flight: usize,
    scroll_reset: bool,
}

impl Controller {
    pub fn new(
        config: &Config,
        service: Arc<dyn RepositoryService>,
        store: Option<SessionStore>,
    ) -> Self {
        let has_data = match &store {
            Some(store) => store.has_data().unwrap_or_else(|e| {
                warn!("Could not read session flags: {}", e);
                false
            }),
            None => false,
        };
        debug!("Controller starting, has_data={}", has_data);

        let (tx, rx) = mpsc::unbounded_channel();

        Self {
            state: ViewState::from_config(config, has_data),
            service,
            store,
            tx,
            rx,
            in_flight: 0,
            scroll_reset: false,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Number of API calls that have not reported back yet
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// True once after any effect asked the view to scroll back to the top
    pub fn take_scroll_reset(&mut self) -> bool {
        std::mem::take(&mut self.scroll_reset)
    }

    /// Apply a message and start whatever it kicked off
    pub fn dispatch(&mut self, msg: Msg) {
        if matches!(
            msg,
            Msg::SearchLoaded { .. } | Msg::ListingLoaded { .. } | Msg::FavoriteToggled { .. }
        ) {
            self.in_flight = self.in_flight.saturating_sub(1);
        }

        let state = std::mem::take(&mut self.state);
        let (next, effects) = update(state, msg);
        self.state = next;

        for effect in effects {
            self.run(effect);
        }
    }

    /// Apply every completion that has already arrived. Never waits.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(msg) = self.rx.try_recv() {
            self.dispatch(msg);
            applied += 1;
        }
        applied
    }

    /// Wait for the next completion (or timer) and apply it
    pub async fn next_completion(&mut self) -> bool {
        match self.rx.recv().await {
            Some(msg) => {
                self.dispatch(msg);
                true
            }
            None => false,
        }
    }

    /// Wait until every API call started so far has reported back
    pub async fn settle(&mut self) {
        while self.in_flight > 0 {
            if !self.next_completion().await {
                break;
            }
        }
    }

    fn run(&mut self, effect: Effect) {
        match effect {
            Effect::Search {
                request,
                query,
                page,
                per_page,
            } => {
                info!("Searching {:?} page {} ({} per page)", query, page, per_page);
                self.in_flight += 1;
                let service = Arc::clone(&self.service);
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let result = service.search(&query, page, per_page).await;
                    let _ = tx.send(Msg::SearchLoaded {
                        request,
                        page,
                        result,
                    });
                });
            }

            Effect::FetchRelevant { request, purpose } => {
                info!("Fetching relevant repositories for {:?}", purpose);
                self.in_flight += 1;
                let service = Arc::clone(&self.service);
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let result = service.relevant().await;
                    let _ = tx.send(Msg::ListingLoaded {
                        request,
                        purpose,
                        result,
                    });
                });
            }

            Effect::ToggleFavorite { request, id } => {
                debug!("Toggling favorite on {}", id);
                self.in_flight += 1;
                let service = Arc::clone(&self.service);
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let result = service.toggle_favorite(id).await;
                    let _ = tx.send(Msg::FavoriteToggled {
                        request,
                        id,
                        result,
                    });
                });
            }

            Effect::ClearNoticeAfter { notice, delay } => {
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    let _ = tx.send(Msg::ClearNotice(notice));
                });
            }

            Effect::ScrollToTop => {
                self.scroll_reset = true;
            }

            Effect::MarkHasData => {
                if let Some(store) = &self.store {
                    if let Err(e) = store.mark_has_data() {
                        warn!("Failed to persist session flag: {}", e);
                    }
                }
            }
        }
    }
}
