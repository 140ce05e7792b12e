//! Debounced place search

use domain::SearchResult;
use tracing::{debug, instrument};

use super::{SessionEvent, StationSession};

impl StationSession {
    /// React to the search box text changing
    ///
    /// Text shorter than the minimum clears the results at once. Longer text
    /// is searched after the debounce delay unless newer text arrives first.
    /// Must be called from within a Tokio runtime.
    pub fn search_text_changed(&self, text: &str) {
        let trimmed = text.trim();
        let generation = {
            let mut core = self.inner.core.lock();
            if core.view.disposed {
                return;
            }

            core.search_generation += 1;
            core.view.search.query = text.to_string();
            core.view.search.in_flight = false;

            if trimmed.chars().count() < self.inner.config.min_search_chars {
                let had_results = !core.view.search.results.is_empty();
                core.view.search.results.clear();
                core.view.search.visible = false;
                drop(core);
                if had_results {
                    self.emit(SessionEvent::SearchResultsUpdated { count: 0 });
                }
                return;
            }
            core.search_generation
        };

        let session = self.clone();
        let query = trimmed.to_string();
        let delay = self.inner.config.search_debounce();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            session.run_search(generation, query).await;
        });
    }

    /// Pick a search result to highlight on the map
    pub fn select_search_result(&self, result: SearchResult) {
        {
            let mut core = self.inner.core.lock();
            if core.view.disposed {
                return;
            }
            // A pending search must not reopen the list
            core.search_generation += 1;
            core.view.search.visible = false;
            core.view.search.in_flight = false;
            core.view.highlighted_place = Some(result.clone());
        }
        self.emit(SessionEvent::FocusRequested { place: result });
    }

    #[instrument(skip(self))]
    async fn run_search(&self, generation: u64, query: String) {
        {
            let mut core = self.inner.core.lock();
            if core.view.disposed || core.search_generation != generation {
                debug!("Search superseded before it was sent");
                return;
            }
            core.view.search.in_flight = true;
        }

        let results = self
            .inner
            .geocoding
            .search_places(&query, self.inner.config.search_country.clone())
            .await;

        let count = {
            let mut core = self.inner.core.lock();
            if core.view.disposed || core.search_generation != generation {
                debug!("Discarding stale search results");
                return;
            }
            let count = results.len();
            core.view.search.in_flight = false;
            core.view.search.visible = count > 0;
            core.view.search.results = results;
            count
        };

        debug!(count, "Search results updated");
        self.emit(SessionEvent::SearchResultsUpdated { count });
    }
}
