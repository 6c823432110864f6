//! Page-level search state: current filters, current page, and the
//! fetch lifecycle around them.
//!
//! Every fetch is tagged with a monotonically increasing sequence number;
//! a completion whose tag is not the latest issued is discarded, so a
//! slow stale response can never overwrite fresher results.

use crate::error::ClientError;
use crate::filters::{Event, EventFilters, SearchPage};
use crate::search::EventSearch;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PagerPhase {
    Idle,
    Loading,
    Ready,
    /// Fetch failed; the message backs a visible error state with a retry
    /// affordance. Leaving this state requires an explicit retry or a new
    /// filter/page change.
    Error(String),
}

/// Tag for one issued fetch. Completions carry it back; only the latest
/// tag is honored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken(u64);

pub struct EventPager<S> {
    search: S,
    filters: EventFilters,
    page: u32,
    phase: PagerPhase,
    events: Vec<Event>,
    total: i64,
    total_pages: u32,
    issued: u64,
}

impl<S> EventPager<S> {
    pub fn new(search: S, filters: EventFilters) -> Self {
        EventPager {
            search,
            filters,
            page: 1,
            phase: PagerPhase::Idle,
            events: Vec::new(),
            total: 0,
            total_pages: 0,
            issued: 0,
        }
    }

    pub fn phase(&self) -> &PagerPhase {
        &self.phase
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn total(&self) -> i64 {
        self.total
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn filters(&self) -> &EventFilters {
        &self.filters
    }

    /// The complete filter object for the next request: owned filters
    /// plus the pager's current page.
    fn request_filters(&self) -> EventFilters {
        let mut filters = self.filters.clone();
        filters.page = Some(self.page);
        filters.limit = Some(self.filters.limit_or_default());
        filters
    }

    /// Replace the filters, reset to page 1, and start loading.
    pub fn begin_filters_change(&mut self, filters: EventFilters) -> RequestToken {
        self.filters = filters;
        self.page = 1;
        self.begin()
    }

    /// Move to another page with the existing filters. Returns `None`
    /// (leaving all state untouched) when the target is the current page
    /// or outside `[1, total_pages]`.
    pub fn begin_page_change(&mut self, page: u32) -> Option<RequestToken> {
        if page == self.page || page < 1 || page > self.total_pages {
            return None;
        }
        self.page = page;
        Some(self.begin())
    }

    /// Re-issue the current request, typically from the error state.
    pub fn begin_retry(&mut self) -> RequestToken {
        self.begin()
    }

    fn begin(&mut self) -> RequestToken {
        self.issued += 1;
        self.phase = PagerPhase::Loading;
        RequestToken(self.issued)
    }

    /// Feed a completed fetch back in. Returns `false` for a stale token,
    /// in which case nothing changes. On failure the previous data is
    /// retained but the phase flips to `Error`.
    pub fn complete(
        &mut self,
        token: RequestToken,
        outcome: Result<SearchPage, ClientError>,
    ) -> bool {
        if token.0 != self.issued {
            tracing::debug!(token = token.0, latest = self.issued, "discarding stale response");
            return false;
        }
        match outcome {
            Ok(page) => {
                self.events = page.data;
                self.total = page.meta.total;
                self.total_pages = page.meta.total_pages;
                self.phase = PagerPhase::Ready;
            }
            Err(e) => {
                self.phase = PagerPhase::Error(e.to_string());
            }
        }
        true
    }
}

impl<S: EventSearch> EventPager<S> {
    async fn run(&mut self, token: RequestToken) {
        let filters = self.request_filters();
        let outcome = self.search.search(&filters).await;
        self.complete(token, outcome);
    }

    /// Load the first page with the initial filters.
    pub async fn load_first_page(&mut self) {
        let token = self.begin();
        self.run(token).await;
    }

    pub async fn on_filters_change(&mut self, filters: EventFilters) {
        let token = self.begin_filters_change(filters);
        self.run(token).await;
    }

    pub async fn on_page_change(&mut self, page: u32) {
        if let Some(token) = self.begin_page_change(page) {
            self.run(token).await;
        }
    }

    pub async fn retry(&mut self) {
        let token = self.begin_retry();
        self.run(token).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::PageMeta;
    use std::sync::Mutex;

    // Scripted search backend: pops pre-programmed outcomes in order.
    struct Script {
        outcomes: Mutex<Vec<Result<SearchPage, ClientError>>>,
        requests: Mutex<Vec<EventFilters>>,
    }

    impl Script {
        fn new(outcomes: Vec<Result<SearchPage, ClientError>>) -> Self {
            Script {
                outcomes: Mutex::new(outcomes),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    impl EventSearch for Script {
        async fn search(&self, filters: &EventFilters) -> Result<SearchPage, ClientError> {
            self.requests.lock().unwrap().push(filters.clone());
            self.outcomes.lock().unwrap().remove(0)
        }
    }

    fn page(total: i64, page_no: u32, limit: u32) -> SearchPage {
        let total_pages = if total == 0 {
            0
        } else {
            ((total + i64::from(limit) - 1) / i64::from(limit)) as u32
        };
        SearchPage {
            data: Vec::new(),
            meta: PageMeta {
                total,
                page: page_no,
                limit,
                total_pages,
            },
        }
    }

    fn endpoint_error() -> ClientError {
        ClientError::Endpoint {
            status: 500,
            body: "Server error".into(),
        }
    }

    #[tokio::test]
    async fn first_load_moves_idle_to_ready() {
        let mut pager = EventPager::new(Script::new(vec![Ok(page(15, 1, 10))]), Default::default());
        assert_eq!(*pager.phase(), PagerPhase::Idle);
        pager.load_first_page().await;
        assert_eq!(*pager.phase(), PagerPhase::Ready);
        assert_eq!(pager.total(), 15);
        assert_eq!(pager.total_pages(), 2);
    }

    #[tokio::test]
    async fn filter_change_resets_to_page_one() {
        let script = Script::new(vec![Ok(page(30, 1, 10)), Ok(page(30, 3, 10)), Ok(page(5, 1, 10))]);
        let mut pager = EventPager::new(script, Default::default());
        pager.load_first_page().await;
        pager.on_page_change(3).await;
        assert_eq!(pager.page(), 3);

        pager
            .on_filters_change(EventFilters {
                search: Some("kathak".into()),
                ..Default::default()
            })
            .await;
        assert_eq!(pager.page(), 1);
        let requests = pager.search.requests.lock().unwrap();
        assert_eq!(requests.last().unwrap().page, Some(1));
        assert_eq!(requests.last().unwrap().search.as_deref(), Some("kathak"));
    }

    #[tokio::test]
    async fn out_of_range_and_same_page_changes_are_no_ops() {
        let mut pager = EventPager::new(Script::new(vec![Ok(page(15, 1, 10))]), Default::default());
        pager.load_first_page().await;
        assert_eq!(pager.total_pages(), 2);

        for target in [0, 1, 3, 99] {
            pager.on_page_change(target).await;
            assert_eq!(pager.page(), 1, "page change to {target} must not apply");
            assert_eq!(*pager.phase(), PagerPhase::Ready);
        }
        // Exactly one request went out: the initial load.
        assert_eq!(pager.search.requests.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn error_state_requires_explicit_retry() {
        let script = Script::new(vec![Err(endpoint_error()), Ok(page(7, 1, 10))]);
        let mut pager = EventPager::new(script, Default::default());
        pager.load_first_page().await;
        assert!(matches!(pager.phase(), PagerPhase::Error(_)));

        pager.retry().await;
        assert_eq!(*pager.phase(), PagerPhase::Ready);
        assert_eq!(pager.total(), 7);
    }

    #[tokio::test]
    async fn failure_keeps_previous_data() {
        let script = Script::new(vec![Ok(page(12, 1, 10)), Err(endpoint_error())]);
        let mut pager = EventPager::new(script, Default::default());
        pager.load_first_page().await;
        assert_eq!(pager.total(), 12);

        pager.on_page_change(2).await;
        assert!(matches!(pager.phase(), PagerPhase::Error(_)));
        // Totals from the last successful fetch are retained.
        assert_eq!(pager.total(), 12);
    }

    #[test]
    fn stale_completion_is_discarded() {
        let script = Script::new(vec![]);
        let mut pager = EventPager::new(script, Default::default());

        let first = pager.begin_filters_change(EventFilters {
            search: Some("old".into()),
            ..Default::default()
        });
        let second = pager.begin_filters_change(EventFilters {
            search: Some("new".into()),
            ..Default::default()
        });

        // The newer request resolves first.
        assert!(pager.complete(second, Ok(page(3, 1, 10))));
        assert_eq!(*pager.phase(), PagerPhase::Ready);
        assert_eq!(pager.total(), 3);

        // The slow stale response must not overwrite it.
        assert!(!pager.complete(first, Ok(page(99, 1, 10))));
        assert_eq!(pager.total(), 3);
        assert_eq!(*pager.phase(), PagerPhase::Ready);
    }

    #[test]
    fn stale_error_cannot_clobber_fresh_results() {
        let mut pager = EventPager::new(Script::new(vec![]), EventFilters::default());
        let first = pager.begin_retry();
        let second = pager.begin_retry();
        assert!(pager.complete(second, Ok(page(4, 1, 10))));
        assert!(!pager.complete(first, Err(endpoint_error())));
        assert_eq!(*pager.phase(), PagerPhase::Ready);
    }
}
