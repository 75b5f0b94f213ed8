use std::fmt;

use crate::news::{Article, NewsPage};

/// Where a feed's pages come from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FeedSource {
    Headlines { country: String, category: String },
    Search { query: String },
}

impl fmt::Display for FeedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedSource::Headlines { category, .. } => write!(f, "{category}"),
            FeedSource::Search { query } => write!(f, "\"{query}\""),
        }
    }
}

/// One page load the controller wants performed.
///
/// The caller fetches it and hands the result back to
/// [`FeedController::apply`] together with this request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub source: FeedSource,
    pub page: u32,
    pub page_size: u32,
    /// Replace the accumulated items instead of appending
    pub reset: bool,
    pub seq: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedStatus {
    Idle,
    Loading,
    Loaded,
    Error,
}

/// Outcome of handing a response to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Accepted,
    /// The response did not belong to the request in flight and was dropped
    Stale,
}

/// Paginated feed state machine.
///
/// Accumulates pages for one source, tracks whether more are available and
/// drops responses to requests that are no longer current. Holds no I/O.
#[derive(Debug)]
pub struct FeedController {
    source: FeedSource,
    page_size: u32,
    items: Vec<Article>,
    current_page: u32,
    total_available: u64,
    has_more: bool,
    status: FeedStatus,
    error: Option<String>,
    in_flight: Option<PageRequest>,
    last_failed: Option<PageRequest>,
    next_seq: u64,
    torn_down: bool,
}

impl FeedController {
    pub fn new(source: FeedSource, page_size: u32) -> Self {
        Self {
            source,
            page_size: page_size.max(1),
            items: Vec::new(),
            current_page: 1,
            total_available: 0,
            has_more: false,
            status: FeedStatus::Idle,
            error: None,
            in_flight: None,
            last_failed: None,
            next_seq: 0,
            torn_down: false,
        }
    }

    fn issue(&mut self, page: u32, reset: bool) -> Option<PageRequest> {
        if self.torn_down {
            return None;
        }
        self.next_seq += 1;
        let request = PageRequest {
            source: self.source.clone(),
            page,
            page_size: self.page_size,
            reset,
            seq: self.next_seq,
        };
        self.status = FeedStatus::Loading;
        self.in_flight = Some(request.clone());
        Some(request)
    }

    fn clear(&mut self) {
        self.items.clear();
        self.current_page = 1;
        self.total_available = 0;
        self.has_more = false;
        self.error = None;
        self.last_failed = None;
    }

    /// First load: page 1 of the current source, replacing anything held.
    pub fn mount(&mut self) -> Option<PageRequest> {
        self.clear();
        self.issue(1, true)
    }

    /// Switch to another source. Items and page reset before the first page
    /// of the new source is requested; any response still in flight for the
    /// old source becomes stale.
    pub fn change_source(&mut self, source: FeedSource) -> Option<PageRequest> {
        self.source = source;
        self.mount()
    }

    /// Request the next page. Refused while a load is running, while an
    /// error is waiting for [`retry`](Self::retry), or when nothing is left.
    pub fn load_more(&mut self) -> Option<PageRequest> {
        if !self.can_load_more() {
            return None;
        }
        let next = self.current_page + 1;
        self.issue(next, false)
    }

    /// Re-issue the request that last failed with the same parameters.
    pub fn retry(&mut self) -> Option<PageRequest> {
        if self.status != FeedStatus::Error {
            return None;
        }
        let failed = self.last_failed.take()?;
        self.error = None;
        self.issue(failed.page, failed.reset)
    }

    /// Merge a response into the feed.
    pub fn apply<E: fmt::Display>(
        &mut self,
        request: &PageRequest,
        result: Result<NewsPage, E>,
    ) -> Applied {
        // Seq numbers restart in every controller, so the source must match too
        let current = self
            .in_flight
            .as_ref()
            .is_some_and(|in_flight| in_flight == request && request.source == self.source);
        if self.torn_down || !current {
            tracing::debug!(
                seq = request.seq,
                page = request.page,
                source = %request.source,
                "Discarding stale feed response"
            );
            return Applied::Stale;
        }
        self.in_flight = None;

        match result {
            Ok(page) => {
                if request.reset {
                    self.items = page.articles;
                } else {
                    self.items.extend(page.articles);
                }
                self.current_page = request.page;
                self.total_available = page.total_results;
                self.has_more = u64::from(self.current_page) * u64::from(self.page_size)
                    < self.total_available;
                self.status = FeedStatus::Loaded;
                self.error = None;
                self.last_failed = None;
            }
            Err(e) => {
                tracing::warn!(source = %request.source, page = request.page, error = %e, "Feed page failed");
                self.status = FeedStatus::Error;
                self.error = Some(e.to_string());
                self.last_failed = Some(request.clone());
            }
        }
        Applied::Accepted
    }

    /// Stop accepting responses. Every later response is stale and no new
    /// requests are issued.
    pub fn teardown(&mut self) {
        self.torn_down = true;
        self.in_flight = None;
    }

    pub fn can_load_more(&self) -> bool {
        !self.torn_down
            && self.has_more
            && !matches!(self.status, FeedStatus::Loading | FeedStatus::Error)
    }

    pub fn source(&self) -> &FeedSource {
        &self.source
    }

    pub fn items(&self) -> &[Article] {
        &self.items
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn total_available(&self) -> u64 {
        self.total_available
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn status(&self) -> FeedStatus {
        self.status
    }

    pub fn is_loading(&self) -> bool {
        self.status == FeedStatus::Loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }
}
