use crate::feed::{Applied, FeedController, FeedSource, FeedStatus, PageRequest};
use crate::news::{Article, NewsClient, NewsPage, CATEGORIES};
use crate::preferences::PreferenceManager;
use crate::storage::Database;
use crate::theme::{StyleMap, ThemeVariant};
use crate::util::MAX_SEARCH_QUERY_LENGTH;
use ratatui::style::Style;
use std::borrow::Cow;
use std::collections::HashSet;
use tokio::time::Instant;

/// Maximum scroll offset for the article view (ratatui u16 limit).
pub const MAX_SCROLL: usize = u16::MAX as usize;

/// Seconds an informational status message stays visible.
const STATUS_TTL_SECS: u64 = 3;

// ============================================================================
// View and State Enums
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Headlines,
    Search,
    Bookmarks,
    Article,
}

/// State of the article detail view.
#[derive(Debug, Clone)]
pub enum DetailState {
    Idle,
    Loading { id: String },
    Loaded(Box<Article>),
}

/// Pending confirmation for destructive operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    ClearBookmarks,
}

/// Events from background tasks.
pub enum AppEvent {
    /// A headline or search page finished loading.
    ///
    /// Carries the request it answers so the controller can drop it if the
    /// feed has moved on since.
    PageLoaded {
        request: PageRequest,
        result: Result<NewsPage, String>,
    },
    /// An article was written to the local store.
    ///
    /// `open` is set when the save was triggered by opening the article, in
    /// which case the detail view loads it next.
    ArticleSaved { id: String, open: bool },
    ArticleSaveFailed { error: String },
    /// Detail lookup finished. `Ok(None)` means no stored record.
    ArticleLoaded {
        id: String,
        generation: u64,
        result: Result<Option<Article>, String>,
    },
    BookmarksLoaded(Result<Vec<Article>, String>),
    BookmarksCleared(Result<u64, String>),
    /// A background task panicked.
    TaskPanicked { task: &'static str, error: String },
}

// ============================================================================
// Application State
// ============================================================================

/// Central application state
pub struct App {
    pub db: Database,
    pub news: NewsClient,
    pub prefs: PreferenceManager,

    pub theme_variant: ThemeVariant,
    pub theme: StyleMap,

    pub country: String,
    pub category_index: usize,

    // Feeds
    pub headlines: FeedController,
    /// Present while a search has been submitted; torn down on leaving Search.
    pub search: Option<FeedController>,
    pub bookmarks: Vec<Article>,
    pub bookmarks_loading: bool,
    /// Ids written to the local store this session or listed in Bookmarks.
    pub saved_ids: HashSet<String>,

    // UI State
    pub view: View,
    /// View to return to when leaving the article view.
    pub return_view: View,
    pub selected_headline: usize,
    pub selected_search: usize,
    pub selected_bookmark: usize,
    pub scroll_offset: usize,

    // Search input
    pub search_input: String,
    pub search_editing: bool,

    // Article detail
    pub detail: DetailState,
    /// Incremented for each detail load; older responses are dropped.
    pub detail_generation: u64,

    /// Status message with the time it was set. Errors stay until dismissed.
    pub status_message: Option<(Cow<'static, str>, Instant)>,
    pub status_is_error: bool,

    pub pending_confirm: Option<ConfirmAction>,

    /// Dirty flag to skip unnecessary frame renders
    pub needs_redraw: bool,
}

impl App {
    pub fn new(
        db: Database,
        news: NewsClient,
        prefs: PreferenceManager,
        country: impl Into<String>,
        page_size: u32,
    ) -> Self {
        let country = country.into();
        let category_index = CATEGORIES
            .iter()
            .position(|c| *c == prefs.category())
            .unwrap_or(0);
        let theme_variant = prefs.theme_variant();
        let headlines = FeedController::new(
            FeedSource::Headlines {
                country: country.clone(),
                category: CATEGORIES[category_index].to_string(),
            },
            page_size,
        );

        Self {
            db,
            news,
            prefs,
            theme_variant,
            theme: StyleMap::from_palette(&theme_variant.palette()),
            country,
            category_index,
            headlines,
            search: None,
            bookmarks: Vec::new(),
            bookmarks_loading: false,
            saved_ids: HashSet::new(),
            view: View::Headlines,
            return_view: View::Headlines,
            selected_headline: 0,
            selected_search: 0,
            selected_bookmark: 0,
            scroll_offset: 0,
            search_input: String::new(),
            search_editing: false,
            detail: DetailState::Idle,
            detail_generation: 0,
            status_message: None,
            status_is_error: false,
            pending_confirm: None,
            needs_redraw: true,
        }
    }

    /// Resolve a semantic role name to its `Style`.
    pub fn style(&self, role: &str) -> Style {
        self.theme.resolve(role)
    }

    pub fn set_theme(&mut self, variant: ThemeVariant) {
        self.theme_variant = variant;
        self.theme = StyleMap::from_palette(&variant.palette());
        self.needs_redraw = true;
    }

    /// Switch to the other theme variant and return it.
    pub fn cycle_theme(&mut self) -> ThemeVariant {
        let next = self.theme_variant.next();
        self.set_theme(next);
        next
    }

    // ------------------------------------------------------------------------
    // Categories
    // ------------------------------------------------------------------------

    pub fn current_category(&self) -> &'static str {
        CATEGORIES[self.category_index]
    }

    /// Switch the headline feed to another category.
    ///
    /// Returns the first-page request for the new category, or `None` if
    /// the category is already selected.
    pub fn select_category(&mut self, index: usize) -> Option<PageRequest> {
        let index = index % CATEGORIES.len();
        if index == self.category_index && self.headlines.status() != FeedStatus::Idle {
            return None;
        }
        self.category_index = index;
        self.selected_headline = 0;
        self.headlines.change_source(FeedSource::Headlines {
            country: self.country.clone(),
            category: CATEGORIES[index].to_string(),
        })
    }

    pub fn next_category(&mut self) -> Option<PageRequest> {
        self.select_category(self.category_index + 1)
    }

    pub fn prev_category(&mut self) -> Option<PageRequest> {
        self.select_category(self.category_index + CATEGORIES.len() - 1)
    }

    // ------------------------------------------------------------------------
    // Feed access
    // ------------------------------------------------------------------------

    /// Controller backing the current list view, if it has one.
    pub fn active_feed(&self) -> Option<&FeedController> {
        match self.view {
            View::Headlines => Some(&self.headlines),
            View::Search => self.search.as_ref(),
            View::Bookmarks | View::Article => None,
        }
    }

    pub fn active_feed_mut(&mut self) -> Option<&mut FeedController> {
        match self.view {
            View::Headlines => Some(&mut self.headlines),
            View::Search => self.search.as_mut(),
            View::Bookmarks | View::Article => None,
        }
    }

    /// Articles shown by the current list view.
    pub fn visible_articles(&self) -> &[Article] {
        match self.view {
            View::Headlines => self.headlines.items(),
            View::Search => self
                .search
                .as_ref()
                .map(FeedController::items)
                .unwrap_or_default(),
            View::Bookmarks => &self.bookmarks,
            View::Article => &[],
        }
    }

    pub fn selected_index(&self) -> usize {
        match self.view {
            View::Headlines => self.selected_headline,
            View::Search => self.selected_search,
            View::Bookmarks => self.selected_bookmark,
            View::Article => 0,
        }
    }

    fn selected_index_mut(&mut self) -> Option<&mut usize> {
        match self.view {
            View::Headlines => Some(&mut self.selected_headline),
            View::Search => Some(&mut self.selected_search),
            View::Bookmarks => Some(&mut self.selected_bookmark),
            View::Article => None,
        }
    }

    pub fn selected_article(&self) -> Option<&Article> {
        self.visible_articles().get(self.selected_index())
    }

    /// The article the user is acting on: the detail article in the article
    /// view, otherwise the selected list entry.
    pub fn focused_article(&self) -> Option<&Article> {
        match (&self.view, &self.detail) {
            (View::Article, DetailState::Loaded(article)) => Some(article.as_ref()),
            (View::Article, _) => None,
            _ => self.selected_article(),
        }
    }

    pub fn is_saved(&self, article: &Article) -> bool {
        !article.id.is_empty() && self.saved_ids.contains(&article.id)
    }

    pub fn nav_up(&mut self) {
        if let Some(selected) = self.selected_index_mut() {
            *selected = selected.saturating_sub(1);
        }
    }

    pub fn nav_down(&mut self) {
        let len = self.visible_articles().len();
        if len == 0 {
            return;
        }
        if let Some(selected) = self.selected_index_mut() {
            *selected = selected.saturating_add(1).min(len - 1);
        }
    }

    /// Keep every selection inside its list.
    pub fn clamp_selections(&mut self) {
        fn clamp(selected: &mut usize, len: usize) {
            *selected = (*selected).min(len.saturating_sub(1));
        }
        clamp(&mut self.selected_headline, self.headlines.items().len());
        let search_len = self.search.as_ref().map_or(0, |s| s.items().len());
        clamp(&mut self.selected_search, search_len);
        clamp(&mut self.selected_bookmark, self.bookmarks.len());
    }

    /// Hand a finished page to the controller it was requested by.
    pub fn apply_page(
        &mut self,
        request: &PageRequest,
        result: Result<NewsPage, String>,
    ) -> Applied {
        let failed = result.as_ref().err().cloned();
        let (feed, selected) = match request.source {
            FeedSource::Headlines { .. } => (Some(&mut self.headlines), &mut self.selected_headline),
            FeedSource::Search { .. } => (self.search.as_mut(), &mut self.selected_search),
        };
        let Some(feed) = feed else {
            tracing::debug!(seq = request.seq, "Page arrived with no search active");
            return Applied::Stale;
        };

        let applied = feed.apply(request, result);
        if applied == Applied::Accepted {
            if request.reset {
                *selected = 0;
            }
            if let Some(error) = failed {
                self.set_error(format!("{error} (press r to retry)"));
            }
            self.clamp_selections();
        }
        applied
    }

    // ------------------------------------------------------------------------
    // Search
    // ------------------------------------------------------------------------

    /// Switch to the search view with the input focused.
    pub fn enter_search(&mut self) {
        if self.search.as_ref().is_some_and(FeedController::is_torn_down) {
            self.search = None;
            self.selected_search = 0;
        }
        self.view = View::Search;
        self.search_editing = true;
    }

    /// Start a search for the current input.
    ///
    /// Returns `None` (with a status message) for empty or oversized input.
    pub fn submit_search(&mut self, page_size: u32) -> Option<PageRequest> {
        let query = self.search_input.trim().to_string();
        if query.is_empty() {
            self.set_status("Enter a search term");
            return None;
        }
        if query.len() > MAX_SEARCH_QUERY_LENGTH {
            self.set_status(format!(
                "Search query too long (max {} chars)",
                MAX_SEARCH_QUERY_LENGTH
            ));
            return None;
        }

        self.search_editing = false;
        self.selected_search = 0;
        let source = FeedSource::Search { query };
        match self.search.as_mut() {
            Some(feed) if !feed.is_torn_down() => feed.change_source(source),
            _ => {
                let mut feed = FeedController::new(source, page_size);
                let request = feed.mount();
                self.search = Some(feed);
                request
            }
        }
    }

    /// Leave the search view. The search feed stops accepting responses.
    pub fn leave_search(&mut self) {
        if let Some(feed) = self.search.as_mut() {
            feed.teardown();
        }
        self.search_editing = false;
        self.search_input.clear();
        self.view = View::Headlines;
    }

    // ------------------------------------------------------------------------
    // Article detail
    // ------------------------------------------------------------------------

    /// Enter the article view for `id` and return the load generation.
    pub fn open_detail(&mut self, id: String) -> u64 {
        if self.view != View::Article {
            self.return_view = self.view;
        }
        self.view = View::Article;
        self.scroll_offset = 0;
        self.detail_generation = self.detail_generation.wrapping_add(1);
        self.detail = DetailState::Loading { id };
        self.detail_generation
    }

    /// Apply a detail lookup. A missing record routes back to the list.
    pub fn apply_detail(
        &mut self,
        id: &str,
        generation: u64,
        result: Result<Option<Article>, String>,
    ) {
        let current = matches!(&self.detail, DetailState::Loading { id: loading } if loading == id);
        if generation != self.detail_generation || !current {
            tracing::debug!(id, generation, "Discarding stale article load");
            return;
        }
        match result {
            Ok(Some(article)) => {
                self.detail = DetailState::Loaded(Box::new(article));
            }
            Ok(None) => {
                self.exit_detail();
                self.set_error("Article not found");
            }
            Err(e) => {
                self.exit_detail();
                self.set_error(format!("Failed to load article: {e}"));
            }
        }
    }

    pub fn exit_detail(&mut self) {
        self.view = self.return_view;
        self.detail = DetailState::Idle;
        self.scroll_offset = 0;
    }

    /// Go back one level. Returns false when already at the top.
    pub fn back(&mut self) -> bool {
        match self.view {
            View::Article => self.exit_detail(),
            View::Search => self.leave_search(),
            View::Bookmarks => self.view = View::Headlines,
            View::Headlines => return false,
        }
        true
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.scroll_offset = self.scroll_offset.saturating_add(lines).min(MAX_SCROLL);
    }

    /// Clamp scroll offset to the content height.
    pub fn clamp_scroll(&mut self, content_lines: usize, visible_lines: usize) {
        let max_scroll = content_lines.saturating_sub(visible_lines);
        self.scroll_offset = self.scroll_offset.min(max_scroll).min(MAX_SCROLL);
    }

    // ------------------------------------------------------------------------
    // Status
    // ------------------------------------------------------------------------

    /// Set status message (will auto-expire after 3 seconds)
    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), Instant::now()));
        self.status_is_error = false;
    }

    /// Set an error notice; it stays until dismissed or replaced.
    pub fn set_error(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), Instant::now()));
        self.status_is_error = true;
    }

    /// Returns true if a notice was showing.
    pub fn dismiss_status(&mut self) -> bool {
        self.status_is_error = false;
        self.status_message.take().is_some()
    }

    /// Clear an informational message older than 3 seconds.
    /// Returns true if a message was actually cleared
    pub fn clear_expired_status(&mut self) -> bool {
        if self.status_is_error {
            return false;
        }
        if let Some((_, time)) = &self.status_message {
            if time.elapsed().as_secs() >= STATUS_TTL_SECS {
                self.status_message = None;
                return true;
            }
        }
        false
    }
}
