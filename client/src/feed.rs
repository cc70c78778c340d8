//! Paginated post feed.
//!
//! [`FeedReducer`] owns the list shown on the home screen: infinite scroll,
//! pull-to-refresh, debounced search and posts created locally. Pages are
//! loaded through the [`PostFetcher`] in [`FeedEnvironment`].
//!
//! Every load carries a generation number. Changing the search or
//! refreshing starts a new generation, and pages from older generations are
//! dropped when they arrive.

use crate::providers::{PageRequest, PostFetcher};
use crate::schemas::{Post, PostsPage};
use std::collections::HashSet;
use std::time::Duration;
use storefront_core::{SmallVec, effect::Effect, reducer::Reducer, smallvec};
use storefront_remote::RemoteError;

/// Feed environment.
#[derive(Clone)]
pub struct FeedEnvironment<F>
where
    F: PostFetcher + Clone,
{
    /// Page source.
    pub fetcher: F,

    /// Posts per page.
    pub page_size: u32,

    /// Quiet period before a typed search term is applied.
    pub search_debounce: Duration,
}

impl<F: PostFetcher + Clone> FeedEnvironment<F> {
    /// Environment with the default page size (20) and debounce (500 ms).
    #[must_use]
    pub const fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            page_size: crate::config::DEFAULT_PAGE_SIZE,
            search_debounce: crate::config::DEFAULT_SEARCH_DEBOUNCE,
        }
    }

    /// Environment sized from client configuration.
    #[must_use]
    pub const fn from_config(fetcher: F, config: &crate::config::ClientConfig) -> Self {
        Self {
            fetcher,
            page_size: config.page_size,
            search_debounce: config.search_debounce,
        }
    }
}

/// Feed state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedState {
    /// Posts in display order, unique by id.
    pub posts: Vec<Post>,
    /// Last requested page (1-based); 0 before the first load.
    pub page: u32,
    /// Applied search term.
    pub search: Option<String>,
    /// Search term typed but not yet applied.
    pub pending_search: Option<String>,
    /// Total posts reported by the server.
    pub total: Option<u32>,
    /// No page has resolved yet for the current search.
    pub is_loading: bool,
    /// A page request is in flight.
    pub is_fetching: bool,
    /// The last page request failed.
    pub error: Option<RemoteError>,
    /// The last page reached the end of the results.
    pub reached_end: bool,
    generation: u64,
    typed: u64,
    created: Vec<u64>,
}

impl FeedState {
    /// Empty feed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether scrolling further can load more posts.
    #[must_use]
    pub const fn has_more(&self) -> bool {
        self.page > 0 && !self.reached_end
    }

    /// Current load generation.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether a post with `id` is shown.
    #[must_use]
    pub fn contains(&self, id: u64) -> bool {
        self.posts.iter().any(|post| post.id == id)
    }

    fn begin(&mut self, page: u32, limit: u32) -> PageRequest {
        self.page = page;
        self.is_fetching = true;
        PageRequest {
            page,
            limit,
            search: self.search.clone(),
        }
    }

    fn restart(&mut self) {
        self.generation += 1;
        self.total = None;
        self.reached_end = false;
        self.error = None;
    }

    /// Apply `search`, restarting from page 1 when it changed.
    fn apply_search(&mut self, search: Option<String>) -> bool {
        if search == self.search && self.page > 0 {
            return false;
        }
        tracing::debug!(search = ?search, "Search changed");
        self.search = search;
        self.posts.clear();
        self.restart();
        self.is_loading = true;
        true
    }

    /// Replace the list with page 1, keeping locally created posts at the head
    /// of the unfiltered feed.
    fn replace_with(&mut self, incoming: Vec<Post>) {
        let server_ids: HashSet<u64> = incoming.iter().map(|post| post.id).collect();
        let previous = std::mem::take(&mut self.posts);
        let mut posts: Vec<Post> = if self.search.is_none() {
            previous
                .into_iter()
                .filter(|post| self.created.contains(&post.id) && !server_ids.contains(&post.id))
                .collect()
        } else {
            Vec::new()
        };

        let mut seen: HashSet<u64> = posts.iter().map(|post| post.id).collect();
        posts.extend(incoming.into_iter().filter(|post| seen.insert(post.id)));
        self.posts = posts;
    }

    /// Append posts not already shown, preserving their order.
    fn append(&mut self, incoming: Vec<Post>) -> usize {
        let mut seen: HashSet<u64> = self.posts.iter().map(|post| post.id).collect();
        let before = self.posts.len();
        self.posts.extend(incoming.into_iter().filter(|post| seen.insert(post.id)));
        self.posts.len() - before
    }
}

/// Feed actions.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedAction {
    /// Load page 1 unless something is already shown or loading.
    LoadFirstPage,

    /// Load the page after the last one requested.
    ///
    /// Ignored while a request is in flight and once every post is loaded.
    LoadNextPage,

    /// Reload page 1 and replace the list.
    Refresh,

    /// The search box changed; applied after the debounce delay.
    SearchTyped(String),

    /// The debounce delay for a typed term elapsed.
    ///
    /// Dropped unless `typed` is still the latest keystroke.
    SearchSettled {
        /// Keystroke sequence number
        typed: u64,
        /// Term typed at that keystroke
        term: String,
    },

    /// Apply a search term immediately; an empty term clears the search.
    ///
    /// Cancels any typed term still waiting for its debounce.
    SetSearch(String),

    /// A page request succeeded.
    PageLoaded {
        /// Generation the request was issued in
        generation: u64,
        /// Page number
        page: u32,
        /// Validated page
        posts: PostsPage,
    },

    /// A page request failed.
    PageFailed {
        /// Generation the request was issued in
        generation: u64,
        /// Page number
        page: u32,
        /// Failure
        error: RemoteError,
    },

    /// A post was created on this device.
    PostCreated(Post),
}

/// Feed reducer.
#[derive(Debug, Clone)]
pub struct FeedReducer<F> {
    _phantom: std::marker::PhantomData<F>,
}

impl<F> FeedReducer<F> {
    /// Create a new feed reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<F> Default for FeedReducer<F> {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize(term: &str) -> Option<String> {
    let term = term.trim();
    (!term.is_empty()).then(|| term.to_string())
}

impl<F> FeedReducer<F>
where
    F: PostFetcher + Clone + 'static,
{
    fn load(
        state: &mut FeedState,
        env: &FeedEnvironment<F>,
        page: u32,
    ) -> SmallVec<[Effect<FeedAction>; 4]> {
        let request = state.begin(page, env.page_size);
        let generation = state.generation;
        let fetcher = env.fetcher.clone();

        tracing::debug!(page, generation, search = ?request.search, "Loading feed page");

        smallvec![Effect::Future(Box::pin(async move {
            match fetcher.fetch_posts(request).await {
                Ok(posts) => Some(FeedAction::PageLoaded {
                    generation,
                    page,
                    posts,
                }),
                Err(error) => Some(FeedAction::PageFailed {
                    generation,
                    page,
                    error,
                }),
            }
        }))]
    }
}

impl<F> Reducer for FeedReducer<F>
where
    F: PostFetcher + Clone + 'static,
{
    type State = FeedState;
    type Action = FeedAction;
    type Environment = FeedEnvironment<F>;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ═══════════════════════════════════════════════════════════════
            // Pagination
            // ═══════════════════════════════════════════════════════════════
            FeedAction::LoadFirstPage => {
                if state.is_fetching || state.page > 0 {
                    tracing::trace!("Feed already loaded; LoadFirstPage ignored");
                    return SmallVec::new();
                }
                state.restart();
                state.is_loading = true;
                Self::load(state, env, 1)
            },

            FeedAction::LoadNextPage => {
                if state.is_fetching {
                    tracing::trace!("Request in flight; LoadNextPage ignored");
                    return SmallVec::new();
                }
                if !state.has_more() {
                    tracing::trace!(page = state.page, "No more posts; LoadNextPage ignored");
                    return SmallVec::new();
                }
                Self::load(state, env, state.page + 1)
            },

            FeedAction::Refresh => {
                state.restart();
                Self::load(state, env, 1)
            },

            // ═══════════════════════════════════════════════════════════════
            // Search
            // ═══════════════════════════════════════════════════════════════
            FeedAction::SearchTyped(term) => {
                state.typed += 1;
                state.pending_search = Some(term.clone());
                smallvec![Effect::delay(
                    env.search_debounce,
                    FeedAction::SearchSettled {
                        typed: state.typed,
                        term,
                    },
                )]
            },

            FeedAction::SearchSettled { typed, term } => {
                if typed != state.typed || state.pending_search.is_none() {
                    tracing::trace!(typed, latest = state.typed, "Search superseded by newer input");
                    return SmallVec::new();
                }
                state.pending_search = None;
                if state.apply_search(normalize(&term)) {
                    Self::load(state, env, 1)
                } else {
                    SmallVec::new()
                }
            },

            FeedAction::SetSearch(term) => {
                state.typed += 1;
                state.pending_search = None;
                if state.apply_search(normalize(&term)) {
                    Self::load(state, env, 1)
                } else {
                    SmallVec::new()
                }
            },

            // ═══════════════════════════════════════════════════════════════
            // Results
            // ═══════════════════════════════════════════════════════════════
            FeedAction::PageLoaded {
                generation,
                page,
                posts,
            } => {
                if generation != state.generation {
                    tracing::trace!(generation, current = state.generation, "Stale page dropped");
                    return SmallVec::new();
                }

                let PostsPage {
                    posts,
                    total,
                    skip,
                    ..
                } = posts;
                let received = u32::try_from(posts.len()).unwrap_or(u32::MAX);

                state.is_fetching = false;
                state.is_loading = false;
                state.error = None;
                state.total = Some(total);
                state.reached_end = received == 0 || skip.saturating_add(received) >= total;

                if page <= 1 {
                    state.replace_with(posts);
                    tracing::debug!(shown = state.posts.len(), total, "Feed replaced");
                } else {
                    let added = state.append(posts);
                    tracing::debug!(page, added, shown = state.posts.len(), total, "Feed page appended");
                }
                SmallVec::new()
            },

            FeedAction::PageFailed {
                generation,
                page,
                error,
            } => {
                if generation != state.generation {
                    return SmallVec::new();
                }
                tracing::warn!(page, error = %error, "Feed page failed");
                state.is_fetching = false;
                state.is_loading = false;
                state.page = page.saturating_sub(1);
                state.error = Some(error);
                SmallVec::new()
            },

            // ═══════════════════════════════════════════════════════════════
            // Local posts
            // ═══════════════════════════════════════════════════════════════
            FeedAction::PostCreated(post) => {
                if state.contains(post.id) {
                    return SmallVec::new();
                }
                tracing::debug!(post_id = post.id, "Post prepended");
                state.created.push(post.id);
                state.posts.insert(0, post);
                SmallVec::new()
            },
        }
    }
}
