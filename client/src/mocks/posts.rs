//! Mock post fetcher.

use crate::providers::{PageRequest, PostFetcher};
use crate::schemas::PostsPage;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use storefront_remote::RemoteError;

type PageKey = (u32, Option<String>);

/// Post fetcher serving canned pages keyed by page number and search term.
///
/// Unknown pages fail with a 404 transport error.
#[derive(Debug, Clone, Default)]
pub struct MockPostFetcher {
    pages: Arc<Mutex<HashMap<PageKey, Result<PostsPage, RemoteError>>>>,
    requests: Arc<Mutex<Vec<PageRequest>>>,
}

impl MockPostFetcher {
    /// A fetcher with no pages.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `posts` for page `page` of the unfiltered feed.
    #[must_use]
    pub fn with_page(self, page: u32, posts: PostsPage) -> Self {
        self.insert(page, None, Ok(posts))
    }

    /// Serve `posts` for page `page` of the results for `term`.
    #[must_use]
    pub fn with_search_page(self, term: &str, page: u32, posts: PostsPage) -> Self {
        self.insert(page, Some(term.to_string()), Ok(posts))
    }

    /// Fail page `page` of the unfiltered feed with `error`.
    #[must_use]
    pub fn with_failure(self, page: u32, error: RemoteError) -> Self {
        self.insert(page, None, Err(error))
    }

    #[allow(clippy::unwrap_used)] // Test mock: mutex poisoning is a test failure
    fn insert(self, page: u32, search: Option<String>, outcome: Result<PostsPage, RemoteError>) -> Self {
        self.pages.lock().unwrap().insert((page, search), outcome);
        self
    }

    /// Requests received so far.
    #[must_use]
    #[allow(clippy::unwrap_used)] // Test mock: mutex poisoning is a test failure
    pub fn requests(&self) -> Vec<PageRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl PostFetcher for MockPostFetcher {
    #[allow(clippy::unwrap_used)] // Test mock: mutex poisoning is a test failure
    async fn fetch_posts(&self, request: PageRequest) -> Result<PostsPage, RemoteError> {
        let key = (request.page, request.search.clone());
        self.requests.lock().unwrap().push(request);
        self.pages.lock().unwrap().get(&key).cloned().unwrap_or_else(|| {
            Err(RemoteError::Transport {
                status: Some(404),
                message: "Not Found".to_string(),
            })
        })
    }
}
