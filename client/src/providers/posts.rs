//! Feed page source trait.

use crate::schemas::PostsPage;
use storefront_remote::RemoteError;

/// One page of the feed to load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number
    pub page: u32,
    /// Page size
    pub limit: u32,
    /// Search term; `None` lists every post
    pub search: Option<String>,
}

impl PageRequest {
    /// Offset of the first post on this page.
    #[must_use]
    pub const fn skip(&self) -> u32 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }
}

/// Loads pages of posts.
pub trait PostFetcher: Send + Sync {
    /// Load one page.
    ///
    /// # Errors
    ///
    /// Returns the [`RemoteError`] of the read.
    fn fetch_posts(
        &self,
        request: PageRequest,
    ) -> impl std::future::Future<Output = Result<PostsPage, RemoteError>> + Send;
}
