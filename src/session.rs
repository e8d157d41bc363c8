// Copyright 2024 The Quill Authors
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use log::{debug, warn};

use crate::domain::{Blog, BlogFilters, CommentNode, Page};
use crate::filters::{FilterState, FilterUpdate, FilterView};
use crate::source::{BlogSource, SourceError};
use crate::thread::{build_thread_with, OrphanPolicy};

/// Browsing session of a blog listing.
///
/// Owns the filter state of one view and the outcome of the last fetch.
/// Every change to the filters is followed by a fetch from the source. A
/// failed fetch leaves the filters and the query string as they are.
///
/// # Examples
///
/// ```
/// use quill::filters::{FilterUpdate, FilterView};
/// use quill::session::FeedSession;
/// use quill::source::MemorySource;
///
/// async fn browse() {
///     let mut session = FeedSession::new(MemorySource::new(), FilterView::Browse, 12);
///     session.apply_filters(FilterUpdate::new().search("rust")).await;
///     assert_eq!(session.query_string(), "search=rust");
/// }
/// ```
pub struct FeedSession<S> {
    source: S,
    state: FilterState,
    page: Option<Page<Blog>>,
    error: Option<SourceError>,
}

impl<S: BlogSource> FeedSession<S> {
    pub fn new(source: S, view: FilterView, default_limit: usize) -> Self {
        Self::with_state(source, FilterState::new(view, default_limit))
    }

    /// Session for a view opened with `query` in its URL.
    pub fn from_query(source: S, view: FilterView, query: &str, default_limit: usize) -> Self {
        Self::with_state(source, FilterState::from_query(view, query, default_limit))
    }

    pub fn with_state(source: S, state: FilterState) -> Self {
        Self {
            source,
            state,
            page: None,
            error: None,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    pub fn filters(&self) -> &BlogFilters {
        self.state.filters()
    }

    pub fn query_string(&self) -> &str {
        self.state.query_string()
    }

    pub fn current_page(&self) -> usize {
        self.state.current_page()
    }

    /// Blogs of the last successful fetch; `None` before the first fetch or after a failure.
    pub fn page(&self) -> Option<&Page<Blog>> {
        self.page.as_ref()
    }

    pub fn error(&self) -> Option<&SourceError> {
        self.error.as_ref()
    }

    pub async fn apply_filters(&mut self, update: FilterUpdate) {
        self.state.apply_filters(update);
        self.refresh().await;
    }

    pub async fn change_page(&mut self, page: usize) {
        self.state.handle_page_change(page);
        self.refresh().await;
    }

    pub async fn clear_filters(&mut self) {
        self.state.clear_filters();
        self.refresh().await;
    }

    pub async fn toggle_category(&mut self, category: &str) {
        self.state.toggle_category(category);
        self.refresh().await;
    }

    pub async fn toggle_tag(&mut self, tag: &str) {
        self.state.toggle_tag(tag);
        self.refresh().await;
    }

    /// Fetches the blogs for the current filters.
    pub async fn refresh(&mut self) {
        let filters = self.state.filters().clone();
        debug!("fetching blogs for page {}", filters.page());

        match self.source.list_blogs(&filters).await {
            Ok(page) => {
                self.page = Some(page);
                self.error = None;
            }
            Err(err) => {
                warn!("fetching blogs failed: {}", err);
                self.page = None;
                self.error = Some(err);
            }
        }
    }
}

/// Fetches a blog's comments and arranges them into reply threads.
pub async fn load_thread<S: BlogSource>(
    source: &S,
    blog_id: &str,
    policy: OrphanPolicy,
) -> Result<Vec<CommentNode>, SourceError> {
    let comments = source.list_comments(blog_id).await?;
    debug!("threading {} comments of blog {}", comments.len(), blog_id);
    Ok(build_thread_with(&comments, policy))
}
