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

//! Authoritative blog filters kept in step with the browser query string.

use serde::{Deserialize, Serialize};

use crate::domain::{BlogFilters, BlogStatus, SortBy, SortOrder};

pub mod query;

/// The view a filter state belongs to.
///
/// The general list and the keyword search view encode the search text under
/// different parameters and treat categories differently: the list allows any
/// number of categories, the search view at most one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterView {
    Browse,
    Search,
}

impl FilterView {
    pub fn search_param(&self) -> &'static str {
        match self {
            FilterView::Browse => query::SEARCH_PARAM,
            FilterView::Search => query::KEYWORD_PARAM,
        }
    }

    pub fn single_category(&self) -> bool {
        matches!(self, FilterView::Search)
    }
}

impl std::str::FromStr for FilterView {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "browse" => Ok(FilterView::Browse),
            "search" => Ok(FilterView::Search),
            _ => Err(format!("{} is not a valid view", s)),
        }
    }
}

/// Status part of a filter update; `Any` removes the status filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    Any,
    Draft,
    Published,
    Archived,
}

impl From<StatusFilter> for Option<BlogStatus> {
    fn from(value: StatusFilter) -> Self {
        match value {
            StatusFilter::Any => None,
            StatusFilter::Draft => Some(BlogStatus::Draft),
            StatusFilter::Published => Some(BlogStatus::Published),
            StatusFilter::Archived => Some(BlogStatus::Archived),
        }
    }
}

/// A partial change to [`BlogFilters`].
///
/// Every field is optional and `None` leaves the current value untouched.
/// Text fields are trimmed and an empty text clears the field. The offset is
/// not part of an update: applying one always returns to the first page.
///
/// # Examples
///
/// ```
/// use quill::filters::FilterUpdate;
/// use quill::SortBy;
///
/// let update = FilterUpdate::new().search("rust").sort_by(SortBy::Likes);
/// assert_eq!(update.search.as_deref(), Some("rust"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FilterUpdate {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub categories: Option<Vec<String>>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub status: Option<StatusFilter>,
    #[serde(default)]
    pub sort_by: Option<SortBy>,
    #[serde(default)]
    pub sort_order: Option<SortOrder>,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl FilterUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn categories(mut self, categories: Vec<String>) -> Self {
        self.categories = Some(categories);
        self
    }

    pub fn tags(mut self, tags: Vec<String>) -> Self {
        self.tags = Some(tags);
        self
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn status(mut self, status: StatusFilter) -> Self {
        self.status = Some(status);
        self
    }

    pub fn sort_by(mut self, sort_by: SortBy) -> Self {
        self.sort_by = Some(sort_by);
        self
    }

    pub fn sort_order(mut self, sort_order: SortOrder) -> Self {
        self.sort_order = Some(sort_order);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Merges the update into `current`, producing filters on the first page.
    pub fn merge_into(self, current: &BlogFilters) -> BlogFilters {
        let mut next = current.clone();

        if let Some(search) = self.search {
            next.search = non_empty(search);
        }
        if let Some(categories) = self.categories {
            next.categories = unique(categories);
        }
        if let Some(tags) = self.tags {
            next.tags = unique(tags);
        }
        if let Some(author) = self.author {
            next.author = non_empty(author);
        }
        if let Some(status) = self.status {
            next.status = status.into();
        }
        if let Some(sort_by) = self.sort_by {
            next.sort_by = sort_by;
        }
        if let Some(sort_order) = self.sort_order {
            next.sort_order = sort_order;
        }
        if let Some(limit) = self.limit {
            next.limit = limit.max(1);
        }
        next.offset = 0;

        next
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn unique(values: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(values.len());
    for value in values {
        let value = value.trim();
        if !value.is_empty() && !out.iter().any(|v| v == value) {
            out.push(value.to_string());
        }
    }
    out
}

/// Single source of truth for a view's filters and its URL query string.
///
/// The query string is always derived from the filters, except when the
/// state is first built from a URL with [`FilterState::from_query`].
///
/// # Examples
///
/// ```
/// use quill::filters::{FilterState, FilterUpdate, FilterView};
///
/// let mut state = FilterState::new(FilterView::Browse, 12);
/// state.handle_page_change(3);
/// assert_eq!(state.filters().offset, 24);
///
/// state.apply_filters(FilterUpdate::new().search("rust"));
/// assert_eq!(state.filters().offset, 0);
/// assert_eq!(state.query_string(), "search=rust");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    view: FilterView,
    default_limit: usize,
    filters: BlogFilters,
    query: String,
}

impl FilterState {
    /// Default state of a view showing `default_limit` blogs per page.
    pub fn new(view: FilterView, default_limit: usize) -> Self {
        Self {
            view,
            default_limit: default_limit.max(1),
            filters: BlogFilters::with_limit(default_limit),
            query: String::new(),
        }
    }

    /// State reconstructed from the URL the view was loaded with.
    pub fn from_query(view: FilterView, query: &str, default_limit: usize) -> Self {
        let filters = query::decode(view, query, default_limit);
        let query = query::encode(view, &filters);
        Self {
            view,
            default_limit: default_limit.max(1),
            filters,
            query,
        }
    }

    pub fn view(&self) -> FilterView {
        self.view
    }

    pub fn filters(&self) -> &BlogFilters {
        &self.filters
    }

    /// URL query string without the leading `?`; empty when nothing is set.
    pub fn query_string(&self) -> &str {
        &self.query
    }

    /// One-based page number for display.
    pub fn current_page(&self) -> usize {
        self.filters.page()
    }

    /// Merges `update`, returns to the first page and re-derives the URL.
    ///
    /// In the search view only the last of several requested categories is kept.
    pub fn apply_filters(&mut self, update: FilterUpdate) -> &BlogFilters {
        let mut next = update.merge_into(&self.filters);
        if self.view.single_category() && next.categories.len() > 1 {
            next.categories = next.categories.split_off(next.categories.len() - 1);
        }

        self.query = query::encode(self.view, &next);
        self.filters = next;
        &self.filters
    }

    /// Moves to the one-based `page`. Nothing but the offset changes.
    ///
    /// Pages past the last addressable offset land on that last page.
    pub fn handle_page_change(&mut self, page: usize) -> &BlogFilters {
        let limit = self.filters.limit.max(1);
        let index = page
            .saturating_sub(1)
            .min(usize::MAX / limit)
            .min(usize::MAX - 1);
        self.filters.offset = index * limit;
        &self.filters
    }

    /// Resets to the view defaults and clears the URL.
    pub fn clear_filters(&mut self) -> &BlogFilters {
        self.filters = BlogFilters::with_limit(self.default_limit);
        self.query.clear();
        &self.filters
    }

    /// Selects `category`, or deselects it when already selected.
    ///
    /// The search view keeps at most one category: selecting another one
    /// replaces the current selection.
    pub fn toggle_category(&mut self, category: &str) -> &BlogFilters {
        let categories = if self.view.single_category() {
            if self.filters.categories.iter().any(|c| c == category) {
                vec![]
            } else {
                vec![category.to_string()]
            }
        } else {
            toggled(&self.filters.categories, category)
        };

        self.apply_filters(FilterUpdate::new().categories(categories))
    }

    /// Selects `tag`, or deselects it when already selected.
    pub fn toggle_tag(&mut self, tag: &str) -> &BlogFilters {
        let tags = toggled(&self.filters.tags, tag);
        self.apply_filters(FilterUpdate::new().tags(tags))
    }
}

fn toggled(values: &[String], value: &str) -> Vec<String> {
    if values.iter().any(|v| v == value) {
        values.iter().filter(|v| *v != value).cloned().collect()
    } else {
        let mut out = values.to_vec();
        out.push(value.to_string());
        out
    }
}
