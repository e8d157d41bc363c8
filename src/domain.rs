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

use std::fmt::Display;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Default page size of the general blog list.
pub const DEFAULT_LIMIT: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

/// Denormalized author information carried by blogs and comments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub id: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub role: Role,
}

/// A persisted comment record.
///
/// Replies are not part of the record. They only exist on the
/// [`CommentNode`] produced by [`crate::thread::build_thread`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub content: String,
    pub blog_id: String,
    pub author_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,
    #[serde(default)]
    pub parent_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// A comment together with its nested replies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentNode {
    #[serde(flatten)]
    pub comment: Comment,
    pub replies: Vec<CommentNode>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlogStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

impl Display for BlogStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BlogStatus::Draft => write!(f, "draft"),
            BlogStatus::Published => write!(f, "published"),
            BlogStatus::Archived => write!(f, "archived"),
        }
    }
}

impl FromStr for BlogStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(BlogStatus::Draft),
            "published" => Ok(BlogStatus::Published),
            "archived" => Ok(BlogStatus::Archived),
            _ => Err(format!("{} is not a valid blog status", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blog {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: String,
    pub status: BlogStatus,
    pub author_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub liked_by: Vec<String>,
    #[serde(default)]
    pub views: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortBy {
    #[default]
    CreatedAt,
    PublishedAt,
    Title,
    Likes,
    Views,
}

impl Display for SortBy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortBy::CreatedAt => write!(f, "createdAt"),
            SortBy::PublishedAt => write!(f, "publishedAt"),
            SortBy::Title => write!(f, "title"),
            SortBy::Likes => write!(f, "likes"),
            SortBy::Views => write!(f, "views"),
        }
    }
}

impl FromStr for SortBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "createdAt" => Ok(SortBy::CreatedAt),
            "publishedAt" => Ok(SortBy::PublishedAt),
            "title" => Ok(SortBy::Title),
            "likes" => Ok(SortBy::Likes),
            "views" => Ok(SortBy::Views),
            _ => Err(format!("{} is not a valid sort key", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortOrder::Asc => write!(f, "asc"),
            SortOrder::Desc => write!(f, "desc"),
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(format!("{} is not a valid sort order", s)),
        }
    }
}

/// The filter object driving blog queries.
///
/// `sort_by` and `sort_order` are never unset, so a filter is never in an
/// ambiguous sort state. `offset` is a record count, not a page number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<BlogStatus>,
    #[serde(default)]
    pub sort_by: SortBy,
    #[serde(default)]
    pub sort_order: SortOrder,
    #[serde(deserialize_with = "at_least_one")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

fn at_least_one<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(usize::deserialize(deserializer)?.max(1))
}

impl BlogFilters {
    /// Default filters for a view showing `limit` blogs per page.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            search: None,
            categories: vec![],
            tags: vec![],
            author: None,
            status: None,
            sort_by: SortBy::default(),
            sort_order: SortOrder::default(),
            limit: limit.max(1),
            offset: 0,
        }
    }

    /// One-based page number derived from the offset.
    pub fn page(&self) -> usize {
        (self.offset / self.limit.max(1)).saturating_add(1)
    }

    /// Query parameters understood by the blog REST API.
    ///
    /// Unlike the browser URL this carries every set field, pagination included.
    pub fn to_api_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![];

        if let Some(search) = &self.search {
            params.push(("search", search.clone()));
        }
        if !self.categories.is_empty() {
            params.push(("categories", self.categories.join(",")));
        }
        if !self.tags.is_empty() {
            params.push(("tags", self.tags.join(",")));
        }
        if let Some(author) = &self.author {
            params.push(("author", author.clone()));
        }
        if let Some(status) = &self.status {
            params.push(("status", status.to_string()));
        }
        params.push(("sortBy", self.sort_by.to_string()));
        params.push(("sortOrder", self.sort_order.to_string()));
        params.push(("limit", self.limit.to_string()));
        params.push(("offset", self.offset.to_string()));

        params
    }
}

impl Default for BlogFilters {
    fn default() -> Self {
        Self::with_limit(DEFAULT_LIMIT)
    }
}

/// One page of a paginated listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub limit: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    pub(crate) fn new(data: Vec<T>, total: usize, filters: &BlogFilters) -> Self {
        let limit = filters.limit.max(1);
        Self {
            data,
            total,
            page: filters.page(),
            limit,
            total_pages: total.div_ceil(limit),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Usage count of a category or tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facet {
    pub name: String,
    pub count: usize,
}
