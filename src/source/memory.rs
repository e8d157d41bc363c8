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

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};
use std::sync::OnceLock;

use chrono::Utc;
use log::info;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{BlogSource, SourceError};
use crate::domain::{
    Author, Blog, BlogFilters, BlogStatus, Comment, Facet, Page, SortBy, SortOrder,
};
use crate::thread::ReplyPolicy;

const EXCERPT_LENGTH: usize = 160;

/// Input for [`MemorySource::create_blog`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBlog {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    pub author_id: String,
    #[serde(default)]
    pub author: Option<Author>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Partial edit of a blog; `None` keeps the stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BlogEdit {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub categories: Option<Vec<String>>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

/// Input for [`MemorySource::add_comment`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    pub blog_id: String,
    pub author_id: String,
    #[serde(default)]
    pub author: Option<Author>,
    #[serde(default)]
    pub parent_id: Option<String>,
    pub content: String,
}

/// In-memory blog store.
///
/// Holds blogs and comments in insertion order and answers filtered,
/// sorted and paginated queries the same way the REST API does.
/// Replies may be nested to any depth unless a [`ReplyPolicy`] is set.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    blogs: Vec<Blog>,
    comments: Vec<Comment>,
    reply_policy: Option<ReplyPolicy>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects replies to comments the policy no longer offers a reply for.
    pub fn with_reply_policy(mut self, policy: ReplyPolicy) -> Self {
        self.reply_policy = Some(policy);
        self
    }

    /// Stores a blog as is, replacing any blog with the same id.
    pub fn insert_blog(&mut self, blog: Blog) {
        match self.blogs.iter_mut().find(|b| b.id == blog.id) {
            Some(saved) => *saved = blog,
            None => self.blogs.push(blog),
        }
    }

    /// Stores a comment as is, without checking its blog or parent.
    pub fn insert_comment(&mut self, comment: Comment) {
        match self.comments.iter_mut().find(|c| c.id == comment.id) {
            Some(saved) => *saved = comment,
            None => self.comments.push(comment),
        }
    }

    pub fn blog(&self, id: &str) -> Option<&Blog> {
        self.blogs.iter().find(|b| b.id == id)
    }

    pub fn blog_by_slug(&self, slug: &str) -> Option<&Blog> {
        self.blogs.iter().find(|b| b.slug == slug)
    }

    /// Runs a filtered, sorted and paginated query.
    pub fn query(&self, filters: &BlogFilters) -> Page<Blog> {
        let needle = filters.search.as_ref().map(|s| s.to_lowercase());

        let mut matching: Vec<&Blog> = self
            .blogs
            .iter()
            .filter(|blog| is_match(blog, filters, needle.as_deref()))
            .collect();

        matching.sort_by(|a, b| {
            let ordering = compare(a, b, filters.sort_by);
            match filters.sort_order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });

        let total = matching.len();
        let data = matching
            .into_iter()
            .skip(filters.offset)
            .take(filters.limit.max(1))
            .cloned()
            .collect();

        Page::new(data, total, filters)
    }

    pub fn create_blog(&mut self, new: NewBlog) -> Result<Blog, SourceError> {
        let title = required("title", &new.title)?;
        let now = Utc::now();
        let excerpt = match new.excerpt.as_deref().map(str::trim) {
            Some(excerpt) if !excerpt.is_empty() => excerpt.to_string(),
            _ => excerpt_of(&new.content),
        };

        let blog = Blog {
            id: Uuid::new_v4().to_string(),
            slug: self.unique_slug(&title, None),
            title,
            content: new.content,
            excerpt,
            status: BlogStatus::Draft,
            author_id: new.author_id,
            author: new.author,
            categories: new.categories,
            tags: new.tags,
            likes: 0,
            liked_by: vec![],
            views: 0,
            created_at: now,
            updated_at: now,
            published_at: None,
        };

        info!("created blog {} ({})", blog.id, blog.slug);
        self.blogs.push(blog.clone());
        Ok(blog)
    }

    pub fn update_blog(&mut self, id: &str, edit: BlogEdit) -> Result<Blog, SourceError> {
        let title = match &edit.title {
            Some(title) => Some(required("title", title)?),
            None => None,
        };
        let slug = title.as_ref().map(|t| self.unique_slug(t, Some(id)));

        let blog = self.blog_mut(id)?;
        if let (Some(title), Some(slug)) = (title, slug) {
            blog.title = title;
            blog.slug = slug;
        }
        if let Some(content) = edit.content {
            blog.content = content;
        }
        if let Some(excerpt) = edit.excerpt {
            blog.excerpt = excerpt;
        }
        if let Some(categories) = edit.categories {
            blog.categories = categories;
        }
        if let Some(tags) = edit.tags {
            blog.tags = tags;
        }
        blog.updated_at = Utc::now();

        Ok(blog.clone())
    }

    /// Makes a blog public. The first publication date is kept on republish.
    pub fn publish_blog(&mut self, id: &str) -> Result<Blog, SourceError> {
        let blog = self.blog_mut(id)?;
        let now = Utc::now();
        blog.status = BlogStatus::Published;
        blog.published_at.get_or_insert(now);
        blog.updated_at = now;
        Ok(blog.clone())
    }

    pub fn archive_blog(&mut self, id: &str) -> Result<Blog, SourceError> {
        let blog = self.blog_mut(id)?;
        blog.status = BlogStatus::Archived;
        blog.updated_at = Utc::now();
        Ok(blog.clone())
    }

    /// Removes a blog together with its comments.
    pub fn delete_blog(&mut self, id: &str) -> Result<Blog, SourceError> {
        let position = self
            .blogs
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| SourceError::NotFound(format!("blog {}", id)))?;
        let blog = self.blogs.remove(position);
        self.comments.retain(|c| c.blog_id != id);

        info!("deleted blog {}", id);
        Ok(blog)
    }

    pub fn record_view(&mut self, id: &str) -> Result<u64, SourceError> {
        let blog = self.blog_mut(id)?;
        blog.views += 1;
        Ok(blog.views)
    }

    /// Likes the blog for `user_id`, or takes the like back. Returns the new count.
    pub fn toggle_like(&mut self, id: &str, user_id: &str) -> Result<u64, SourceError> {
        let blog = self.blog_mut(id)?;
        match blog.liked_by.iter().position(|u| u == user_id) {
            Some(position) => {
                blog.liked_by.remove(position);
            }
            None => blog.liked_by.push(user_id.to_string()),
        }
        blog.likes = blog.liked_by.len() as u64;
        Ok(blog.likes)
    }

    /// Comments of a blog in storage order.
    pub fn comments_for(&self, blog_id: &str) -> Result<Vec<Comment>, SourceError> {
        if self.blog(blog_id).is_none() {
            return Err(SourceError::NotFound(format!("blog {}", blog_id)));
        }

        Ok(self
            .comments
            .iter()
            .filter(|c| c.blog_id == blog_id)
            .cloned()
            .collect())
    }

    pub fn add_comment(&mut self, new: NewComment) -> Result<Comment, SourceError> {
        let content = required("content", &new.content)?;
        if self.blog(&new.blog_id).is_none() {
            return Err(SourceError::NotFound(format!("blog {}", new.blog_id)));
        }
        if let Some(parent_id) = &new.parent_id {
            match self.comments.iter().find(|c| &c.id == parent_id) {
                Some(parent) if parent.blog_id == new.blog_id => {}
                Some(_) => {
                    return Err(SourceError::Invalid(format!(
                        "comment {} belongs to another blog",
                        parent_id
                    )))
                }
                None => return Err(SourceError::NotFound(format!("comment {}", parent_id))),
            }
            if let Some(policy) = self.reply_policy {
                let depth = self.comment_depth(parent_id)?;
                if !policy.can_reply(depth) {
                    return Err(SourceError::Invalid(format!(
                        "comment {} is nested too deeply to reply to",
                        parent_id
                    )));
                }
            }
        }

        let now = Utc::now();
        let comment = Comment {
            id: Uuid::new_v4().to_string(),
            content,
            blog_id: new.blog_id,
            author_id: new.author_id,
            author: new.author,
            parent_id: new.parent_id,
            created_at: now,
            updated_at: now,
        };

        self.comments.push(comment.clone());
        Ok(comment)
    }

    /// Nesting level of a comment, zero for a root comment.
    ///
    /// A comment whose parent is missing counts from the missing parent.
    pub fn comment_depth(&self, id: &str) -> Result<usize, SourceError> {
        let mut current = self
            .comments
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| SourceError::NotFound(format!("comment {}", id)))?;

        let mut depth = 0;
        while let Some(parent) = current.parent_id.as_deref() {
            depth += 1;
            match self.comments.iter().find(|c| c.id == parent) {
                // a parent cycle would never end
                Some(next) if depth <= self.comments.len() => current = next,
                _ => break,
            }
        }
        Ok(depth)
    }

    pub fn update_comment(&mut self, id: &str, content: &str) -> Result<Comment, SourceError> {
        let content = required("content", content)?;
        let comment = self
            .comments
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| SourceError::NotFound(format!("comment {}", id)))?;
        comment.content = content;
        comment.updated_at = Utc::now();
        Ok(comment.clone())
    }

    /// Removes a comment and every reply below it. Returns how many were removed.
    pub fn delete_comment(&mut self, id: &str) -> Result<usize, SourceError> {
        if !self.comments.iter().any(|c| c.id == id) {
            return Err(SourceError::NotFound(format!("comment {}", id)));
        }

        let mut doomed: HashSet<String> = HashSet::from([id.to_string()]);
        loop {
            let before = doomed.len();
            for comment in &self.comments {
                if let Some(parent) = &comment.parent_id {
                    if doomed.contains(parent) {
                        doomed.insert(comment.id.clone());
                    }
                }
            }
            if doomed.len() == before {
                break;
            }
        }

        let count = self.comments.len();
        self.comments.retain(|c| !doomed.contains(&c.id));
        let removed = count - self.comments.len();

        info!("deleted comment {} and {} replies", id, removed - 1);
        Ok(removed)
    }

    /// Replaces `pattern` in every title, body, excerpt and comment.
    /// Returns the number of records changed.
    pub fn censor(&mut self, pattern: &str, replacement: &str) -> usize {
        if pattern.is_empty() {
            return 0;
        }

        let mut changed = 0;
        for blog in self.blogs.iter_mut() {
            let mut touched = replace_in(&mut blog.title, pattern, replacement);
            touched |= replace_in(&mut blog.content, pattern, replacement);
            touched |= replace_in(&mut blog.excerpt, pattern, replacement);
            if touched {
                blog.updated_at = Utc::now();
                changed += 1;
            }
        }
        for comment in self.comments.iter_mut() {
            if replace_in(&mut comment.content, pattern, replacement) {
                comment.updated_at = Utc::now();
                changed += 1;
            }
        }

        info!("censored {} records", changed);
        changed
    }

    /// Categories in use, most used first.
    pub fn categories(&self) -> Vec<Facet> {
        facets(self.blogs.iter().flat_map(|b| b.categories.iter()))
    }

    /// Tags in use, most used first.
    pub fn tags(&self) -> Vec<Facet> {
        facets(self.blogs.iter().flat_map(|b| b.tags.iter()))
    }

    fn blog_mut(&mut self, id: &str) -> Result<&mut Blog, SourceError> {
        self.blogs
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| SourceError::NotFound(format!("blog {}", id)))
    }

    fn unique_slug(&self, title: &str, own_id: Option<&str>) -> String {
        let base = slugify(title);
        let taken = |slug: &str| {
            self.blogs
                .iter()
                .any(|b| b.slug == slug && Some(b.id.as_str()) != own_id)
        };

        if !taken(&base) {
            return base;
        }
        (2..)
            .map(|n| format!("{}-{}", base, n))
            .find(|candidate| !taken(candidate))
            .unwrap_or(base)
    }
}

impl BlogSource for MemorySource {
    async fn list_blogs(&self, filters: &BlogFilters) -> Result<Page<Blog>, SourceError> {
        Ok(self.query(filters))
    }

    async fn list_comments(&self, blog_id: &str) -> Result<Vec<Comment>, SourceError> {
        self.comments_for(blog_id)
    }
}

fn is_match(blog: &Blog, filters: &BlogFilters, needle: Option<&str>) -> bool {
    if let Some(needle) = needle {
        let found = blog.title.to_lowercase().contains(needle)
            || blog.excerpt.to_lowercase().contains(needle)
            || blog.content.to_lowercase().contains(needle)
            || blog.tags.iter().any(|t| t.to_lowercase().contains(needle));
        if !found {
            return false;
        }
    }
    if !filters.categories.is_empty()
        && !blog.categories.iter().any(|c| filters.categories.contains(c))
    {
        return false;
    }
    if !filters.tags.is_empty() && !blog.tags.iter().any(|t| filters.tags.contains(t)) {
        return false;
    }
    if let Some(author) = &filters.author {
        if &blog.author_id != author {
            return false;
        }
    }
    if let Some(status) = filters.status {
        if blog.status != status {
            return false;
        }
    }
    true
}

fn compare(a: &Blog, b: &Blog, sort_by: SortBy) -> Ordering {
    match sort_by {
        SortBy::CreatedAt => a.created_at.cmp(&b.created_at),
        // unpublished blogs sort before any publication date
        SortBy::PublishedAt => a.published_at.cmp(&b.published_at),
        SortBy::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
        SortBy::Likes => a.likes.cmp(&b.likes),
        SortBy::Views => a.views.cmp(&b.views),
    }
}

fn facets<'a>(names: impl Iterator<Item = &'a String>) -> Vec<Facet> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for name in names {
        *counts.entry(name.as_str()).or_default() += 1;
    }

    let mut out: Vec<Facet> = counts
        .into_iter()
        .map(|(name, count)| Facet {
            name: name.to_string(),
            count,
        })
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count));
    out
}

fn required(field: &str, value: &str) -> Result<String, SourceError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(SourceError::Invalid(format!("{} must not be empty", field)));
    }
    Ok(value.to_string())
}

fn replace_in(target: &mut String, pattern: &str, replacement: &str) -> bool {
    if !target.contains(pattern) {
        return false;
    }
    *target = target.replace(pattern, replacement);
    true
}

fn slug_separator() -> &'static Regex {
    static SEPARATOR: OnceLock<Regex> = OnceLock::new();
    SEPARATOR.get_or_init(|| Regex::new(r"[^a-z0-9]+").expect("slug pattern is valid"))
}

/// Lowercase, dash separated form of a title used in blog URLs.
pub fn slugify(title: &str) -> String {
    let lower = title.to_lowercase();
    let slug = slug_separator().replace_all(&lower, "-");
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        "untitled".to_string()
    } else {
        slug.to_string()
    }
}

fn excerpt_of(content: &str) -> String {
    let words = content.split_whitespace().collect::<Vec<&str>>().join(" ");
    if words.chars().count() <= EXCERPT_LENGTH {
        return words;
    }
    let cut: String = words.chars().take(EXCERPT_LENGTH).collect();
    match cut.rfind(' ') {
        Some(space) => format!("{}...", &cut[..space]),
        None => format!("{}...", cut),
    }
}
