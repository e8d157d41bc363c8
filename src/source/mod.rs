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

//! Where blogs and comments come from.

use thiserror::Error;

use crate::domain::{Blog, BlogFilters, Comment, Page};

pub mod http;
pub mod memory;

pub use http::HttpSource;
pub use memory::MemorySource;

/// Error type for blog data access
#[derive(Debug, Error)]
pub enum SourceError {
    /// Transport failure talking to the API
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The API answered with an unexpected status code
    #[error("unexpected response code {code} from {url}")]
    Status { code: u16, url: String },
    /// The requested record does not exist
    #[error("{0} not found")]
    NotFound(String),
    /// The request was rejected before reaching storage
    #[error("invalid request: {0}")]
    Invalid(String),
    /// The response body could not be read
    #[error("cannot decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Read access to blogs and their comments.
#[allow(async_fn_in_trait)]
pub trait BlogSource {
    /// One page of blogs matching `filters`.
    async fn list_blogs(&self, filters: &BlogFilters) -> Result<Page<Blog>, SourceError>;

    /// Every comment of a blog, in storage order.
    async fn list_comments(&self, blog_id: &str) -> Result<Vec<Comment>, SourceError>;
}
