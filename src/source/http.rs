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

use std::str::FromStr;

use log::debug;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT};
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;

use super::{BlogSource, SourceError};
use crate::domain::{Blog, BlogFilters, Comment, Page};

/// Blog source backed by the REST API.
///
/// Blogs are listed with `GET {base}/blogs` and comments with
/// `GET {base}/blogs/{id}/comments`.
///
/// # Examples
///
/// ```
/// use quill::source::HttpSource;
///
/// let source = HttpSource::new("http://localhost:8000")
///     .unwrap()
///     .with_header("Authorization", "Bearer abcd")
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct HttpSource {
    base_url: Url,
    headers: HeaderMap,
    client: Client,
}

impl HttpSource {
    pub fn new(base_url: &str) -> Result<Self, SourceError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| SourceError::Invalid(format!("invalid base URL {}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(SourceError::Invalid(format!(
                "{} cannot be used as a base URL",
                base_url
            )));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        Ok(Self {
            base_url,
            headers,
            client: Client::new(),
        })
    }

    /// Adds a header sent with every request.
    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self, SourceError> {
        let name = HeaderName::from_str(name).map_err(|e| SourceError::Invalid(e.to_string()))?;
        let value = HeaderValue::from_str(value).map_err(|e| SourceError::Invalid(e.to_string()))?;
        self.headers.insert(name, value);
        Ok(self)
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // checked in the constructor
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, String)],
        what: &str,
    ) -> Result<T, SourceError> {
        debug!("GET {}", url);

        let response = self
            .client
            .get(url.clone())
            .headers(self.headers.clone())
            .query(query)
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => return Err(SourceError::NotFound(what.to_string())),
            status if !status.is_success() => {
                return Err(SourceError::Status {
                    code: status.as_u16(),
                    url: url.to_string(),
                })
            }
            _ => {}
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

impl BlogSource for HttpSource {
    async fn list_blogs(&self, filters: &BlogFilters) -> Result<Page<Blog>, SourceError> {
        let url = self.endpoint(&["blogs"]);
        self.get(url, &filters.to_api_params(), "blogs").await
    }

    async fn list_comments(&self, blog_id: &str) -> Result<Vec<Comment>, SourceError> {
        let url = self.endpoint(&["blogs", blog_id, "comments"]);
        self.get(url, &[], &format!("blog {}", blog_id)).await
    }
}
