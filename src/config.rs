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

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::DEFAULT_LIMIT;
use crate::filters::FilterView;
use crate::thread::{OrphanPolicy, ReplyPolicy};

/// Error type for loading a [`Config`]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Application settings.
///
/// Every field has a default, so a config file only lists what it changes:
///
/// ```
/// # use quill::Config;
/// let config: Config = serde_json::from_str(r#"{"searchPageSize": 20}"#).unwrap();
/// assert_eq!(config.search_page_size, 20);
/// assert_eq!(config.browse_page_size, 12);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct Config {
    /// Blogs per page in the general list
    pub browse_page_size: usize,
    /// Blogs per page in the keyword search view
    pub search_page_size: usize,
    /// Deepest comment level that still offers a reply
    pub max_reply_depth: usize,
    /// What to do with comments whose parent is missing
    pub orphan_policy: OrphanPolicy,
    /// Base URL of the blog REST API
    pub api_url: Option<String>,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn page_size(&self, view: FilterView) -> usize {
        match view {
            FilterView::Browse => self.browse_page_size,
            FilterView::Search => self.search_page_size,
        }
    }

    pub fn orphan_policy(&self) -> OrphanPolicy {
        self.orphan_policy
    }

    pub fn reply_policy(&self) -> ReplyPolicy {
        ReplyPolicy::new(self.max_reply_depth)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            browse_page_size: DEFAULT_LIMIT,
            search_page_size: 10,
            max_reply_depth: 3,
            orphan_policy: OrphanPolicy::Drop,
            api_url: None,
        }
    }
}
