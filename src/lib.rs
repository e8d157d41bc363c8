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

#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/README.md"))]

pub mod config;
pub mod domain;
pub mod filters;
pub mod session;
pub mod source;
pub mod thread;


pub use config::{Config, ConfigError};
pub use domain::{
    Author, Blog, BlogFilters, BlogStatus, Comment, CommentNode, Facet, Page, Role, SortBy,
    SortOrder,
};
pub use filters::{FilterState, FilterUpdate, FilterView, StatusFilter};
pub use session::{load_thread, FeedSession};
pub use source::{BlogSource, HttpSource, MemorySource, SourceError};
pub use thread::{build_thread, build_thread_with, OrphanPolicy, ReplyPolicy};
