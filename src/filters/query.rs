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
use url::form_urlencoded;

use super::FilterView;
use crate::domain::{BlogFilters, SortBy, SortOrder};

pub const SEARCH_PARAM: &str = "search";
pub const KEYWORD_PARAM: &str = "q";
pub const CATEGORY_PARAM: &str = "category";
pub const SORT_PARAM: &str = "sort";
pub const ORDER_PARAM: &str = "order";

/// Derives the browser query string (without the leading `?`) from filters.
///
/// Only fields that differ from their defaults are written. The category
/// parameter carries the first selected category. Tags, author, status and
/// pagination never appear in the URL.
pub(crate) fn encode(view: FilterView, filters: &BlogFilters) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());

    if let Some(search) = &filters.search {
        serializer.append_pair(view.search_param(), search);
    }
    if let Some(category) = filters.categories.first() {
        serializer.append_pair(CATEGORY_PARAM, category);
    }
    if filters.sort_by != SortBy::default() {
        serializer.append_pair(SORT_PARAM, &filters.sort_by.to_string());
    }
    if filters.sort_order != SortOrder::default() {
        serializer.append_pair(ORDER_PARAM, &filters.sort_order.to_string());
    }

    serializer.finish()
}

/// Rebuilds filters from a browser query string on initial load.
///
/// Parameters the view does not know and values that fail to parse are
/// ignored, leaving the corresponding field at its default.
pub(crate) fn decode(view: FilterView, query: &str, limit: usize) -> BlogFilters {
    let mut filters = BlogFilters::with_limit(limit);
    let query = query.trim_start_matches('?');

    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        match key.as_ref() {
            k if k == view.search_param() => {
                let value = value.trim();
                if !value.is_empty() {
                    filters.search = Some(value.to_string());
                }
            }
            CATEGORY_PARAM => {
                let value = value.trim();
                if !value.is_empty() && filters.categories.is_empty() {
                    filters.categories.push(value.to_string());
                }
            }
            SORT_PARAM => match SortBy::from_str(&value) {
                Ok(sort_by) => filters.sort_by = sort_by,
                Err(err) => debug!("ignoring query parameter {}: {}", SORT_PARAM, err),
            },
            ORDER_PARAM => match SortOrder::from_str(&value) {
                Ok(order) => filters.sort_order = order,
                Err(err) => debug!("ignoring query parameter {}: {}", ORDER_PARAM, err),
            },
            other => debug!("ignoring unknown query parameter {}", other),
        }
    }

    filters
}
