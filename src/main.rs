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
use std::path::PathBuf;
use std::str::FromStr;

use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;

use quill::session::FeedSession;
use quill::thread::{build_thread_with, OrphanPolicy};
use quill::{Comment, CommentNode, Config, FilterState, FilterUpdate, FilterView, HttpSource};

#[doc(hidden)]
#[macro_export]
macro_rules! handle_error {
    ($code:expr, $msg:expr, $($arg:tt)*) => {
        eprintln!($msg, $($arg)*);
        std::process::exit($code);
    };

    ($code:expr, $msg:expr) => {
        eprintln!($msg);
        std::process::exit($code);
    };
}

/// Deepest reply nesting `thread` prints; JSON output nests once per level.
const MAX_PRINT_DEPTH: usize = 512;

#[doc(hidden)]
struct Code;

impl Code {
    const SUCCESS: i32 = 0;
    const INTERNAL_ERROR: i32 = 1;
    const INVALID_ARGUMENT: i32 = 2;
    const CONFIG_ERROR: i32 = 3;
    const FETCH_ERROR: i32 = 4;
}

#[doc(hidden)]
#[derive(Debug, Clone)]
struct JSONUpdate(FilterUpdate);

impl FromStr for JSONUpdate {
    type Err = serde_json::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let update = serde_json::from_str(s)?;
        Ok(JSONUpdate(update))
    }
}

#[doc(hidden)]
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Configuration file in the JSON format
    #[clap(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[doc(hidden)]
#[derive(Debug, Subcommand)]
enum Command {
    /// Arrange a JSON list of comments into reply threads
    Thread {
        /// File holding the comments as a JSON array
        file: PathBuf,

        /// Show comments with a missing parent as roots
        #[clap(long)]
        promote_orphans: bool,
    },
    /// Show the filters and URL query a view ends up with
    Query {
        /// View the query string belongs to (browse or search)
        #[clap(long, default_value = "browse")]
        view: FilterView,

        /// URL query string the view is opened with
        #[clap(short, long, default_value = "")]
        query: String,

        /// Filter update to apply, as a JSON object
        #[clap(short, long)]
        filters: Option<JSONUpdate>,

        /// Page to move to after applying the update
        #[clap(short, long)]
        page: Option<usize>,
    },
    /// Fetch one page of blogs from the REST API
    List {
        /// Base URL of the API, overrides the config file
        #[clap(short, long)]
        url: Option<String>,

        /// View the query string belongs to (browse or search)
        #[clap(long, default_value = "browse")]
        view: FilterView,

        /// URL query string the view is opened with
        #[clap(short, long, default_value = "")]
        query: String,

        /// Page to fetch
        #[clap(short, long)]
        page: Option<usize>,
    },
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(out) => println!("{}", out),
        Err(err) => {
            handle_error!(Code::INTERNAL_ERROR, "Error: {}", err);
        }
    }
}

#[doc(hidden)]
#[tokio::main]
async fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match Config::load(path) {
            Ok(config) => config,
            Err(err) => {
                handle_error!(Code::CONFIG_ERROR, "Error: {}", err);
            }
        },
        None => Config::default(),
    };

    match cli.command {
        Command::Thread {
            file,
            promote_orphans,
        } => {
            let content = match fs::read_to_string(&file) {
                Ok(content) => content,
                Err(err) => {
                    handle_error!(Code::INVALID_ARGUMENT, "Error reading {:?}: {}", file, err);
                }
            };
            let comments: Vec<Comment> = match serde_json::from_str(&content) {
                Ok(comments) => comments,
                Err(err) => {
                    handle_error!(Code::INVALID_ARGUMENT, "Error parsing comments: {}", err);
                }
            };

            let policy = if promote_orphans {
                OrphanPolicy::PromoteToRoot
            } else {
                config.orphan_policy()
            };

            let forest = build_thread_with(&comments, policy);
            let depth = forest.iter().map(CommentNode::depth).max().unwrap_or(0);
            if depth > MAX_PRINT_DEPTH {
                handle_error!(
                    Code::INVALID_ARGUMENT,
                    "Error: replies are nested {} levels deep, at most {} can be printed",
                    depth,
                    MAX_PRINT_DEPTH
                );
            }

            print_json(&forest);
        }
        Command::Query {
            view,
            query,
            filters,
            page,
        } => {
            let mut state = FilterState::from_query(view, &query, config.page_size(view));
            if let Some(JSONUpdate(update)) = filters {
                state.apply_filters(update);
            }
            if let Some(page) = page {
                state.handle_page_change(page);
            }

            print_json(&json!({
                "filters": state.filters(),
                "query": state.query_string(),
                "page": state.current_page(),
            }));
        }
        Command::List {
            url,
            view,
            query,
            page,
        } => {
            let Some(url) = url.or(config.api_url.clone()) else {
                handle_error!(
                    Code::INVALID_ARGUMENT,
                    "Error: API URL is required, pass --url or set apiUrl in the config"
                );
            };
            let source = match HttpSource::new(&url) {
                Ok(source) => source,
                Err(err) => {
                    handle_error!(Code::INVALID_ARGUMENT, "Error: {}", err);
                }
            };

            let mut session = FeedSession::from_query(source, view, &query, config.page_size(view));
            match page {
                Some(page) => session.change_page(page).await,
                None => session.refresh().await,
            }

            if let Some(err) = session.error() {
                handle_error!(Code::FETCH_ERROR, "Error fetching blogs: {}", err);
            }
            if let Some(page) = session.page() {
                print_json(page);
            }
        }
    }

    std::process::exit(Code::SUCCESS);
}
