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

use quill::{Config, MemorySource, SourceError};
use rocket::fairing::AdHoc;
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::{json, Json, Value};
use rocket::tokio::sync::Mutex;
use rocket::State;
use serde::Deserialize;

pub type Store = Mutex<MemorySource>;
pub type AppState<'r> = &'r State<Store>;

pub type ApiResult<T> = Result<Json<T>, Custom<Value>>;

/// Settings read from `Rocket.toml` or `ROCKET_QUILL`, e.g.
/// `[default.quill] maxReplyDepth = 2`.
#[derive(Deserialize)]
struct Settings {
    #[serde(default)]
    quill: Config,
}

pub fn stage() -> AdHoc {
    AdHoc::try_on_ignite("store", |rocket| async {
        match rocket.figment().extract::<Settings>() {
            Ok(settings) => {
                let store = MemorySource::new().with_reply_policy(settings.quill.reply_policy());
                Ok(rocket.manage(Store::new(store)))
            }
            Err(err) => {
                eprintln!("invalid quill settings: {}", err);
                Err(rocket)
            }
        }
    })
}

pub fn failure(err: SourceError) -> Custom<Value> {
    let status = match err {
        SourceError::NotFound(_) => Status::NotFound,
        SourceError::Invalid(_) => Status::BadRequest,
        _ => Status::InternalServerError,
    };

    Custom(
        status,
        json!({
            "status": "error",
            "reason": err.to_string(),
        }),
    )
}

/// Splits a comma separated query value, dropping empty items.
pub fn split_list(value: &Option<String>) -> Vec<String> {
    value
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
        .collect()
}
