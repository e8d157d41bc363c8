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

use crate::domain::{failure, ApiResult, AppState};
use rocket::serde::json::{json, Json, Value};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize)]
struct CensorshipInput {
    pattern: String,
    replacement: String,
}

#[post("/censor", format = "json", data = "<censor>")]
async fn censor(censor: Json<CensorshipInput>, state: AppState<'_>) -> Value {
    let mut store = state.lock().await;
    let changed = store.censor(&censor.pattern, &censor.replacement);

    json!({
        "status": "ok",
        "changed": changed,
    })
}

#[delete("/comments/<id>")]
async fn delete_comment(id: &str, state: AppState<'_>) -> ApiResult<Value> {
    let mut store = state.lock().await;
    store
        .delete_comment(id)
        .map(|removed| Json(json!({ "removed": removed })))
        .map_err(failure)
}

pub fn stage() -> rocket::fairing::AdHoc {
    rocket::fairing::AdHoc::on_ignite("admin", |rocket| async {
        rocket.mount("/admin", routes![censor, delete_comment])
    })
}
