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

#[macro_use]
extern crate rocket;

use rocket::serde::json::{json, Json, Value};

mod admin;
mod blog;
mod comment;
mod domain;

#[get("/", format = "json")]
async fn status(store: domain::AppState<'_>) -> Json<Value> {
    let store = store.lock().await;
    Json(json!({
        "status": "ok",
        "categories": store.categories().len(),
    }))
}

#[launch]
fn rocket() -> _ {
    rocket::build()
        .attach(blog::stage())
        .attach(comment::stage())
        .attach(admin::stage())
        .attach(domain::stage())
        .mount("/status", routes![status])
}
