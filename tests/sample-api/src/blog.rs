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

use crate::domain::{failure, split_list, ApiResult, AppState};
use quill::domain::DEFAULT_LIMIT;
use quill::source::memory::{BlogEdit, NewBlog};
use quill::{Blog, BlogFilters, BlogStatus, Facet, Page, SortBy, SortOrder};
use rocket::serde::json::{json, Json, Value};
use serde::Deserialize;

#[derive(FromForm, Default)]
struct ListQuery {
    search: Option<String>,
    categories: Option<String>,
    tags: Option<String>,
    author: Option<String>,
    status: Option<String>,
    #[field(name = "sortBy")]
    sort_by: Option<String>,
    #[field(name = "sortOrder")]
    sort_order: Option<String>,
    limit: Option<usize>,
    offset: Option<usize>,
}

impl ListQuery {
    fn filters(&self) -> Result<BlogFilters, String> {
        let mut filters = BlogFilters::with_limit(self.limit.unwrap_or(DEFAULT_LIMIT));
        filters.search = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string());
        filters.categories = split_list(&self.categories);
        filters.tags = split_list(&self.tags);
        filters.author = self.author.clone();
        if let Some(status) = &self.status {
            filters.status = Some(BlogStatus::from_str(status)?);
        }
        if let Some(sort_by) = &self.sort_by {
            filters.sort_by = SortBy::from_str(sort_by)?;
        }
        if let Some(sort_order) = &self.sort_order {
            filters.sort_order = SortOrder::from_str(sort_order)?;
        }
        filters.offset = self.offset.unwrap_or(0);
        Ok(filters)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LikeInput {
    user_id: String,
}

#[get("/?<query..>")]
async fn all(query: ListQuery, state: AppState<'_>) -> ApiResult<Page<Blog>> {
    let filters = query
        .filters()
        .map_err(|e| failure(quill::SourceError::Invalid(e)))?;
    let store = state.lock().await;
    Ok(Json(store.query(&filters)))
}

#[get("/<id>")]
async fn get(id: &str, state: AppState<'_>) -> Option<Json<Blog>> {
    let store = state.lock().await;
    store.blog(id).map(|blog| Json(blog.clone()))
}

#[get("/slug/<slug>", rank = 2)]
async fn by_slug(slug: &str, state: AppState<'_>) -> Option<Json<Blog>> {
    let store = state.lock().await;
    store.blog_by_slug(slug).map(|blog| Json(blog.clone()))
}

#[post("/", format = "json", data = "<blog>")]
async fn create(blog: Json<NewBlog>, state: AppState<'_>) -> ApiResult<Blog> {
    let mut store = state.lock().await;
    store.create_blog(blog.into_inner()).map(Json).map_err(failure)
}

#[put("/<id>", format = "json", data = "<edit>")]
async fn update(id: &str, edit: Json<BlogEdit>, state: AppState<'_>) -> ApiResult<Blog> {
    let mut store = state.lock().await;
    store
        .update_blog(id, edit.into_inner())
        .map(Json)
        .map_err(failure)
}

#[post("/<id>/publish")]
async fn publish(id: &str, state: AppState<'_>) -> ApiResult<Blog> {
    let mut store = state.lock().await;
    store.publish_blog(id).map(Json).map_err(failure)
}

#[post("/<id>/archive")]
async fn archive(id: &str, state: AppState<'_>) -> ApiResult<Blog> {
    let mut store = state.lock().await;
    store.archive_blog(id).map(Json).map_err(failure)
}

#[delete("/<id>")]
async fn delete(id: &str, state: AppState<'_>) -> ApiResult<Blog> {
    let mut store = state.lock().await;
    store.delete_blog(id).map(Json).map_err(failure)
}

#[post("/<id>/like", format = "json", data = "<like>")]
async fn like(id: &str, like: Json<LikeInput>, state: AppState<'_>) -> ApiResult<Value> {
    let mut store = state.lock().await;
    store
        .toggle_like(id, &like.user_id)
        .map(|likes| Json(json!({ "likes": likes })))
        .map_err(failure)
}

#[post("/<id>/view")]
async fn view(id: &str, state: AppState<'_>) -> ApiResult<Value> {
    let mut store = state.lock().await;
    store
        .record_view(id)
        .map(|views| Json(json!({ "views": views })))
        .map_err(failure)
}

#[get("/")]
async fn categories(state: AppState<'_>) -> Json<Vec<Facet>> {
    let store = state.lock().await;
    Json(store.categories())
}

#[get("/")]
async fn tags(state: AppState<'_>) -> Json<Vec<Facet>> {
    let store = state.lock().await;
    Json(store.tags())
}

#[catch(404)]
fn not_found() -> Value {
    json!({
        "status": "error",
        "reason": "Resource was not found."
    })
}

pub fn stage() -> rocket::fairing::AdHoc {
    rocket::fairing::AdHoc::on_ignite("blogs", |rocket| async {
        rocket
            .mount(
                "/blogs",
                routes![all, get, by_slug, create, update, publish, archive, delete, like, view],
            )
            .mount("/categories", routes![categories])
            .mount("/tags", routes![tags])
            .register("/blogs", catchers![not_found])
    })
}
