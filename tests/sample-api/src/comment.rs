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
use quill::source::memory::NewComment;
use quill::{build_thread_with, Comment, CommentNode, MemorySource, OrphanPolicy, SourceError};
use rocket::serde::json::{json, Json, Value};
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentInput {
    author_id: String,
    #[serde(default)]
    parent_id: Option<String>,
    content: String,
}

#[derive(Deserialize)]
struct CommentEdit {
    content: String,
}

fn ensure_in_blog(
    store: &MemorySource,
    blog_id: &str,
    comment_id: &str,
) -> Result<(), SourceError> {
    if store.comments_for(blog_id)?.iter().any(|c| c.id == comment_id) {
        Ok(())
    } else {
        Err(SourceError::NotFound(format!("comment {}", comment_id)))
    }
}

#[get("/<blog_id>/comments")]
async fn all(blog_id: &str, state: AppState<'_>) -> ApiResult<Vec<Comment>> {
    let store = state.lock().await;
    store.comments_for(blog_id).map(Json).map_err(failure)
}

#[get("/<blog_id>/comments/thread?<promote>")]
async fn thread(
    blog_id: &str,
    promote: Option<bool>,
    state: AppState<'_>,
) -> ApiResult<Vec<CommentNode>> {
    let policy = if promote.unwrap_or(false) {
        OrphanPolicy::PromoteToRoot
    } else {
        OrphanPolicy::Drop
    };
    let store = state.lock().await;
    store
        .comments_for(blog_id)
        .map(|comments| Json(build_thread_with(&comments, policy)))
        .map_err(failure)
}

#[post("/<blog_id>/comments", format = "json", data = "<comment>")]
async fn create(
    blog_id: &str,
    comment: Json<CommentInput>,
    state: AppState<'_>,
) -> ApiResult<Comment> {
    let comment = comment.into_inner();
    let mut store = state.lock().await;
    store
        .add_comment(NewComment {
            blog_id: blog_id.to_string(),
            author_id: comment.author_id,
            author: None,
            parent_id: comment.parent_id,
            content: comment.content,
        })
        .map(Json)
        .map_err(failure)
}

#[put("/<blog_id>/comments/<comment_id>", format = "json", data = "<edit>")]
async fn update(
    blog_id: &str,
    comment_id: &str,
    edit: Json<CommentEdit>,
    state: AppState<'_>,
) -> ApiResult<Comment> {
    let mut store = state.lock().await;
    ensure_in_blog(&store, blog_id, comment_id).map_err(failure)?;
    store
        .update_comment(comment_id, &edit.content)
        .map(Json)
        .map_err(failure)
}

#[delete("/<blog_id>/comments/<comment_id>")]
async fn delete(blog_id: &str, comment_id: &str, state: AppState<'_>) -> ApiResult<Value> {
    let mut store = state.lock().await;
    ensure_in_blog(&store, blog_id, comment_id).map_err(failure)?;
    store
        .delete_comment(comment_id)
        .map(|removed| Json(json!({ "removed": removed })))
        .map_err(failure)
}

pub fn stage() -> rocket::fairing::AdHoc {
    rocket::fairing::AdHoc::on_ignite("comments", |rocket| async {
        rocket.mount("/blogs", routes![all, thread, create, update, delete])
    })
}
