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

//! Reconstruction of reply threads from flat comment lists.

use std::collections::HashMap;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::domain::{Comment, CommentNode};

/// What to do with a comment whose parent is not in the working set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OrphanPolicy {
    /// Leave the comment out of the forest.
    #[default]
    Drop,
    /// Show the comment as a root, at its position in the input.
    PromoteToRoot,
}

/// Decides whether a reply may be started at a given nesting depth.
///
/// This only limits what the UI offers. Stored replies deeper than
/// `max_depth` are still part of the forest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplyPolicy {
    pub max_depth: usize,
}

impl ReplyPolicy {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// `depth` is zero for root comments.
    pub fn can_reply(&self, depth: usize) -> bool {
        depth < self.max_depth
    }
}

impl Default for ReplyPolicy {
    fn default() -> Self {
        Self::new(3)
    }
}

/// Builds the reply forest, dropping orphaned comments.
///
/// # Examples
///
/// ```
/// # use quill::thread::build_thread;
/// # use quill::Comment;
/// # fn comment(id: &str, parent: Option<&str>) -> Comment {
/// #     let now = chrono::Utc::now();
/// #     Comment {
/// #         id: id.to_string(),
/// #         content: String::new(),
/// #         blog_id: "blog".to_string(),
/// #         author_id: "user".to_string(),
/// #         author: None,
/// #         parent_id: parent.map(|p| p.to_string()),
/// #         created_at: now,
/// #         updated_at: now,
/// #     }
/// # }
/// let comments = vec![comment("1a", Some("1")), comment("1", None)];
/// let forest = build_thread(&comments);
/// assert_eq!(forest.len(), 1);
/// assert_eq!(forest[0].replies[0].comment.id, "1a");
/// ```
pub fn build_thread(comments: &[Comment]) -> Vec<CommentNode> {
    build_thread_with(comments, OrphanPolicy::Drop)
}

/// Builds the reply forest with an explicit orphan policy.
///
/// Roots and siblings keep their relative input order. The input is never
/// modified. When two comments share an id the first one wins. Nesting depth
/// is not limited: the forest is assembled without recursion.
pub fn build_thread_with(comments: &[Comment], policy: OrphanPolicy) -> Vec<CommentNode> {
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(comments.len());
    let mut unique = Vec::with_capacity(comments.len());
    for (position, comment) in comments.iter().enumerate() {
        if index.contains_key(comment.id.as_str()) {
            warn!("duplicate comment id {} ignored", comment.id);
            continue;
        }
        index.insert(comment.id.as_str(), position);
        unique.push(position);
    }

    let mut roots = vec![];
    let mut orphans = vec![];
    let mut children: HashMap<usize, Vec<usize>> = HashMap::new();
    for position in unique {
        let comment = &comments[position];
        if comment.is_root() {
            roots.push(position);
            continue;
        }
        let parent = comment.parent_id.as_deref().unwrap_or_default();
        match index.get(parent) {
            Some(&parent_position) => {
                children.entry(parent_position).or_default().push(position);
            }
            None => {
                debug!("comment {} references missing parent {}", comment.id, parent);
                orphans.push(position);
            }
        }
    }

    if policy == OrphanPolicy::PromoteToRoot {
        roots.append(&mut orphans);
        roots.sort_unstable();
    }

    roots
        .into_iter()
        .map(|root| assemble(root, comments, &mut children))
        .collect()
}

/// Builds the subtree below `root` in post-order.
///
/// Every comment has a single parent, so each one is reached at most once.
/// Comments in a parent cycle are never reached from a root.
fn assemble(
    root: usize,
    comments: &[Comment],
    children: &mut HashMap<usize, Vec<usize>>,
) -> CommentNode {
    let mut built: HashMap<usize, CommentNode> = HashMap::new();
    let mut stack = vec![(root, false)];

    while let Some((position, expanded)) = stack.pop() {
        if expanded {
            let replies = children
                .remove(&position)
                .unwrap_or_default()
                .into_iter()
                .filter_map(|child| built.remove(&child))
                .collect();
            built.insert(
                position,
                CommentNode {
                    comment: comments[position].clone(),
                    replies,
                },
            );
        } else {
            stack.push((position, true));
            if let Some(kids) = children.get(&position) {
                stack.extend(kids.iter().map(|&kid| (kid, false)));
            }
        }
    }

    built.remove(&root).unwrap_or_else(|| CommentNode {
        comment: comments[root].clone(),
        replies: vec![],
    })
}

/// Depth-first, pre-order listing of every comment in the forest.
pub fn flatten(forest: &[CommentNode]) -> Vec<&Comment> {
    let mut out = vec![];
    let mut stack: Vec<&CommentNode> = forest.iter().rev().collect();
    while let Some(node) = stack.pop() {
        out.push(&node.comment);
        stack.extend(node.replies.iter().rev());
    }
    out
}

/// Number of comments in the forest.
pub fn count(forest: &[CommentNode]) -> usize {
    let mut total = 0;
    let mut stack: Vec<&CommentNode> = forest.iter().collect();
    while let Some(node) = stack.pop() {
        total += 1;
        stack.extend(node.replies.iter());
    }
    total
}

impl CommentNode {
    /// Number of direct and indirect replies.
    pub fn reply_count(&self) -> usize {
        count(&self.replies)
    }

    /// Height of the subtree; a comment without replies has depth zero.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self, 0)];
        while let Some((node, level)) = stack.pop() {
            deepest = deepest.max(level);
            stack.extend(node.replies.iter().map(|reply| (reply, level + 1)));
        }
        deepest
    }

    pub fn find(&self, id: &str) -> Option<&CommentNode> {
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if node.comment.id == id {
                return Some(node);
            }
            stack.extend(node.replies.iter().rev());
        }
        None
    }
}

impl Drop for CommentNode {
    fn drop(&mut self) {
        // unlink replies first so long chains are freed without recursion
        let mut pending = std::mem::take(&mut self.replies);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.replies);
        }
    }
}
