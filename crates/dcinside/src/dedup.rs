use std::collections::HashSet;

use common::{normalize, Post};

/// Drops every post whose normalized title was already seen.
///
/// The first occurrence is kept whole; later duplicates are discarded, never merged.
pub fn dedup(posts: Vec<Post>) -> Vec<Post> {
    let mut seen = HashSet::with_capacity(posts.len());
    posts
        .into_iter()
        .filter(|post| seen.insert(normalize(&post.title)))
        .collect()
}
