//! Community forum: posts, comments, likes and bookmarks.
//!
//! Layout:
//!   .grow/community/posts.yaml   `seq` counter plus every post with its comments, oldest first
//!
//! Post IDs come from `seq`, which only grows, so deleting a post never frees its ID.

use crate::error::{GrowError, Result};
use crate::forms::Validator;
use crate::{io, paths};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

const MAX_TITLE: usize = 200;
const MAX_BODY: usize = 10_000;
const MAX_TAGS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub author_id: String,
    pub author_name: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: u32,
    pub author_id: String,
    pub author_name: String,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// User IDs that liked the post.
    #[serde(default)]
    pub likes: Vec<String>,
    /// User IDs that bookmarked the post.
    #[serde(default)]
    pub bookmarks: Vec<String>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub comment_seq: u32,
    pub created_at: DateTime<Utc>,
}

impl Post {
    fn matches(&self, query: Option<&str>, tag: Option<&str>) -> bool {
        if let Some(t) = tag {
            if !self.tags.iter().any(|x| x.eq_ignore_ascii_case(t)) {
                return false;
            }
        }
        match query.map(str::trim).filter(|q| !q.is_empty()) {
            Some(q) => {
                let q = q.to_lowercase();
                self.title.to_lowercase().contains(&q) || self.body.to_lowercase().contains(&q)
            }
            None => true,
        }
    }
}

/// Who is acting on the forum.
#[derive(Debug, Clone, Copy)]
pub struct Author<'a> {
    pub id: &'a str,
    pub name: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewPost {
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl NewPost {
    pub fn validate(&self) -> Result<()> {
        Validator::default()
            .required("title", &self.title, MAX_TITLE)
            .required("body", &self.body, MAX_BODY)
            .check(self.tags.len() <= MAX_TAGS, "tags", "at most five tags")
            .check(
                self.tags.iter().all(|t| paths::validate_slug(t.trim()).is_ok()),
                "tags",
                "tags must be lowercase words joined by hyphens",
            )
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Internal file I/O
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Serialize, Deserialize)]
struct PostStore {
    /// Last post ID handed out.
    #[serde(default)]
    seq: u32,
    #[serde(default)]
    posts: Vec<Post>,
}

impl PostStore {
    fn next_id(&mut self) -> u32 {
        let highest = self.posts.iter().map(|p| p.id).max().unwrap_or(0);
        self.seq = self.seq.max(highest) + 1;
        self.seq
    }
}

fn load_store(root: &Path) -> Result<PostStore> {
    io::read_yaml_or_default(&paths::posts_path(root))
}

fn save_store(root: &Path, store: &PostStore) -> Result<()> {
    io::write_yaml(&paths::posts_path(root), store)
}

fn load_all(root: &Path) -> Result<Vec<Post>> {
    Ok(load_store(root)?.posts)
}

fn find_mut(posts: &mut [Post], id: u32) -> Result<&mut Post> {
    posts
        .iter_mut()
        .find(|p| p.id == id)
        .ok_or(GrowError::PostNotFound(id))
}

/// Flip `user_id`'s membership in `set`. Returns whether it is now present.
fn toggle(set: &mut Vec<String>, user_id: &str) -> bool {
    if let Some(pos) = set.iter().position(|u| u == user_id) {
        set.remove(pos);
        false
    } else {
        set.push(user_id.to_string());
        true
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

pub fn create(root: &Path, author: Author<'_>, new: NewPost) -> Result<Post> {
    new.validate()?;
    let mut store = load_store(root)?;
    let id = store.next_id();
    let post = Post {
        id,
        author_id: author.id.to_string(),
        author_name: author.name.to_string(),
        title: new.title.trim().to_string(),
        body: new.body.trim().to_string(),
        tags: new.tags.iter().map(|t| t.trim().to_string()).collect(),
        likes: Vec::new(),
        bookmarks: Vec::new(),
        comments: Vec::new(),
        comment_seq: 0,
        created_at: Utc::now(),
    };
    store.posts.push(post.clone());
    save_store(root, &store)?;
    tracing::info!(id, author = %author.id, "post created");
    Ok(post)
}

/// Newest first, filtered by free-text `query` over title and body and by `tag`.
pub fn list(root: &Path, query: Option<&str>, tag: Option<&str>) -> Result<Vec<Post>> {
    let mut posts = load_all(root)?;
    posts.retain(|p| p.matches(query, tag));
    posts.reverse();
    Ok(posts)
}

pub fn get(root: &Path, id: u32) -> Result<Post> {
    load_all(root)?
        .into_iter()
        .find(|p| p.id == id)
        .ok_or(GrowError::PostNotFound(id))
}

/// Delete a post. Only its author may, unless `moderator` is set.
pub fn delete(root: &Path, id: u32, user_id: &str, moderator: bool) -> Result<()> {
    let mut store = load_store(root)?;
    let post = find_mut(&mut store.posts, id)?;
    if post.author_id != user_id && !moderator {
        return Err(GrowError::Forbidden(
            "only the author can delete this post".to_string(),
        ));
    }
    store.posts.retain(|p| p.id != id);
    save_store(root, &store)
}

pub fn add_comment(root: &Path, id: u32, author: Author<'_>, body: &str) -> Result<Comment> {
    Validator::default()
        .required("body", body, MAX_BODY)
        .finish()?;
    let mut store = load_store(root)?;
    let post = find_mut(&mut store.posts, id)?;
    post.comment_seq += 1;
    let comment = Comment {
        id: format!("C{}", post.comment_seq),
        author_id: author.id.to_string(),
        author_name: author.name.to_string(),
        body: body.trim().to_string(),
        created_at: Utc::now(),
    };
    post.comments.push(comment.clone());
    save_store(root, &store)?;
    Ok(comment)
}

/// Toggle the user's like. Returns `(liked, like_count)`.
pub fn toggle_like(root: &Path, id: u32, user_id: &str) -> Result<(bool, usize)> {
    let mut store = load_store(root)?;
    let post = find_mut(&mut store.posts, id)?;
    let liked = toggle(&mut post.likes, user_id);
    let count = post.likes.len();
    save_store(root, &store)?;
    Ok((liked, count))
}

/// Toggle the user's bookmark. Returns whether the post is now bookmarked.
pub fn toggle_bookmark(root: &Path, id: u32, user_id: &str) -> Result<bool> {
    let mut store = load_store(root)?;
    let post = find_mut(&mut store.posts, id)?;
    let marked = toggle(&mut post.bookmarks, user_id);
    save_store(root, &store)?;
    Ok(marked)
}

pub fn bookmarks_for(root: &Path, user_id: &str) -> Result<Vec<Post>> {
    let mut posts = load_all(root)?;
    posts.retain(|p| p.bookmarks.iter().any(|u| u == user_id));
    posts.reverse();
    Ok(posts)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const ANA: Author<'static> = Author { id: "u-ana", name: "Ana" };
    const BO: Author<'static> = Author { id: "u-bo", name: "Bo" };

    fn post(title: &str, tags: &[&str]) -> NewPost {
        NewPost {
            title: title.to_string(),
            body: format!("Thoughts on {title}"),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[test]
    fn create_and_list_newest_first() {
        let d = tempfile::TempDir::new().unwrap();
        create(d.path(), ANA, post("Morning routines", &["habits"])).unwrap();
        create(d.path(), BO, post("Finding a mentor", &["career"])).unwrap();

        let all = list(d.path(), None, None).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, 2);
        assert_eq!(all[1].author_name, "Ana");
    }

    #[test]
    fn search_and_tag_filters() {
        let d = tempfile::TempDir::new().unwrap();
        create(d.path(), ANA, post("Morning routines", &["habits"])).unwrap();
        create(d.path(), BO, post("Finding a mentor", &["career"])).unwrap();

        assert_eq!(list(d.path(), Some("MENTOR"), None).unwrap().len(), 1);
        assert_eq!(list(d.path(), None, Some("habits")).unwrap()[0].id, 1);
        assert!(list(d.path(), Some("mentor"), Some("habits")).unwrap().is_empty());
        assert_eq!(list(d.path(), Some("  "), None).unwrap().len(), 2);
    }

    #[test]
    fn invalid_post_rejected() {
        let d = tempfile::TempDir::new().unwrap();
        assert!(matches!(
            create(d.path(), ANA, post("", &[])),
            Err(GrowError::Validation(_))
        ));
        assert!(create(d.path(), ANA, post("Tags", &["Not A Slug"])).is_err());
    }

    #[test]
    fn only_author_deletes() {
        let d = tempfile::TempDir::new().unwrap();
        let p = create(d.path(), ANA, post("Mine", &[])).unwrap();
        assert!(matches!(
            delete(d.path(), p.id, BO.id, false),
            Err(GrowError::Forbidden(_))
        ));
        delete(d.path(), p.id, ANA.id, false).unwrap();
        assert!(matches!(get(d.path(), p.id), Err(GrowError::PostNotFound(1))));
    }

    #[test]
    fn deleted_newest_post_id_is_not_reused() {
        let d = tempfile::TempDir::new().unwrap();
        create(d.path(), ANA, post("One", &[])).unwrap();
        let two = create(d.path(), ANA, post("Two", &[])).unwrap();
        delete(d.path(), two.id, ANA.id, false).unwrap();
        let three = create(d.path(), BO, post("Three", &[])).unwrap();
        assert_eq!(three.id, 3);
    }

    #[test]
    fn moderator_can_delete() {
        let d = tempfile::TempDir::new().unwrap();
        let p = create(d.path(), ANA, post("Mine", &[])).unwrap();
        delete(d.path(), p.id, "admin", true).unwrap();
        assert!(list(d.path(), None, None).unwrap().is_empty());
    }

    #[test]
    fn comments_get_sequential_ids() {
        let d = tempfile::TempDir::new().unwrap();
        let p = create(d.path(), ANA, post("Q", &[])).unwrap();
        assert_eq!(add_comment(d.path(), p.id, BO, "Great point").unwrap().id, "C1");
        assert_eq!(add_comment(d.path(), p.id, ANA, "Thanks").unwrap().id, "C2");
        assert!(add_comment(d.path(), p.id, ANA, "   ").is_err());
        assert!(add_comment(d.path(), 42, ANA, "hello").is_err());
        assert_eq!(get(d.path(), p.id).unwrap().comments.len(), 2);
    }

    #[test]
    fn like_toggles() {
        let d = tempfile::TempDir::new().unwrap();
        let p = create(d.path(), ANA, post("Q", &[])).unwrap();
        assert_eq!(toggle_like(d.path(), p.id, BO.id).unwrap(), (true, 1));
        assert_eq!(toggle_like(d.path(), p.id, ANA.id).unwrap(), (true, 2));
        assert_eq!(toggle_like(d.path(), p.id, BO.id).unwrap(), (false, 1));
    }

    #[test]
    fn bookmark_toggles() {
        let d = tempfile::TempDir::new().unwrap();
        let p1 = create(d.path(), ANA, post("One", &[])).unwrap();
        let p2 = create(d.path(), ANA, post("Two", &[])).unwrap();
        assert!(toggle_bookmark(d.path(), p1.id, BO.id).unwrap());
        assert!(toggle_bookmark(d.path(), p2.id, BO.id).unwrap());
        assert_eq!(bookmarks_for(d.path(), BO.id).unwrap().len(), 2);

        assert!(!toggle_bookmark(d.path(), p1.id, BO.id).unwrap());
        let marked = bookmarks_for(d.path(), BO.id).unwrap();
        assert_eq!(marked.len(), 1);
        assert_eq!(marked[0].id, p2.id);
        assert!(bookmarks_for(d.path(), ANA.id).unwrap().is_empty());
    }
}
