use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};

use super::models::{DeleteOutcome, Post};
use super::{from_millis, new_id, now_millis};

#[derive(Debug, Clone, Default)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub user_id: String,
    pub user_name: String,
    pub user_picture: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
}

/// State of a post after a like toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeToggle {
    pub liked: bool,
    pub likes: i32,
}

pub fn insert(conn: &Connection, new: NewPost) -> rusqlite::Result<Post> {
    // An empty image is treated as no image at all
    let image_url = new.image_url.filter(|url| !url.is_empty());
    if let Some(url) = image_url.as_deref() {
        if !url.starts_with("https://") && !url.starts_with("data:image/") {
            tracing::warn!(
                "Unexpected image URL format: {}...",
                url.chars().take(20).collect::<String>()
            );
        }
    }

    let post = Post {
        id: new_id(),
        title: new.title,
        content: new.content,
        image_url,
        user_id: new.user_id,
        user_name: new.user_name,
        user_picture: new.user_picture,
        likes: 0,
        category: new.category,
        location: new.location,
        created_at: from_millis(now_millis()),
    };

    conn.execute(
        &format!(
            "INSERT INTO posts ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            Post::COLUMNS
        ),
        params![
            post.id,
            post.title,
            post.content,
            post.image_url,
            post.user_id,
            post.user_name,
            post.user_picture,
            post.likes,
            post.category,
            post.location,
            post.created_at.timestamp_millis(),
        ],
    )?;

    Ok(post)
}

pub fn find(conn: &Connection, id: &str) -> rusqlite::Result<Option<Post>> {
    conn.query_row(
        &format!("SELECT {} FROM posts WHERE id = ?1", Post::COLUMNS),
        params![id],
        Post::from_row,
    )
    .optional()
}

pub fn list(conn: &Connection) -> rusqlite::Result<Vec<Post>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM posts ORDER BY created_at DESC, id DESC",
        Post::COLUMNS
    ))?;
    let posts = stmt
        .query_map([], Post::from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(posts)
}

pub fn list_by_user(conn: &Connection, user_id: &str) -> rusqlite::Result<Vec<Post>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM posts WHERE user_id = ?1 ORDER BY created_at DESC, id DESC",
        Post::COLUMNS
    ))?;
    let posts = stmt
        .query_map(params![user_id], Post::from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(posts)
}

/// Like the post if this user has not, unlike it otherwise.
/// Returns `None` when the post does not exist. The write lock is taken up
/// front so concurrent toggles queue on the busy timeout.
pub fn toggle_like(
    conn: &Connection,
    post_id: &str,
    user_id: &str,
) -> rusqlite::Result<Option<LikeToggle>> {
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;

    let likes: Option<i32> = tx
        .query_row(
            "SELECT likes FROM posts WHERE id = ?1",
            params![post_id],
            |r| r.get(0),
        )
        .optional()?;
    let Some(likes) = likes else {
        return Ok(None);
    };

    let removed = tx.execute(
        "DELETE FROM likes WHERE post_id = ?1 AND user_id = ?2",
        params![post_id, user_id],
    )?;

    let toggle = if removed > 0 {
        LikeToggle {
            liked: false,
            likes: (likes - 1).max(0),
        }
    } else {
        tx.execute(
            "INSERT INTO likes (id, user_id, post_id, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![new_id(), user_id, post_id, now_millis()],
        )?;
        LikeToggle {
            liked: true,
            likes: likes + 1,
        }
    };

    tx.execute(
        "UPDATE posts SET likes = ?1 WHERE id = ?2",
        params![toggle.likes, post_id],
    )?;
    tx.commit()?;

    Ok(Some(toggle))
}

/// Ids of every post this user currently likes.
pub fn liked_post_ids(conn: &Connection, user_id: &str) -> rusqlite::Result<Vec<String>> {
    let mut stmt =
        conn.prepare("SELECT post_id FROM likes WHERE user_id = ?1 ORDER BY created_at ASC")?;
    let ids = stmt
        .query_map(params![user_id], |r| r.get(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ids)
}

/// Author-only delete; likes and comments go with the post.
pub fn delete(conn: &Connection, id: &str, user_id: &str) -> rusqlite::Result<DeleteOutcome> {
    let owner: Option<String> = conn
        .query_row(
            "SELECT user_id FROM posts WHERE id = ?1",
            params![id],
            |r| r.get(0),
        )
        .optional()?;

    match owner {
        None => Ok(DeleteOutcome::NotFound),
        Some(owner) if owner != user_id => Ok(DeleteOutcome::NotOwner),
        Some(_) => {
            conn.execute("DELETE FROM posts WHERE id = ?1", params![id])?;
            Ok(DeleteOutcome::Deleted)
        }
    }
}
