use rusqlite::{params, Connection, OptionalExtension};

use super::models::{Comment, DeleteOutcome};
use super::{from_millis, new_id, now_millis};

#[derive(Debug, Clone)]
pub struct NewComment {
    pub post_id: String,
    pub user_id: String,
    pub user_name: String,
    pub user_picture: Option<String>,
    pub content: String,
}

/// Returns `None` when the post does not exist.
pub fn insert(conn: &Connection, new: NewComment) -> rusqlite::Result<Option<Comment>> {
    let post_exists: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM posts WHERE id = ?1",
        params![new.post_id],
        |r| r.get(0),
    )?;
    if !post_exists {
        return Ok(None);
    }

    let comment = Comment {
        id: new_id(),
        post_id: new.post_id,
        user_id: new.user_id,
        user_name: new.user_name,
        user_picture: new.user_picture,
        content: new.content,
        created_at: from_millis(now_millis()),
    };

    conn.execute(
        &format!(
            "INSERT INTO comments ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            Comment::COLUMNS
        ),
        params![
            comment.id,
            comment.post_id,
            comment.user_id,
            comment.user_name,
            comment.user_picture,
            comment.content,
            comment.created_at.timestamp_millis(),
        ],
    )?;

    Ok(Some(comment))
}

/// Comments on a post, newest first.
pub fn list_for_post(conn: &Connection, post_id: &str) -> rusqlite::Result<Vec<Comment>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM comments WHERE post_id = ?1 ORDER BY created_at DESC, id DESC",
        Comment::COLUMNS
    ))?;
    let comments = stmt
        .query_map(params![post_id], Comment::from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(comments)
}

pub fn count_for_post(conn: &Connection, post_id: &str) -> rusqlite::Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM comments WHERE post_id = ?1",
        params![post_id],
        |r| r.get(0),
    )
}

pub fn delete(conn: &Connection, id: &str, user_id: &str) -> rusqlite::Result<DeleteOutcome> {
    let owner: Option<String> = conn
        .query_row(
            "SELECT user_id FROM comments WHERE id = ?1",
            params![id],
            |r| r.get(0),
        )
        .optional()?;

    match owner {
        None => Ok(DeleteOutcome::NotFound),
        Some(owner) if owner != user_id => Ok(DeleteOutcome::NotOwner),
        Some(_) => {
            conn.execute("DELETE FROM comments WHERE id = ?1", params![id])?;
            Ok(DeleteOutcome::Deleted)
        }
    }
}
