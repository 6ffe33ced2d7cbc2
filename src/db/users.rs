use rusqlite::{params, Connection, OptionalExtension};

use super::models::{Role, User};
use super::{new_id, now_millis};

/// Profile fields supplied by the identity provider
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub picture: String,
}

/// Return the user for this email, creating it with `role` on first sight.
/// An existing record keeps its stored role.
pub fn ensure_user(conn: &Connection, new: &NewUser, role: Role) -> rusqlite::Result<User> {
    conn.execute(
        "INSERT INTO users (id, uid, name, email, picture, role, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT(email) DO NOTHING",
        params![
            new_id(),
            uuid::Uuid::new_v4().to_string(),
            new.name,
            new.email,
            new.picture,
            role.as_str(),
            now_millis(),
        ],
    )?;

    conn.query_row(
        &format!("SELECT {} FROM users WHERE email = ?1", User::COLUMNS),
        params![new.email],
        User::from_row,
    )
}

pub fn find_by_email(conn: &Connection, email: &str) -> rusqlite::Result<Option<User>> {
    conn.query_row(
        &format!("SELECT {} FROM users WHERE email = ?1", User::COLUMNS),
        params![email],
        User::from_row,
    )
    .optional()
}

pub fn find_by_uid(conn: &Connection, uid: &str) -> rusqlite::Result<Option<User>> {
    conn.query_row(
        &format!("SELECT {} FROM users WHERE uid = ?1", User::COLUMNS),
        params![uid],
        User::from_row,
    )
    .optional()
}

pub fn list(conn: &Connection) -> rusqlite::Result<Vec<User>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM users ORDER BY created_at ASC",
        User::COLUMNS
    ))?;
    let users = stmt
        .query_map([], User::from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(users)
}

pub fn set_role(conn: &Connection, uid: &str, role: Role) -> rusqlite::Result<bool> {
    let rows = conn.execute(
        "UPDATE users SET role = ?1 WHERE uid = ?2",
        params![role.as_str(), uid],
    )?;
    Ok(rows > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    fn alice() -> NewUser {
        NewUser {
            name: "Alice".into(),
            email: "alice@example.org".into(),
            picture: "https://img.example.org/a.png".into(),
        }
    }

    #[test]
    fn ensure_user_creates_once_per_email() {
        let pool = test_pool();
        let conn = pool.get().unwrap();

        let first = ensure_user(&conn, &alice(), Role::User).unwrap();
        let second = ensure_user(&conn, &alice(), Role::Admin).unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first.uid, second.uid);
        assert_eq!(second.role, Role::User);
        assert_eq!(list(&conn).unwrap().len(), 1);
    }

    #[test]
    fn find_by_email_and_uid() {
        let pool = test_pool();
        let conn = pool.get().unwrap();
        let user = ensure_user(&conn, &alice(), Role::User).unwrap();

        assert!(find_by_email(&conn, "nobody@example.org").unwrap().is_none());
        let by_email = find_by_email(&conn, "alice@example.org").unwrap().unwrap();
        assert_eq!(by_email.uid, user.uid);
        let by_uid = find_by_uid(&conn, &user.uid).unwrap().unwrap();
        assert_eq!(by_uid.email, "alice@example.org");
    }

    #[test]
    fn set_role_promotes_user() {
        let pool = test_pool();
        let conn = pool.get().unwrap();
        let user = ensure_user(&conn, &alice(), Role::User).unwrap();

        assert!(set_role(&conn, &user.uid, Role::Admin).unwrap());
        assert!(!set_role(&conn, "missing", Role::Admin).unwrap());
        let reloaded = find_by_uid(&conn, &user.uid).unwrap().unwrap();
        assert_eq!(reloaded.role, Role::Admin);
    }
}
