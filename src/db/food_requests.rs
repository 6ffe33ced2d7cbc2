use rusqlite::{params, Connection, OptionalExtension};

use super::models::{FoodRequest, RequestStatus};
use super::{from_millis, new_id, now_millis};

#[derive(Debug, Clone, Default)]
pub struct NewFoodRequest {
    pub name: String,
    pub contact: String,
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub food_description: String,
    pub quantity: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatusChange {
    Updated(FoodRequest),
    NotFound,
    Rejected {
        from: RequestStatus,
        to: RequestStatus,
    },
}

pub fn insert(conn: &Connection, new: NewFoodRequest) -> rusqlite::Result<FoodRequest> {
    let request = FoodRequest {
        id: new_id(),
        name: new.name,
        contact: new.contact,
        location: new.location,
        latitude: new.latitude,
        longitude: new.longitude,
        food_description: new.food_description,
        quantity: new.quantity,
        status: RequestStatus::Pending,
        created_at: from_millis(now_millis()),
    };

    conn.execute(
        &format!(
            "INSERT INTO food_requests ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            FoodRequest::COLUMNS
        ),
        params![
            request.id,
            request.name,
            request.contact,
            request.location,
            request.latitude,
            request.longitude,
            request.food_description,
            request.quantity,
            request.status.as_str(),
            request.created_at.timestamp_millis(),
        ],
    )?;

    tracing::debug!("Inserted food request {}", request.id);
    Ok(request)
}

pub fn find(conn: &Connection, id: &str) -> rusqlite::Result<Option<FoodRequest>> {
    conn.query_row(
        &format!("SELECT {} FROM food_requests WHERE id = ?1", FoodRequest::COLUMNS),
        params![id],
        FoodRequest::from_row,
    )
    .optional()
}

pub fn list(conn: &Connection) -> rusqlite::Result<Vec<FoodRequest>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM food_requests ORDER BY created_at ASC, id ASC",
        FoodRequest::COLUMNS
    ))?;
    let requests = stmt
        .query_map([], FoodRequest::from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(requests)
}

/// Move a request along its lifecycle, refusing backwards or terminal moves.
pub fn update_status(
    conn: &Connection,
    id: &str,
    next: RequestStatus,
) -> rusqlite::Result<StatusChange> {
    let Some(mut request) = find(conn, id)? else {
        return Ok(StatusChange::NotFound);
    };

    if !request.status.can_transition_to(next) {
        return Ok(StatusChange::Rejected {
            from: request.status,
            to: next,
        });
    }

    conn.execute(
        "UPDATE food_requests SET status = ?1 WHERE id = ?2",
        params![next.as_str(), id],
    )?;
    request.status = next;
    Ok(StatusChange::Updated(request))
}

pub fn delete(conn: &Connection, id: &str) -> rusqlite::Result<bool> {
    let rows = conn.execute("DELETE FROM food_requests WHERE id = ?1", params![id])?;
    Ok(rows > 0)
}
