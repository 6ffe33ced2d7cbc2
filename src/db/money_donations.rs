use rusqlite::{params, Connection};

use super::models::MoneyDonation;
use super::{from_millis, new_id, now_millis};

#[derive(Debug, Clone)]
pub struct NewMoneyDonation {
    pub donor_name: String,
    pub donation_amount: f64,
    pub transaction_id: Option<String>,
}

pub fn insert(conn: &Connection, new: NewMoneyDonation) -> rusqlite::Result<MoneyDonation> {
    let donation = MoneyDonation {
        id: new_id(),
        donor_name: new.donor_name,
        donation_amount: new.donation_amount,
        transaction_id: new.transaction_id.filter(|t| !t.is_empty()),
        created_at: from_millis(now_millis()),
    };

    conn.execute(
        &format!(
            "INSERT INTO money_donations ({}) VALUES (?1, ?2, ?3, ?4, ?5)",
            MoneyDonation::COLUMNS
        ),
        params![
            donation.id,
            donation.donor_name,
            donation.donation_amount,
            donation.transaction_id,
            donation.created_at.timestamp_millis(),
        ],
    )?;

    Ok(donation)
}

pub fn list(conn: &Connection) -> rusqlite::Result<Vec<MoneyDonation>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM money_donations ORDER BY created_at ASC, id ASC",
        MoneyDonation::COLUMNS
    ))?;
    let donations = stmt
        .query_map([], MoneyDonation::from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(donations)
}

pub fn total_amount(conn: &Connection) -> rusqlite::Result<f64> {
    conn.query_row(
        "SELECT COALESCE(SUM(donation_amount), 0.0) FROM money_donations",
        [],
        |row| row.get(0),
    )
}

pub fn delete(conn: &Connection, id: &str) -> rusqlite::Result<bool> {
    let rows = conn.execute("DELETE FROM money_donations WHERE id = ?1", params![id])?;
    Ok(rows > 0)
}
