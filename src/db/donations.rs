use async_graphql::SimpleObject;
use rusqlite::{params, Connection};
use std::collections::HashMap;

use super::models::{Donation, DonationStatus};
use super::{from_millis, new_id, now_millis};

pub const DEFAULT_CATEGORY: &str = "Other";

#[derive(Debug, Clone, Default)]
pub struct NewDonation {
    pub food_name: String,
    pub description: String,
    pub image_url: String,
    pub quantity: Option<i32>,
    pub expiry_date: Option<String>,
    pub location: Option<String>,
    pub contact_phone: Option<String>,
    pub category: Option<String>,
    pub user_id: Option<String>,
}

/// Occurrence count for one category or location
#[derive(Clone, Debug, PartialEq, Eq, SimpleObject)]
pub struct CountEntry {
    pub key: String,
    pub count: i64,
}

#[derive(Clone, Debug, SimpleObject)]
pub struct DonationStats {
    pub total_donations: i64,
    pub category_counts: Vec<CountEntry>,
    pub location_counts: Vec<CountEntry>,
    /// The five newest donations
    pub recent_donations: Vec<Donation>,
}

pub fn insert(conn: &Connection, new: NewDonation) -> rusqlite::Result<Donation> {
    let donation = Donation {
        id: new_id(),
        food_name: new.food_name,
        description: new.description,
        image_url: new.image_url,
        quantity: new.quantity.unwrap_or(1),
        expiry_date: new.expiry_date.unwrap_or_default(),
        location: new.location.unwrap_or_default(),
        contact_phone: new.contact_phone.unwrap_or_default(),
        category: new
            .category
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
        user_id: new.user_id.filter(|u| !u.is_empty()),
        status: DonationStatus::Available,
        created_at: from_millis(now_millis()),
    };

    conn.execute(
        &format!(
            "INSERT INTO donations ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            Donation::COLUMNS
        ),
        params![
            donation.id,
            donation.food_name,
            donation.description,
            donation.image_url,
            donation.quantity,
            donation.expiry_date,
            donation.location,
            donation.contact_phone,
            donation.category,
            donation.user_id,
            donation.status.as_str(),
            donation.created_at.timestamp_millis(),
        ],
    )?;

    Ok(donation)
}

fn query(
    conn: &Connection,
    filter: &str,
    args: &[&dyn rusqlite::ToSql],
) -> rusqlite::Result<Vec<Donation>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM donations {} ORDER BY created_at DESC, id DESC",
        Donation::COLUMNS,
        filter
    ))?;
    let donations = stmt
        .query_map(args, Donation::from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(donations)
}

/// All donations, newest first.
pub fn list_recent(conn: &Connection) -> rusqlite::Result<Vec<Donation>> {
    query(conn, "", &[])
}

/// `None` and `"All"` both mean no filter.
pub fn list_by_category(
    conn: &Connection,
    category: Option<&str>,
) -> rusqlite::Result<Vec<Donation>> {
    match category {
        Some(c) if c != "All" => query(conn, "WHERE category = ?1", &[&c]),
        _ => list_recent(conn),
    }
}

pub fn list_with_location(conn: &Connection) -> rusqlite::Result<Vec<Donation>> {
    query(conn, "WHERE location != ''", &[])
}

pub fn list_by_user(conn: &Connection, user_id: &str) -> rusqlite::Result<Vec<Donation>> {
    query(conn, "WHERE user_id = ?1", &[&user_id])
}

pub fn delete(conn: &Connection, id: &str) -> rusqlite::Result<bool> {
    let rows = conn.execute("DELETE FROM donations WHERE id = ?1", params![id])?;
    Ok(rows > 0)
}

pub fn stats(conn: &Connection) -> rusqlite::Result<DonationStats> {
    let donations = list_recent(conn)?;

    let mut categories: HashMap<String, i64> = HashMap::new();
    let mut locations: HashMap<String, i64> = HashMap::new();
    for d in &donations {
        let category = if d.category.is_empty() {
            DEFAULT_CATEGORY
        } else {
            d.category.as_str()
        };
        *categories.entry(category.to_string()).or_default() += 1;
        if !d.location.is_empty() {
            *locations.entry(d.location.clone()).or_default() += 1;
        }
    }

    Ok(DonationStats {
        total_donations: donations.len() as i64,
        category_counts: sorted_counts(categories),
        location_counts: sorted_counts(locations),
        recent_donations: donations.into_iter().take(5).collect(),
    })
}

/// Highest count first, ties broken by key.
fn sorted_counts(counts: HashMap<String, i64>) -> Vec<CountEntry> {
    let mut entries: Vec<CountEntry> = counts
        .into_iter()
        .map(|(key, count)| CountEntry { key, count })
        .collect();
    entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    fn donation(name: &str, category: Option<&str>, location: Option<&str>) -> NewDonation {
        NewDonation {
            food_name: name.into(),
            description: format!("{} to share", name),
            image_url: "https://img.example.org/x.jpg".into(),
            category: category.map(String::from),
            location: location.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn insert_applies_defaults() {
        let pool = test_pool();
        let conn = pool.get().unwrap();
        let d = insert(&conn, donation("Rice", None, None)).unwrap();

        assert_eq!(d.quantity, 1);
        assert_eq!(d.category, "Other");
        assert_eq!(d.location, "");
        assert_eq!(d.status, DonationStatus::Available);
        assert!(d.user_id.is_none());
    }

    #[test]
    fn category_filter_treats_all_as_unfiltered() {
        let pool = test_pool();
        let conn = pool.get().unwrap();
        insert(&conn, donation("Rice", Some("Grains"), None)).unwrap();
        insert(&conn, donation("Milk", Some("Dairy"), None)).unwrap();

        assert_eq!(list_by_category(&conn, Some("Dairy")).unwrap().len(), 1);
        assert_eq!(list_by_category(&conn, Some("All")).unwrap().len(), 2);
        assert_eq!(list_by_category(&conn, None).unwrap().len(), 2);
    }

    #[test]
    fn newest_first_ordering() {
        let pool = test_pool();
        let conn = pool.get().unwrap();
        insert(&conn, donation("First", None, None)).unwrap();
        insert(&conn, donation("Second", None, None)).unwrap();

        let names: Vec<String> = list_recent(&conn)
            .unwrap()
            .into_iter()
            .map(|d| d.food_name)
            .collect();
        assert_eq!(names, vec!["Second", "First"]);
    }

    #[test]
    fn stats_count_categories_and_locations() {
        let pool = test_pool();
        let conn = pool.get().unwrap();
        insert(&conn, donation("Rice", Some("Grains"), Some("Pune"))).unwrap();
        insert(&conn, donation("Wheat", Some("Grains"), Some("Pune"))).unwrap();
        insert(&conn, donation("Soup", None, None)).unwrap();

        let s = stats(&conn).unwrap();
        assert_eq!(s.total_donations, 3);
        assert_eq!(
            s.category_counts,
            vec![
                CountEntry { key: "Grains".into(), count: 2 },
                CountEntry { key: "Other".into(), count: 1 },
            ]
        );
        assert_eq!(
            s.location_counts,
            vec![CountEntry { key: "Pune".into(), count: 2 }]
        );
        assert_eq!(list_with_location(&conn).unwrap().len(), 2);
    }
}
