use async_graphql::{Enum, SimpleObject};
use chrono::{DateTime, Utc};
use rusqlite::Row;
use serde::{Deserialize, Serialize};

use super::from_millis;

/// Access level attached to a user record
#[derive(Clone, Copy, Debug, Serialize, Deserialize, Enum, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "admin" => Role::Admin,
            _ => Role::User,
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, Enum, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum DonationStatus {
    Available,
    Claimed,
    Completed,
}

impl DonationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DonationStatus::Available => "available",
            DonationStatus::Claimed => "claimed",
            DonationStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "claimed" => DonationStatus::Claimed,
            "completed" => DonationStatus::Completed,
            _ => DonationStatus::Available,
        }
    }
}

/// Lifecycle of a food request: pending -> approved -> fulfilled, or
/// pending -> fulfilled directly.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, Enum, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Fulfilled,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Fulfilled => "fulfilled",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "approved" => RequestStatus::Approved,
            "fulfilled" => RequestStatus::Fulfilled,
            _ => RequestStatus::Pending,
        }
    }

    pub fn can_transition_to(&self, next: RequestStatus) -> bool {
        matches!(
            (self, next),
            (RequestStatus::Pending, RequestStatus::Approved)
                | (RequestStatus::Pending, RequestStatus::Fulfilled)
                | (RequestStatus::Approved, RequestStatus::Fulfilled)
        )
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    /// Generated identifier referenced by donations, posts and comments
    pub uid: String,
    pub name: String,
    pub email: String,
    pub picture: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub(crate) const COLUMNS: &'static str = "id, uid, name, email, picture, role, created_at";

    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(User {
            id: row.get(0)?,
            uid: row.get(1)?,
            name: row.get(2)?,
            email: row.get(3)?,
            picture: row.get(4)?,
            role: Role::parse(&row.get::<_, String>(5)?),
            created_at: from_millis(row.get(6)?),
        })
    }
}

/// A food item offered by a donor
#[derive(Clone, Debug, Serialize, Deserialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct Donation {
    pub id: String,
    pub food_name: String,
    pub description: String,
    pub image_url: String,
    pub quantity: i32,
    pub expiry_date: String,
    pub location: String,
    pub contact_phone: String,
    pub category: String,
    pub user_id: Option<String>,
    pub status: DonationStatus,
    pub created_at: DateTime<Utc>,
}

impl Donation {
    pub(crate) const COLUMNS: &'static str = "id, food_name, description, image_url, quantity, \
         expiry_date, location, contact_phone, category, user_id, status, created_at";

    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Donation {
            id: row.get(0)?,
            food_name: row.get(1)?,
            description: row.get(2)?,
            image_url: row.get(3)?,
            quantity: row.get(4)?,
            expiry_date: row.get(5)?,
            location: row.get(6)?,
            contact_phone: row.get(7)?,
            category: row.get(8)?,
            user_id: row.get(9)?,
            status: DonationStatus::parse(&row.get::<_, String>(10)?),
            created_at: from_millis(row.get(11)?),
        })
    }
}

/// A captured payment recorded after the client-side checkout completes
#[derive(Clone, Debug, Serialize, Deserialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct MoneyDonation {
    pub id: String,
    pub donor_name: String,
    pub donation_amount: f64,
    pub transaction_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl MoneyDonation {
    pub(crate) const COLUMNS: &'static str =
        "id, donor_name, donation_amount, transaction_id, created_at";

    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(MoneyDonation {
            id: row.get(0)?,
            donor_name: row.get(1)?,
            donation_amount: row.get(2)?,
            transaction_id: row.get(3)?,
            created_at: from_millis(row.get(4)?),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct FoodRequest {
    pub id: String,
    pub name: String,
    pub contact: String,
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub food_description: String,
    pub quantity: i32,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
}

impl FoodRequest {
    pub(crate) const COLUMNS: &'static str = "id, name, contact, location, latitude, longitude, \
         food_description, quantity, status, created_at";

    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(FoodRequest {
            id: row.get(0)?,
            name: row.get(1)?,
            contact: row.get(2)?,
            location: row.get(3)?,
            latitude: row.get(4)?,
            longitude: row.get(5)?,
            food_description: row.get(6)?,
            quantity: row.get(7)?,
            status: RequestStatus::parse(&row.get::<_, String>(8)?),
            created_at: from_millis(row.get(9)?),
        })
    }
}

/// Community feed entry
#[derive(Clone, Debug, Serialize, Deserialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub user_id: String,
    pub user_name: String,
    pub user_picture: Option<String>,
    pub likes: i32,
    pub category: Option<String>,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Post {
    pub(crate) const COLUMNS: &'static str = "id, title, content, image_url, user_id, user_name, \
         user_picture, likes, category, location, created_at";

    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Post {
            id: row.get(0)?,
            title: row.get(1)?,
            content: row.get(2)?,
            image_url: row.get(3)?,
            user_id: row.get(4)?,
            user_name: row.get(5)?,
            user_picture: row.get(6)?,
            likes: row.get(7)?,
            category: row.get(8)?,
            location: row.get(9)?,
            created_at: from_millis(row.get(10)?),
        })
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub post_id: String,
    pub user_id: String,
    pub user_name: String,
    pub user_picture: Option<String>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub(crate) const COLUMNS: &'static str =
        "id, post_id, user_id, user_name, user_picture, content, created_at";

    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Comment {
            id: row.get(0)?,
            post_id: row.get(1)?,
            user_id: row.get(2)?,
            user_name: row.get(3)?,
            user_picture: row.get(4)?,
            content: row.get(5)?,
            created_at: from_millis(row.get(6)?),
        })
    }
}

/// Outcome of an owner-checked delete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
    NotOwner,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_status_transitions() {
        use RequestStatus::*;
        assert!(Pending.can_transition_to(Approved));
        assert!(Pending.can_transition_to(Fulfilled));
        assert!(Approved.can_transition_to(Fulfilled));
        assert!(!Approved.can_transition_to(Pending));
        assert!(!Fulfilled.can_transition_to(Approved));
        assert!(!Pending.can_transition_to(Pending));
    }

    #[test]
    fn unknown_status_strings_fall_back() {
        assert_eq!(RequestStatus::parse("weird"), RequestStatus::Pending);
        assert_eq!(DonationStatus::parse(""), DonationStatus::Available);
        assert_eq!(Role::parse("superuser"), Role::User);
        assert_eq!(Role::parse(Role::Admin.as_str()), Role::Admin);
    }
}
