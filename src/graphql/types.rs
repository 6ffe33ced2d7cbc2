use async_graphql::*;

use crate::db::donations::NewDonation;
use crate::db::food_requests::NewFoodRequest;
use crate::db::models::{Donation, FoodRequest, MoneyDonation};
use crate::db::money_donations::NewMoneyDonation;

/// Site-wide totals shown on the dashboard
#[derive(Clone, Debug, SimpleObject)]
pub struct GlobalStats {
    pub all_donations: Vec<Donation>,
    pub all_food_requests: Vec<FoodRequest>,
    pub all_money_donations: Vec<MoneyDonation>,
    pub total_donations: i64,
    pub total_money_amount: f64,
}

/// Result of toggling a like
#[derive(Clone, Debug, SimpleObject)]
pub struct LikeResult {
    pub success: bool,
    /// Whether the caller now likes the post
    pub liked: bool,
    pub likes: i32,
}

/// Input for listing a food donation
#[derive(InputObject)]
pub struct AddDonationInput {
    pub food_name: String,
    #[graphql(default)]
    pub description: String,
    #[graphql(default)]
    pub image_url: String,
    /// Defaults to 1
    pub quantity: Option<i32>,
    pub expiry_date: Option<String>,
    pub location: Option<String>,
    pub contact_phone: Option<String>,
    /// Defaults to "Other"
    pub category: Option<String>,
}

impl AddDonationInput {
    pub fn validate(&self) -> Result<()> {
        if self.food_name.trim().is_empty() {
            return Err(Error::new("Food name is required"));
        }
        if matches!(self.quantity, Some(q) if q <= 0) {
            return Err(Error::new("Quantity must be a positive number"));
        }
        Ok(())
    }

    pub fn into_new(self, user_id: Option<String>) -> NewDonation {
        NewDonation {
            food_name: self.food_name.trim().to_string(),
            description: self.description,
            image_url: self.image_url,
            quantity: self.quantity,
            expiry_date: self.expiry_date,
            location: self.location,
            contact_phone: self.contact_phone,
            category: self.category,
            user_id,
        }
    }
}

#[derive(InputObject)]
pub struct CreateFoodRequestInput {
    pub name: String,
    pub contact: String,
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub food_description: String,
    pub quantity: i32,
}

impl CreateFoodRequestInput {
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("Name", &self.name),
            ("Contact", &self.contact),
            ("Location", &self.location),
            ("Food description", &self.food_description),
        ] {
            if value.trim().is_empty() {
                return Err(Error::new(format!("{} is required", field)));
            }
        }
        if self.quantity <= 0 {
            return Err(Error::new("Quantity must be a positive number"));
        }
        let coordinate_ok = |v: Option<f64>, bound: f64| v.map_or(true, |v| v.is_finite() && v.abs() <= bound);
        if !coordinate_ok(self.latitude, 90.0) || !coordinate_ok(self.longitude, 180.0) {
            return Err(Error::new("Coordinates are out of range"));
        }
        Ok(())
    }
}

impl From<CreateFoodRequestInput> for NewFoodRequest {
    fn from(input: CreateFoodRequestInput) -> Self {
        NewFoodRequest {
            name: input.name,
            contact: input.contact,
            location: input.location,
            latitude: input.latitude,
            longitude: input.longitude,
            food_description: input.food_description,
            quantity: input.quantity,
        }
    }
}

#[derive(InputObject)]
pub struct CreateMoneyDonationInput {
    pub donor_name: String,
    pub donation_amount: f64,
    /// Payment provider's capture id
    pub transaction_id: Option<String>,
}

impl CreateMoneyDonationInput {
    pub fn validate(&self) -> Result<()> {
        if self.donor_name.trim().is_empty() {
            return Err(Error::new("Donor name is required"));
        }
        if !self.donation_amount.is_finite() || self.donation_amount <= 0.0 {
            return Err(Error::new("Donation amount must be greater than zero"));
        }
        Ok(())
    }
}

impl From<CreateMoneyDonationInput> for NewMoneyDonation {
    fn from(input: CreateMoneyDonationInput) -> Self {
        NewMoneyDonation {
            donor_name: input.donor_name,
            donation_amount: input.donation_amount,
            transaction_id: input.transaction_id,
        }
    }
}

#[derive(InputObject)]
pub struct CreatePostInput {
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
}
