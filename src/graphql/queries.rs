use async_graphql::*;

use super::schema::{current_user, pool, require_admin};
use crate::db::donations::{self, DonationStats};
use crate::db::models::{Comment, Donation, FoodRequest, MoneyDonation, Post, User};
use crate::db::{comments, food_requests, money_donations, posts, users};
use crate::graphql::types::GlobalStats;

/// GraphQL Query root
pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// Look up a user by email; null when no email is given
    async fn user(&self, ctx: &Context<'_>, email: Option<String>) -> Result<Option<User>> {
        let Some(email) = email.filter(|e| !e.trim().is_empty()) else {
            return Ok(None);
        };
        let conn = pool(ctx)?.get()?;
        Ok(users::find_by_email(&conn, email.trim())?)
    }

    /// The signed-in user, if any
    async fn me(&self, ctx: &Context<'_>) -> Result<Option<User>> {
        let Some(user) = current_user(ctx) else {
            return Ok(None);
        };
        let conn = pool(ctx)?.get()?;
        Ok(users::find_by_uid(&conn, &user.uid)?)
    }

    /// All registered users (admin only)
    async fn users(&self, ctx: &Context<'_>) -> Result<Vec<User>> {
        require_admin(ctx)?;
        let conn = pool(ctx)?.get()?;
        Ok(users::list(&conn)?)
    }

    /// All food donations, newest first
    async fn recent_donations(&self, ctx: &Context<'_>) -> Result<Vec<Donation>> {
        let conn = pool(ctx)?.get()?;
        Ok(donations::list_recent(&conn)?)
    }

    /// Donations in a category, newest first; "All" or no category lists everything
    async fn donations_by_category(
        &self,
        ctx: &Context<'_>,
        category: Option<String>,
    ) -> Result<Vec<Donation>> {
        let conn = pool(ctx)?.get()?;
        Ok(donations::list_by_category(&conn, category.as_deref())?)
    }

    /// Donations that have a location, for the map view
    async fn donations_with_location(&self, ctx: &Context<'_>) -> Result<Vec<Donation>> {
        let conn = pool(ctx)?.get()?;
        Ok(donations::list_with_location(&conn)?)
    }

    async fn donation_stats(&self, ctx: &Context<'_>) -> Result<DonationStats> {
        let conn = pool(ctx)?.get()?;
        Ok(donations::stats(&conn)?)
    }

    /// A user's donations, newest first; empty without a user id
    async fn user_donations(
        &self,
        ctx: &Context<'_>,
        user_id: Option<String>,
    ) -> Result<Vec<Donation>> {
        let Some(user_id) = user_id.filter(|u| !u.is_empty()) else {
            return Ok(Vec::new());
        };
        let conn = pool(ctx)?.get()?;
        Ok(donations::list_by_user(&conn, &user_id)?)
    }

    async fn global_stats(&self, ctx: &Context<'_>) -> Result<GlobalStats> {
        let conn = pool(ctx)?.get()?;
        let all_donations = donations::list_recent(&conn)?;
        Ok(GlobalStats {
            total_donations: all_donations.len() as i64,
            all_donations,
            all_food_requests: food_requests::list(&conn)?,
            all_money_donations: money_donations::list(&conn)?,
            total_money_amount: money_donations::total_amount(&conn)?,
        })
    }

    async fn food_requests(&self, ctx: &Context<'_>) -> Result<Vec<FoodRequest>> {
        let conn = pool(ctx)?.get()?;
        Ok(food_requests::list(&conn)?)
    }

    async fn money_donations(&self, ctx: &Context<'_>) -> Result<Vec<MoneyDonation>> {
        let conn = pool(ctx)?.get()?;
        Ok(money_donations::list(&conn)?)
    }

    /// Community feed, newest first
    async fn posts(&self, ctx: &Context<'_>) -> Result<Vec<Post>> {
        let conn = pool(ctx)?.get()?;
        Ok(posts::list(&conn)?)
    }

    async fn posts_by_user(&self, ctx: &Context<'_>, user_id: String) -> Result<Vec<Post>> {
        let conn = pool(ctx)?.get()?;
        Ok(posts::list_by_user(&conn, &user_id)?)
    }

    async fn post(&self, ctx: &Context<'_>, id: String) -> Result<Option<Post>> {
        let conn = pool(ctx)?.get()?;
        Ok(posts::find(&conn, &id)?)
    }

    /// Ids of posts the user has liked. Falls back to the signed-in user.
    async fn user_likes(
        &self,
        ctx: &Context<'_>,
        user_id: Option<String>,
        skip: Option<bool>,
    ) -> Result<Vec<String>> {
        if skip.unwrap_or(false) {
            return Ok(Vec::new());
        }
        let user_id = user_id
            .filter(|u| !u.is_empty())
            .or_else(|| current_user(ctx).map(|u| u.uid.clone()));
        let Some(user_id) = user_id else {
            return Ok(Vec::new());
        };
        let conn = pool(ctx)?.get()?;
        Ok(posts::liked_post_ids(&conn, &user_id)?)
    }

    /// Comments on a post, newest first
    async fn comments(&self, ctx: &Context<'_>, post_id: String) -> Result<Vec<Comment>> {
        let conn = pool(ctx)?.get()?;
        Ok(comments::list_for_post(&conn, &post_id)?)
    }

    async fn comment_count(&self, ctx: &Context<'_>, post_id: String) -> Result<i64> {
        let conn = pool(ctx)?.get()?;
        Ok(comments::count_for_post(&conn, &post_id)?)
    }
}
