use async_graphql::*;

use super::schema::{current_user, pool, require_admin, require_user};
use crate::db::comments::{self, NewComment};
use crate::db::food_requests::{self, StatusChange};
use crate::db::models::{
    Comment, DeleteOutcome, Donation, FoodRequest, MoneyDonation, Post, RequestStatus,
};
use crate::db::posts::{self, NewPost};
use crate::db::{donations, money_donations};
use crate::graphql::types::{
    AddDonationInput, CreateFoodRequestInput, CreateMoneyDonationInput, CreatePostInput,
    LikeResult,
};

/// GraphQL Mutation root
pub struct MutationRoot;

#[Object]
impl MutationRoot {
    /// List a food donation. Signed-in donors are recorded as the owner.
    async fn add_donation(&self, ctx: &Context<'_>, input: AddDonationInput) -> Result<Donation> {
        input.validate()?;
        let user_id = current_user(ctx).map(|u| u.uid.clone());
        let conn = pool(ctx)?.get()?;

        let donation = donations::insert(&conn, input.into_new(user_id))?;
        tracing::info!("Donation {} added ({})", donation.id, donation.food_name);
        Ok(donation)
    }

    async fn create_food_request(
        &self,
        ctx: &Context<'_>,
        input: CreateFoodRequestInput,
    ) -> Result<FoodRequest> {
        input.validate()?;
        let conn = pool(ctx)?.get()?;

        let request = food_requests::insert(&conn, input.into())?;
        tracing::info!("Food request {} created", request.id);
        Ok(request)
    }

    /// Record a captured payment
    async fn create_money_donation(
        &self,
        ctx: &Context<'_>,
        input: CreateMoneyDonationInput,
    ) -> Result<MoneyDonation> {
        input.validate()?;
        let conn = pool(ctx)?.get()?;

        let donation = money_donations::insert(&conn, input.into())?;
        tracing::info!(
            "Money donation {} recorded: {:.2}",
            donation.id,
            donation.donation_amount
        );
        Ok(donation)
    }

    /// Move a food request along pending -> approved -> fulfilled (admin only)
    async fn update_food_request_status(
        &self,
        ctx: &Context<'_>,
        id: String,
        status: RequestStatus,
    ) -> Result<FoodRequest> {
        require_admin(ctx)?;
        let conn = pool(ctx)?.get()?;

        match food_requests::update_status(&conn, &id, status)? {
            StatusChange::Updated(request) => Ok(request),
            StatusChange::NotFound => Err(Error::new("Food request not found")),
            StatusChange::Rejected { from, to } => Err(Error::new(format!(
                "Cannot change request status from {} to {}",
                from.as_str(),
                to.as_str()
            ))),
        }
    }

    async fn delete_donation(&self, ctx: &Context<'_>, id: String) -> Result<bool> {
        require_admin(ctx)?;
        let conn = pool(ctx)?.get()?;
        if !donations::delete(&conn, &id)? {
            return Err(Error::new("Donation not found"));
        }
        Ok(true)
    }

    async fn delete_food_request(&self, ctx: &Context<'_>, id: String) -> Result<bool> {
        require_admin(ctx)?;
        let conn = pool(ctx)?.get()?;
        if !food_requests::delete(&conn, &id)? {
            return Err(Error::new("Food request not found"));
        }
        Ok(true)
    }

    async fn delete_money_donation(&self, ctx: &Context<'_>, id: String) -> Result<bool> {
        require_admin(ctx)?;
        let conn = pool(ctx)?.get()?;
        if !money_donations::delete(&conn, &id)? {
            return Err(Error::new("Money donation not found"));
        }
        Ok(true)
    }

    async fn create_post(&self, ctx: &Context<'_>, input: CreatePostInput) -> Result<Post> {
        let user = require_user(ctx)?;
        if input.title.trim().is_empty() || input.content.trim().is_empty() {
            return Err(Error::new("Title and content are required"));
        }
        let conn = pool(ctx)?.get()?;

        let post = posts::insert(
            &conn,
            NewPost {
                title: input.title,
                content: input.content,
                image_url: input.image_url,
                user_id: user.uid.clone(),
                user_name: user.name.clone(),
                user_picture: user.picture(),
                category: input.category,
                location: input.location,
            },
        )?;
        Ok(post)
    }

    /// Like or unlike a post
    async fn like_post(&self, ctx: &Context<'_>, id: String) -> Result<LikeResult> {
        let user = require_user(ctx)?;
        let conn = pool(ctx)?.get()?;

        let toggle = posts::toggle_like(&conn, &id, &user.uid)?
            .ok_or_else(|| Error::new("Post not found"))?;
        Ok(LikeResult {
            success: true,
            liked: toggle.liked,
            likes: toggle.likes,
        })
    }

    async fn delete_post(&self, ctx: &Context<'_>, id: String) -> Result<bool> {
        let user = require_user(ctx)?;
        let conn = pool(ctx)?.get()?;

        match posts::delete(&conn, &id, &user.uid)? {
            DeleteOutcome::Deleted => Ok(true),
            DeleteOutcome::NotFound => Err(Error::new("Post not found")),
            DeleteOutcome::NotOwner => Err(Error::new("You can only delete your own posts")),
        }
    }

    async fn add_comment(
        &self,
        ctx: &Context<'_>,
        post_id: String,
        content: String,
    ) -> Result<Comment> {
        let user = require_user(ctx)?;
        if content.trim().is_empty() {
            return Err(Error::new("Comment cannot be empty"));
        }
        let conn = pool(ctx)?.get()?;

        comments::insert(
            &conn,
            NewComment {
                post_id,
                user_id: user.uid.clone(),
                user_name: user.name.clone(),
                user_picture: user.picture(),
                content,
            },
        )?
        .ok_or_else(|| Error::new("Post not found"))
    }

    async fn delete_comment(&self, ctx: &Context<'_>, id: String) -> Result<bool> {
        let user = require_user(ctx)?;
        let conn = pool(ctx)?.get()?;

        match comments::delete(&conn, &id, &user.uid)? {
            DeleteOutcome::Deleted => Ok(true),
            DeleteOutcome::NotFound => Err(Error::new("Comment not found")),
            DeleteOutcome::NotOwner => Err(Error::new("You can only delete your own comments")),
        }
    }
}
