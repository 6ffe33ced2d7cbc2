use async_graphql::{Context, EmptySubscription, Error, Result, Schema};

use super::mutations::MutationRoot;
use super::queries::QueryRoot;
use crate::extractors::CurrentUser;
use crate::state::DbPool;

/// GraphQL Schema type
pub type FoodShareSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Request data marking the caller as an allowlisted admin
#[derive(Debug, Clone, Copy)]
pub struct AdminAccess;

/// Build the GraphQL schema
pub fn build_schema() -> FoodShareSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription).finish()
}

pub(crate) fn pool<'a>(ctx: &Context<'a>) -> Result<&'a DbPool> {
    ctx.data::<DbPool>()
}

pub(crate) fn current_user<'a>(ctx: &Context<'a>) -> Option<&'a CurrentUser> {
    ctx.data_opt::<CurrentUser>()
}

pub(crate) fn require_user<'a>(ctx: &Context<'a>) -> Result<&'a CurrentUser> {
    current_user(ctx).ok_or_else(|| Error::new("Authentication required"))
}

pub(crate) fn require_admin<'a>(ctx: &Context<'a>) -> Result<&'a CurrentUser> {
    let user = require_user(ctx)?;
    ctx.data_opt::<AdminAccess>()
        .map(|_| user)
        .ok_or_else(|| Error::new("Admin access required"))
}
