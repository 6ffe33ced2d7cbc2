use async_graphql::http::{playground_source, GraphQLPlaygroundConfig};
use axum::extract::State;
use axum::response::{Html, IntoResponse, Json};
use axum::routing::{get, post};
use axum::Router;

use crate::db::models::Role;
use crate::extractors::MaybeUser;
use crate::graphql::AdminAccess;
use crate::state::AppState;

/// GraphQL endpoint handler. Anonymous callers may read; the session user,
/// when present, is handed to resolvers for writes and admin operations.
async fn graphql_handler(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Json(req): Json<async_graphql::Request>,
) -> Json<async_graphql::Response> {
    let mut request = req.data(state.db.clone());

    if let Some(user) = user {
        if user.role == Role::Admin && state.config.auth.is_admin_email(&user.email) {
            request = request.data(AdminAccess);
        }
        request = request.data(user);
    }

    let response = state.graphql_schema.execute(request).await;
    Json(response)
}

/// GraphQL Playground UI (development tool)
async fn graphql_playground() -> impl IntoResponse {
    Html(playground_source(GraphQLPlaygroundConfig::new("/graphql")))
}

/// GraphQL router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/graphql", post(graphql_handler))
        .route("/graphql/playground", get(graphql_playground))
}
