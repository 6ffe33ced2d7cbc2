use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use serde::Serialize;

use crate::db::{donations, food_requests, money_donations, users};
use crate::error::{AppError, AppResult};
use crate::extractors::AdminUser;
use crate::state::AppState;

/// Tables the admin panel can download
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Donations,
    FoodRequests,
    MoneyDonations,
    Users,
}

impl ExportKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "donations" => Some(ExportKind::Donations),
            "foodRequests" => Some(ExportKind::FoodRequests),
            "moneyDonations" => Some(ExportKind::MoneyDonations),
            "users" => Some(ExportKind::Users),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExportKind::Donations => "donations",
            ExportKind::FoodRequests => "foodRequests",
            ExportKind::MoneyDonations => "moneyDonations",
            ExportKind::Users => "users",
        }
    }
}

fn to_csv<T: Serialize>(rows: &[T]) -> AppResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    writer
        .into_inner()
        .map_err(|e| AppError::Internal(e.to_string()))
}

pub fn export_filename(kind: ExportKind, date: chrono::NaiveDate) -> String {
    format!(
        "food-donation-{}-{}.csv",
        kind.as_str(),
        date.format("%Y-%m-%d")
    )
}

async fn export(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(kind): Path<String>,
) -> AppResult<Response> {
    let kind = ExportKind::parse(&kind).ok_or(AppError::NotFound)?;
    let conn = state.db.get()?;

    let body = match kind {
        ExportKind::Donations => to_csv(&donations::list_recent(&conn)?)?,
        ExportKind::FoodRequests => to_csv(&food_requests::list(&conn)?)?,
        ExportKind::MoneyDonations => to_csv(&money_donations::list(&conn)?)?,
        ExportKind::Users => to_csv(&users::list(&conn)?)?,
    };

    tracing::info!("{} exported {}", admin.email, kind.as_str());

    let disposition = format!(
        "attachment; filename=\"{}\"",
        export_filename(kind, chrono::Utc::now().date_naive())
    );
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/admin/export/{kind}", get(export))
}
