//! Dashboard: headline counters and monthly upload volume.

use axum::{
    extract::State,
    response::{Html, IntoResponse},
    Json,
};
use chrono::{Datelike, Local, Months, NaiveDate};
use serde::Serialize;
use tubescope_common::error::ApiError;
use tubescope_common::models::{DashboardStats, MonthlyCount};

use crate::charts::BarChart;
use crate::render::PageError;
use crate::state::SharedState;

const CHART_MONTHS: u32 = 6;
const CHART_WIDTH: f64 = 600.0;
const CHART_HEIGHT: f64 = 300.0;

/// GET /api/dashboard/stats
pub async fn api_stats(State(state): State<SharedState>) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.stats().dashboard().await?))
}

#[derive(Serialize)]
struct DashboardPage {
    stats: DashboardStats,
    chart: BarChart,
}

/// One `YYYY-MM` entry per month for the `months` months ending at `today`,
/// oldest first. Months missing from `counts` get zero.
fn fill_months(counts: &[MonthlyCount], months: u32, today: NaiveDate) -> Vec<(String, i64)> {
    let first_of_month = today.with_day(1).unwrap_or(today);
    (0..months)
        .rev()
        .filter_map(|back| first_of_month.checked_sub_months(Months::new(back)))
        .map(|month| {
            let label = month.format("%Y-%m").to_string();
            let videos = counts.iter().find(|c| c.month == label).map_or(0, |c| c.videos);
            (label, videos)
        })
        .collect()
}

fn monthly_chart(counts: &[MonthlyCount], today: NaiveDate) -> BarChart {
    let series = fill_months(counts, CHART_MONTHS, today);
    BarChart::new(&series, CHART_WIDTH, CHART_HEIGHT)
}

/// GET / and /dashboard
pub async fn dashboard(State(state): State<SharedState>) -> Result<Html<String>, PageError> {
    let repo = state.stats();
    let (stats, months) = tokio::try_join!(repo.dashboard(), repo.videos_per_month(CHART_MONTHS))?;

    let ctx = DashboardPage { stats, chart: monthly_chart(&months, Local::now().date_naive()) };
    state.templates.render("dashboard.html", "dashboard", ctx)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_monthly_chart_labels() {
        let months = vec![
            MonthlyCount { month: "2024-04".into(), videos: 12 },
            MonthlyCount { month: "2024-05".into(), videos: 30 },
        ];
        let chart = monthly_chart(&months, day(2024, 5, 31));
        assert_eq!(chart.bars.len(), 6);
        assert_eq!(chart.bars[4].label, "2024-04");
        assert_eq!(chart.bars[5].value, "30");
    }

    #[test]
    fn test_empty_months_are_zero() {
        let counts = vec![MonthlyCount { month: "2024-01".into(), videos: 7 }];
        let series = fill_months(&counts, 6, day(2024, 3, 15));
        let labels: Vec<&str> = series.iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(labels, ["2023-10", "2023-11", "2023-12", "2024-01", "2024-02", "2024-03"]);
        assert_eq!(series.iter().map(|(_, v)| *v).collect::<Vec<_>>(), [0, 0, 0, 7, 0, 0]);

        assert!(fill_months(&[], 6, day(2024, 3, 15)).iter().all(|(_, v)| *v == 0));
    }
}
