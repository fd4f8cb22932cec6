use std::collections::HashMap;

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde::Serialize;

use crate::db::Store;
use crate::error::StudioResult;
use crate::models::PageView;

pub const WINDOW_DAYS: i64 = 30;
const TOP_PAGES: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyViews {
    pub date: NaiveDate,
    pub views: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageCount {
    pub path: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsReport {
    pub total_views: i64,
    pub daily: Vec<DailyViews>,
    pub window_views: usize,
    pub daily_average: i64,
    pub top_pages: Vec<PageCount>,
}

/// Path without its query string
pub fn normalize_path(path: &str) -> &str {
    path.split('?').next().unwrap_or(path)
}

/// One bucket per day for the window ending on `today`, oldest first.
/// Views are dated on the studio's clock, `tz`.
pub fn daily_buckets<Tz: TimeZone>(
    views: &[PageView],
    today: NaiveDate,
    tz: &Tz,
) -> Vec<DailyViews> {
    let mut counts: HashMap<NaiveDate, usize> = HashMap::new();
    for view in views {
        let day = view.created_at.with_timezone(tz).date_naive();
        *counts.entry(day).or_default() += 1;
    }

    (0..WINDOW_DAYS)
        .rev()
        .map(|back| {
            let date = today - Duration::days(back);
            DailyViews {
                date,
                views: counts.get(&date).copied().unwrap_or(0),
            }
        })
        .collect()
}

pub fn top_pages(paths: &[String]) -> Vec<PageCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for path in paths {
        *counts.entry(normalize_path(path)).or_default() += 1;
    }

    let mut pages: Vec<PageCount> = counts
        .into_iter()
        .map(|(path, count)| PageCount {
            path: path.to_string(),
            count,
        })
        .collect();
    pages.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.path.cmp(&b.path)));
    pages.truncate(TOP_PAGES);
    pages
}

pub fn build_report<Tz: TimeZone>(
    total_views: i64,
    recent: &[PageView],
    paths: &[String],
    today: NaiveDate,
    tz: &Tz,
) -> AnalyticsReport {
    let daily = daily_buckets(recent, today, tz);
    let window_views: usize = daily.iter().map(|d| d.views).sum();

    AnalyticsReport {
        total_views,
        daily_average: (window_views as f64 / WINDOW_DAYS as f64).round() as i64,
        window_views,
        daily,
        top_pages: top_pages(paths),
    }
}

/// Midnight on the first day of the window, in `now`'s zone.
pub fn window_start<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Utc> {
    let first_day = now.date_naive() - Duration::days(WINDOW_DAYS - 1);
    first_day
        .and_hms_opt(0, 0, 0)
        .and_then(|midnight| now.timezone().from_local_datetime(&midnight).earliest())
        .map(|start| start.with_timezone(&Utc))
        .unwrap_or_else(|| now.with_timezone(&Utc))
}

/// Build the report for the window ending today on `now`'s clock.
pub async fn load<Tz: TimeZone>(
    store: &dyn Store,
    now: DateTime<Tz>,
) -> StudioResult<AnalyticsReport> {
    let today = now.date_naive();
    let tz = now.timezone();
    let since = window_start(&now);

    let total = store.count_page_views().await?;
    let recent = store.page_views_since(since).await?;
    let paths = store.page_view_paths().await?;

    Ok(build_report(total, &recent, &paths, today, &tz))
}
