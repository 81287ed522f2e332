//! Page view aggregation for the admin dashboard.
//!
//! Raw rows come straight from the data store; everything here is a pure
//! function of those rows, the requested day count and the current time.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::upstream::types::PageView;

pub const DEFAULT_DAYS: u32 = 30;
pub const MAX_DAYS: u32 = 90;
/// Upper bound on rows pulled from the store per report.
pub const MAX_ROWS: usize = 10_000;

const TOP_LIMIT: usize = 10;
const DEVICE_LIMIT: usize = 5;

/// A name with how often it occurred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ranked {
    pub name: String,
    pub count: u64,
}

/// Views on one calendar day (UTC).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyViews {
    pub date: String,
    pub views: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalyticsReport {
    pub total_views: u64,
    pub today_views: u64,
    pub yesterday_views: u64,
    pub daily: Vec<DailyViews>,
    pub top_pages: Vec<Ranked>,
    pub top_countries: Vec<Ranked>,
    pub top_referrers: Vec<Ranked>,
    pub devices: Vec<Ranked>,
    pub days: u32,
}

/// Counter that remembers first-seen order so ranking ties are stable.
#[derive(Default)]
struct Tally {
    index: HashMap<String, usize>,
    entries: Vec<Ranked>,
}

impl Tally {
    fn add(&mut self, name: &str) {
        match self.index.get(name) {
            Some(&i) => self.entries[i].count += 1,
            None => {
                self.index.insert(name.to_string(), self.entries.len());
                self.entries.push(Ranked {
                    name: name.to_string(),
                    count: 1,
                });
            }
        }
    }

    fn get(&self, name: &str) -> u64 {
        self.index.get(name).map_or(0, |&i| self.entries[i].count)
    }

    fn top(mut self, n: usize) -> Vec<Ranked> {
        self.entries.sort_by(|a, b| b.count.cmp(&a.count));
        self.entries.truncate(n);
        self.entries
    }
}

/// Interpret the `days` query parameter.
///
/// Takes the leading integer of the raw value; absent, unparsable or zero
/// means [`DEFAULT_DAYS`]. The result is clamped to `1..=MAX_DAYS`.
pub fn parse_days(raw: Option<&str>) -> u32 {
    let parsed = raw.and_then(leading_integer).filter(|&d| d != 0);
    match parsed {
        Some(d) => d.clamp(1, i64::from(MAX_DAYS)) as u32,
        None => DEFAULT_DAYS,
    }
}

fn leading_integer(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (sign, digits) = match s.as_bytes().first() {
        Some(b'-') => (-1, &s[1..]),
        Some(b'+') => (1, &s[1..]),
        _ => (1, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    // Saturate absurdly long inputs instead of failing.
    let value = digits[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(sign * value)
}

/// Hostname of a referrer URL, or the raw value when it is not a URL.
fn referrer_name(raw: &str) -> Option<String> {
    let name = match url::Url::parse(raw) {
        Ok(url) => url.host_str().unwrap_or_default().to_string(),
        Err(_) => raw.to_string(),
    };
    if name.is_empty() || name == "null" {
        None
    } else {
        Some(name)
    }
}

fn day_key(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d").to_string()
}

/// Build the dashboard report for the trailing `days` days ending at `now`.
pub fn aggregate(views: &[PageView], days: u32, now: DateTime<Utc>) -> AnalyticsReport {
    let mut daily = Tally::default();
    let mut pages = Tally::default();
    let mut countries = Tally::default();
    let mut devices = Tally::default();
    let mut referrers = Tally::default();

    for view in views {
        let day = view
            .created_at
            .as_deref()
            .and_then(|ts| ts.get(..10))
            .unwrap_or("unknown");
        daily.add(day);

        pages.add(view.path.as_deref().filter(|p| !p.is_empty()).unwrap_or("/"));

        if let Some(country) = view.country.as_deref().filter(|c| !c.is_empty()) {
            countries.add(country);
        }
        if let Some(device) = view.device.as_deref().filter(|d| !d.is_empty()) {
            devices.add(device);
        }
        if let Some(name) = view
            .referrer
            .as_deref()
            .filter(|r| !r.is_empty())
            .and_then(referrer_name)
        {
            referrers.add(&name);
        }
    }

    let series = (0..days)
        .map(|d| {
            let date = day_key(now - Duration::days(i64::from(days - 1 - d)));
            DailyViews {
                views: daily.get(&date),
                date,
            }
        })
        .collect();

    AnalyticsReport {
        total_views: views.len() as u64,
        today_views: daily.get(&day_key(now)),
        yesterday_views: daily.get(&day_key(now - Duration::days(1))),
        daily: series,
        top_pages: pages.top(TOP_LIMIT),
        top_countries: countries.top(TOP_LIMIT),
        top_referrers: referrers.top(TOP_LIMIT),
        devices: devices.top(DEVICE_LIMIT),
        days,
    }
}
