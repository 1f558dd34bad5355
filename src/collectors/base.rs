use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use once_cell::sync::Lazy;
use regex::Regex;

use super::Collector;
use crate::models::{Category, Event};

/// Simulated sources never publish further ahead than this.
pub const WINDOW_MONTHS: u32 = 6;

static NON_SLUG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("valid slug regex"));

pub fn clean_text(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lowercase, `&` spelled out, every other run of punctuation or whitespace
/// collapsed into a single dash.
pub fn slugify(input: &str) -> String {
    let lowered = input.to_lowercase().replace('&', " and ");
    NON_SLUG_RE
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}

pub fn at(date: NaiveDate, hour: u32, minute: u32) -> NaiveDateTime {
    date.and_time(NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or_default())
}

pub fn days_from(today: NaiveDate, days: i64, hour: u32, minute: u32) -> NaiveDateTime {
    at(today + Duration::days(days), hour, minute)
}

/// First `weekday` on or after `from`.
pub fn next_weekday(from: NaiveDate, weekday: Weekday) -> NaiveDate {
    let ahead = (7 + weekday.num_days_from_monday() - from.weekday().num_days_from_monday()) % 7;
    from + Duration::days(i64::from(ahead))
}

/// `count` consecutive weekly dates starting at the first `weekday` on or
/// after `today`.
pub fn weekly(today: NaiveDate, weekday: Weekday, count: u32) -> Vec<NaiveDate> {
    let first = next_weekday(today, weekday);
    (0..count)
        .map(|week| first + Duration::weeks(i64::from(week)))
        .collect()
}

/// The `n`th `weekday` of each of the next `months` calendar months, starting
/// with the current one. Dates already behind `today` are dropped.
pub fn monthly(today: NaiveDate, weekday: Weekday, n: u8, months: u32) -> Vec<NaiveDate> {
    let Some(first_of_month) = today.with_day(1) else {
        return Vec::new();
    };
    (0..months)
        .filter_map(|offset| first_of_month.checked_add_months(Months::new(offset)))
        .filter_map(|month| {
            NaiveDate::from_weekday_of_month_opt(month.year(), month.month(), weekday, n)
        })
        .filter(|date| *date >= today)
        .collect()
}

pub fn within_window(today: NaiveDate, date: NaiveDate) -> bool {
    date >= today
        && today
            .checked_add_months(Months::new(WINDOW_MONTHS))
            .map_or(false, |end| date <= end)
}

/// Next occurrence of an annual date (today counts), or `None` for dates
/// such as Feb 29 that do not exist in the candidate years.
pub fn next_annual(today: NaiveDate, month: u32, day: u32) -> Option<NaiveDate> {
    let this_year = NaiveDate::from_ymd_opt(today.year(), month, day);
    match this_year {
        Some(date) if date >= today => Some(date),
        _ => NaiveDate::from_ymd_opt(today.year() + 1, month, day),
    }
}

pub fn anchor_url(base: &str, anchor: &str) -> String {
    format!("{base}#{anchor}")
}

pub fn dated_anchor(label: &str, date: NaiveDate) -> String {
    format!("{label}-{}", date.format("%Y-%m-%d"))
}

/// Event stamped with the collector's name. Categories left as `None` are
/// inferred from the wording.
pub fn build_event(
    source: &dyn Collector,
    name: &str,
    occurs_at: NaiveDateTime,
    source_url: String,
    location: &str,
    description: &str,
    category: Option<Category>,
) -> Event {
    let name = clean_text(name);
    let description = clean_text(description);
    let category = category.unwrap_or_else(|| Category::infer(&name, &description));
    Event::new(name, Some(occurs_at), source_url, source.source_name())
        .with_location(clean_text(location))
        .with_description(description)
        .with_category(category)
}
