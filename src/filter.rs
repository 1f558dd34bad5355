use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;

use crate::models::{Category, Event};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Raw filter values as they arrive on a query string.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct FilterParams {
    pub search: Option<String>,
    pub category: Option<String>,
    pub source: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct EventFilter {
    pub search: Option<String>,
    pub category: Option<Category>,
    pub source: Option<String>,
    pub start: Option<NaiveDateTime>,
    /// Inclusive; a date-only bound is stretched to 23:59:59.
    pub end: Option<NaiveDateTime>,
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}

impl EventFilter {
    /// Builds a filter from request parameters. A category must name one of
    /// the lowercase labels exactly; anything else is dropped silently.
    /// Malformed dates are dropped with a warning meant for the person
    /// filling in the form.
    pub fn from_params(params: &FilterParams) -> (Self, Vec<String>) {
        let mut warnings = Vec::new();

        let start = non_empty(&params.start_date).and_then(|raw| match parse_date(&raw) {
            Some(date) => date.and_hms_opt(0, 0, 0),
            None => {
                warnings.push(format!("Invalid start date format: {raw}"));
                None
            }
        });

        let end = non_empty(&params.end_date).and_then(|raw| match parse_date(&raw) {
            Some(date) => date.and_hms_opt(23, 59, 59),
            None => {
                warnings.push(format!("Invalid end date format: {raw}"));
                None
            }
        });

        let filter = Self {
            search: non_empty(&params.search),
            category: params.category.as_deref().and_then(Category::lookup),
            source: non_empty(&params.source),
            start,
            end,
        };
        (filter, warnings)
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn matches(&self, event: &Event) -> bool {
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            let hit = [
                &event.name,
                &event.location,
                &event.description,
                &event.source_name,
            ]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }

        if self.category.is_some_and(|category| event.category != category) {
            return false;
        }

        if self
            .source
            .as_ref()
            .is_some_and(|source| &event.source_name != source)
        {
            return false;
        }

        if let Some(start) = self.start {
            if event.occurs_at.map_or(true, |at| at < start) {
                return false;
            }
        }

        if let Some(end) = self.end {
            if event.occurs_at.map_or(true, |at| at > end) {
                return false;
            }
        }

        true
    }

    /// Keeps matching events in their original order.
    pub fn apply(&self, events: Vec<Event>) -> Vec<Event> {
        if self.is_empty() {
            return events;
        }
        events.into_iter().filter(|event| self.matches(event)).collect()
    }
}
