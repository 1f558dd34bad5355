//! Server-rendered listing page.

use axum::extract::{Query, State};
use axum::response::Html;
use axum::routing::get;
use axum::Router;

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::filter::{EventFilter, FilterParams};
use crate::freshness::FreshnessState;
use crate::models::{Category, Event};

const DISPLAY_FORMAT: &str = "%A, %B %-d, %Y at %-I:%M %p";

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn field(params: &Option<String>) -> String {
    escape(params.as_deref().unwrap_or_default().trim())
}

fn option(value: &str, label: &str, selected: bool) -> String {
    format!(
        r#"<option value="{}"{}>{}</option>"#,
        escape(value),
        if selected { " selected" } else { "" },
        escape(label)
    )
}

fn render_form(params: &FilterParams, sources: &[String]) -> String {
    let selected_category = params.category.as_deref().unwrap_or_default();
    let selected_source = params.source.as_deref().unwrap_or_default();

    let mut categories = option("", "All categories", selected_category.is_empty());
    for category in Category::ALL {
        categories.push_str(&option(
            category.as_str(),
            category.as_str(),
            category.as_str() == selected_category,
        ));
    }

    let mut source_options = option("", "All sources", selected_source.is_empty());
    for source in sources {
        source_options.push_str(&option(source, source, source == selected_source));
    }

    format!(
        r#"<form method="get" action="/" class="filters">
  <input type="search" name="search" placeholder="Search events" value="{search}">
  <select name="category">{categories}</select>
  <select name="source">{source_options}</select>
  <input type="date" name="start_date" value="{start}">
  <input type="date" name="end_date" value="{end}">
  <button type="submit">Filter</button>
  <a href="/">Clear</a>
</form>"#,
        search = field(&params.search),
        start = field(&params.start_date),
        end = field(&params.end_date),
    )
}

fn render_event(event: &Event) -> String {
    let when = event
        .occurs_at
        .map(|at| at.format(DISPLAY_FORMAT).to_string())
        .unwrap_or_else(|| "Date to be announced".to_string());

    let mut details = String::new();
    for (label, value) in [
        ("Cost", &event.cost),
        ("Organizer", &event.organizer),
        ("Contact", &event.contact_info),
        ("Ages", &event.age_restrictions),
    ] {
        if !value.is_empty() {
            details.push_str(&format!(
                "<li><strong>{label}:</strong> {}</li>",
                escape(value)
            ));
        }
    }
    if event.registration_required {
        details.push_str("<li><strong>Registration required</strong></li>");
    }

    format!(
        r#"<article class="event category-{category}">
  <h2><a href="{url}">{name}</a></h2>
  <p class="when">{when}</p>
  <p class="where">{location}</p>
  <p>{description}</p>
  <ul class="details">{details}</ul>
  <p class="source">{category} &middot; {source}</p>
</article>"#,
        category = event.category.as_str(),
        url = escape(&event.source_url),
        name = escape(&event.name),
        when = escape(&when),
        location = escape(&event.location),
        description = escape(&event.description),
        source = escape(&event.source_name),
    )
}

fn render_page(
    params: &FilterParams,
    warnings: &[String],
    events: &[Event],
    sources: &[String],
    freshness: FreshnessState,
) -> String {
    let mut notices = String::new();
    for warning in warnings {
        notices.push_str(&format!(
            r#"<p class="notice">{}</p>"#,
            escape(warning)
        ));
    }
    if freshness == FreshnessState::Refreshing {
        notices.push_str(
            r#"<p class="notice">Collecting events. Reload the page shortly for the full listing.</p>"#,
        );
    }

    let listing = if events.is_empty() {
        r#"<p class="empty">No events match these filters.</p>"#.to_string()
    } else {
        events.iter().map(render_event).collect::<Vec<_>>().join("\n")
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Waltham Community Events</title>
</head>
<body>
<header>
  <h1>Waltham Community Events</h1>
  <a href="/update">Update events</a>
</header>
{form}
{notices}
<p class="count">{count} events</p>
<main>
{listing}
</main>
</body>
</html>
"#,
        form = render_form(params, sources),
        count = events.len(),
    )
}

/// GET /
async fn index(
    State(state): State<AppState>,
    Query(params): Query<FilterParams>,
) -> Result<Html<String>, ApiError> {
    let (filter, warnings) = EventFilter::from_params(&params);
    let freshness = state.ensure_fresh().await;

    let query = state.listing_query();
    let (events, sources) = state
        .with_store(move |store| Ok((store.query_upcoming(&query)?, store.upcoming_sources()?)))
        .await?;
    let events = filter.apply(events);

    Ok(Html(render_page(
        &params, &warnings, &events, &sources, freshness,
    )))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(index))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup_in_user_text() {
        assert_eq!(
            escape(r#"<script>"Tom & Jerry's"</script>"#),
            "&lt;script&gt;&quot;Tom &amp; Jerry&#39;s&quot;&lt;/script&gt;"
        );
    }

    #[test]
    fn page_keeps_filter_values_and_warnings() {
        let params = FilterParams {
            search: Some("<market>".into()),
            category: Some("food".into()),
            ..FilterParams::default()
        };
        let html = render_page(
            &params,
            &["Invalid start date format: soon".to_string()],
            &[],
            &["Meetup".to_string()],
            FreshnessState::Refreshing,
        );
        assert!(html.contains(r#"value="&lt;market&gt;""#));
        assert!(html.contains(r#"<option value="food" selected>food</option>"#));
        assert!(html.contains("Invalid start date format: soon"));
        assert!(html.contains("Collecting events"));
        assert!(html.contains("No events match these filters."));
    }
}
