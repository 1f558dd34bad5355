use anyhow::Result;
use chrono::{NaiveDate, Weekday};

use super::base;
use super::Collector;
use crate::models::{Category, Event};

const URL: &str = "https://waltham.lib.ma.us/programs/";
const SOURCE_ID: &str = "waltham_public_library";
const SOURCE_NAME: &str = "Waltham Public Library";
const MAIN_BRANCH: &str = "Waltham Public Library, 735 Main St";

pub struct PublicLibrary;

impl Collector for PublicLibrary {
    fn source_id(&self) -> &'static str {
        SOURCE_ID
    }

    fn source_name(&self) -> &'static str {
        SOURCE_NAME
    }

    fn source_url(&self) -> &'static str {
        URL
    }

    fn collect(&self, today: NaiveDate) -> Result<Vec<Event>> {
        let mut events = Vec::new();

        for date in base::weekly(today, Weekday::Wed, 26) {
            events.push(
                base::build_event(
                    self,
                    "Children's Story Time",
                    base::at(date, 10, 30),
                    base::anchor_url(URL, &base::dated_anchor("story-time", date)),
                    MAIN_BRANCH,
                    "Weekly story time for children ages 3-6. Songs, stories, and crafts.",
                    Some(Category::Family),
                )
                .with_cost("Free")
                .with_age_restrictions("Ages 3-6"),
            );
        }

        for date in base::monthly(today, Weekday::Mon, 1, base::WINDOW_MONTHS) {
            events.push(base::build_event(
                self,
                &format!("Adult Book Club - {}", date.format("%B %Y")),
                base::at(date, 18, 30),
                base::anchor_url(URL, &base::dated_anchor("book-club", date)),
                MAIN_BRANCH,
                "Monthly book discussion group featuring contemporary and classic literature.",
                Some(Category::Education),
            ));
        }

        for date in base::weekly(today, Weekday::Fri, 26).into_iter().step_by(2) {
            events.push(
                base::build_event(
                    self,
                    "Digital Literacy Workshop",
                    base::at(date, 14, 0),
                    base::anchor_url(URL, &base::dated_anchor("digital-literacy", date)),
                    "Waltham Public Library - Computer Lab",
                    "Learn basic computer skills including internet browsing, email, and online safety.",
                    Some(Category::Education),
                )
                .with_registration_required(true),
            );
        }

        for date in base::monthly(today, Weekday::Thu, 3, base::WINDOW_MONTHS) {
            events.push(
                base::build_event(
                    self,
                    "Teen Gaming & Pizza Night",
                    base::at(date, 17, 0),
                    base::anchor_url(URL, &base::dated_anchor("teen-night", date)),
                    "Waltham Public Library - Teen Room",
                    "Video games, board games, and pizza for teens ages 13-18.",
                    Some(Category::Family),
                )
                .with_age_restrictions("Ages 13-18"),
            );
        }

        Ok(events)
    }
}
