use anyhow::Result;
use chrono::{Datelike, NaiveDate, Weekday};

use super::base;
use super::Collector;
use crate::models::{Category, Event};

const URL: &str = "https://www.city.waltham.ma.us/calendar";
const SOURCE_ID: &str = "city_of_waltham";
const SOURCE_NAME: &str = "City of Waltham";
const CITY_HALL: &str = "Waltham City Hall, 610 Main St";

pub struct CityHall;

impl Collector for CityHall {
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

        for date in base::monthly(today, Weekday::Tue, 1, base::WINDOW_MONTHS) {
            events.push(base::build_event(
                self,
                &format!("City Council Meeting - {}", date.format("%B %Y")),
                base::at(date, 19, 0),
                base::anchor_url(URL, &base::dated_anchor("council", date)),
                CITY_HALL,
                "Monthly city council meeting open to the public. Agenda available online.",
                Some(Category::Community),
            ));
        }

        for date in base::monthly(today, Weekday::Wed, 2, base::WINDOW_MONTHS) {
            events.push(base::build_event(
                self,
                &format!("Planning Board Meeting - {}", date.format("%B %Y")),
                base::at(date, 18, 30),
                base::anchor_url(URL, &base::dated_anchor("planning-board", date)),
                CITY_HALL,
                "Public meeting of the planning board to discuss development proposals.",
                Some(Category::Community),
            ));
        }

        // Forums run in odd-numbered months, third Thursday.
        for date in base::monthly(today, Weekday::Thu, 3, base::WINDOW_MONTHS)
            .into_iter()
            .filter(|date| date.month() % 2 == 1)
        {
            events.push(base::build_event(
                self,
                &format!("Community Forum - {}", date.format("%B %Y")),
                base::at(date, 18, 0),
                base::anchor_url(URL, &base::dated_anchor("community-forum", date)),
                CITY_HALL,
                "Community forum for residents to discuss local issues with city officials.",
                Some(Category::Community),
            ));
        }

        Ok(events)
    }
}
