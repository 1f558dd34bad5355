use anyhow::Result;
use chrono::{Datelike, Duration, NaiveDate, Weekday};

use super::base;
use super::Collector;
use crate::models::{Category, Event};

const URL: &str = "https://www.city.waltham.ma.us/calendar";
const SOURCE_ID: &str = "waltham_common";
const SOURCE_NAME: &str = "Waltham Common";

const CONCERT_BANDS: [(&str, &str); 8] = [
    ("Sea Breeze", "Italian classics and contemporary hits"),
    ("Cactus Gang", "Country and western favorites"),
    ("Billy & the Jets", "Elton John tribute band"),
    ("American Legion Band", "Patriotic and traditional music"),
    ("The Harmonics", "Classic rock and pop covers"),
    ("Waltham Community Orchestra", "Classical and pops selections"),
    ("The River Bend Band", "Folk and acoustic favorites"),
    ("Swing Time", "Big band and jazz standards"),
];

enum SpecialDate {
    DaysAhead(i64),
    Annual { month: u32, day: u32 },
}

struct Special {
    name: &'static str,
    when: SpecialDate,
    description: &'static str,
    category: Category,
}

const SPECIALS: [Special; 5] = [
    Special {
        name: "Waltham Lions Club Annual Car Show",
        when: SpecialDate::DaysAhead(16),
        description: "Classic car show featuring vintage automobiles, food vendors, and family activities.",
        category: Category::Community,
    },
    Special {
        name: "Memorial Day Ceremony",
        when: SpecialDate::Annual { month: 5, day: 25 },
        description: "Annual Memorial Day ceremony honoring fallen veterans. Public invited.",
        category: Category::Community,
    },
    Special {
        name: "Fourth of July Celebration",
        when: SpecialDate::Annual { month: 7, day: 4 },
        description: "Independence Day celebration with food, music, and evening fireworks display.",
        category: Category::Community,
    },
    Special {
        name: "Harvest Festival",
        when: SpecialDate::DaysAhead(45),
        description: "Fall community festival with pumpkin carving, crafts, and seasonal activities.",
        category: Category::Family,
    },
    Special {
        name: "Winter Holiday Tree Lighting",
        when: SpecialDate::Annual { month: 12, day: 1 },
        description: "Annual tree lighting ceremony with hot cocoa, caroling, and visits from Santa.",
        category: Category::Family,
    },
];

pub struct WalthamCommon;

impl Collector for WalthamCommon {
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

        // Market season ends with November.
        for date in base::weekly(today, Weekday::Sat, 26)
            .into_iter()
            .filter(|date| date.month() < 12)
        {
            events.push(
                base::build_event(
                    self,
                    "Waltham Farmers' Market",
                    base::at(date, 9, 30),
                    base::anchor_url(URL, &base::dated_anchor("farmers-market", date)),
                    "Waltham Common Parking Lot",
                    "Weekly farmers' market featuring local vendors, fresh produce, artisan goods, and live music. Rain or shine!",
                    Some(Category::Community),
                )
                .with_cost("Free to attend"),
            );
        }

        for (week, date) in base::weekly(today, Weekday::Thu, 12).into_iter().enumerate() {
            if !(6..=8).contains(&date.month()) {
                continue;
            }
            let (band, style) = CONCERT_BANDS[week % CONCERT_BANDS.len()];
            events.push(
                base::build_event(
                    self,
                    &format!("Free Concert on the Common: {band}"),
                    base::at(date, 19, 0),
                    base::anchor_url(URL, &base::dated_anchor("concert", date)),
                    "Waltham Common Bandstand",
                    &format!("Free outdoor concert featuring {band} - {style}. Bring chairs and blankets!"),
                    Some(Category::Music),
                )
                .with_cost("Free"),
            );
        }

        for date in base::weekly(today, Weekday::Wed, 20)
            .into_iter()
            .filter(|date| (4..=9).contains(&date.month()))
        {
            events.push(
                base::build_event(
                    self,
                    "Free Outdoor Zumba on the Common",
                    base::at(date, 19, 0),
                    base::anchor_url(URL, &base::dated_anchor("zumba", date)),
                    "Waltham Common Lawn",
                    "Free outdoor Zumba fitness class for all skill levels. No registration required - just show up!",
                    Some(Category::Sports),
                )
                .with_cost("Free"),
            );
        }

        for special in &SPECIALS {
            let date = match special.when {
                SpecialDate::DaysAhead(days) => Some(today + Duration::days(days)),
                SpecialDate::Annual { month, day } => base::next_annual(today, month, day),
            };
            let Some(date) = date.filter(|date| base::within_window(today, *date)) else {
                continue;
            };
            events.push(base::build_event(
                self,
                special.name,
                base::at(date, 18, 0),
                base::anchor_url(URL, &base::slugify(special.name)),
                "Waltham Common",
                special.description,
                Some(special.category),
            ));
        }

        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(events: &[Event], prefix: &str) -> usize {
        events.iter().filter(|e| e.name.starts_with(prefix)).count()
    }

    #[test]
    fn summer_schedule_includes_concerts_and_zumba() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 2).expect("valid date");
        let events = WalthamCommon.collect(today).expect("collect");

        // June 5 .. August 21: twelve Thursdays, all in season.
        assert_eq!(names(&events, "Free Concert on the Common"), 12);
        // April-September Wednesdays between June 4 and September 24.
        assert_eq!(names(&events, "Free Outdoor Zumba"), 17);
        // Saturdays from June 7 through November 29.
        assert_eq!(names(&events, "Waltham Farmers' Market"), 26);
        assert_eq!(names(&events, "Fourth of July Celebration"), 1);
        assert_eq!(names(&events, "Memorial Day Ceremony"), 0);
        assert_eq!(names(&events, "Winter Holiday Tree Lighting"), 1);
    }

    #[test]
    fn winter_schedule_has_no_outdoor_series() {
        let today = NaiveDate::from_ymd_opt(2025, 12, 3).expect("valid date");
        let events = WalthamCommon.collect(today).expect("collect");
        assert_eq!(names(&events, "Free Concert on the Common"), 0);
        assert!(events
            .iter()
            .filter(|e| e.name.starts_with("Free Outdoor Zumba") || e.name.contains("Market"))
            .filter_map(|e| e.occurs_at)
            .all(|at| at.month() != 12));
        // Twenty Wednesdays from December 3 only reach into April.
        assert_eq!(names(&events, "Free Outdoor Zumba"), 3);
        assert_eq!(names(&events, "Memorial Day Ceremony"), 1);
        assert_eq!(names(&events, "Harvest Festival"), 1);
    }
}
