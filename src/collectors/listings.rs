//! Sources that publish a short, hand-curated list of upcoming events. Each
//! listing is placed a fixed number of days after the collection date.

use anyhow::Result;
use chrono::NaiveDate;

use super::base;
use super::Collector;
use crate::models::{Category, Event};

pub struct Listing {
    pub name: &'static str,
    pub days_from_now: i64,
    pub hour: u32,
    pub minute: u32,
    pub location: &'static str,
    pub description: &'static str,
    /// `None` leaves classification to keyword inference.
    pub category: Option<Category>,
}

pub struct StaticListings {
    id: &'static str,
    name: &'static str,
    url: &'static str,
    /// Entry `i` is published at `{url_prefix}{i}`.
    url_prefix: &'static str,
    entries: &'static [Listing],
}

impl Collector for StaticListings {
    fn source_id(&self) -> &'static str {
        self.id
    }

    fn source_name(&self) -> &'static str {
        self.name
    }

    fn source_url(&self) -> &'static str {
        self.url
    }

    fn collect(&self, today: NaiveDate) -> Result<Vec<Event>> {
        Ok(self
            .entries
            .iter()
            .enumerate()
            .map(|(i, listing)| {
                base::build_event(
                    self,
                    listing.name,
                    base::days_from(today, listing.days_from_now, listing.hour, listing.minute),
                    format!("{}{i}", self.url_prefix),
                    listing.location,
                    listing.description,
                    listing.category,
                )
            })
            .collect())
    }
}

pub const CHARLES_RIVER_MUSEUM: StaticListings = StaticListings {
    id: "charles_river_museum",
    name: "Charles River Museum",
    url: "https://www.charlesrivermuseum.org/events",
    url_prefix: "https://www.charlesrivermuseum.org/events#event_",
    entries: &[
        Listing {
            name: "Waltham Repair Cafe",
            days_from_now: 9,
            hour: 10,
            minute: 0,
            location: "Charles River Museum, 154 Moody St",
            description: "Bring broken items to be repaired by volunteer fixers. Free community event.",
            category: Some(Category::Community),
        },
        Listing {
            name: "Industrial History Walking Tour",
            days_from_now: 16,
            hour: 14,
            minute: 0,
            location: "Charles River Museum (starts here)",
            description: "Guided tour of Waltham's industrial heritage sites along the Charles River.",
            category: Some(Category::Education),
        },
        Listing {
            name: "Family Workshop: Build a Simple Machine",
            days_from_now: 23,
            hour: 11,
            minute: 0,
            location: "Charles River Museum",
            description: "Hands-on workshop for families to build and learn about simple machines.",
            category: Some(Category::Family),
        },
        Listing {
            name: "Craft Beer for a Cause Fundraiser",
            days_from_now: 47,
            hour: 18,
            minute: 0,
            location: "Charles River Museum",
            description: "Annual fundraising event with local craft beer, food, and live music. 21+ event.",
            category: Some(Category::Community),
        },
    ],
};

pub const BRANDEIS: StaticListings = StaticListings {
    id: "brandeis",
    name: "Brandeis University",
    url: "https://www.brandeis.edu/events/",
    url_prefix: "https://www.brandeis.edu/events/#event_",
    entries: &[
        Listing {
            name: "Rose Art Museum Exhibition Opening",
            days_from_now: 6,
            hour: 17,
            minute: 0,
            location: "Rose Art Museum, Brandeis University",
            description: "Opening reception for new contemporary art exhibition. Free and open to public.",
            category: Some(Category::Arts),
        },
        Listing {
            name: "Public Lecture: Climate Change and Policy",
            days_from_now: 13,
            hour: 19,
            minute: 0,
            location: "Brandeis University Campus",
            description: "Distinguished lecture series presentation open to the community.",
            category: Some(Category::Education),
        },
        Listing {
            name: "Brandeis Jazz Ensemble Concert",
            days_from_now: 20,
            hour: 20,
            minute: 0,
            location: "Slosberg Music Center, Brandeis",
            description: "Student jazz ensemble performance featuring contemporary and classic pieces.",
            category: Some(Category::Music),
        },
    ],
};

pub const RECREATION: StaticListings = StaticListings {
    id: "waltham_recreation",
    name: "Waltham Recreation",
    url: "https://www.city.waltham.ma.us/recreation-department",
    url_prefix: "https://www.city.waltham.ma.us/recreation-department#program_",
    entries: &[
        Listing {
            name: "Youth Soccer Registration",
            days_from_now: 4,
            hour: 10,
            minute: 0,
            location: "Waltham Recreation Office",
            description: "Registration opens for fall youth soccer league ages 5-14.",
            category: Some(Category::Sports),
        },
        Listing {
            name: "Senior Fitness Classes",
            days_from_now: 2,
            hour: 9,
            minute: 0,
            location: "Veterans Memorial Building",
            description: "Low-impact fitness classes for seniors 55+. Drop-in welcome.",
            category: Some(Category::Sports),
        },
        Listing {
            name: "Family Movie Night in the Park",
            days_from_now: 11,
            hour: 20,
            minute: 0,
            location: "Prospect Hill Park",
            description: "Free outdoor movie screening for families. Bring blankets and snacks.",
            category: Some(Category::Family),
        },
        Listing {
            name: "Adult Pickleball Tournament",
            days_from_now: 18,
            hour: 9,
            minute: 0,
            location: "Waltham Tennis Courts",
            description: "Double elimination tournament for adult pickleball players. Registration required.",
            category: Some(Category::Sports),
        },
    ],
};

pub const MEETUP: StaticListings = StaticListings {
    id: "meetup",
    name: "Meetup",
    url: "https://www.meetup.com/find/?location=us--ma--waltham",
    url_prefix: "https://www.meetup.com/find/?location=us--ma--waltham#meetup_",
    entries: &[
        Listing {
            name: "Waltham Hiking Group: Forest Trail Walk",
            days_from_now: 8,
            hour: 9,
            minute: 0,
            location: "Prospect Hill Park Trailhead",
            description: "Easy 2-mile hike through local forest trails. All skill levels welcome.",
            category: None,
        },
        Listing {
            name: "Tech Professionals Networking",
            days_from_now: 15,
            hour: 18,
            minute: 30,
            location: "Moody Street Cafe",
            description: "Monthly networking event for software developers and tech professionals.",
            category: None,
        },
        Listing {
            name: "Board Game Night",
            days_from_now: 10,
            hour: 19,
            minute: 0,
            location: "Waltham Public Library",
            description: "Weekly board game meetup. Games provided or bring your own.",
            category: Some(Category::General),
        },
        Listing {
            name: "Photography Walk: Downtown Waltham",
            days_from_now: 22,
            hour: 10,
            minute: 0,
            location: "Waltham Common (meeting point)",
            description: "Explore downtown Waltham with fellow photographers. All camera types welcome.",
            category: Some(Category::Arts),
        },
    ],
};

pub const EVENTBRITE: StaticListings = StaticListings {
    id: "eventbrite",
    name: "Eventbrite",
    url: "https://www.eventbrite.com/d/ma--waltham/events/",
    url_prefix: "https://eventbrite.com/e/waltham-event-",
    entries: &[
        Listing {
            name: "Waltham Farmers Market",
            days_from_now: 3,
            hour: 9,
            minute: 30,
            location: "Waltham Common Parking Lot",
            description: "Weekly farmers market featuring local vendors, fresh produce, artisan goods, and live music.",
            category: Some(Category::Community),
        },
        Listing {
            name: "Small Business Workshop: Digital Marketing",
            days_from_now: 10,
            hour: 18,
            minute: 30,
            location: "Waltham Chamber of Commerce",
            description: "Learn digital marketing strategies for small businesses. Registration required.",
            category: Some(Category::Business),
        },
        Listing {
            name: "Wine Tasting & Art Show",
            days_from_now: 17,
            hour: 19,
            minute: 0,
            location: "Moody Street Gallery",
            description: "Evening event featuring local wines and artwork from regional artists.",
            category: Some(Category::Arts),
        },
        Listing {
            name: "Charity 5K Run/Walk",
            days_from_now: 24,
            hour: 8,
            minute: 0,
            location: "Charles River Path (start/finish at Waltham Common)",
            description: "Annual charity run to benefit local food pantries. All fitness levels welcome.",
            category: Some(Category::Sports),
        },
    ],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listings_are_offset_from_the_collection_date() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 2).expect("valid date");
        let events = BRANDEIS.collect(today).expect("collect");
        assert_eq!(events.len(), 3);
        assert_eq!(
            events[0].occurs_at,
            NaiveDate::from_ymd_opt(2025, 6, 8).and_then(|d| d.and_hms_opt(17, 0, 0))
        );
        assert_eq!(events[2].source_url, "https://www.brandeis.edu/events/#event_2");
        assert!(events.iter().all(|e| e.source_name == "Brandeis University"));
    }

    #[test]
    fn unlabelled_listings_are_classified_by_keyword() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 2).expect("valid date");
        let events = MEETUP.collect(today).expect("collect");
        assert_eq!(events[0].category, Category::Outdoors);
        assert_eq!(events[1].category, Category::Business);
        assert_eq!(events[2].category, Category::General);
    }
}
