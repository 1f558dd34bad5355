use anyhow::Result;
use chrono::{Duration, NaiveDate, Weekday};

use super::base;
use super::Collector;
use crate::models::{Category, Event};

const URL: &str = "https://waltham-events.local/food-events/";
const SOURCE_ID: &str = "waltham_food_events";
const SOURCE_NAME: &str = "Waltham Food Events";

enum Schedule {
    Weekly { weekday: Weekday, weeks: u32 },
    /// Every thirty days starting `first_in_days` out.
    Monthly { first_in_days: i64, months: i64 },
    Once { days_from_now: i64 },
}

struct FoodListing {
    name: &'static str,
    location: &'static str,
    description: &'static str,
    cost: &'static str,
    organizer: &'static str,
    contact_info: &'static str,
    registration_required: bool,
    age_restrictions: &'static str,
    start_hour: u32,
    schedule: Schedule,
}

impl FoodListing {
    fn dates(&self, today: NaiveDate) -> Vec<NaiveDate> {
        match self.schedule {
            Schedule::Weekly { weekday, weeks } => base::weekly(today, weekday, weeks),
            Schedule::Monthly {
                first_in_days,
                months,
            } => (0..months)
                .map(|month| today + Duration::days(first_in_days + 30 * month))
                .collect(),
            Schedule::Once { days_from_now } => vec![today + Duration::days(days_from_now)],
        }
    }
}

const LISTINGS: [FoodListing; 15] = [
    FoodListing {
        name: "Saturday Farmers Market - Fresh & Local",
        location: "Waltham Common",
        description: "Weekly farmers market featuring fresh local produce, artisanal foods, handmade baked goods, local honey, seasonal vegetables, and specialty gourmet items from area farmers.",
        cost: "Free to attend",
        organizer: "Waltham Farmers Market Association",
        contact_info: "info@walthamfarmersmarket.org | (781) 555-0123",
        registration_required: false,
        age_restrictions: "All ages welcome",
        start_hour: 9,
        schedule: Schedule::Weekly {
            weekday: Weekday::Sat,
            weeks: 24,
        },
    },
    FoodListing {
        name: "Moody Street Culinary Festival",
        location: "Moody Street, Waltham",
        description: "Annual street festival celebrating Waltham's diverse culinary scene. Food trucks, restaurant pop-ups, cooking demonstrations, wine tastings, and live music.",
        cost: "Free admission, food varies $5-15",
        organizer: "Waltham Tourism Board",
        contact_info: "events@walthamtourism.org | (781) 555-0456",
        registration_required: false,
        age_restrictions: "21+ for alcohol tastings",
        start_hour: 11,
        schedule: Schedule::Once { days_from_now: 45 },
    },
    FoodListing {
        name: "Farm-to-Table Dinner Experience",
        location: "Bentley University, Waltham",
        description: "Farm-to-table dining experience featuring locally sourced ingredients from Massachusetts farms. Five-course meal with wine pairings and chef meet-and-greet.",
        cost: "$95 per person",
        organizer: "Bentley Culinary Arts Program",
        contact_info: "culinary@bentley.edu | (781) 555-0789",
        registration_required: true,
        age_restrictions: "21+ (alcohol served)",
        start_hour: 18,
        schedule: Schedule::Once { days_from_now: 28 },
    },
    FoodListing {
        name: "Italian Pasta Making Masterclass",
        location: "Waltham Community Kitchen",
        description: "Hands-on cooking class in traditional Italian pasta techniques. Make fresh fettuccine, ravioli, and classic sauces from scratch.",
        cost: "$75 per person",
        organizer: "Chef Marco Romano",
        contact_info: "classes@walthamcooking.com | (781) 555-0321",
        registration_required: true,
        age_restrictions: "Ages 12+ (under 16 with adult)",
        start_hour: 14,
        schedule: Schedule::Once { days_from_now: 21 },
    },
    FoodListing {
        name: "Wine & Artisan Cheese Tasting",
        location: "Historic Waltham Watch Building",
        description: "Curated evening of international wines paired with artisanal cheeses, led by a certified sommelier.",
        cost: "$45 per person",
        organizer: "Waltham Wine Society",
        contact_info: "tastings@walthamwine.org | (781) 555-0654",
        registration_required: true,
        age_restrictions: "21+ only",
        start_hour: 19,
        schedule: Schedule::Once { days_from_now: 35 },
    },
    FoodListing {
        name: "Monthly Food Truck Extravaganza",
        location: "Prospect Hill Park, Waltham",
        description: "Monthly gathering of regional food trucks offering diverse cuisines. Family-friendly atmosphere with picnic seating.",
        cost: "Free admission, food $8-20",
        organizer: "Waltham Parks & Recreation",
        contact_info: "parks@waltham.gov | (781) 555-0987",
        registration_required: false,
        age_restrictions: "All ages welcome",
        start_hour: 11,
        schedule: Schedule::Monthly {
            first_in_days: 15,
            months: 6,
        },
    },
    FoodListing {
        name: "Sustainable Cooking & Nutrition Workshop",
        location: "Waltham Public Library",
        description: "Eco-friendly cooking techniques, reducing food waste, and using seasonal ingredients. Interactive hands-on session.",
        cost: "$25 per person",
        organizer: "Green Living Collective",
        contact_info: "workshops@greenliving.org | (781) 555-0246",
        registration_required: true,
        age_restrictions: "Ages 16+ (teens with adult)",
        start_hour: 13,
        schedule: Schedule::Once { days_from_now: 42 },
    },
    FoodListing {
        name: "Craft Beer & Local Food Pairing Night",
        location: "Waltham Brewing Company",
        description: "Local craft beer tastings paired with dishes from Waltham restaurants. Limited to 40 guests.",
        cost: "$65 per person",
        organizer: "Waltham Brewing Company",
        contact_info: "events@walthambrewing.com | (781) 555-0135",
        registration_required: true,
        age_restrictions: "21+ only",
        start_hour: 18,
        schedule: Schedule::Once { days_from_now: 56 },
    },
    FoodListing {
        name: "Community Garden Harvest Celebration",
        location: "Waltham Community Gardens",
        description: "Harvest tastings, organic gardening workshops, seed exchanges, and farm-fresh lunch. Kids activities included.",
        cost: "Free, lunch $12",
        organizer: "Waltham Community Garden Association",
        contact_info: "garden@walthamcommunity.org | (781) 555-0468",
        registration_required: false,
        age_restrictions: "All ages welcome",
        start_hour: 10,
        schedule: Schedule::Once { days_from_now: 72 },
    },
    FoodListing {
        name: "Authentic Middle Eastern Food Night",
        location: "Waltham Cultural Center",
        description: "Cultural dining experience with traditional cooking demonstrations and family-style dining.",
        cost: "$35 per person, $15 kids",
        organizer: "Waltham Cultural Exchange",
        contact_info: "culture@walthamcenter.org | (781) 555-0579",
        registration_required: true,
        age_restrictions: "All ages welcome",
        start_hour: 17,
        schedule: Schedule::Once { days_from_now: 63 },
    },
    FoodListing {
        name: "Artisan Sourdough Bread Workshop",
        location: "Local Bakery, Moody Street",
        description: "Sourdough starter cultivation, bread shaping, and the science behind fermentation. Take home starter and a fresh loaf.",
        cost: "$55 per person",
        organizer: "Artisan Bread Academy",
        contact_info: "bread@artisanacademy.com | (781) 555-0691",
        registration_required: true,
        age_restrictions: "Ages 14+ (teens with adult)",
        start_hour: 15,
        schedule: Schedule::Once { days_from_now: 38 },
    },
    FoodListing {
        name: "Waltham Restaurant Week Celebration",
        location: "Various Restaurants, Waltham",
        description: "Week-long celebration with special prix fixe menus at participating Waltham restaurants.",
        cost: "Prix fixe menus $25-45",
        organizer: "Waltham Restaurant Association",
        contact_info: "info@walthamrestaurants.org | (781) 555-0802",
        registration_required: false,
        age_restrictions: "Varies by restaurant",
        start_hour: 17,
        schedule: Schedule::Once { days_from_now: 84 },
    },
    FoodListing {
        name: "Coffee Cupping & Roasting Workshop",
        location: "Waltham Coffee Roasters",
        description: "Bean origins, roasting processes, cupping techniques, and brewing methods. Take home freshly roasted beans.",
        cost: "$40 per person",
        organizer: "Waltham Coffee Roasters",
        contact_info: "learn@walthamcoffee.com | (781) 555-0913",
        registration_required: true,
        age_restrictions: "Ages 16+",
        start_hour: 10,
        schedule: Schedule::Once { days_from_now: 49 },
    },
    FoodListing {
        name: "Outdoor Farm Dinner Under the Stars",
        location: "Historic Waltham Estate Gardens",
        description: "Six-course meal prepared with ingredients from local farms, served in historic gardens with live acoustic music.",
        cost: "$125 per person",
        organizer: "Farm to Fork Events",
        contact_info: "dinners@farmtofork.org | (781) 555-0124",
        registration_required: true,
        age_restrictions: "18+ preferred (outdoor setting)",
        start_hour: 18,
        schedule: Schedule::Once { days_from_now: 91 },
    },
    FoodListing {
        name: "Healthy Meal Prep & Nutrition Class",
        location: "Waltham Community Center",
        description: "Meal preparation strategies and budget-friendly healthy cooking tips from registered dietitians.",
        cost: "$30 per person",
        organizer: "Waltham Health & Wellness",
        contact_info: "nutrition@walthamhealth.org | (781) 555-0235",
        registration_required: true,
        age_restrictions: "Ages 18+",
        start_hour: 12,
        schedule: Schedule::Once { days_from_now: 77 },
    },
];

pub struct FoodEvents;

impl Collector for FoodEvents {
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
        for listing in &LISTINGS {
            let slug = base::slugify(listing.name);
            for date in listing.dates(today) {
                events.push(
                    base::build_event(
                        self,
                        listing.name,
                        base::at(date, listing.start_hour, 0),
                        format!("{URL}{}", base::dated_anchor(&slug, date)),
                        listing.location,
                        listing.description,
                        Some(Category::Food),
                    )
                    .with_cost(listing.cost)
                    .with_organizer(listing.organizer)
                    .with_contact_info(listing.contact_info)
                    .with_registration_required(listing.registration_required)
                    .with_age_restrictions(listing.age_restrictions),
                );
            }
        }
        Ok(events)
    }
}
