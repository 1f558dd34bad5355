use std::fmt;

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Text form used for every persisted and serialized timestamp: ISO-8601,
/// naive local time, no offset.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

pub fn format_timestamp(value: &NaiveDateTime) -> String {
    value.format(TIMESTAMP_FORMAT).to_string()
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Category {
    #[default]
    General,
    Family,
    Music,
    Outdoors,
    Sports,
    Arts,
    Food,
    Business,
    Education,
    Community,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Category::General,
        Category::Family,
        Category::Music,
        Category::Outdoors,
        Category::Sports,
        Category::Arts,
        Category::Food,
        Category::Business,
        Category::Education,
        Category::Community,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::General => "general",
            Category::Family => "family",
            Category::Music => "music",
            Category::Outdoors => "outdoors",
            Category::Sports => "sports",
            Category::Arts => "arts",
            Category::Food => "food",
            Category::Business => "business",
            Category::Education => "education",
            Category::Community => "community",
        }
    }

    /// Exact wire-name match; no trimming or case folding.
    pub fn lookup(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == value)
    }

    /// Tolerant of case and surrounding whitespace, `None` for anything
    /// outside the enumerated set.
    pub fn try_parse(value: &str) -> Option<Self> {
        let wanted = value.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == wanted)
    }

    /// Lenient lookup used at the storage and wire boundary: unknown or empty
    /// values fall back to `General`.
    pub fn parse(value: &str) -> Self {
        Self::try_parse(value).unwrap_or_default()
    }

    /// Keyword classifier for sources that do not label their listings.
    /// First matching group wins.
    pub fn infer(title: &str, description: &str) -> Self {
        const RULES: [(Category, &[&str]); 9] = [
            (Category::Family, &["family", "kids", "children", "playground"]),
            (Category::Music, &["music", "concert", "band", "jazz", "rock"]),
            (Category::Outdoors, &["outdoor", "park", "hiking", "nature"]),
            (Category::Arts, &["art", "gallery", "exhibition", "museum"]),
            (Category::Food, &["food", "restaurant", "dining", "market"]),
            (Category::Business, &["business", "networking", "entrepreneur"]),
            (Category::Education, &["education", "workshop", "class", "seminar"]),
            (Category::Community, &["community", "meeting", "council"]),
            (Category::Sports, &["sport", "game", "athletic", "fitness"]),
        ];

        let text = format!("{title} {description}").to_lowercase();
        RULES
            .iter()
            .find(|(_, words)| words.iter().any(|word| text.contains(word)))
            .map(|(category, _)| *category)
            .unwrap_or_default()
    }
}

impl From<String> for Category {
    fn from(value: String) -> Self {
        Category::parse(&value)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Event {
    /// Assigned by the store; `None` until the event has been inserted.
    pub id: Option<i64>,
    pub name: String,
    pub occurs_at: Option<NaiveDateTime>,
    pub location: String,
    pub description: String,
    pub source_url: String, // dedup key
    pub source_name: String,
    pub category: Category,
    pub cost: String,
    pub organizer: String,
    pub contact_info: String,
    pub registration_required: bool,
    pub age_restrictions: String,
    /// Provisional until first insertion, where the store stamps it.
    pub created_at: NaiveDateTime,
}

impl Event {
    pub fn new(
        name: impl Into<String>,
        occurs_at: Option<NaiveDateTime>,
        source_url: impl Into<String>,
        source_name: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            occurs_at,
            location: String::new(),
            description: String::new(),
            source_url: source_url.into(),
            source_name: source_name.into(),
            category: Category::General,
            cost: String::new(),
            organizer: String::new(),
            contact_info: String::new(),
            registration_required: false,
            age_restrictions: String::new(),
            created_at: Local::now().naive_local(),
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    pub fn with_cost(mut self, cost: impl Into<String>) -> Self {
        self.cost = cost.into();
        self
    }

    pub fn with_organizer(mut self, organizer: impl Into<String>) -> Self {
        self.organizer = organizer.into();
        self
    }

    pub fn with_contact_info(mut self, contact_info: impl Into<String>) -> Self {
        self.contact_info = contact_info.into();
        self
    }

    pub fn with_registration_required(mut self, required: bool) -> Self {
        self.registration_required = required;
        self
    }

    pub fn with_age_restrictions(mut self, age_restrictions: impl Into<String>) -> Self {
        self.age_restrictions = age_restrictions.into();
        self
    }

    pub fn with_created_at(mut self, created_at: NaiveDateTime) -> Self {
        self.created_at = created_at;
        self
    }

    /// Stable, flat transport shape. Key names are part of the JSON API.
    pub fn to_record(&self) -> Map<String, Value> {
        let mut record = Map::new();
        record.insert("id".to_string(), json!(self.id));
        record.insert("name".to_string(), json!(self.name));
        record.insert(
            "date_time".to_string(),
            json!(self.occurs_at.as_ref().map(format_timestamp)),
        );
        record.insert("location".to_string(), json!(self.location));
        record.insert("description".to_string(), json!(self.description));
        record.insert("source_url".to_string(), json!(self.source_url));
        record.insert("source_name".to_string(), json!(self.source_name));
        record.insert("category".to_string(), json!(self.category.as_str()));
        record.insert("cost".to_string(), json!(self.cost));
        record.insert("organizer".to_string(), json!(self.organizer));
        record.insert("contact_info".to_string(), json!(self.contact_info));
        record.insert(
            "registration_required".to_string(),
            json!(self.registration_required),
        );
        record.insert("age_restrictions".to_string(), json!(self.age_restrictions));
        record.insert(
            "created_at".to_string(),
            json!(format_timestamp(&self.created_at)),
        );
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, day)
            .and_then(|date| date.and_hms_opt(hour, 0, 0))
            .expect("valid datetime")
    }

    #[test]
    fn unknown_categories_fall_back_to_general() {
        assert_eq!(Category::parse("music"), Category::Music);
        assert_eq!(Category::parse("  Outdoors "), Category::Outdoors);
        assert_eq!(Category::parse("karaoke"), Category::General);
        assert_eq!(Category::parse(""), Category::General);
        assert_eq!(Category::try_parse("karaoke"), None);
        assert_eq!(Category::lookup("food"), Some(Category::Food));
        assert_eq!(Category::lookup("Food"), None);

        let decoded: Category = serde_json::from_str("\"nonsense\"").expect("decode category");
        assert_eq!(decoded, Category::General);
        let encoded = serde_json::to_string(&Category::Arts).expect("encode category");
        assert_eq!(encoded, "\"arts\"");
    }

    #[test]
    fn infers_category_from_keywords() {
        assert_eq!(
            Category::infer("Story Time", "Songs for kids"),
            Category::Family
        );
        assert_eq!(
            Category::infer("Jazz Night", "Live band on the patio"),
            Category::Music
        );
        assert_eq!(
            Category::infer("Council Meeting", "Monthly public session"),
            Category::Community
        );
        assert_eq!(Category::infer("Trivia", "Bring friends"), Category::General);
    }

    #[test]
    fn record_uses_stable_keys_and_naive_timestamps() {
        let event = Event::new(
            "Waltham Farmers' Market",
            Some(at(7, 9)),
            "https://example.org/market",
            "Waltham Common",
        )
        .with_location("Waltham Common")
        .with_category(Category::Community)
        .with_registration_required(true)
        .with_created_at(at(1, 12));

        let record = event.to_record();
        assert_eq!(record.len(), 14);
        assert_eq!(record["id"], Value::Null);
        assert_eq!(record["date_time"], json!("2025-06-07T09:00:00"));
        assert_eq!(record["created_at"], json!("2025-06-01T12:00:00"));
        assert_eq!(record["category"], json!("community"));
        assert_eq!(record["registration_required"], json!(true));
        assert_eq!(record["cost"], json!(""));
    }

    #[test]
    fn undated_events_serialize_null_date() {
        let event = Event::new("Open Studio", None, "https://example.org/studio", "Meetup");
        assert_eq!(event.to_record()["date_time"], Value::Null);
    }
}
