//! Domain shapes exposed to the presentation layer.
//!
//! `Business` mirrors one row of the `businesses` table. `StateInfo` and
//! `CityInfo` are derived aggregate views, recomputed on every query.

use serde::{Deserialize, Deserializer, Serialize};

/// One HVAC service provider listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Business {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    pub slug: String,
    pub address: String,
    pub city: String,
    pub city_slug: String,
    pub state: String,
    pub state_slug: String,
    pub state_abbr: String,
    pub zip: String,
    pub phone: String,
    #[serde(default)]
    pub website: Option<String>,
    pub rating: f64,
    pub review_count: u32,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub services: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub is_emergency: bool,
    #[serde(default)]
    pub is_24hr: bool,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

/// Latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// A row that breaks one of the listing invariants.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvariantViolation {
    #[error("rating {0} is outside 0.0..=5.0")]
    RatingOutOfRange(f64),

    #[error("latitude and longitude must be present together")]
    PartialCoordinates,

    #[error("slug is empty")]
    EmptySlug,
}

impl Business {
    /// Canonical path of the listing page.
    pub fn path(&self) -> String {
        format!("/{}/{}/{}", self.state_slug, self.city_slug, self.slug)
    }

    /// Both coordinates, or nothing.
    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinates { latitude, longitude }),
            _ => None,
        }
    }

    /// Whether consumers may emit aggregate-rating data for this listing.
    pub fn has_reviews(&self) -> bool {
        self.review_count > 0
    }

    /// "No reviews" / "1 review" / "N reviews".
    pub fn review_label(&self) -> String {
        match self.review_count {
            0 => "No reviews".to_string(),
            1 => "1 review".to_string(),
            n => format!("{} reviews", n),
        }
    }

    /// Rating rounded to the nearest whole star, for 5-star widgets.
    pub fn rounded_stars(&self) -> u8 {
        self.rating.round().clamp(0.0, 5.0) as u8
    }

    /// "★★★★☆" for a 4.4 rating.
    pub fn star_glyphs(&self) -> String {
        let filled = self.rounded_stars() as usize;
        format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
    }

    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        if !(0.0..=5.0).contains(&self.rating) {
            return Err(InvariantViolation::RatingOutOfRange(self.rating));
        }
        if self.latitude.is_some() != self.longitude.is_some() {
            return Err(InvariantViolation::PartialCoordinates);
        }
        if self.slug.is_empty() || self.city_slug.is_empty() || self.state_slug.is_empty() {
            return Err(InvariantViolation::EmptySlug);
        }
        Ok(())
    }
}

/// Businesses per state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateInfo {
    pub name: String,
    pub slug: String,
    pub abbr: String,
    pub business_count: u64,
}

/// Businesses per city, with parent state identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CityInfo {
    pub name: String,
    pub slug: String,
    pub state: String,
    pub state_slug: String,
    pub state_abbr: String,
    pub business_count: u64,
}

/// Tables keyed by integer id hand them back as JSON numbers.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Uint(u64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Int(n) => n.to_string(),
        Raw::Uint(n) => n.to_string(),
    })
}
