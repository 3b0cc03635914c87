//! In-memory sample listings for local development.

use super::{BusinessQuery, BusinessStore, StoreResult};
use crate::models::Business;
use async_trait::async_trait;

/// Fixed five-listing store. Immutable after construction.
#[derive(Debug, Clone)]
pub struct SampleStore {
    businesses: Vec<Business>,
}

impl Default for SampleStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SampleStore {
    pub fn new() -> Self {
        Self::with_businesses(Self::sample_businesses())
    }

    /// Store over an arbitrary record set (tests, fixtures).
    pub fn with_businesses(businesses: Vec<Business>) -> Self {
        Self { businesses }
    }

    pub fn businesses(&self) -> &[Business] {
        &self.businesses
    }

    pub fn sample_businesses() -> Vec<Business> {
        vec![
            listing(Listing {
                id: "1",
                name: "Arctic Air Heating & Cooling",
                slug: "arctic-air-heating-cooling",
                address: "1234 Main St",
                city: ("Los Angeles", "los-angeles"),
                state: ("California", "california", "CA"),
                zip: "90001",
                phone: "(310) 555-0101",
                website: Some("https://arcticairhvac.com"),
                rating: 4.8,
                review_count: 247,
                categories: &["HVAC", "Air Conditioning", "Heating"],
                services: &["AC Repair", "Furnace Installation", "Duct Cleaning", "Emergency Service"],
                description: "Family-owned HVAC company serving Los Angeles since 2005. Specializing in residential and commercial heating and cooling systems.",
                coordinates: (34.0522, -118.2437),
                is_emergency: true,
                is_24hr: true,
            }),
            listing(Listing {
                id: "2",
                name: "SoCal Comfort Systems",
                slug: "socal-comfort-systems",
                address: "5678 Oak Ave",
                city: ("Los Angeles", "los-angeles"),
                state: ("California", "california", "CA"),
                zip: "90015",
                phone: "(323) 555-0202",
                website: Some("https://socalcomfort.com"),
                rating: 4.6,
                review_count: 189,
                categories: &["HVAC", "Air Conditioning"],
                services: &["AC Repair", "AC Installation", "Maintenance Plans"],
                description: "Top-rated HVAC contractor in Los Angeles providing reliable air conditioning and heating services for homes and businesses.",
                coordinates: (34.0407, -118.2668),
                is_emergency: false,
                is_24hr: false,
            }),
            listing(Listing {
                id: "3",
                name: "Lone Star HVAC Pros",
                slug: "lone-star-hvac-pros",
                address: "789 Commerce St",
                city: ("Houston", "houston"),
                state: ("Texas", "texas", "TX"),
                zip: "77001",
                phone: "(713) 555-0303",
                website: Some("https://lonestarhvac.com"),
                rating: 4.9,
                review_count: 312,
                categories: &["HVAC", "Heating", "Air Conditioning"],
                services: &["AC Repair", "Furnace Repair", "Heat Pump Installation", "24/7 Emergency"],
                description: "Houston's most trusted HVAC company. Licensed and insured technicians available 24/7 for all your heating and cooling needs.",
                coordinates: (29.7604, -95.3698),
                is_emergency: true,
                is_24hr: true,
            }),
            listing(Listing {
                id: "4",
                name: "Bayou Breeze Cooling",
                slug: "bayou-breeze-cooling",
                address: "456 Westheimer Rd",
                city: ("Houston", "houston"),
                state: ("Texas", "texas", "TX"),
                zip: "77006",
                phone: "(832) 555-0404",
                website: None,
                rating: 4.5,
                review_count: 98,
                categories: &["Air Conditioning", "HVAC"],
                services: &["AC Repair", "AC Installation", "Duct Cleaning"],
                description: "Affordable air conditioning services in the greater Houston area. Free estimates on all installations.",
                coordinates: (29.7430, -95.3934),
                is_emergency: false,
                is_24hr: false,
            }),
            listing(Listing {
                id: "5",
                name: "Windy City Climate Control",
                slug: "windy-city-climate-control",
                address: "321 Michigan Ave",
                city: ("Chicago", "chicago"),
                state: ("Illinois", "illinois", "IL"),
                zip: "60601",
                phone: "(312) 555-0505",
                website: Some("https://windycityclimate.com"),
                rating: 4.7,
                review_count: 201,
                categories: &["HVAC", "Heating", "Air Conditioning"],
                services: &["Furnace Repair", "Boiler Service", "AC Installation", "Emergency Heating"],
                description: "Chicago's go-to HVAC contractor for harsh winters and hot summers. Specializing in furnace repair and boiler services.",
                coordinates: (41.8781, -87.6298),
                is_emergency: true,
                is_24hr: false,
            }),
        ]
    }
}

struct Listing {
    id: &'static str,
    name: &'static str,
    slug: &'static str,
    address: &'static str,
    city: (&'static str, &'static str),
    state: (&'static str, &'static str, &'static str),
    zip: &'static str,
    phone: &'static str,
    website: Option<&'static str>,
    rating: f64,
    review_count: u32,
    categories: &'static [&'static str],
    services: &'static [&'static str],
    description: &'static str,
    coordinates: (f64, f64),
    is_emergency: bool,
    is_24hr: bool,
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn listing(l: Listing) -> Business {
    Business {
        id: l.id.to_string(),
        name: l.name.to_string(),
        slug: l.slug.to_string(),
        address: l.address.to_string(),
        city: l.city.0.to_string(),
        city_slug: l.city.1.to_string(),
        state: l.state.0.to_string(),
        state_slug: l.state.1.to_string(),
        state_abbr: l.state.2.to_string(),
        zip: l.zip.to_string(),
        phone: l.phone.to_string(),
        website: l.website.map(str::to_string),
        rating: l.rating,
        review_count: l.review_count,
        categories: owned(l.categories),
        services: owned(l.services),
        description: l.description.to_string(),
        image_url: None,
        latitude: Some(l.coordinates.0),
        longitude: Some(l.coordinates.1),
        is_emergency: l.is_emergency,
        is_24hr: l.is_24hr,
        created_at: "2024-01-01".to_string(),
        updated_at: "2024-01-01".to_string(),
    }
}

#[async_trait]
impl BusinessStore for SampleStore {
    async fn select(&self, query: &BusinessQuery) -> StoreResult<Vec<Business>> {
        let mut rows: Vec<Business> = self
            .businesses
            .iter()
            .filter(|b| query.matches(b))
            .cloned()
            .collect();

        if query.sort.is_some() {
            rows.sort_by(|a, b| query.compare(a, b));
        }
        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }

        tracing::debug!("sample store returned {} rows for {:?}", rows.len(), query);
        Ok(rows)
    }

    async fn count(&self, query: &BusinessQuery) -> StoreResult<u64> {
        Ok(self.businesses.iter().filter(|b| query.matches(b)).count() as u64)
    }

    fn name(&self) -> &str {
        "sample"
    }
}
