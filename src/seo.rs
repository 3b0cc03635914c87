//! Search-engine metadata: page titles and descriptions, schema.org JSON-LD
//! for listing pages, and the XML sitemap.

use crate::models::Business;
use crate::regions::UsState;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};

pub const SITE_NAME: &str = "HVACLocate";

/// `<title>`, meta description and canonical URL of one page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageMeta {
    pub title: String,
    pub description: String,
    pub canonical: String,
}

pub fn home_meta(site_url: &str) -> PageMeta {
    PageMeta {
        title: format!("{} — Find Trusted HVAC Contractors Near You", SITE_NAME),
        description: "Compare top-rated heating, cooling, and air conditioning professionals \
                      across the United States."
            .to_string(),
        canonical: format!("{}/", site_url),
    }
}

pub fn state_meta(site_url: &str, state: &UsState) -> PageMeta {
    PageMeta {
        title: format!("HVAC Contractors in {} — Find Heating & Cooling Pros", state.name),
        description: format!(
            "Browse top-rated HVAC contractors in {}. Compare heating, cooling, and air \
             conditioning professionals by city with reviews and ratings.",
            state.name
        ),
        canonical: format!("{}/{}", site_url, state.slug),
    }
}

pub fn city_meta(site_url: &str, state: &UsState, city_name: &str, city_slug: &str) -> PageMeta {
    PageMeta {
        title: format!("HVAC Contractors in {}, {} — Top Rated Pros", city_name, state.abbr),
        description: format!(
            "Find the best HVAC contractors in {}, {}. Compare ratings, services, and prices \
             for heating and cooling professionals near you.",
            city_name, state.name
        ),
        canonical: format!("{}/{}/{}", site_url, state.slug, city_slug),
    }
}

pub fn listing_meta(site_url: &str, business: &Business) -> PageMeta {
    let services: Vec<&str> = business.services.iter().take(3).map(String::as_str).collect();
    PageMeta {
        title: format!(
            "{} — HVAC Contractor in {}, {}",
            business.name, business.city, business.state_abbr
        ),
        description: format!(
            "{} in {}, {}. {} star rating from {} reviews. Services: {}. Contact: {}.",
            business.name,
            business.city,
            business.state,
            business.rating,
            business.review_count,
            services.join(", "),
            business.phone
        ),
        canonical: format!("{}{}", site_url, business.path()),
    }
}

/// `query` is the trimmed search text, if any.
pub fn search_meta(site_url: &str, query: Option<&str>) -> PageMeta {
    match query {
        Some(q) => PageMeta {
            title: format!("Search results for \"{}\"", q),
            description: format!(
                "Find HVAC contractors matching \"{}\". Compare ratings, services, and prices.",
                q
            ),
            canonical: format!("{}/search?q={}", site_url, urlencoding::encode(q)),
        },
        None => PageMeta {
            title: "Search HVAC Contractors".to_string(),
            description: "Search for HVAC contractors by city, state, or company name."
                .to_string(),
            canonical: format!("{}/search", site_url),
        },
    }
}

/// "los-angeles" -> "Los Angeles". Used when a city has no listings to name it.
pub fn title_case_slug(slug: &str) -> String {
    slug.split('-')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

// ============================================================================
// JSON-LD
// ============================================================================

/// schema.org `HVACBusiness` for a listing page.
///
/// `aggregateRating` is present only when the listing has reviews.
pub fn structured_data(business: &Business, site_url: &str) -> Value {
    let mut data = json!({
        "@context": "https://schema.org",
        "@type": "HVACBusiness",
        "@id": format!("{}{}", site_url, business.path()),
        "name": business.name,
        "address": {
            "@type": "PostalAddress",
            "streetAddress": business.address,
            "addressLocality": business.city,
            "addressRegion": business.state_abbr,
            "postalCode": business.zip,
            "addressCountry": "US",
        },
        "telephone": business.phone,
    });

    let obj = match data.as_object_mut() {
        Some(obj) => obj,
        None => return data,
    };
    if let Some(ref website) = business.website {
        obj.insert("url".into(), json!(website));
    }
    if !business.description.is_empty() {
        obj.insert("description".into(), json!(business.description));
    }
    if let Some(ref image) = business.image_url {
        obj.insert("image".into(), json!(image));
    }
    if let Some(geo) = business.coordinates() {
        obj.insert(
            "geo".into(),
            json!({
                "@type": "GeoCoordinates",
                "latitude": geo.latitude,
                "longitude": geo.longitude,
            }),
        );
    }
    if business.is_24hr {
        obj.insert("openingHours".into(), json!("Mo-Su 00:00-23:59"));
    }
    if business.has_reviews() {
        obj.insert(
            "aggregateRating".into(),
            json!({
                "@type": "AggregateRating",
                "ratingValue": business.rating,
                "reviewCount": business.review_count,
            }),
        );
    }
    data
}

/// Serialized JSON-LD safe to embed inside `<script type="application/ld+json">`.
pub fn json_ld_script(data: &Value) -> String {
    data.to_string().replace("</", "<\\/")
}

// ============================================================================
// Sitemap
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeFrequency {
    Daily,
    Weekly,
    Monthly,
}

impl ChangeFrequency {
    fn as_str(self) -> &'static str {
        match self {
            ChangeFrequency::Daily => "daily",
            ChangeFrequency::Weekly => "weekly",
            ChangeFrequency::Monthly => "monthly",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SitemapEntry {
    pub url: String,
    pub last_modified: DateTime<Utc>,
    pub change_frequency: ChangeFrequency,
    pub priority: f32,
}

impl SitemapEntry {
    pub fn new(url: String, change_frequency: ChangeFrequency, priority: f32, now: DateTime<Utc>) -> Self {
        Self {
            url,
            last_modified: now,
            change_frequency,
            priority,
        }
    }
}

/// Home, every registry state, and each city and listing that exists.
///
/// `businesses` may arrive in any order; cities are deduplicated.
pub fn sitemap_entries(
    site_url: &str,
    states: &[UsState],
    businesses: &[Business],
    now: DateTime<Utc>,
) -> Vec<SitemapEntry> {
    let mut entries = vec![SitemapEntry::new(
        format!("{}/", site_url),
        ChangeFrequency::Daily,
        1.0,
        now,
    )];

    entries.extend(states.iter().map(|s| {
        SitemapEntry::new(
            format!("{}/{}", site_url, s.slug),
            ChangeFrequency::Weekly,
            0.8,
            now,
        )
    }));

    let mut cities: Vec<(&str, &str)> = businesses
        .iter()
        .map(|b| (b.state_slug.as_str(), b.city_slug.as_str()))
        .collect();
    cities.sort_unstable();
    cities.dedup();
    entries.extend(cities.into_iter().map(|(state, city)| {
        SitemapEntry::new(
            format!("{}/{}/{}", site_url, state, city),
            ChangeFrequency::Weekly,
            0.7,
            now,
        )
    }));

    entries.extend(businesses.iter().map(|b| {
        SitemapEntry::new(
            format!("{}{}", site_url, b.path()),
            ChangeFrequency::Monthly,
            0.6,
            now,
        )
    }));

    entries
}

pub fn sitemap_xml(entries: &[SitemapEntry]) -> String {
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );
    for entry in entries {
        xml.push_str(&format!(
            "  <url>\n    <loc>{}</loc>\n    <lastmod>{}</lastmod>\n    <changefreq>{}</changefreq>\n    <priority>{:.1}</priority>\n  </url>\n",
            xml_escape(&entry.url),
            entry.last_modified.format("%Y-%m-%d"),
            entry.change_frequency.as_str(),
            entry.priority
        ));
    }
    xml.push_str("</urlset>\n");
    xml
}

fn xml_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regions::state_by_slug;
    use crate::store::SampleStore;
    use chrono::TimeZone;

    const SITE: &str = "https://hvaclocate.com";

    fn lone_star() -> Business {
        SampleStore::sample_businesses()
            .into_iter()
            .find(|b| b.slug == "lone-star-hvac-pros")
            .unwrap()
    }

    #[test]
    fn title_cases_slugs() {
        assert_eq!(title_case_slug("los-angeles"), "Los Angeles");
        assert_eq!(title_case_slug("winston--salem"), "Winston Salem");
        assert_eq!(title_case_slug(""), "");
    }

    #[test]
    fn aggregate_rating_only_with_reviews() {
        let mut b = lone_star();
        let data = structured_data(&b, SITE);
        assert_eq!(data["aggregateRating"]["reviewCount"], 312);
        assert_eq!(data["address"]["addressRegion"], "TX");
        assert_eq!(data["openingHours"], "Mo-Su 00:00-23:59");
        assert_eq!(data["geo"]["@type"], "GeoCoordinates");

        b.review_count = 0;
        b.website = None;
        b.latitude = None;
        let data = structured_data(&b, SITE);
        assert!(data.get("aggregateRating").is_none());
        assert!(data.get("url").is_none());
        assert!(data.get("geo").is_none());
    }

    #[test]
    fn script_payload_cannot_close_its_tag() {
        let mut b = lone_star();
        b.name = "Evil</script><script>alert(1)".to_string();
        let script = json_ld_script(&structured_data(&b, SITE));
        assert!(!script.contains("</script>"));
    }

    #[test]
    fn listing_meta_mentions_first_three_services() {
        let meta = listing_meta(SITE, &lone_star());
        assert_eq!(meta.title, "Lone Star HVAC Pros — HVAC Contractor in Houston, TX");
        assert!(meta
            .description
            .contains("Services: AC Repair, Furnace Repair, Heat Pump Installation."));
        assert!(!meta.description.contains("24/7 Emergency"));
        assert_eq!(meta.canonical, "https://hvaclocate.com/texas/houston/lone-star-hvac-pros");
    }

    #[test]
    fn city_and_state_meta() {
        let texas = state_by_slug("texas").unwrap();
        assert_eq!(
            state_meta(SITE, texas).title,
            "HVAC Contractors in Texas — Find Heating & Cooling Pros"
        );
        let meta = city_meta(SITE, texas, "Houston", "houston");
        assert_eq!(meta.title, "HVAC Contractors in Houston, TX — Top Rated Pros");
        assert_eq!(meta.canonical, "https://hvaclocate.com/texas/houston");
    }

    #[test]
    fn sitemap_lists_states_cities_and_listings() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let texas = *state_by_slug("texas").unwrap();
        let businesses = SampleStore::sample_businesses();
        let entries = sitemap_entries(SITE, &[texas], &businesses, now);

        // home + 1 state + 3 cities + 5 listings
        assert_eq!(entries.len(), 10);
        assert_eq!(entries[0].url, "https://hvaclocate.com/");

        let xml = sitemap_xml(&entries);
        assert!(xml.contains("<loc>https://hvaclocate.com/texas/houston</loc>"));
        assert!(xml.contains("<lastmod>2024-06-01</lastmod>"));
        assert!(xml.contains("<priority>1.0</priority>"));
        assert_eq!(xml.matches("<url>").count(), 10);
    }
}
