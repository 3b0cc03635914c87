//! Region Registry
//!
//! Fixed table of U.S. states (plus the District of Columbia) used to validate
//! incoming state slugs before any store query, and to enumerate browse
//! targets for the home page and sitemap.

use serde::Serialize;

/// One registry entry: display name, two-letter abbreviation, URL slug.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UsState {
    pub name: &'static str,
    pub abbr: &'static str,
    pub slug: &'static str,
}

const fn entry(name: &'static str, abbr: &'static str, slug: &'static str) -> UsState {
    UsState { name, abbr, slug }
}

/// Alphabetical by name.
pub const US_STATES: &[UsState] = &[
    entry("Alabama", "AL", "alabama"),
    entry("Alaska", "AK", "alaska"),
    entry("Arizona", "AZ", "arizona"),
    entry("Arkansas", "AR", "arkansas"),
    entry("California", "CA", "california"),
    entry("Colorado", "CO", "colorado"),
    entry("Connecticut", "CT", "connecticut"),
    entry("Delaware", "DE", "delaware"),
    entry("District of Columbia", "DC", "district-of-columbia"),
    entry("Florida", "FL", "florida"),
    entry("Georgia", "GA", "georgia"),
    entry("Hawaii", "HI", "hawaii"),
    entry("Idaho", "ID", "idaho"),
    entry("Illinois", "IL", "illinois"),
    entry("Indiana", "IN", "indiana"),
    entry("Iowa", "IA", "iowa"),
    entry("Kansas", "KS", "kansas"),
    entry("Kentucky", "KY", "kentucky"),
    entry("Louisiana", "LA", "louisiana"),
    entry("Maine", "ME", "maine"),
    entry("Maryland", "MD", "maryland"),
    entry("Massachusetts", "MA", "massachusetts"),
    entry("Michigan", "MI", "michigan"),
    entry("Minnesota", "MN", "minnesota"),
    entry("Mississippi", "MS", "mississippi"),
    entry("Missouri", "MO", "missouri"),
    entry("Montana", "MT", "montana"),
    entry("Nebraska", "NE", "nebraska"),
    entry("Nevada", "NV", "nevada"),
    entry("New Hampshire", "NH", "new-hampshire"),
    entry("New Jersey", "NJ", "new-jersey"),
    entry("New Mexico", "NM", "new-mexico"),
    entry("New York", "NY", "new-york"),
    entry("North Carolina", "NC", "north-carolina"),
    entry("North Dakota", "ND", "north-dakota"),
    entry("Ohio", "OH", "ohio"),
    entry("Oklahoma", "OK", "oklahoma"),
    entry("Oregon", "OR", "oregon"),
    entry("Pennsylvania", "PA", "pennsylvania"),
    entry("Rhode Island", "RI", "rhode-island"),
    entry("South Carolina", "SC", "south-carolina"),
    entry("South Dakota", "SD", "south-dakota"),
    entry("Tennessee", "TN", "tennessee"),
    entry("Texas", "TX", "texas"),
    entry("Utah", "UT", "utah"),
    entry("Vermont", "VT", "vermont"),
    entry("Virginia", "VA", "virginia"),
    entry("Washington", "WA", "washington"),
    entry("West Virginia", "WV", "west-virginia"),
    entry("Wisconsin", "WI", "wisconsin"),
    entry("Wyoming", "WY", "wyoming"),
];

/// All registry entries in alphabetical order.
pub fn all_states() -> &'static [UsState] {
    US_STATES
}

/// Exact slug lookup. Callers treat `None` as not-found and skip the store.
pub fn state_by_slug(slug: &str) -> Option<&'static UsState> {
    US_STATES.iter().find(|s| s.slug == slug)
}

/// Two-letter abbreviation lookup, case-insensitive.
pub fn state_by_abbr(abbr: &str) -> Option<&'static UsState> {
    US_STATES.iter().find(|s| s.abbr.eq_ignore_ascii_case(abbr))
}
