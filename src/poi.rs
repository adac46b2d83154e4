//! Core types for the marker pipeline.

use std::fmt;

/// Listing categories recognized in Wikivoyage articles.
///
/// Declaration order is the canonical output order: folders and style
/// blocks in the generated document always follow it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    See,
    Do,
    Go,
    Buy,
    Eat,
    Drink,
    Sleep,
    Other,
}

impl Category {
    /// Every category, in canonical order.
    pub const ALL: [Category; 8] = [
        Category::See,
        Category::Do,
        Category::Go,
        Category::Buy,
        Category::Eat,
        Category::Drink,
        Category::Sleep,
        Category::Other,
    ];

    /// Map a listing template name ("see", "do", ...) to its category.
    ///
    /// The generic `listing`/`marker` templates carry their category in a
    /// `type=` field instead — see [`Category::from_listing_type`].
    pub fn from_template_name(name: &str) -> Option<Category> {
        match name.trim().to_ascii_lowercase().as_str() {
            "see" => Some(Category::See),
            "do" => Some(Category::Do),
            "go" => Some(Category::Go),
            "buy" => Some(Category::Buy),
            "eat" => Some(Category::Eat),
            "drink" => Some(Category::Drink),
            "sleep" => Some(Category::Sleep),
            _ => None,
        }
    }

    /// Resolve the `type=` field of a generic `listing`/`marker` template.
    /// A missing or unrecognized type falls back to [`Category::Other`].
    pub fn from_listing_type(listing_type: Option<&str>) -> Category {
        listing_type
            .and_then(Category::from_template_name)
            .unwrap_or(Category::Other)
    }

    /// Stable lowercase identifier, used as the style id in KML output.
    pub fn id(&self) -> &'static str {
        match self {
            Category::See => "see",
            Category::Do => "do",
            Category::Go => "go",
            Category::Buy => "buy",
            Category::Eat => "eat",
            Category::Drink => "drink",
            Category::Sleep => "sleep",
            Category::Other => "other",
        }
    }

    /// Human-readable folder label.
    pub fn label(&self) -> &'static str {
        match self {
            Category::See => "See",
            Category::Do => "Do",
            Category::Go => "Go",
            Category::Buy => "Buy",
            Category::Eat => "Eat",
            Category::Drink => "Drink",
            Category::Sleep => "Sleep",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A validated geographic coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    /// Build a pair, rejecting non-finite values and anything outside the
    /// geographic range (latitude -90..90, longitude -180..180).
    pub fn new(lat: f64, lon: f64) -> Option<Coordinates> {
        if lat.is_finite()
            && lon.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lon)
        {
            Some(Coordinates { lat, lon })
        } else {
            None
        }
    }
}

/// One point of interest extracted from an article listing.
///
/// `name` is never empty — the extractor drops records without one.
/// `coordinates` stays absent until either the article, a geocoding
/// lookup, or manual input supplies a pair; fill passes never overwrite
/// a value that is already set.
#[derive(Debug, Clone)]
pub struct PointOfInterest {
    pub name: String,
    pub category: Category,
    pub description: Option<String>,
    pub address: Option<String>,
    pub directions: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub url: Option<String>,
    pub hours: Option<String>,
    pub coordinates: Option<Coordinates>,
    /// True when coordinates were filled in after extraction (geocoding or
    /// manual entry) instead of coming from the article itself.
    pub location_added: bool,
}

impl PointOfInterest {
    pub fn new(name: impl Into<String>, category: Category) -> Self {
        Self {
            name: name.into(),
            category,
            description: None,
            address: None,
            directions: None,
            phone: None,
            email: None,
            url: None,
            hours: None,
            coordinates: None,
            location_added: false,
        }
    }

    /// Query string for geocoding: the address when present, otherwise the
    /// name, suffixed with the destination for disambiguation.
    pub fn geocode_query(&self, destination: &str) -> String {
        match &self.address {
            Some(address) => format!("{}, {}", address, destination),
            None => format!("{}, {}", self.name, destination),
        }
    }
}
