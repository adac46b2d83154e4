//! Wikivoyage destination articles → KML/KMZ marker files.
//!
//! A destination article's listing templates become placemarks grouped by
//! category. Listings the article does not place get their coordinates
//! through Nominatim geocoding (or a human, interactively), and the result
//! serializes into a deterministic KML document for offline map apps.

pub mod fetch;
pub mod geocode;
pub mod kml;
pub mod output;
pub mod poi;
pub mod wikitext;

pub use poi::{Category, Coordinates, PointOfInterest};
