//! Coordinate fill pass for extracted points.
//!
//! The extractor leaves `coordinates` absent whenever the article lacked a
//! usable lat/long pair. This module resolves those gaps through a
//! pluggable lookup service and reports what is still missing, so the
//! caller can involve a human for the remainder.

pub mod nominatim;

pub use nominatim::Nominatim;

use crate::poi::{Coordinates, PointOfInterest};

/// A coordinate lookup service.
///
/// Failures are indistinguishable from misses on purpose: a per-record
/// problem must never abort the pass.
pub trait GeocodeLookup {
    fn lookup(&self, query: &str) -> Option<Coordinates>;
}

/// Indices into the processed slice, split by outcome.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct GeocodeOutcome {
    pub resolved: Vec<usize>,
    pub unresolved: Vec<usize>,
}

/// Fill in coordinates for every point that has none.
///
/// Points that already carry coordinates are never touched. The query
/// prefers the point's address, falling back to its name, both suffixed
/// with the destination for disambiguation.
pub fn fill_missing(
    points: &mut [PointOfInterest],
    destination: &str,
    lookup: &dyn GeocodeLookup,
) -> GeocodeOutcome {
    let mut outcome = GeocodeOutcome::default();
    for (index, point) in points.iter_mut().enumerate() {
        if point.coordinates.is_some() {
            continue;
        }
        match lookup.lookup(&point.geocode_query(destination)) {
            Some(coordinates) => {
                point.coordinates = Some(coordinates);
                point.location_added = true;
                outcome.resolved.push(index);
            }
            None => outcome.unresolved.push(index),
        }
    }
    outcome
}
