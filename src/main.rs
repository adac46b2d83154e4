use clap::Parser;
use std::path::PathBuf;
use std::process;

use wikivoyage2kml::fetch;
use wikivoyage2kml::geocode::{self, Nominatim};
use wikivoyage2kml::kml::KmlBuilder;
use wikivoyage2kml::output;
use wikivoyage2kml::poi::{Coordinates, PointOfInterest};
use wikivoyage2kml::wikitext;

/// Create KML/KMZ marker files for offline map apps from Wikivoyage articles.
///
/// Examples:
///   wv2kml Paris
///   wv2kml "New York" --kmz
///   wv2kml Sevilla -l es --add
#[derive(Parser)]
#[command(name = "wv2kml", version, about, long_about = None)]
struct Cli {
    /// Destination name, as titled on Wikivoyage
    destination: String,

    /// Language of the Wikivoyage article
    #[arg(long, short = 'l', default_value = "en")]
    language: String,

    /// Save output in KMZ format
    #[arg(long, short = 'z')]
    kmz: bool,

    /// Prompt for coordinates of markers geocoding could not place
    #[arg(long, short = 'a')]
    add: bool,
}

fn main() {
    let cli = Cli::parse();

    // ── Fetch ───────────────────────────────────────────────────

    let article = fetch::fetch_wikitext(&cli.destination, &cli.language).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        process::exit(1);
    });

    // ── Extract ─────────────────────────────────────────────────

    let extraction = wikitext::extract(&article);
    if extraction.skipped > 0 {
        eprintln!("Skipped {} listing(s) without a name", extraction.skipped);
    }
    let mut points = extraction.points;
    if points.is_empty() {
        eprintln!(
            "Error: no listings found in the '{}' article",
            cli.destination
        );
        process::exit(1);
    }
    eprintln!("Extracted {} listing(s)", points.len());

    // ── Geocode the gaps ────────────────────────────────────────

    let outcome = geocode::fill_missing(&mut points, &cli.destination, &Nominatim::new());
    for &index in &outcome.resolved {
        eprintln!("Located '{}' via geocoding", points[index].name);
    }
    for &index in &outcome.unresolved {
        eprintln!("No location found for '{}'", points[index].name);
    }

    if cli.add {
        for index in outcome.unresolved.iter().copied() {
            if let Some(coordinates) = prompt_for_coordinates(&points[index]) {
                points[index].coordinates = Some(coordinates);
                points[index].location_added = true;
            }
        }
    }

    // ── Build and save ──────────────────────────────────────────

    let builder = KmlBuilder::new(&cli.destination, &points);
    let placed = builder.placed();
    let kml = builder.build();
    eprintln!(
        "{} of {} marker(s) placed for destination: {}",
        placed,
        points.len(),
        cli.destination
    );

    let extension = if cli.kmz { "kmz" } else { "kml" };
    let path = PathBuf::from(format!(
        "{}.{}",
        output::output_basename(&cli.destination, &cli.language),
        extension
    ));
    let written = if cli.kmz {
        output::write_kmz(&kml, &path)
    } else {
        output::write_kml(&kml, &path)
    };
    written.unwrap_or_else(|e| {
        eprintln!("Error: could not write '{}': {}", path.display(), e);
        process::exit(1);
    });
    eprintln!("Saved {}", path.display());
}

/// Ask the user for manual coordinates. Blank input skips the marker;
/// anything else must parse as "lat,lon" within geographic range.
fn prompt_for_coordinates(point: &PointOfInterest) -> Option<Coordinates> {
    eprintln!();
    eprintln!("Marker '{}' has no location.", point.name);
    if let Some(address) = &point.address {
        eprintln!("  Address: {}", address);
    }
    loop {
        eprint!("  Enter coordinates as 'lat,lon' (blank to skip): ");
        let mut line = String::new();
        match std::io::stdin().read_line(&mut line) {
            Ok(0) | Err(_) => return None, // EOF or broken stdin
            Ok(_) => {}
        }
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        match parse_manual_coordinates(line) {
            Some(coordinates) => return Some(coordinates),
            None => eprintln!("  Invalid coordinates, expected e.g. '48.86,2.34'"),
        }
    }
}

fn parse_manual_coordinates(input: &str) -> Option<Coordinates> {
    let (lat, lon) = input.split_once(',')?;
    Coordinates::new(lat.trim().parse().ok()?, lon.trim().parse().ok()?)
}
