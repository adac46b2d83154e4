//! Listing-template extraction from raw wiki markup.
//!
//! Recognizes the Wikivoyage listing family — `{{see|...}}`, `{{do|...}}`
//! and friends, plus the generic `{{listing|type=...}}` / `{{marker}}`
//! forms — and turns each invocation into a [`PointOfInterest`]. Every
//! other template in the markup is ignored; a malformed listing is skipped,
//! never fatal.

use crate::poi::{Category, Coordinates, PointOfInterest};
use std::collections::HashMap;

/// Result of an extraction pass.
#[derive(Debug, Default)]
pub struct Extraction {
    /// Points in source order.
    pub points: Vec<PointOfInterest>,
    /// Listing templates dropped for a missing name.
    pub skipped: usize,
}

enum ListingParse {
    Point(Box<PointOfInterest>),
    MissingName,
    NotAListing,
}

/// Extract all listing templates from an article's wikitext.
///
/// Output order matches appearance order in the source. Listings nested
/// inside non-listing templates are still found.
pub fn extract(wikitext: &str) -> Extraction {
    let mut extraction = Extraction::default();
    let mut rest = wikitext;

    while let Some(start) = rest.find("{{") {
        let body_start = start + 2;
        let Some(body_len) = matching_close(&rest[body_start..]) else {
            break; // unbalanced braces, nothing more to find
        };
        let body = &rest[body_start..body_start + body_len];

        match parse_listing(body) {
            ListingParse::Point(point) => {
                extraction.points.push(*point);
                rest = &rest[body_start + body_len + 2..];
            }
            ListingParse::MissingName => {
                extraction.skipped += 1;
                rest = &rest[body_start + body_len + 2..];
            }
            // Not a listing: step inside so nested listings are not lost.
            ListingParse::NotAListing => rest = &rest[body_start..],
        }
    }

    extraction
}

/// Byte offset of the `}}` closing the template whose body starts at the
/// beginning of `s`, accounting for nested `{{ }}` pairs.
fn matching_close(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut depth = 0usize;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'{' && bytes.get(i + 1) == Some(&b'{') {
            depth += 1;
            i += 2;
        } else if bytes[i] == b'}' && bytes.get(i + 1) == Some(&b'}') {
            if depth == 0 {
                return Some(i);
            }
            depth -= 1;
            i += 2;
        } else {
            i += 1;
        }
    }
    None
}

fn parse_listing(body: &str) -> ListingParse {
    let parts = split_arguments(body);
    let template_name = parts[0].trim().to_ascii_lowercase();

    let mut fields: HashMap<String, String> = HashMap::new();
    for part in &parts[1..] {
        let Some((key, value)) = part.split_once('=') else {
            continue; // positional argument, listings use named ones
        };
        let value = clean_text(value);
        if !value.is_empty() {
            fields.insert(key.trim().to_ascii_lowercase(), value);
        }
    }

    let category = match template_name.as_str() {
        "listing" | "marker" => Category::from_listing_type(fields.get("type").map(String::as_str)),
        other => match Category::from_template_name(other) {
            Some(category) => category,
            None => return ListingParse::NotAListing,
        },
    };

    let Some(name) = fields.remove("name") else {
        return ListingParse::MissingName;
    };

    let mut point = PointOfInterest::new(name, category);
    point.coordinates = parse_coordinates(&fields);
    point.description = fields.remove("content");
    point.address = fields.remove("address");
    point.directions = fields.remove("directions");
    point.phone = fields.remove("phone");
    point.email = fields.remove("email");
    point.url = fields.remove("url");
    point.hours = fields.remove("hours");

    ListingParse::Point(Box::new(point))
}

/// A lat/long pair is only accepted when both fields parse as floats in
/// geographic range; anything else leaves the point unplaced.
fn parse_coordinates(fields: &HashMap<String, String>) -> Option<Coordinates> {
    let lat: f64 = fields.get("lat")?.parse().ok()?;
    let lon: f64 = fields.get("long")?.parse().ok()?;
    Coordinates::new(lat, lon)
}

/// Split a template body on top-level `|`, leaving nested templates and
/// wiki links intact.
fn split_arguments(body: &str) -> Vec<&str> {
    let bytes = body.as_bytes();
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'{' | b'[' if bytes.get(i + 1) == Some(&bytes[i]) => {
                depth += 1;
                i += 2;
            }
            b'}' | b']' if bytes.get(i + 1) == Some(&bytes[i]) => {
                depth = depth.saturating_sub(1);
                i += 2;
            }
            b'|' if depth == 0 => {
                parts.push(&body[start..i]);
                start = i + 1;
                i += 1;
            }
            _ => i += 1,
        }
    }
    parts.push(&body[start..]);
    parts
}

/// Strip wiki decoration down to plain text: links keep their label,
/// bold/italic quote runs and HTML comments disappear, nested templates
/// are dropped entirely, whitespace collapses.
fn clean_text(raw: &str) -> String {
    let text = strip_comments(raw);
    let text = strip_templates(&text);
    let text = strip_links(&text);
    let text = text.replace("'''", "").replace("''", "");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn strip_comments(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("<!--") {
        out.push_str(&rest[..start]);
        match rest[start..].find("-->") {
            Some(end) => rest = &rest[start + end + 3..],
            None => return out,
        }
    }
    out.push_str(rest);
    out
}

fn strip_templates(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        match matching_close(&rest[start + 2..]) {
            Some(len) => rest = &rest[start + 2 + len + 2..],
            None => return out,
        }
    }
    out.push_str(rest);
    out
}

fn strip_links(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find('[') {
        out.push_str(&rest[..start]);
        let after = &rest[start..];
        if let Some(inner) = after.strip_prefix("[[") {
            if let Some(end) = inner.find("]]") {
                // [[target|label]] keeps the label, [[target]] the target
                let target = &inner[..end];
                let label = target.rsplit('|').next().unwrap_or(target);
                out.push_str(label.trim());
                rest = &inner[end + 2..];
                continue;
            }
        } else if let Some(inner) = after.strip_prefix('[') {
            if let Some(end) = inner.find(']') {
                // [url label] keeps the label, [url] the url
                let target = &inner[..end];
                let label = match target.split_once(' ') {
                    Some((_, label)) => label,
                    None => target,
                };
                out.push_str(label.trim());
                rest = &inner[end + 1..];
                continue;
            }
        }
        // unterminated bracket, keep verbatim
        out.push_str(after);
        return out;
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_extract_full_listing() {
        let wikitext = "Some prose.\n{{see\n| name=Louvre | url=https://www.louvre.fr\n\
                        | address=Rue de Rivoli | phone=+33 1 40 20 50 50\n\
                        | hours=9:00-18:00 | lat=48.8606 | long=2.3376\n\
                        | content=The world's most visited museum.\n}}\nMore prose.";
        let extraction = extract(wikitext);

        assert_eq!(extraction.points.len(), 1);
        assert_eq!(extraction.skipped, 0);

        let point = &extraction.points[0];
        assert_eq!(point.name, "Louvre");
        assert_eq!(point.category, Category::See);
        assert_eq!(point.address.as_deref(), Some("Rue de Rivoli"));
        assert_eq!(point.url.as_deref(), Some("https://www.louvre.fr"));
        assert_eq!(point.hours.as_deref(), Some("9:00-18:00"));
        assert_eq!(
            point.description.as_deref(),
            Some("The world's most visited museum.")
        );
        let coords = point.coordinates.expect("coordinates present");
        assert_relative_eq!(coords.lat, 48.8606);
        assert_relative_eq!(coords.lon, 2.3376);
        assert!(!point.location_added);
    }

    #[test]
    fn test_missing_name_is_skipped_and_counted() {
        let extraction = extract("{{eat|address=Main St|lat=1.0|long=2.0}}");
        assert!(extraction.points.is_empty());
        assert_eq!(extraction.skipped, 1);
    }

    #[test]
    fn test_unknown_template_is_silently_ignored() {
        let extraction = extract("{{pagebanner|Paris banner.jpg}}\n{{routebox|foo|bar}}");
        assert!(extraction.points.is_empty());
        assert_eq!(extraction.skipped, 0);
    }

    #[test]
    fn test_generic_listing_uses_type_field() {
        let extraction = extract("{{listing|type=eat|name=Chez Marie}}");
        assert_eq!(extraction.points[0].category, Category::Eat);
    }

    #[test]
    fn test_marker_without_type_falls_back_to_other() {
        let extraction = extract("{{marker|name=Trailhead}}");
        assert_eq!(extraction.points[0].category, Category::Other);
    }

    #[test]
    fn test_unparsable_latitude_leaves_point_unplaced() {
        let extraction = extract("{{see|name=Foo|lat=north|long=2.0}}");
        assert_eq!(extraction.points.len(), 1);
        assert!(extraction.points[0].coordinates.is_none());
    }

    #[test]
    fn test_out_of_range_coordinates_left_absent() {
        let extraction = extract("{{see|name=Foo|lat=95.0|long=2.0}}");
        assert!(extraction.points[0].coordinates.is_none());
    }

    #[test]
    fn test_partial_coordinates_left_absent() {
        let extraction = extract("{{see|name=Foo|lat=48.0}}");
        assert!(extraction.points[0].coordinates.is_none());
    }

    #[test]
    fn test_source_order_is_preserved() {
        let wikitext = "{{sleep|name=Hotel B}} text {{see|name=Museum A}} {{eat|name=Cafe C}}";
        let extraction = extract(wikitext);
        let names: Vec<&str> = extraction
            .points
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, ["Hotel B", "Museum A", "Cafe C"]);
    }

    #[test]
    fn test_wiki_links_are_stripped_from_content() {
        let extraction =
            extract("{{see|name=Abbey|content=Near the [[Seine River|Seine]], see [[Notre-Dame]].}}");
        assert_eq!(
            extraction.points[0].description.as_deref(),
            Some("Near the Seine, see Notre-Dame.")
        );
    }

    #[test]
    fn test_external_links_and_quotes_are_stripped() {
        let extraction = extract(
            "{{do|name=Walk|content=A '''great''' stroll, see [https://example.org the map].}}",
        );
        assert_eq!(
            extraction.points[0].description.as_deref(),
            Some("A great stroll, see the map.")
        );
    }

    #[test]
    fn test_nested_template_in_content_is_dropped() {
        let extraction = extract("{{see|name=Tower|content=Open daily. {{dead link|2020}} Worth it.}}");
        assert_eq!(
            extraction.points[0].description.as_deref(),
            Some("Open daily. Worth it.")
        );
    }

    #[test]
    fn test_html_comment_is_dropped() {
        let extraction = extract("{{see|name=Gate|content=Old gate.<!-- verify hours -->}}");
        assert_eq!(extraction.points[0].description.as_deref(), Some("Old gate."));
    }

    #[test]
    fn test_listing_nested_inside_other_template_is_found() {
        let extraction = extract("{{mapframe|content={{see|name=Plaza|lat=1.0|long=2.0}}}}");
        assert_eq!(extraction.points.len(), 1);
        assert_eq!(extraction.points[0].name, "Plaza");
    }

    #[test]
    fn test_empty_fields_count_as_absent() {
        let extraction = extract("{{see|name=Spot|address=|content= }}");
        let point = &extraction.points[0];
        assert!(point.address.is_none());
        assert!(point.description.is_none());
    }

    #[test]
    fn test_unbalanced_braces_do_not_loop() {
        let extraction = extract("{{see|name=Broken");
        assert!(extraction.points.is_empty());
    }

    #[test]
    fn test_mixed_placed_and_unplaced_listings() {
        let extraction = extract("{{see|name=Louvre|lat=48.86|long=2.34}}\n{{do|name=Bad Entry}}");
        assert_eq!(extraction.points.len(), 2);
        assert!(extraction.points[0].coordinates.is_some());
        assert!(extraction.points[1].coordinates.is_none());
    }
}
