//! KML serialization of categorized points.
//!
//! Output is deterministic: style blocks and folders follow the canonical
//! category order, placemarks keep their source order within a folder, and
//! only categories with at least one placed point appear at all. Points
//! without coordinates cannot be put on a map and are left out.

use crate::poi::{Category, PointOfInterest};

const KML_NAMESPACE: &str = "http://www.opengis.net/kml/2.2";
const ICON_BASE_URL: &str = "https://omaps.app/placemarks";

/// Marker color per category, matching the placemark icon sets offline
/// map applications ship.
fn marker_color(category: Category) -> &'static str {
    match category {
        Category::See => "green",
        Category::Do => "teal",
        Category::Go => "brown",
        Category::Buy => "pink",
        Category::Eat => "red",
        Category::Drink => "yellow",
        Category::Sleep => "blue",
        Category::Other => "gray",
    }
}

/// Serializes a set of points into a KML document string.
pub struct KmlBuilder<'a> {
    name: &'a str,
    points: &'a [PointOfInterest],
}

impl<'a> KmlBuilder<'a> {
    pub fn new(name: &'a str, points: &'a [PointOfInterest]) -> Self {
        Self { name, points }
    }

    /// Number of points that will actually appear in the document.
    pub fn placed(&self) -> usize {
        self.points.iter().filter(|p| p.coordinates.is_some()).count()
    }

    pub fn build(&self) -> String {
        let categories: Vec<Category> = Category::ALL
            .into_iter()
            .filter(|category| {
                self.points
                    .iter()
                    .any(|p| p.category == *category && p.coordinates.is_some())
            })
            .collect();

        let mut xml = String::new();
        xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        xml.push_str(&format!("<kml xmlns=\"{}\">\n", KML_NAMESPACE));
        xml.push_str("  <Document>\n");
        xml.push_str(&format!("    <name>{}</name>\n", escape_xml(self.name)));
        for &category in &categories {
            push_style(&mut xml, category);
        }
        for &category in &categories {
            self.push_folder(&mut xml, category);
        }
        xml.push_str("  </Document>\n");
        xml.push_str("</kml>\n");
        xml
    }

    fn push_folder(&self, xml: &mut String, category: Category) {
        xml.push_str("    <Folder>\n");
        xml.push_str(&format!(
            "      <name>{}</name>\n",
            escape_xml(category.label())
        ));
        for point in self.points.iter().filter(|p| p.category == category) {
            let Some(coordinates) = point.coordinates else {
                continue;
            };
            xml.push_str("      <Placemark>\n");
            xml.push_str(&format!(
                "        <name>{}</name>\n",
                escape_xml(&point.name)
            ));
            xml.push_str(&format!(
                "        <description>{}</description>\n",
                escape_xml(&describe(point))
            ));
            xml.push_str(&format!("        <styleUrl>#{}</styleUrl>\n", category.id()));
            xml.push_str("        <Point>\n");
            // KML convention: longitude before latitude.
            xml.push_str(&format!(
                "          <coordinates>{},{},0</coordinates>\n",
                coordinates.lon, coordinates.lat
            ));
            xml.push_str("        </Point>\n");
            xml.push_str("      </Placemark>\n");
        }
        xml.push_str("    </Folder>\n");
    }
}

fn push_style(xml: &mut String, category: Category) {
    xml.push_str(&format!("    <Style id=\"{}\">\n", category.id()));
    xml.push_str("      <IconStyle>\n");
    xml.push_str("        <Icon>\n");
    xml.push_str(&format!(
        "          <href>{}/placemark-{}.png</href>\n",
        ICON_BASE_URL,
        marker_color(category)
    ));
    xml.push_str("        </Icon>\n");
    xml.push_str("      </IconStyle>\n");
    xml.push_str("    </Style>\n");
}

fn anchor(href: &str, text: &str) -> String {
    format!("<a href='{}'>{}</a>", href, text)
}

fn bold(text: &str) -> String {
    format!("<b>{}</b>", text)
}

/// Assemble the description HTML shown in the placemark balloon. The
/// markup is escaped as XML text on the way into the document.
fn describe(point: &PointOfInterest) -> String {
    let mut lines = Vec::new();
    if point.location_added {
        lines.push(format!(
            "{}Location has been added automatically, marker may not be correct",
            bold("WARNING: ")
        ));
    }
    if let Some(url) = &point.url {
        lines.push(format!("{}{}", bold("URL: "), anchor(url, url)));
    }
    if let Some(phone) = &point.phone {
        lines.push(format!(
            "{}{}",
            bold("Phone number: "),
            anchor(&format!("tel:{}", phone), phone)
        ));
    }
    if let Some(email) = &point.email {
        lines.push(format!(
            "{}{}",
            bold("Email: "),
            anchor(&format!("mailto:{}", email), email)
        ));
    }
    if let Some(address) = &point.address {
        lines.push(format!("{}{}", bold("Address: "), address));
    }
    if let Some(directions) = &point.directions {
        lines.push(format!("{}{}", bold("Directions: "), directions));
    }
    if let Some(hours) = &point.hours {
        lines.push(format!("{}{}", bold("Opening hours: "), hours));
    }
    if let Some(description) = &point.description {
        lines.push(bold("Place description:"));
        lines.push(description.clone());
    }
    lines.join("<br/>")
}

/// Escape special XML characters in text content.
fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
