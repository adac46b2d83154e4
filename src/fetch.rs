//! Article retrieval from the Wikivoyage MediaWiki API.

use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;

const USER_AGENT: &str = "wikivoyage2kml/0.1 (marker file generator)";

/// Fatal fetch failures; any of these aborts the run.
#[derive(Debug)]
pub enum FetchError {
    Network(String),
    NotFound { destination: String, language: String },
    InvalidResponse(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network(msg) => write!(f, "Network error: {}", msg),
            Self::NotFound {
                destination,
                language,
            } => write!(
                f,
                "Page for '{}' does not exist on https://{}.wikivoyage.org/",
                destination, language
            ),
            Self::InvalidResponse(msg) => write!(f, "Invalid API response: {}", msg),
        }
    }
}

impl std::error::Error for FetchError {}

#[derive(Deserialize)]
struct QueryResponse {
    query: QueryBody,
}

#[derive(Deserialize)]
struct QueryBody {
    pages: HashMap<String, Page>,
}

#[derive(Deserialize)]
struct Page {
    /// The API marks nonexistent pages with an empty "missing" member.
    #[serde(default)]
    missing: Option<String>,
    #[serde(default)]
    revisions: Vec<Revision>,
}

#[derive(Deserialize)]
struct Revision {
    #[serde(rename = "*")]
    content: String,
}

/// Fetch the current wikitext of a destination article.
pub fn fetch_wikitext(destination: &str, language: &str) -> Result<String, FetchError> {
    let url = format!("https://{}.wikivoyage.org/w/api.php", language);
    let response = ureq::get(&url)
        .query("action", "query")
        .query("format", "json")
        .query("titles", destination)
        .query("prop", "revisions")
        .query("rvprop", "content")
        .set("User-Agent", USER_AGENT)
        .call()
        .map_err(|e| FetchError::Network(e.to_string()))?;

    let parsed: QueryResponse = response
        .into_json()
        .map_err(|e| FetchError::InvalidResponse(e.to_string()))?;

    wikitext_from(parsed, destination, language)
}

fn wikitext_from(
    response: QueryResponse,
    destination: &str,
    language: &str,
) -> Result<String, FetchError> {
    // The query names a single title, so the pages map has a single entry.
    let page = response
        .query
        .pages
        .into_values()
        .next()
        .ok_or_else(|| FetchError::InvalidResponse("no pages in response".into()))?;

    if page.missing.is_some() {
        return Err(FetchError::NotFound {
            destination: destination.to_string(),
            language: language.to_string(),
        });
    }

    page.revisions
        .into_iter()
        .next()
        .map(|revision| revision.content)
        .ok_or_else(|| FetchError::NotFound {
            destination: destination.to_string(),
            language: language.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> QueryResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_wikitext_from_existing_page() {
        let response = parse(
            r#"{"query": {"pages": {"1234": {
                "pageid": 1234,
                "title": "Paris",
                "revisions": [{"*": "{{see|name=Louvre}}"}]
            }}}}"#,
        );
        let wikitext = wikitext_from(response, "Paris", "en").unwrap();
        assert_eq!(wikitext, "{{see|name=Louvre}}");
    }

    #[test]
    fn test_wikitext_from_missing_page() {
        let response = parse(
            r#"{"query": {"pages": {"-1": {
                "title": "Nowhereville",
                "missing": ""
            }}}}"#,
        );
        let err = wikitext_from(response, "Nowhereville", "en").unwrap_err();
        assert!(matches!(err, FetchError::NotFound { .. }));
        assert!(err.to_string().contains("Nowhereville"));
        assert!(err.to_string().contains("en.wikivoyage.org"));
    }

    #[test]
    fn test_wikitext_from_page_without_revisions() {
        let response = parse(
            r#"{"query": {"pages": {"99": {"title": "Stub"}}}}"#,
        );
        let err = wikitext_from(response, "Stub", "en").unwrap_err();
        assert!(matches!(err, FetchError::NotFound { .. }));
    }
}
