//! Best-effort prose descriptions for a diagnosed disease.
//!
//! Nothing in here ever fails a diagnosis: every error is turned into one of
//! the fixed sentinel strings below.

use log::warn;
use regex::Regex;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use scraper::{Html, Selector};
use std::time::Duration;
use thiserror::Error;

pub const DESCRIPTION_UNAVAILABLE: &str = "Descripción no disponible.";
pub const PAGE_NOT_FOUND: &str = "La página de Wikipedia para esta enfermedad no está disponible.";
pub const FETCH_FAILED: &str = "No se pudo obtener la descripción desde Wikipedia.";
pub const CONNECTION_ERROR: &str = "Descripción no disponible debido a un error de conexión.";

const USER_AGENT: &str = "consulta-medica-bot";
const MIN_PARAGRAPH_CHARS: usize = 50;

pub trait Describe: Send + Sync {
    fn describe(&self, disease: &str) -> String;
}

/// Enrichment turned off.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDescription;

impl Describe for NoDescription {
    fn describe(&self, _disease: &str) -> String {
        DESCRIPTION_UNAVAILABLE.to_string()
    }
}

#[derive(Debug, Error)]
pub enum DescribeError {
    #[error("page not found")]
    NotFound,
    #[error("unexpected status {0}")]
    Status(u16),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
    #[error("invalid selector: {0}")]
    Selector(String),
    #[error("no paragraph with content")]
    NoContent,
}

impl DescribeError {
    pub fn sentinel(&self) -> &'static str {
        match self {
            Self::NotFound => PAGE_NOT_FOUND,
            Self::Status(_) => FETCH_FAILED,
            Self::Transport(_) => CONNECTION_ERROR,
            Self::Pattern(_) | Self::Selector(_) | Self::NoContent => DESCRIPTION_UNAVAILABLE,
        }
    }
}

/// Takes the first substantial paragraph of the encyclopedia article named
/// after the disease.
#[derive(Debug, Clone)]
pub struct WikipediaDescriber {
    client: Client,
    base_url: String,
    parenthetical: Regex,
    paragraph: Selector,
}

impl WikipediaDescriber {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, DescribeError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            parenthetical: Regex::new(r"\(.*?\)")?,
            paragraph: Selector::parse("p").map_err(|e| DescribeError::Selector(format!("{e:?}")))?,
        })
    }

    /// Article title for a disease name: parenthetical text removed, words
    /// joined with underscores.
    pub fn article_title(&self, disease: &str) -> String {
        self.parenthetical
            .replace_all(disease, "")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("_")
    }

    pub fn article_url(&self, disease: &str) -> String {
        format!("{}/{}", self.base_url, self.article_title(disease))
    }

    /// Text of the first `<p>` longer than 50 characters, markup removed
    /// and character references decoded.
    pub fn first_paragraph(&self, html: &str) -> Option<String> {
        let document = Html::parse_document(html);
        document.select(&self.paragraph).find_map(|p| {
            let text = p.text().collect::<String>();
            let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
            (text.chars().count() > MIN_PARAGRAPH_CHARS).then_some(text)
        })
    }

    fn fetch(&self, disease: &str) -> Result<String, DescribeError> {
        if self.article_title(disease).is_empty() {
            return Err(DescribeError::NoContent);
        }
        let response = self.client.get(self.article_url(disease)).send()?;
        match response.status() {
            StatusCode::OK => {
                let body = response.text()?;
                self.first_paragraph(&body).ok_or(DescribeError::NoContent)
            }
            StatusCode::NOT_FOUND => Err(DescribeError::NotFound),
            status => Err(DescribeError::Status(status.as_u16())),
        }
    }
}

impl Describe for WikipediaDescriber {
    fn describe(&self, disease: &str) -> String {
        self.fetch(disease).unwrap_or_else(|e| {
            warn!("No description for '{disease}': {e}");
            e.sentinel().to_string()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn describer() -> WikipediaDescriber {
        WikipediaDescriber::new("https://es.wikipedia.org/wiki/", Duration::from_secs(1)).unwrap()
    }

    #[test]
    fn title_drops_parentheticals_and_joins_words() {
        let d = describer();
        assert_eq!(d.article_title("Resfriado común (rinofaringitis)"), "Resfriado_común");
        assert_eq!(d.article_title("  gripe  "), "gripe");
        assert_eq!(
            d.article_url("dolor de cabeza"),
            "https://es.wikipedia.org/wiki/dolor_de_cabeza"
        );
    }

    #[test]
    fn first_long_paragraph_wins() {
        let html = r#"<html><body>
            <p>Corto.</p>
            <pre>no es un parrafo pero es bastante largo para contar como uno si se aceptara</pre>
            <p class="intro">La <b>gripe</b> es una enfermedad infecciosa causada por el virus de la influenza.</p>
            <p>Otro párrafo largo que no debería devolverse porque ya hay uno antes.</p>
        </body></html>"#;
        assert_eq!(
            describer().first_paragraph(html).as_deref(),
            Some("La gripe es una enfermedad infecciosa causada por el virus de la influenza.")
        );
    }

    #[test]
    fn character_references_are_decoded() {
        let html = "<p>La gripe es una enfermedad infecciosa aguda&#91;1&#93; causada por el \
                    virus&nbsp;influenza &amp; otros.</p>";
        assert_eq!(
            describer().first_paragraph(html).as_deref(),
            Some("La gripe es una enfermedad infecciosa aguda[1] causada por el virus influenza & otros.")
        );
    }

    #[test]
    fn no_paragraph_means_none() {
        assert!(describer().first_paragraph("<p>breve</p>").is_none());
        assert!(describer().first_paragraph("").is_none());
    }

    #[test]
    fn sentinels_per_failure() {
        assert_eq!(DescribeError::NotFound.sentinel(), PAGE_NOT_FOUND);
        assert_eq!(DescribeError::Status(503).sentinel(), FETCH_FAILED);
        assert_eq!(DescribeError::NoContent.sentinel(), DESCRIPTION_UNAVAILABLE);
    }

    #[test]
    fn unreachable_host_degrades_to_sentinel() {
        let d = WikipediaDescriber::new("http://127.0.0.1:9", Duration::from_millis(200)).unwrap();
        assert_eq!(d.describe("gripe"), CONNECTION_ERROR);
    }

    #[test]
    fn blank_name_is_not_fetched() {
        assert_eq!(describer().describe("(sin nombre)"), DESCRIPTION_UNAVAILABLE);
    }
}
