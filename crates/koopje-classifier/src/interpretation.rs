//! Parsing of the model's `Merk: X, Titel: Y` strings.
//!
//! The format is free text produced by a model, so extraction is deliberately
//! narrow: the brand is the text after the first `Merk:` up to the next comma,
//! the title everything after `Titel:` to the end. English labels
//! (`Brand:`/`Title:`) are accepted as well. Callers only depend on
//! [`Interpretation`], so a structured format can replace this later.

use std::sync::LazyLock;

use koopje_core::UNKNOWN_BRAND;
use regex::Regex;

static BRAND_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:Merk|Brand):\s*([^,]+)").expect("valid brand regex"));

static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:Titel|Title):\s*(.+)").expect("valid title regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpretation {
    /// Never empty; [`UNKNOWN_BRAND`] when nothing usable was found.
    pub brand: String,
    pub title: Option<String>,
}

impl Interpretation {
    #[must_use]
    pub fn unknown() -> Self {
        Self {
            brand: UNKNOWN_BRAND.to_owned(),
            title: None,
        }
    }

    #[must_use]
    pub fn is_unknown(&self) -> bool {
        self.brand == UNKNOWN_BRAND
    }
}

/// Extracts brand and title from one model answer.
///
/// `None` stands for a missing answer (the model returned fewer entries than
/// it was given) and yields [`Interpretation::unknown`].
#[must_use]
pub fn parse_interpretation(raw: Option<&str>) -> Interpretation {
    let Some(raw) = raw else {
        return Interpretation::unknown();
    };

    let brand = BRAND_RE
        .captures(raw)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim())
        .filter(|b| !b.is_empty())
        .map_or_else(|| UNKNOWN_BRAND.to_owned(), str::to_owned);

    let title = TITLE_RE
        .captures(raw)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_owned())
        .filter(|t| !t.is_empty());

    Interpretation { brand, title }
}
