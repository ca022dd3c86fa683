//! Case-insensitive whole-word matching of brands against the watch-list.

use regex::Regex;

/// Watch-list terms compiled once, kept in configured order.
pub(crate) struct WatchList {
    terms: Vec<(String, Regex)>,
}

impl WatchList {
    /// Compiles one `(?i)\b<term>\b` pattern per term.
    pub(crate) fn new(terms: &[String]) -> Result<Self, regex::Error> {
        let terms = terms
            .iter()
            .map(|term| {
                let pattern = format!(r"(?i)\b{}\b", regex::escape(term));
                Regex::new(&pattern).map(|re| (term.clone(), re))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { terms })
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// The first term, in list order, that occurs as a whole word in `brand`.
    pub(crate) fn first_match(&self, brand: &str) -> Option<&str> {
        self.terms
            .iter()
            .find(|(_, re)| re.is_match(brand))
            .map(|(term, _)| term.as_str())
    }
}
