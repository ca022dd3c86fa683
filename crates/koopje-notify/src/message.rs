use crate::escape::escape_markdown_v2;

/// The fields of one watch-list hit.
#[derive(Debug, Clone, Copy)]
pub struct MatchAlert<'a> {
    pub title: &'a str,
    pub brand: &'a str,
    pub watch_term: &'a str,
    pub price: f64,
    pub link: &'a str,
}

/// Renders the `MarkdownV2` match message.
///
/// Every interpolated field is escaped on its own; the template's bold
/// markers and its escaped `!` are literal markup.
#[must_use]
pub fn format_match_message(alert: &MatchAlert<'_>) -> String {
    format!(
        "MERK MATCH GEVONDEN\\!\n\n\
         Advertentie: *{title}*\n\
         Geïdentificeerd merk: *{brand}*\n\
         Zoekterm: *{term}*\n\
         Prijs: €{price}\n\
         Link: {link}",
        title = escape_markdown_v2(alert.title),
        brand = escape_markdown_v2(alert.brand),
        term = escape_markdown_v2(alert.watch_term),
        price = escape_markdown_v2(&format!("{:.2}", alert.price)),
        link = escape_markdown_v2(alert.link),
    )
}
