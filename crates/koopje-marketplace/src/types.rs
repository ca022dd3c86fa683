use koopje_core::Listing;
use reqwest::Url;
use serde::Deserialize;

/// Price types that carry a real asking price in `priceCents`.
const PRICED_TYPES: &[&str] = &["FIXED", "MIN_BID"];

/// Top-level response of the listing search endpoint.
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub listings: Vec<RawListing>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawListing {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub vip_url: String,
    #[serde(default)]
    pub price_info: Option<PriceInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceInfo {
    #[serde(default)]
    pub price_cents: Option<i64>,
    #[serde(default)]
    pub price_type: String,
}

impl PriceInfo {
    /// Asking price in euros, or `None` for bid-only and "see description" ads.
    #[must_use]
    pub fn euros(&self) -> Option<f64> {
        if !PRICED_TYPES.contains(&self.price_type.as_str()) {
            return None;
        }
        #[allow(clippy::cast_precision_loss)]
        self.price_cents.map(|cents| cents as f64 / 100.0)
    }
}

impl RawListing {
    /// Converts the wire shape into a [`Listing`], resolving relative ad
    /// URLs against `base`.
    #[must_use]
    pub fn into_listing(self, base: &Url) -> Listing {
        let link = base
            .join(&self.vip_url)
            .map_or_else(|_| self.vip_url.clone(), |url| url.to_string());

        Listing {
            title: self.title,
            description: self.description.unwrap_or_default(),
            link,
            price: self.price_info.as_ref().and_then(PriceInfo::euros),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://www.marktplaats.nl/").unwrap()
    }

    fn raw(price_type: &str, price_cents: Option<i64>) -> RawListing {
        RawListing {
            title: "UniFi U6 Lite".to_owned(),
            description: Some("Nauwelijks gebruikt".to_owned()),
            vip_url: "/v/computers-en-software/accesspoints/m2100000001-unifi-u6-lite".to_owned(),
            price_info: Some(PriceInfo {
                price_cents,
                price_type: price_type.to_owned(),
            }),
        }
    }

    #[test]
    fn fixed_price_is_converted_to_euros() {
        let listing = raw("FIXED", Some(4_550)).into_listing(&base());
        assert_eq!(listing.price, Some(45.5));
    }

    #[test]
    fn min_bid_counts_as_priced() {
        let listing = raw("MIN_BID", Some(1_000)).into_listing(&base());
        assert_eq!(listing.price, Some(10.0));
    }

    #[test]
    fn see_description_has_no_price() {
        let listing = raw("SEE_DESCRIPTION", Some(0)).into_listing(&base());
        assert_eq!(listing.price, None);
    }

    #[test]
    fn missing_price_info_has_no_price() {
        let mut r = raw("FIXED", None);
        r.price_info = None;
        assert_eq!(r.into_listing(&base()).price, None);
    }

    #[test]
    fn relative_vip_url_becomes_absolute() {
        let listing = raw("FIXED", Some(100)).into_listing(&base());
        assert_eq!(
            listing.link,
            "https://www.marktplaats.nl/v/computers-en-software/accesspoints/m2100000001-unifi-u6-lite"
        );
    }

    #[test]
    fn absolute_vip_url_is_kept() {
        let mut r = raw("FIXED", Some(100));
        r.vip_url = "https://link.marktplaats.nl/m2100000001".to_owned();
        assert_eq!(
            r.into_listing(&base()).link,
            "https://link.marktplaats.nl/m2100000001"
        );
    }

    #[test]
    fn missing_description_becomes_empty() {
        let mut r = raw("FIXED", Some(100));
        r.description = None;
        assert_eq!(r.into_listing(&base()).description, "");
    }
}
