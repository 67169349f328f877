use serde::{Deserialize, Serialize};

/// A third-party retailer offer for an item.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PriceListing {
    #[serde(default)]
    pub id: Option<u64>,
    /// Retailer identifier; distinct slugs across listings are the
    /// snapshot's channels
    #[serde(default)]
    pub retailer_slug: Option<String>,
    #[serde(default)]
    pub retailer_name: Option<String>,
    #[serde(default)]
    pub price_jpy: Option<i64>,
    #[serde(default)]
    pub price_usd: Option<f64>,
    #[serde(default)]
    pub in_stock: Option<bool>,
    #[serde(default)]
    pub url: Option<String>,
}

impl PriceListing {
    pub fn channel(&self) -> Option<&str> {
        self.retailer_slug.as_deref().filter(|slug| !slug.is_empty())
    }

    pub fn has_url(&self) -> bool {
        self.url.as_deref().is_some_and(|url| !url.is_empty())
    }
}

/// A catalog item attributed to a job.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Item {
    pub id: u64,
    /// Display name
    #[serde(alias = "name_en")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_ja: Option<String>,
    /// Stable identifier from the source catalog, when the source has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_type: Option<String>,
    #[serde(default)]
    pub price_jpy: Option<i64>,
    /// Resolved price
    #[serde(default)]
    pub price_usd: Option<f64>,
    #[serde(default)]
    pub primary_image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(default)]
    pub in_stock: Option<bool>,
    #[serde(default)]
    pub price_listings: Vec<PriceListing>,
}

impl Item {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn resolved_price(&self) -> Option<f64> {
        self.price_usd
    }

    pub fn has_image(&self) -> bool {
        self.primary_image_url
            .as_deref()
            .is_some_and(|url| !url.is_empty())
    }

    pub fn is_in_stock(&self) -> bool {
        self.in_stock.unwrap_or(false)
    }

    pub fn external_id(&self) -> Option<&str> {
        self.external_id.as_deref().filter(|id| !id.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_accepts_name_en() {
        let item: Item = serde_json::from_value(serde_json::json!({
            "id": 101,
            "name_en": "Century Denim",
            "price_usd": 245.5,
            "primary_image_url": "",
            "price_listings": [{"retailer_slug": "ssense", "url": "https://ssense.com/x"}]
        }))
        .unwrap();

        assert_eq!(item.name, "Century Denim");
        assert_eq!(item.resolved_price(), Some(245.5));
        assert!(!item.has_image());
        assert!(!item.is_in_stock());
        assert_eq!(item.price_listings[0].channel(), Some("ssense"));
        assert!(item.price_listings[0].has_url());
    }

    #[test]
    fn test_empty_external_id_is_absent() {
        let mut item = Item::new(1, "Tee");
        item.external_id = Some(String::new());
        assert_eq!(item.external_id(), None);
    }
}
