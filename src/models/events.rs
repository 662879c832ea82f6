// src/models/events.rs
use serde::{Deserialize, Serialize};

/// The structured instruction the natural-language service answers with:
/// which data endpoint to call next, and what the question was about.
/// Consumed immediately by the data fetch; never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptDescriptor {
    pub api_url: String,
    pub intent: String,
}

impl PromptDescriptor {
    /// Pull a descriptor out of whatever JSON the interpreter returned.
    /// `None` when the expected fields are missing or the wrong type.
    pub fn from_value(value: &serde_json::Value) -> Option<Self> {
        let api_url = value.get("api_url")?.as_str()?.to_string();
        let intent = value.get("intent")?.as_str()?.to_string();
        Some(Self { api_url, intent })
    }
}

/// One venue or event record from the data service. Fields beyond the
/// identifier and title are optional; timestamps and prices are kept as
/// the raw strings the upstream sent, with no normalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultItem {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub starts_at: Option<String>,
    #[serde(default)]
    pub ends_at: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
}

impl ResultItem {
    /// Human-readable price. The upstream encodes "free" either as the
    /// literal word or as "0"; everything else is shown as stored.
    pub fn price_label(&self) -> Option<String> {
        self.price.as_deref().map(display_price)
    }

    #[cfg(test)]
    pub fn stub(id: &str, title: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            image_url: None,
            address: None,
            city: None,
            starts_at: None,
            ends_at: None,
            price: None,
            is_favorite: false,
            tags: Vec::new(),
            description: None,
            phone: None,
            website: None,
        }
    }
}

pub fn display_price(price: &str) -> String {
    match price {
        "0" | "free" => "Free".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn zero_and_free_render_as_free() {
        assert_eq!(display_price("0"), "Free");
        assert_eq!(display_price("free"), "Free");
    }

    #[test]
    fn other_prices_pass_through_unchanged() {
        assert_eq!(display_price("120"), "120");
        assert_eq!(display_price("Free"), "Free");
        assert_eq!(display_price("FREE"), "FREE");
        assert_eq!(display_price("25-40"), "25-40");
    }

    #[test]
    fn price_label_uses_the_items_own_price() {
        let mut item = ResultItem::stub("1", "Street Food Festival");
        assert_eq!(item.price_label(), None);
        item.price = Some("0".to_string());
        assert_eq!(item.price_label().as_deref(), Some("Free"));
    }

    #[test]
    fn descriptor_parses_from_interpreter_json() {
        let value = json!({
            "api_url": "https://data.cityscout-api.com/v1/events?cat=music",
            "intent": "find_events",
            "confidence": 0.92
        });
        let desc = PromptDescriptor::from_value(&value).expect("well-formed descriptor");
        assert_eq!(desc.api_url, "https://data.cityscout-api.com/v1/events?cat=music");
        assert_eq!(desc.intent, "find_events");
    }

    #[test]
    fn descriptor_rejects_missing_or_mistyped_fields() {
        assert!(PromptDescriptor::from_value(&json!({"intent": "x"})).is_none());
        assert!(PromptDescriptor::from_value(&json!({"api_url": 7, "intent": "x"})).is_none());
        assert!(PromptDescriptor::from_value(&json!("just a string")).is_none());
    }

    #[test]
    fn result_item_tolerates_sparse_upstream_records() {
        let record = json!({
            "id": "evt-9",
            "title": "Open Air Cinema",
            "unknownField": {"nested": true}
        });
        let item: ResultItem = serde_json::from_value(record).unwrap();
        assert_eq!(item.title, "Open Air Cinema");
        assert!(item.address.is_none());
        assert!(!item.is_favorite);
        assert!(item.tags.is_empty());
    }
}
