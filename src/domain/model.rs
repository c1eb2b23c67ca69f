use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// A country/language pairing the search pipeline supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Market {
    pub code: &'static str,
    pub name: &'static str,
    pub flag: &'static str,
    pub language: &'static str,
    pub language_name: &'static str,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchRequest {
    pub query: Option<String>,
    pub geolocation: Option<String>,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>, geolocation: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            geolocation: Some(geolocation.into()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetailsRequest {
    pub product_id: Option<String>,
    pub geolocation: Option<String>,
}

/// Which strategy produced a translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslationSource {
    Remote,
    Phrasebook,
    Passthrough,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationResult {
    pub original_query: String,
    pub translated_query: String,
    pub target_language: String,
    #[serde(skip)]
    pub source: TranslationSource,
}

/// One seller offer attached to a product.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SellerLink {
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub base_price: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub shipping: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub total_price: Option<String>,
}

/// Provider-defined product result.
///
/// The provider's object is kept as received and is what gets serialized back out.
/// The typed fields are a read view over it, filled leniently: a missing or oddly typed
/// field reads as absent instead of rejecting the item.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShoppingItem {
    pub product_id: Option<String>,
    pub title: Option<String>,
    pub multiple_sources: Option<bool>,
    pub source: Option<String>,
    pub price: Option<String>,
    pub extracted_price: Option<f64>,
    pub product_link: Option<String>,
    pub link: Option<String>,
    pub number_of_comparisons: Option<String>,
    pub sellers: Vec<SellerLink>,
    raw: Map<String, Value>,
}

impl ShoppingItem {
    pub fn from_map(raw: Map<String, Value>) -> Self {
        Self {
            product_id: text_field(&raw, "product_id"),
            title: text_field(&raw, "title"),
            multiple_sources: raw.get("multiple_sources").and_then(Value::as_bool),
            source: text_field(&raw, "source"),
            price: text_field(&raw, "price"),
            extracted_price: raw.get("extracted_price").and_then(number_value),
            product_link: text_field(&raw, "product_link"),
            link: text_field(&raw, "link"),
            number_of_comparisons: text_field(&raw, "number_of_comparisons"),
            sellers: seller_links(&raw),
            raw,
        }
    }

    /// The provider's object, unchanged.
    pub fn raw(&self) -> &Map<String, Value> {
        &self.raw
    }

    /// 只有明確的 `true` 才算多賣家，缺少或其他值一律歸為單一賣家
    pub fn is_multi_source(&self) -> bool {
        self.multiple_sources == Some(true)
    }

    pub fn seller_count(&self) -> Option<usize> {
        if !self.sellers.is_empty() {
            return Some(self.sellers.len());
        }

        // e.g. "50+" or "12 stores"
        let digits: String = self
            .number_of_comparisons
            .as_deref()
            .unwrap_or_default()
            .chars()
            .skip_while(|c| !c.is_ascii_digit())
            .take_while(|c| c.is_ascii_digit())
            .collect();
        if let Ok(count) = digits.parse() {
            return Some(count);
        }

        if self.is_multi_source() {
            None
        } else {
            Some(1)
        }
    }

    pub fn product_url(&self) -> Option<&str> {
        self.product_link.as_deref().or(self.link.as_deref())
    }
}

impl Serialize for ShoppingItem {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ShoppingItem {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Map::deserialize(deserializer).map(Self::from_map)
    }
}

fn text_field(raw: &Map<String, Value>, key: &str) -> Option<String> {
    match raw.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn number_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

// `sellers` or `seller_links`; anything that is not an object is skipped
fn seller_links(raw: &Map<String, Value>) -> Vec<SellerLink> {
    raw.get("sellers")
        .or_else(|| raw.get("seller_links"))
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter(|entry| entry.is_object())
                .filter_map(|entry| SellerLink::deserialize(entry).ok())
                .collect()
        })
        .unwrap_or_default()
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultSet {
    pub geolocation: String,
    pub geo_info: Market,
    pub original_query: String,
    pub translated_query: String,
    pub results: Vec<ShoppingItem>,
    pub total_results: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetails {
    pub product_details: Value,
    pub geolocation: String,
    pub geo_info: Market,
}

/// Parameters sent to the shopping-search capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingQuery {
    pub query: String,
    pub country: String,
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductQuery {
    pub product_id: String,
    pub country: String,
    pub language: String,
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}
