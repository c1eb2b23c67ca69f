use crate::domain::model::{SellerLink, ShoppingItem};
use serde_json::{json, Map, Value};

/// Projects an item into buffer rows: one per seller link, or a single row without
/// seller columns when the provider listed none.
pub fn item_rows(item: &ShoppingItem, geolocation: &str, translated_query: &str) -> Vec<Value> {
    let base = base_row(item, geolocation, translated_query);

    if item.sellers.is_empty() {
        let mut row = base;
        if let Some(source) = &item.source {
            row.insert("sellerName".to_string(), json!(source));
        }
        if let Some(price) = &item.price {
            row.insert("totalPrice".to_string(), json!(price));
        }
        return vec![Value::Object(row)];
    }

    item.sellers
        .iter()
        .enumerate()
        .map(|(index, seller)| {
            let mut row = base.clone();
            insert_seller(&mut row, seller, index + 1);
            Value::Object(row)
        })
        .collect()
}

fn base_row(item: &ShoppingItem, geolocation: &str, translated_query: &str) -> Map<String, Value> {
    let mut row = Map::new();
    row.insert("geolocation".to_string(), json!(geolocation));
    row.insert("translatedQuery".to_string(), json!(translated_query));
    insert_opt(&mut row, "productTitle", item.title.as_deref());
    insert_opt(&mut row, "productId", item.product_id.as_deref());
    insert_opt(&mut row, "priceRange", price_range(item).as_deref());
    if let Some(count) = item.seller_count() {
        row.insert("sellerCount".to_string(), json!(count));
    }
    insert_opt(&mut row, "productLink", item.product_url());
    row
}

fn insert_seller(row: &mut Map<String, Value>, seller: &SellerLink, index: usize) {
    insert_opt(row, "sellerName", seller.name.as_deref());
    insert_opt(row, "sellerLink", seller.link.as_deref());
    insert_opt(row, "basePrice", seller.base_price.as_deref());
    insert_opt(row, "shipping", seller.shipping.as_deref());
    insert_opt(row, "totalPrice", seller.total_price.as_deref());
    row.insert("sellerIndex".to_string(), json!(index));
}

fn insert_opt(row: &mut Map<String, Value>, key: &str, value: Option<&str>) {
    if let Some(value) = value {
        row.insert(key.to_string(), json!(value));
    }
}

/// "min - max" over the sellers' total prices, or the item's own price.
fn price_range(item: &ShoppingItem) -> Option<String> {
    let prices: Vec<(f64, &str)> = item
        .sellers
        .iter()
        .filter_map(|s| s.total_price.as_deref())
        .filter_map(|text| parse_price(text).map(|p| (p, text)))
        .collect();

    let min = prices.iter().min_by(|a, b| a.0.total_cmp(&b.0));
    let max = prices.iter().max_by(|a, b| a.0.total_cmp(&b.0));
    match (min, max) {
        (Some(min), Some(max)) if min.0 < max.0 => Some(format!("{} - {}", min.1, max.1)),
        (Some(only), _) => Some(only.1.to_string()),
        _ => item.price.clone(),
    }
}

// "1 299,00 €" / "$1,299.00" -> 1299.0
fn parse_price(text: &str) -> Option<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    let normalized = match (cleaned.rfind('.'), cleaned.rfind(',')) {
        (Some(dot), Some(comma)) if comma > dot => cleaned.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        (None, Some(comma)) if cleaned.len() - comma == 3 => cleaned.replace(',', "."),
        (None, Some(_)) => cleaned.replace(',', ""),
        _ => cleaned,
    };
    normalized.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(raw: Value) -> ShoppingItem {
        serde_json::from_value(raw).unwrap()
    }

    #[test]
    fn test_single_source_item_gives_one_row() {
        let rows = item_rows(
            &item(json!({
                "product_id": "222",
                "title": "Acer Aspire 5",
                "price": "549,00 €",
                "source": "Alza.sk",
                "product_link": "https://shopping.example/222",
                "multiple_sources": false
            })),
            "sk",
            "notebook",
        );

        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row["geolocation"], "sk");
        assert_eq!(row["translatedQuery"], "notebook");
        assert_eq!(row["productTitle"], "Acer Aspire 5");
        assert_eq!(row["productId"], "222");
        assert_eq!(row["priceRange"], "549,00 €");
        assert_eq!(row["sellerCount"], 1);
        assert_eq!(row["sellerName"], "Alza.sk");
        assert_eq!(row["productLink"], "https://shopping.example/222");
        assert!(row.get("sellerIndex").is_none());
    }

    #[test]
    fn test_one_row_per_seller() {
        let rows = item_rows(
            &item(json!({
                "product_id": "111",
                "title": "ThinkPad X1",
                "multiple_sources": true,
                "sellers": [
                    {"name": "Alza", "link": "https://alza.example", "base_price": "1 199,00 €", "shipping": "0 €", "total_price": "1 199,00 €"},
                    {"name": "Datart", "link": "https://datart.example", "base_price": "1 249,00 €", "shipping": "4,99 €", "total_price": "1 253,99 €"}
                ]
            })),
            "sk",
            "notebook",
        );

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["sellerIndex"], 1);
        assert_eq!(rows[1]["sellerIndex"], 2);
        assert_eq!(rows[1]["sellerName"], "Datart");
        assert_eq!(rows[1]["shipping"], "4,99 €");
        assert_eq!(rows[0]["sellerCount"], 2);
        assert_eq!(rows[0]["priceRange"], "1 199,00 € - 1 253,99 €");
    }

    #[test]
    fn test_parse_price_formats() {
        assert_eq!(parse_price("1 299,00 €"), Some(1299.0));
        assert_eq!(parse_price("$1,299.00"), Some(1299.0));
        assert_eq!(parse_price("1.299,50 €"), Some(1299.5));
        assert_eq!(parse_price("$25"), Some(25.0));
        assert_eq!(parse_price("free"), None);
    }
}
