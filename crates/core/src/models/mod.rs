//! Shared domain models.

use serde::{de, Deserialize, Deserializer, Serialize};

/// One purchasable item from the remote catalog.
///
/// Items are immutable once loaded; the store replaces the whole
/// collection on every successful fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Identifier as delivered by the API. Mock APIs are inconsistent
    /// about this, so numeric ids are accepted and stored as text.
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    /// Display name.
    pub name: String,
    /// Unit price. Accepts a JSON number or a numeric string.
    #[serde(deserialize_with = "lenient_price")]
    pub price: f64,
    /// Longer marketing copy shown on the detail screen.
    #[serde(default)]
    pub description: String,
    /// URL or path of the item image.
    #[serde(default)]
    pub image: String,
}

impl CatalogItem {
    /// User-facing price label: whole amounts render without decimals.
    pub fn price_label(&self) -> String {
        if self.price.fract() == 0.0 {
            format!("${}", self.price as i64)
        } else {
            format!("${:.2}", self.price)
        }
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::String(text) => Ok(text),
        serde_json::Value::Number(num) => Ok(num.to_string()),
        other => Err(de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}

fn lenient_price<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::Number(num) => num
            .as_f64()
            .ok_or_else(|| de::Error::custom("price out of range")),
        serde_json::Value::String(text) => text
            .trim()
            .parse::<f64>()
            .map_err(|err| de::Error::custom(format!("invalid price {text:?}: {err}"))),
        other => Err(de::Error::custom(format!(
            "expected numeric price, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_canonical_payload() {
        let item: CatalogItem = serde_json::from_str(
            r#"{"id":"1","name":"Roadster","price":500,"description":"Fast","image":"bike.png"}"#,
        )
        .expect("decode item");
        assert_eq!(item.id, "1");
        assert_eq!(item.name, "Roadster");
        assert_eq!(item.price, 500.0);
        assert_eq!(item.price_label(), "$500");
    }

    #[test]
    fn tolerates_numeric_id_and_string_price() {
        let item: CatalogItem =
            serde_json::from_str(r#"{"id":7,"name":"Gravel","price":"1249.50"}"#)
                .expect("decode item");
        assert_eq!(item.id, "7");
        assert_eq!(item.price, 1249.5);
        assert_eq!(item.price_label(), "$1249.50");
        assert!(item.description.is_empty());
        assert!(item.image.is_empty());
    }

    #[test]
    fn rejects_non_numeric_price() {
        let result = serde_json::from_str::<CatalogItem>(r#"{"id":"1","name":"X","price":true}"#);
        assert!(result.is_err());
    }
}
