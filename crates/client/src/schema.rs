use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;

/// JSON object that keeps its entries in document order.
///
/// Display order of both the model catalog and the entity counts is the
/// order the backend wrote them in, so a sorted or hashed map won't do.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedMap<V>(Vec<(String, V)>);

impl<V> OrderedMap<V> {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Insert or overwrite. An overwritten key keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: V) {
        let key = key.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for OrderedMap<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl<V: Serialize> Serialize for OrderedMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(k, v)| (k, v)))
    }
}

struct OrderedMapVisitor<V>(PhantomData<V>);

impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedMapVisitor<V> {
    type Value = OrderedMap<V>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a JSON object")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut map = OrderedMap(Vec::with_capacity(access.size_hint().unwrap_or(0)));
        while let Some((key, value)) = access.next_entry::<String, V>()? {
            map.insert(key, value);
        }
        Ok(map)
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for OrderedMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(OrderedMapVisitor(PhantomData))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkpoint: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub model_type: Option<String>,
    /// Anything else the backend attaches to a model entry
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ModelInfo {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            checkpoint: None,
            model_type: None,
            extra: serde_json::Map::new(),
        }
    }
}

/// Body of `GET /api/models`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelCatalog {
    pub models: OrderedMap<ModelInfo>,
}

/// Body of `POST /api/extract`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtractRequest {
    pub text: String,
    pub model_version: String,
}

/// Response of `POST /api/extract`. Every field is optional on the wire and
/// anything else the backend sends (span lists and the like) is ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlighted_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_counts: Option<OrderedMap<i64>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_keeps_response_order() {
        let body = r#"{"models": {
            "v3": {"name": "PII-Shield (Base-Version)", "checkpoint": null, "type": "camel_bert"},
            "v1": {"name": "PII-Shield-v1", "checkpoint": "pii_shield_v001/model.pt", "type": "pii_shield"},
            "v2": {"name": "PII-Shield-v2", "size": 42}
        }}"#;

        let catalog: ModelCatalog = serde_json::from_str(body).unwrap();
        let ids: Vec<&str> = catalog.models.keys().collect();
        assert_eq!(ids, vec!["v3", "v1", "v2"]);

        let v2 = catalog.models.get("v2").unwrap();
        assert_eq!(v2.name, "PII-Shield-v2");
        assert_eq!(v2.extra.get("size"), Some(&serde_json::json!(42)));
        assert_eq!(catalog.models.get("v3").unwrap().model_type.as_deref(), Some("camel_bert"));
    }

    #[test]
    fn test_catalog_requires_models() {
        assert!(serde_json::from_str::<ModelCatalog>(r#"{"items": {}}"#).is_err());
        assert!(serde_json::from_str::<ModelCatalog>(r#"{"models": []}"#).is_err());
    }

    #[test]
    fn test_extract_response_optional_fields() {
        let empty: ExtractResponse = serde_json::from_str("{}").unwrap();
        assert!(empty.highlighted_text.is_none());
        assert!(empty.entity_counts.is_none());

        let null_counts: ExtractResponse =
            serde_json::from_str(r#"{"highlighted_text": "x", "entity_counts": null}"#).unwrap();
        assert!(null_counts.entity_counts.is_none());
    }

    #[test]
    fn test_extract_response_ignores_extra_fields() {
        for body in [
            r#"{"highlighted_text":"<b>Bond</b>","entity_counts":{"PER":1},"entities":null}"#,
            r#"{"highlighted_text":"<b>Bond</b>","entity_counts":{"PER":1},"entities":[{"text":"Bond","entity_type":"PER"}]}"#,
            r#"{"highlighted_text":"<b>Bond</b>","entity_counts":{"PER":1},"entities":"n/a","elapsed_ms":12}"#,
        ] {
            let response: ExtractResponse = serde_json::from_str(body).unwrap();
            assert_eq!(response.highlighted_text.as_deref(), Some("<b>Bond</b>"));
            assert_eq!(response.entity_counts.unwrap().get("PER"), Some(&1));
        }
    }

    #[test]
    fn test_entity_counts_order_survives_serialization() {
        let counts: OrderedMap<i64> = [("ORG", 2), ("PER", 1), ("EMAIL", 3)].into_iter().collect();
        let json = serde_json::to_string(&counts).unwrap();
        assert_eq!(json, r#"{"ORG":2,"PER":1,"EMAIL":3}"#);
    }

    #[test]
    fn test_duplicate_key_keeps_first_position() {
        let counts: OrderedMap<i64> =
            serde_json::from_str(r#"{"PER": 1, "LOC": 2, "PER": 5}"#).unwrap();
        let entries: Vec<(&str, i64)> = counts.iter().map(|(k, v)| (k, *v)).collect();
        assert_eq!(entries, vec![("PER", 5), ("LOC", 2)]);
    }
}
