use serde::{Deserialize, Serialize};

// ════════════════════════════════════════════════════════════════
//  TopicId
// ════════════════════════════════════════════════════════════════

/// Store-wide identifier of a topic record. Generated once by the
/// registry at registration and never reassigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TopicId(uuid::Uuid);

impl TopicId {
    /// Fresh random (v4) identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Parse the textual form. Accepts what `uuid` accepts (hyphenated,
    /// simple, braced, urn).
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        uuid::Uuid::parse_str(s.trim()).map(Self)
    }
}

impl std::fmt::Display for TopicId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl std::str::FromStr for TopicId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// ════════════════════════════════════════════════════════════════
//  TopicRecord
// ════════════════════════════════════════════════════════════════

/// A registered topic.
///
/// `topic` is the natural key and is required on decode. `id` is absent
/// on payloads coming from clients that address records by name. Every
/// other JSON field lands in `payload` and is carried through untouched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TopicRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<TopicId>,
    pub topic: String,
    #[serde(flatten)]
    pub payload: serde_json::Map<String, serde_json::Value>,
}

impl TopicRecord {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            id: None,
            topic: topic.into(),
            payload: serde_json::Map::new(),
        }
    }

    /// Builder-style helper for opaque fields (`address`, `metadata`, ...).
    pub fn with_field(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.payload.insert(name.into(), value);
        self
    }

    pub fn with_id(mut self, id: TopicId) -> Self {
        self.id = Some(id);
        self
    }

    /// Key addressing the stored counterpart of this record: the id when
    /// present, otherwise the topic name.
    pub fn filter(&self) -> Filter {
        match self.id {
            Some(id) => Filter::Id(id),
            None => Filter::Topic(self.topic.clone()),
        }
    }
}

// ════════════════════════════════════════════════════════════════
//  Filter
// ════════════════════════════════════════════════════════════════

/// Single-record lookup key understood by every store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    Id(TopicId),
    /// Exact, case-sensitive match on the `topic` field.
    Topic(String),
}

impl Filter {
    pub fn matches(&self, record: &TopicRecord) -> bool {
        match self {
            Filter::Id(id) => record.id.as_ref() == Some(id),
            Filter::Topic(name) => record.topic == *name,
        }
    }
}

impl std::fmt::Display for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Filter::Id(id) => write!(f, "id '{id}'"),
            Filter::Topic(name) => write!(f, "topic '{name}'"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decode_keeps_opaque_fields() {
        let record: TopicRecord = serde_json::from_value(json!({
            "topic": "orders",
            "address": "tcp://10.0.0.5:1883",
            "metadata": {"qos": 1}
        }))
        .unwrap();

        assert_eq!(record.id, None);
        assert_eq!(record.topic, "orders");
        assert_eq!(record.payload["address"], "tcp://10.0.0.5:1883");
        assert_eq!(record.payload["metadata"], json!({"qos": 1}));
    }

    #[test]
    fn decode_requires_topic() {
        let err = serde_json::from_value::<TopicRecord>(json!({"address": "x"})).unwrap_err();
        assert!(err.to_string().contains("topic"), "{err}");
    }

    #[test]
    fn decode_rejects_malformed_id() {
        let res = serde_json::from_value::<TopicRecord>(json!({"id": "nope", "topic": "a"}));
        assert!(res.is_err());
    }

    #[test]
    fn encode_is_flat_and_omits_missing_id() {
        let record = TopicRecord::new("orders").with_field("address", json!("a:1"));
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({"topic": "orders", "address": "a:1"})
        );

        let id = TopicId::generate();
        let value = serde_json::to_value(record.with_id(id)).unwrap();
        assert_eq!(value["id"], json!(id.to_string()));
    }

    #[test]
    fn filter_prefers_id() {
        let id = TopicId::generate();
        let record = TopicRecord::new("orders").with_id(id);
        assert_eq!(record.filter(), Filter::Id(id));
        assert_eq!(TopicRecord::new("orders").filter(), Filter::Topic("orders".into()));

        assert!(Filter::Topic("orders".into()).matches(&record));
        assert!(!Filter::Topic("Orders".into()).matches(&record));
    }

    #[test]
    fn id_round_trips_through_text() {
        let id = TopicId::generate();
        assert_eq!(TopicId::parse(&id.to_string()).unwrap(), id);
        assert!(TopicId::parse("5b3c0f").is_err());
    }
}
