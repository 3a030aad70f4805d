//! Session configuration value object

use serde::{Deserialize, Serialize};

/// Options for creating a model session (Value Object)
///
/// Serialized camelCase for the host protocol. `top_k` controls sampling
/// breadth for generation; unrecognized future options pass through
/// opaquely via the flattened `extra` map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_top_k(mut self, top_k: u32) -> Self {
        self.top_k = Some(top_k);
        self
    }

    /// Attach an option this version does not recognize; it is forwarded
    /// to the host untouched.
    pub fn with_option(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_k_serializes_camel_case() {
        let config = SessionConfig::new().with_top_k(3);
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["topK"], 3);
    }

    #[test]
    fn absent_top_k_is_omitted() {
        let json = serde_json::to_value(SessionConfig::new()).unwrap();
        assert!(json.get("topK").is_none());
    }

    #[test]
    fn unrecognized_options_pass_through() {
        let config = SessionConfig::new()
            .with_top_k(3)
            .with_option("temperature", serde_json::json!(0.8));
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["temperature"], 0.8);

        let parsed: SessionConfig = serde_json::from_value(serde_json::json!({
            "topK": 5,
            "futureOption": {"nested": true}
        }))
        .unwrap();
        assert_eq!(parsed.top_k, Some(5));
        assert_eq!(parsed.extra["futureOption"]["nested"], true);
    }
}
