use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// Tool execution record reported by the agent backend
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ToolExecution {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Value>,

    /// Either a string or an already-decoded JSON value
    #[serde(default, alias = "response", skip_serializing_if = "Option::is_none")]
    pub tool_response: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ToolExecution {
    /// Decode a JSON array of execution records
    pub fn list_from_json(json: &str) -> Result<Vec<Self>> {
        let records: Vec<Self> = serde_json::from_str(json)?;
        tracing::debug!(records = records.len(), "Loaded tool execution records");
        Ok(records)
    }

    /// The response as text: strings verbatim, other values serialized
    pub fn response_text(&self) -> Option<String> {
        match self.tool_response.as_ref()? {
            Value::Null => None,
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    pub fn call_id(&self) -> Option<&str> {
        self.id.as_deref().or(self.tool_call_id.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParserError;
    use serde_json::json;

    #[test]
    fn test_deserialize_with_response_alias() {
        let exec: ToolExecution = serde_json::from_value(json!({
            "tool_name": "plot",
            "response": "{\"type\":\"bar\"}",
            "tool_call_id": "call_1"
        }))
        .unwrap();

        assert_eq!(exec.tool_name.as_deref(), Some("plot"));
        assert_eq!(exec.response_text().as_deref(), Some("{\"type\":\"bar\"}"));
        assert_eq!(exec.call_id(), Some("call_1"));
    }

    #[test]
    fn test_object_response_is_serialized() {
        let exec = ToolExecution {
            tool_response: Some(json!({"type": "pie", "data": []})),
            ..Default::default()
        };
        let text = exec.response_text().unwrap();
        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["type"], "pie");
    }

    #[test]
    fn test_empty_response() {
        let exec = ToolExecution {
            tool_response: Some(json!("")),
            ..Default::default()
        };
        assert!(exec.response_text().is_none());
        assert!(ToolExecution::default().response_text().is_none());
    }

    #[test]
    fn test_list_from_json() {
        let records = ToolExecution::list_from_json(
            r#"[{"tool_name":"plot","tool_response":{"type":"bar","data":[]}},{"id":"x"}]"#,
        )
        .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].call_id(), Some("x"));

        let err = ToolExecution::list_from_json(r#"{"tool_name":"plot"}"#).unwrap_err();
        assert!(matches!(err, ParserError::JsonError(_)));
    }
}
