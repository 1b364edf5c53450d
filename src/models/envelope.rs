use serde::Serialize;
use serde_json::Value;

/// One message on the line-delimited incremental update channel
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreamEnvelope {
    #[serde(rename = "type")]
    pub kind: String,
    pub data: Value,
    pub raw: String,
}

impl StreamEnvelope {
    /// Envelope type used for end-of-stream text that is not JSON
    pub const CONTENT: &'static str = "content";

    /// Build from a line that must decode to an object with a `type` key.
    ///
    /// `data` is the object's own `data` member when truthy, else the whole object.
    pub fn from_line(line: &str) -> Option<Self> {
        let parsed: Value = serde_json::from_str(line).ok()?;
        let obj = parsed.as_object()?;
        let kind = match obj.get("type")? {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        let data = match obj.get("data") {
            Some(d) if crate::chart::detect::is_truthy(d) => d.clone(),
            _ => parsed.clone(),
        };

        Some(Self {
            kind,
            data,
            raw: line.to_string(),
        })
    }

    pub fn content(text: &str) -> Self {
        Self {
            kind: Self::CONTENT.to_string(),
            data: Value::String(text.to_string()),
            raw: text.to_string(),
        }
    }

    /// Text payload of the envelope, if its data is a string
    pub fn text(&self) -> Option<&str> {
        self.data.as_str()
    }
}
