use serde::{Deserialize, Serialize};

/// One narrative beat, revealed `reveal_at_ms` after the run starts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub id: String,
    pub label: String,
    pub reveal_at_ms: u64,
    pub text: String,
}

impl Segment {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        reveal_at_ms: u64,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            reveal_at_ms,
            text: text.into(),
        }
    }
}
