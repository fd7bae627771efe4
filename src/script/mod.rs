pub mod builtin;
pub mod segment;

use std::{collections::HashSet, fs, path::Path};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

pub use segment::Segment;

/// Validated, immutable reveal schedule.
///
/// Offsets start at zero and strictly increase, so the last segment's offset
/// is the total duration of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    segments: Vec<Segment>,
}

#[derive(Deserialize)]
struct ScriptDocument {
    segments: Vec<Segment>,
}

impl Script {
    pub fn new(segments: Vec<Segment>) -> Result<Self> {
        let Some(first) = segments.first() else {
            bail!("script must contain at least one segment");
        };
        if first.reveal_at_ms != 0 {
            bail!(
                "first segment '{}' must reveal at 0ms, found {}ms",
                first.id,
                first.reveal_at_ms
            );
        }

        for pair in segments.windows(2) {
            if pair[1].reveal_at_ms <= pair[0].reveal_at_ms {
                bail!(
                    "segment '{}' reveals at {}ms, not after '{}' at {}ms",
                    pair[1].id,
                    pair[1].reveal_at_ms,
                    pair[0].id,
                    pair[0].reveal_at_ms
                );
            }
        }

        let mut seen = HashSet::new();
        for segment in &segments {
            if !seen.insert(segment.id.as_str()) {
                bail!("duplicate segment id '{}'", segment.id);
            }
        }

        // A lone segment at 0ms would give a zero-length run.
        if segments.len() < 2 {
            bail!("script needs a final segment after 0ms to define its duration");
        }

        Ok(Self { segments })
    }

    /// The five-beat, twenty second story shipped with the player.
    pub fn builtin() -> Self {
        Self {
            segments: builtin::segments(),
        }
    }

    pub fn from_json_str(contents: &str) -> Result<Self> {
        let document: ScriptDocument =
            serde_json::from_str(contents).context("Failed to parse script JSON")?;
        Self::new(document.segments)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read script from {}", path.display()))?;
        Self::from_json_str(&contents)
            .with_context(|| format!("Invalid script in {}", path.display()))
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn get(&self, index: usize) -> Option<&Segment> {
        self.segments.get(index)
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn last_index(&self) -> usize {
        self.segments.len() - 1
    }

    pub fn total_duration_ms(&self) -> u64 {
        self.segments
            .last()
            .map(|segment| segment.reveal_at_ms)
            .unwrap_or(0)
    }

    /// Index of the latest segment due at `elapsed_ms`.
    pub fn index_at(&self, elapsed_ms: f64) -> usize {
        self.segments
            .iter()
            .rposition(|segment| segment.reveal_at_ms as f64 <= elapsed_ms)
            .unwrap_or(0)
    }
}
