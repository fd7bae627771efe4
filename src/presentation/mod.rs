pub mod format;
pub mod view;

pub use format::{progress_bar, remaining_label};
pub use view::{PlaybackSnapshot, RevealedSegment, SegmentMarker};
