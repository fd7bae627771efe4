pub mod clock;
pub mod commands;
pub mod controller;
pub mod state;

pub use clock::{Clock, TokioClock};
pub use commands::PlayerCommand;
pub use controller::PlaybackController;
pub use state::{PlaybackPhase, PlaybackState};
