mod angle;
mod evaluate;
mod hold;
mod rules;
mod tracker;

pub use angle::angle_span;
pub use evaluate::{evaluate, CaptureMode, CaptureVerdict};
pub use hold::{HoldRules, HoldTracker, HoldUpdate};
pub use rules::CaptureRules;
pub use tracker::{CapturePathPoint, CaptureTracker, CaptureUpdate, TrackerState};
