pub mod presence_tracker;

pub use presence_tracker::{Observation, PresenceTracker};
