//! Playback session: driver, state machine and the components it feeds

pub mod completion;
pub mod controls;
pub mod driver;
pub mod events;
pub mod handle;
pub mod machine;
pub mod scrubber;
mod session;
pub mod simulated;
pub mod status;
pub mod telemetry;

pub use completion::{CompletionRecord, CompletionReporter};
pub use controls::{ControlsVisibility, OpacityFade};
pub use driver::{HostSink, MediaHost, PlaybackDriver};
pub use events::{HostCommand, HostEvent};
pub use handle::{Collaborators, Intent, MountRequest, PlayerHandle, PlayerView};
pub use machine::{Failure, MachineEffect, PlayerMachine};
pub use scrubber::Scrubber;
pub use simulated::{SimulatedHost, SimulatedMedia};
pub use status::PlaybackStatus;
pub use telemetry::TelemetryThrottle;
