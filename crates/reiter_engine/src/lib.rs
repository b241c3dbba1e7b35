//! Reiter engine: bridge to the sattel backend process and effect execution.
mod engine;
mod error;
mod launcher;
mod session;
mod settings;
mod sink;
mod throttle;
mod types;

pub use engine::EngineHandle;
pub use error::SyncError;
pub use launcher::{Launcher, ProcessLauncher, SyncIo};
pub use session::{drive_session, run_link, RunControl, RunLink};
pub use settings::SattelSettings;
pub use sink::{ChannelEventSink, EventSink};
pub use throttle::AdvanceThrottle;
pub use types::{
    BarEvent, BarId, BarKind, BarMessage, EngineEvent, RequestSubject, RunGeneration, SyncSubject,
};
