//! Receiver bookkeeping and the control channel manager

mod manager;
mod registry;
mod state;

pub use manager::{ChannelManager, OswEvent};
pub use registry::{LocalRegistry, ReceiverHandle, ReceiverRegistry};
pub use state::{ReceiverState, ReceiverStats};
