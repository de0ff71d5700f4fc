pub mod channel;
pub mod engine;
pub mod error;

pub use channel::ChannelDispatcher;
pub use engine::{BookingEngine, Decision, NewRequest, NewTrip};
pub use error::EngineError;
