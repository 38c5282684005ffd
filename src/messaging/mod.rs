// Messaging - Change notifications from the engine to observers

pub mod channels;
pub mod events;

pub use channels::{EventConsumer, EventProducer, EventSink, create_event_channel};
pub use events::EngineEvent;
