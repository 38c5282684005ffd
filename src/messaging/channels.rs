// Communication channels lock-free

use crate::messaging::events::EngineEvent;
use ringbuf::HeapRb;
use ringbuf::traits::{Producer, Split};

pub type EventProducer = ringbuf::HeapProd<EngineEvent>;
pub type EventConsumer = ringbuf::HeapCons<EngineEvent>;

pub fn create_event_channel(capacity: usize) -> (EventProducer, EventConsumer) {
    let rb = HeapRb::<EngineEvent>::new(capacity);
    rb.split()
}

/// Optional producer end used by the engine to publish events
///
/// Publishing never blocks: with no producer attached the event is discarded,
/// and when the channel is full it is dropped with a warning.
#[derive(Default)]
pub struct EventSink {
    producer: Option<EventProducer>,
}

impl EventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, producer: EventProducer) {
        self.producer = Some(producer);
    }

    pub fn detach(&mut self) -> Option<EventProducer> {
        self.producer.take()
    }

    pub fn is_attached(&self) -> bool {
        self.producer.is_some()
    }

    pub fn emit(&mut self, event: EngineEvent) {
        let Some(producer) = self.producer.as_mut() else {
            return;
        };
        if let Err(dropped) = producer.try_push(event) {
            log::warn!("Event channel full, dropping {:?}", dropped);
        }
    }
}

impl std::fmt::Debug for EventSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventSink")
            .field("attached", &self.is_attached())
            .finish()
    }
}
