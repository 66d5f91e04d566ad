//! Mock construction helpers

use motion_recorder::sensors::SampleHandler;
use motion_recorder::{
    Channel, EventSink, MotionError, Result, SensorProvider, SensorSample, SensorSubscription,
    SinkEvent,
};
use std::sync::{Arc, Mutex};

/// Sink that keeps every event it receives
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<SinkEvent>>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<SinkEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn data_events(&self) -> Vec<SinkEvent> {
        self.events()
            .into_iter()
            .filter(|e| matches!(e, SinkEvent::Data { .. }))
            .collect()
    }

    pub fn count(&self, event: &SinkEvent) -> usize {
        self.events().iter().filter(|e| *e == event).count()
    }
}

impl EventSink for RecordingSink {
    fn send(&self, event: SinkEvent) {
        self.events.lock().unwrap().push(event);
    }
}

type HandlerSlots = Arc<Mutex<[Option<SampleHandler>; 4]>>;

/// Provider whose samples are fired by the test
#[derive(Default)]
pub struct ScriptedSensors {
    unavailable: Vec<Channel>,
    handlers: HandlerSlots,
}

impl ScriptedSensors {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn without(channels: &[Channel]) -> Arc<Self> {
        Arc::new(Self {
            unavailable: channels.to_vec(),
            ..Default::default()
        })
    }

    /// Deliver `sample` through its channel's subscription, if any
    pub fn emit(&self, sample: SensorSample) -> bool {
        match self.handler(sample.channel) {
            Some(handler) => {
                handler(sample);
                true
            }
            None => false,
        }
    }

    /// Currently subscribed handler of `channel`
    pub fn handler(&self, channel: Channel) -> Option<SampleHandler> {
        self.handlers.lock().unwrap()[channel.index()].clone()
    }

    pub fn subscribed(&self) -> Vec<Channel> {
        Channel::ALL
            .into_iter()
            .filter(|c| self.handler(*c).is_some())
            .collect()
    }
}

impl SensorProvider for ScriptedSensors {
    fn name(&self) -> &str {
        "scripted"
    }

    fn is_available(&self, channel: Channel) -> bool {
        !self.unavailable.contains(&channel)
    }

    fn subscribe(
        &self,
        channel: Channel,
        handler: SampleHandler,
    ) -> Result<Box<dyn SensorSubscription>> {
        if !self.is_available(channel) {
            return Err(MotionError::SensorUnavailable(channel));
        }
        self.handlers.lock().unwrap()[channel.index()] = Some(handler);
        Ok(Box::new(ScriptedSubscription {
            channel,
            handlers: Arc::clone(&self.handlers),
        }))
    }
}

struct ScriptedSubscription {
    channel: Channel,
    handlers: HandlerSlots,
}

impl SensorSubscription for ScriptedSubscription {
    fn channel(&self) -> Channel {
        self.channel
    }

    fn cancel(&mut self) {
        self.handlers.lock().unwrap()[self.channel.index()] = None;
    }
}
