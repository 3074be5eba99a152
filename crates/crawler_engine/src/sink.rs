use std::sync::mpsc;

use crate::EngineEvent;

pub trait EventSink<T>: Send + Sync {
    fn emit(&self, event: EngineEvent<T>);
}

/// Forwards events into a std channel drained by the host loop.
pub struct ChannelEventSink<T> {
    tx: mpsc::Sender<EngineEvent<T>>,
}

impl<T> ChannelEventSink<T> {
    pub fn new(tx: mpsc::Sender<EngineEvent<T>>) -> Self {
        Self { tx }
    }
}

impl<T: Send> EventSink<T> for ChannelEventSink<T> {
    fn emit(&self, event: EngineEvent<T>) {
        // The host hung up; nothing left to notify.
        let _ = self.tx.send(event);
    }
}
