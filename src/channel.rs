//! Outbound method channel to the application side.
//!
//! The transport is a black box for the drop target: sending a message only
//! queues it, so OS callbacks never wait on the consumer.

use serde_json::Value;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::error::{Error, Result};
use crate::event::DropEvent;

#[derive(Debug, Clone, PartialEq)]
pub struct MethodCall {
    pub channel: String,
    pub method: String,
    pub arguments: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MethodResponse {
    Success(Value),
    NotImplemented,
}

pub type MethodCallHandler = Box<dyn Fn(&MethodCall) -> MethodResponse + Send + Sync>;

/// Sending half of the message transport.
#[derive(Debug, Clone)]
pub struct Messenger {
    outbound: UnboundedSender<MethodCall>,
}

/// Creates a messenger and the receiver the consumer reads from.
pub fn messenger() -> (Messenger, UnboundedReceiver<MethodCall>) {
    let (outbound, receiver) = mpsc::unbounded_channel();
    (Messenger { outbound }, receiver)
}

impl Messenger {
    pub fn send(&self, call: MethodCall) -> Result<()> {
        self.outbound
            .send(call)
            .map_err(|e| Error::ChannelClosed { method: e.0.method })
    }
}

/// Anything drop events can be written to.
pub trait EventSink {
    fn send_event(&self, event: DropEvent);
}

pub struct MethodChannel {
    name: String,
    messenger: Messenger,
    handler: Option<MethodCallHandler>,
}

impl MethodChannel {
    pub fn new(messenger: &Messenger, name: impl Into<String>) -> Self {
        Self { name: name.into(), messenger: messenger.clone(), handler: None }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_method_call_handler<F>(&mut self, handler: F)
    where
        F: Fn(&MethodCall) -> MethodResponse + Send + Sync + 'static,
    {
        self.handler = Some(Box::new(handler));
    }

    /// Answers a call coming from the application side.
    pub fn handle_method_call(&self, call: &MethodCall) -> MethodResponse {
        match &self.handler {
            Some(handler) => handler(call),
            None => MethodResponse::NotImplemented,
        }
    }

    /// Fire-and-forget. A consumer that went away is not an error for the
    /// caller.
    pub fn invoke_method(&self, method: &str, arguments: Value) {
        let call = MethodCall { channel: self.name.clone(), method: method.to_owned(), arguments };
        if let Err(e) = self.messenger.send(call) {
            tracing::debug!(channel = %self.name, "dropping message: {}", e);
        }
    }
}

impl EventSink for MethodChannel {
    fn send_event(&self, event: DropEvent) {
        tracing::trace!(channel = %self.name, ?event, "sending drop event");
        self.invoke_method(event.method(), event.arguments());
    }
}

impl std::fmt::Debug for MethodChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MethodChannel")
            .field("name", &self.name)
            .field("has_handler", &self.handler.is_some())
            .finish()
    }
}
