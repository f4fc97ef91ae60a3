//! Native drop target that turns OS file-drop gestures into messages on an
//! asynchronous method channel.
//!
//! The gesture state machine, file list extraction and COM-style reference
//! counting live in platform-neutral modules. The Win32 backend in [`win`]
//! wires them to `RegisterDragDrop` and `IDataObject`.

pub mod channel;
pub mod com;
pub mod encoding;
mod error;
pub mod event;
pub mod files;
pub mod ole;
pub mod plugin;
pub mod target;

#[cfg(target_os = "windows")]
pub mod win;

pub use channel::{messenger, EventSink, MethodCall, MethodChannel, MethodResponse, Messenger};
pub use com::{supports, ComInterface, Counted, CountedRef, NoInterface};
pub use error::{Error, RegisterError, Result};
pub use event::{DropEvent, Point};
pub use plugin::{register_with_registrar, DesktopDropPlugin, Plugin, PluginOptions, PluginRegistrar};
pub use target::{DropTarget, DropWindow};
