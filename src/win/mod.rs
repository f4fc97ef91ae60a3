mod data;
mod drop_handler;

pub use data::{DataObject, DropFiles};
pub use drop_handler::{create_drop_target, Win32Window, WindowsDropTarget};

use raw_window_handle::RawWindowHandle;
use winapi::shared::windef::HWND;

use crate::plugin::{self, PluginOptions, PluginRegistrar};

/// Registers the drop target for the registrar's Win32 window. Any other kind
/// of handle, or none at all, disables the feature.
pub fn register_with_registrar<R: PluginRegistrar + ?Sized>(
    registrar: &mut R, options: &PluginOptions,
) -> bool {
    plugin::register_with_registrar(registrar, options, |channel, handle| match handle {
        RawWindowHandle::Win32(handle) if !handle.hwnd.is_null() => {
            Some(create_drop_target(channel, handle.hwnd as HWND))
        }
        _ => None,
    })
}
