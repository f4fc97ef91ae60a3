//! Host-side registration: one drop target per application window.

use raw_window_handle::RawWindowHandle;

use crate::channel::{MethodCall, MethodChannel, MethodResponse, Messenger};
use crate::com::CountedRef;
use crate::target::{DropTarget, DropWindow};

pub const CHANNEL_NAME: &str = "desktop_drop";

#[derive(Debug, Clone)]
pub struct PluginOptions {
    /// Name of the method channel events are sent on.
    pub channel_name: String,
}

impl Default for PluginOptions {
    fn default() -> Self {
        Self { channel_name: CHANNEL_NAME.to_owned() }
    }
}

impl PluginOptions {
    pub fn channel_name(mut self, name: impl Into<String>) -> Self {
        self.channel_name = name.into();
        self
    }
}

/// An object the host keeps alive until shutdown.
pub trait Plugin {
    fn handle_method_call(&self, call: &MethodCall) -> MethodResponse;
}

/// What the host application offers to plugins at startup.
pub trait PluginRegistrar {
    fn native_window(&self) -> Option<RawWindowHandle>;
    fn messenger(&self) -> &Messenger;
    fn add_plugin(&mut self, plugin: Box<dyn Plugin>);
}

pub type CountedTarget<W> = CountedRef<<W as DropWindow>::Interface, DropTarget<MethodChannel, W>>;

/// Holds the one counted reference that keeps the drop target alive.
pub struct DesktopDropPlugin<W: DropWindow> {
    target: CountedTarget<W>,
}

impl<W: DropWindow> DesktopDropPlugin<W> {
    pub fn new(target: CountedTarget<W>) -> Self {
        Self { target }
    }

    pub fn target(&self) -> &DropTarget<MethodChannel, W> {
        &self.target
    }
}

impl<W: DropWindow> Plugin for DesktopDropPlugin<W> {
    fn handle_method_call(&self, call: &MethodCall) -> MethodResponse {
        self.target.channel().handle_method_call(call)
    }
}

impl<W: DropWindow> Drop for DesktopDropPlugin<W> {
    fn drop(&mut self) {
        // Revoking first makes the OS give back the references it took while
        // registered, so releasing `target` below is the final release.
        self.target.revoke();
    }
}

/// Registers a drop target for the registrar's window.
///
/// `create` turns the native handle into a registered target and may refuse
/// handles it cannot use. Without a window nothing is registered and no event
/// is ever sent. Returns whether a plugin was added.
pub fn register_with_registrar<R, W, F>(registrar: &mut R, options: &PluginOptions, create: F) -> bool
where
    R: PluginRegistrar + ?Sized,
    W: DropWindow + 'static,
    W::Interface: 'static,
    F: FnOnce(MethodChannel, RawWindowHandle) -> Option<CountedTarget<W>>,
{
    let window = match registrar.native_window() {
        Some(window) => window,
        None => {
            tracing::debug!("no native window, drop target disabled");
            return false;
        }
    };

    let mut channel = MethodChannel::new(registrar.messenger(), options.channel_name.clone());
    channel.set_method_call_handler(|_| MethodResponse::NotImplemented);

    let target = match create(channel, window) {
        Some(target) => target,
        None => {
            tracing::debug!("unsupported window handle {:?}, drop target disabled", window);
            return false;
        }
    };

    registrar.add_plugin(Box::new(DesktopDropPlugin::new(target)));
    true
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use raw_window_handle::Win32WindowHandle;
    use serde_json::json;

    use super::*;
    use crate::channel::messenger;
    use crate::ole::tests::leaked;
    use crate::target::tests::FakeWindow;

    struct FakeRegistrar {
        window: Option<RawWindowHandle>,
        messenger: Messenger,
        plugins: Vec<Box<dyn Plugin>>,
    }

    impl PluginRegistrar for FakeRegistrar {
        fn native_window(&self) -> Option<RawWindowHandle> {
            self.window
        }

        fn messenger(&self) -> &Messenger {
            &self.messenger
        }

        fn add_plugin(&mut self, plugin: Box<dyn Plugin>) {
            self.plugins.push(plugin);
        }
    }

    fn registrar(window: Option<RawWindowHandle>) -> FakeRegistrar {
        let (messenger, _receiver) = messenger();
        FakeRegistrar { window, messenger, plugins: Vec::new() }
    }

    fn win32() -> RawWindowHandle {
        RawWindowHandle::Win32(Win32WindowHandle::empty())
    }

    #[test]
    fn no_window_no_drop() {
        let mut registrar = registrar(None);
        let mut called = false;
        let added = register_with_registrar(&mut registrar, &PluginOptions::default(), |_, _| {
            called = true;
            None::<CountedTarget<FakeWindow>>
        });
        assert!(!added);
        assert!(!called);
        assert!(registrar.plugins.is_empty());
    }

    #[test]
    fn refused_handle_adds_nothing() {
        let mut registrar = registrar(Some(win32()));
        let added = register_with_registrar(&mut registrar, &PluginOptions::default(), |_, _| {
            None::<CountedTarget<FakeWindow>>
        });
        assert!(!added);
        assert!(registrar.plugins.is_empty());
    }

    #[test]
    fn plugin_holds_target_until_teardown() {
        let (_, counter) = leaked();
        let log = Rc::new(RefCell::new(Vec::new()));
        let options = PluginOptions::default().channel_name("drops");
        let mut registrar = registrar(Some(win32()));

        let window_log = log.clone();
        let added = register_with_registrar(&mut registrar, &options, |channel, _| {
            assert_eq!(channel.name(), "drops");
            let window = FakeWindow { log: window_log, ..Default::default() };
            Some(DropTarget::create(channel, window, (), counter))
        });
        assert!(added);
        assert_eq!(registrar.plugins.len(), 1);
        assert_eq!(*log.borrow(), vec!["register"]);

        let call = MethodCall { channel: "drops".into(), method: "ping".into(), arguments: json!([]) };
        assert_eq!(registrar.plugins[0].handle_method_call(&call), MethodResponse::NotImplemented);

        registrar.plugins.clear();
        assert_eq!(*log.borrow(), vec!["register", "revoke"]);
    }
}
