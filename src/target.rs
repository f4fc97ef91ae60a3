//! The drop target: one per window, fed by the OS drag callbacks.

use std::cell::{Cell, RefCell};
use std::ptr::NonNull;

use crate::channel::EventSink;
use crate::com::CountedRef;
use crate::error::RegisterError;
use crate::event::{DropEvent, Point};
use crate::files::{self, FilePayload};
use crate::ole::{register_with_retry, SubsystemCounter, SubsystemLease};

/// The native window a target is attached to.
pub trait DropWindow {
    /// Interface header of the counted target object handed to the OS.
    type Interface;

    fn register(&self, target: NonNull<Self::Interface>) -> Result<(), RegisterError>;
    fn revoke(&self);
    fn screen_to_client(&self, x: i32, y: i32) -> Point;
}

pub struct DropTarget<C, W: DropWindow> {
    channel: C,
    window: W,
    /// Base names captured on enter, valid until leave or drop.
    current_file_names: RefCell<Vec<String>>,
    registered: Cell<bool>,
    revoked: Cell<bool>,
    lease: RefCell<Option<SubsystemLease>>,
}

impl<C: EventSink, W: DropWindow> DropTarget<C, W> {
    pub fn new(channel: C, window: W) -> Self {
        Self {
            channel,
            window,
            current_file_names: RefCell::new(Vec::new()),
            registered: Cell::new(false),
            revoked: Cell::new(false),
            lease: RefCell::new(None),
        }
    }

    /// Allocates a counted target and registers it with `window`.
    ///
    /// A registration that still fails after the subsystem retry leaves the
    /// target inert: it exists but never receives callbacks.
    pub fn create(
        channel: C, window: W, interface: W::Interface, subsystem: &'static SubsystemCounter,
    ) -> CountedRef<W::Interface, Self> {
        let target = CountedRef::new(interface, Self::new(channel, window));
        let registration =
            register_with_retry(subsystem, || target.window.register(target.as_interface()));
        target.registered.set(registration.registered);
        *target.lease.borrow_mut() = registration.lease;
        target
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    pub fn is_registered(&self) -> bool {
        self.registered.get() && !self.revoked.get()
    }

    pub fn current_file_names(&self) -> Vec<String> {
        self.current_file_names.borrow().clone()
    }

    /// Removes the window's drop registration. Only the first call reaches
    /// the OS.
    pub fn revoke(&self) {
        if self.revoked.replace(true) {
            return;
        }
        self.window.revoke();
    }

    pub fn drag_enter<P: FilePayload + ?Sized>(&self, payload: Option<&P>, x: i32, y: i32) {
        let point = self.window.screen_to_client(x, y);
        let files = payload.map(files::file_names).unwrap_or_default();
        *self.current_file_names.borrow_mut() = files.clone();
        self.channel.send_event(DropEvent::Entered { point, files });
    }

    pub fn drag_over(&self, x: i32, y: i32) {
        let point = self.window.screen_to_client(x, y);
        let files = self.current_file_names();
        self.channel.send_event(DropEvent::Updated { point, files });
    }

    pub fn drag_leave(&self) {
        self.current_file_names.borrow_mut().clear();
        self.channel.send_event(DropEvent::Exited);
    }

    /// Reads full paths from `payload` independently of what enter captured.
    pub fn perform_drop<P: FilePayload + ?Sized>(&self, payload: Option<&P>) {
        let paths = payload.map(files::file_paths).unwrap_or_default();
        self.current_file_names.borrow_mut().clear();
        self.channel.send_event(DropEvent::DropCompleted { paths });
    }
}

impl<C, W: DropWindow> Drop for DropTarget<C, W> {
    fn drop(&mut self) {
        if !self.revoked.replace(true) {
            self.window.revoke();
        }
        // The lease field is dropped after this, once the window is revoked.
    }
}
