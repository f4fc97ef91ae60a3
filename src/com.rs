//! COM-style shared ownership.
//!
//! [`Counted`] is a heap object whose lifetime is driven by an explicit atomic
//! reference count instead of Rust ownership, so that it can be handed to the
//! OS as an interface pointer. [`CountedRef`] owns one of those references.

use std::ops::Deref;
use std::ptr::NonNull;
use std::sync::atomic::{self, AtomicU32, Ordering};

use thiserror::Error;
use uuid::Uuid;

pub const IID_IUNKNOWN: Uuid = Uuid::from_u128(0x00000000_0000_0000_c000_000000000046);
pub const IID_IDROPTARGET: Uuid = Uuid::from_u128(0x00000122_0000_0000_c000_000000000046);

/// An interface header that can sit at the start of a [`Counted`] object.
pub trait ComInterface {
    const IID: Uuid;
}

/// Whether an object exposing `I` answers a query for `iid`.
pub fn supports<I: ComInterface>(iid: &Uuid) -> bool {
    *iid == IID_IUNKNOWN || *iid == I::IID
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("no such interface")]
pub struct NoInterface;

#[repr(C)]
pub struct Counted<I, T> {
    // Must stay the first field, interface pointers are pointers to this.
    interface: I,
    refcount: AtomicU32,
    value: T,
}

#[allow(clippy::missing_safety_doc)]
impl<I, T> Counted<I, T> {
    /// Allocates the object with a reference count of zero.
    pub fn new(interface: I, value: T) -> NonNull<Self> {
        let boxed = Box::new(Self { interface, refcount: AtomicU32::new(0), value });
        NonNull::from(Box::leak(boxed))
    }

    pub unsafe fn from_interface<P>(this: *mut P) -> NonNull<Self> {
        NonNull::new_unchecked(this as *mut Self)
    }

    pub unsafe fn value<'a>(this: NonNull<Self>) -> &'a T {
        &(*this.as_ptr()).value
    }

    pub unsafe fn ref_count(this: NonNull<Self>) -> u32 {
        (*this.as_ptr()).refcount.load(Ordering::Acquire)
    }

    /// Returns the new count.
    pub unsafe fn add_ref(this: NonNull<Self>) -> u32 {
        (*this.as_ptr()).refcount.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Returns the remaining count. The object is destroyed before this
    /// returns when the count reaches zero, and `this` must not be used again.
    pub unsafe fn release(this: NonNull<Self>) -> u32 {
        let previous = (*this.as_ptr()).refcount.fetch_sub(1, Ordering::Release);
        debug_assert_ne!(previous, 0, "released an object with no references");
        let count = previous.wrapping_sub(1);
        if count == 0 {
            atomic::fence(Ordering::Acquire);
            drop(Box::from_raw(this.as_ptr()));
        }
        count
    }

    /// On success the returned pointer carries a new reference.
    pub unsafe fn query_interface(
        this: NonNull<Self>, iid: &Uuid,
    ) -> Result<NonNull<I>, NoInterface>
    where
        I: ComInterface,
    {
        if !supports::<I>(iid) {
            return Err(NoInterface);
        }
        Self::add_ref(this);
        Ok(this.cast())
    }
}

/// One owned reference to a [`Counted`] object.
pub struct CountedRef<I, T> {
    ptr: NonNull<Counted<I, T>>,
}

impl<I, T> CountedRef<I, T> {
    pub fn new(interface: I, value: T) -> Self {
        let ptr = Counted::new(interface, value);
        unsafe {
            Counted::add_ref(ptr);
        }
        Self { ptr }
    }

    /// Takes an additional reference on a live object.
    ///
    /// # Safety
    /// `ptr` must point to a live `Counted` object.
    pub unsafe fn from_raw(ptr: NonNull<Counted<I, T>>) -> Self {
        Counted::add_ref(ptr);
        Self { ptr }
    }

    pub fn as_ptr(&self) -> NonNull<Counted<I, T>> {
        self.ptr
    }

    pub fn as_interface(&self) -> NonNull<I> {
        self.ptr.cast()
    }

    pub fn ref_count(&self) -> u32 {
        unsafe { Counted::ref_count(self.ptr) }
    }

    /// The returned pointer carries its own reference, to be given back with
    /// [`Counted::release`].
    pub fn query_interface(&self, iid: &Uuid) -> Result<NonNull<I>, NoInterface>
    where
        I: ComInterface,
    {
        unsafe { Counted::query_interface(self.ptr, iid) }
    }
}

impl<I, T> Deref for CountedRef<I, T> {
    type Target = T;

    fn deref(&self) -> &T {
        unsafe { Counted::value(self.ptr) }
    }
}

impl<I, T> Clone for CountedRef<I, T> {
    fn clone(&self) -> Self {
        unsafe { Self::from_raw(self.ptr) }
    }
}

impl<I, T> Drop for CountedRef<I, T> {
    fn drop(&mut self) {
        unsafe {
            Counted::release(self.ptr);
        }
    }
}

unsafe impl<I: Send + Sync, T: Send + Sync> Send for CountedRef<I, T> {}
unsafe impl<I: Send + Sync, T: Send + Sync> Sync for CountedRef<I, T> {}
