// Vtable layout adapted from https://github.com/rust-windowing/winit/blob/master/src/platform_impl/windows/drop_handler.rs
use std::ptr::{self, NonNull};

use uuid::Uuid;
use winapi::{
    ctypes::c_void,
    shared::{
        guiddef::{GUID, REFIID},
        minwindef::{DWORD, ULONG},
        windef::{HWND, POINT, POINTL},
        winerror::{E_NOINTERFACE, E_OUTOFMEMORY, E_POINTER, S_OK, SUCCEEDED},
    },
    um::{
        objidl::IDataObject,
        ole2::{OleInitialize, OleUninitialize, RegisterDragDrop, RevokeDragDrop},
        oleidl::{IDropTarget, IDropTargetVtbl},
        unknwnbase::{IUnknown, IUnknownVtbl},
        winnt::HRESULT,
        winuser::ScreenToClient,
    },
};

use super::data::DataObject;
use crate::channel::MethodChannel;
use crate::com::{ComInterface, Counted, IID_IDROPTARGET};
use crate::error::{Error, RegisterError, Result};
use crate::event::Point;
use crate::ole::{Subsystem, SubsystemCounter};
use crate::plugin::CountedTarget;
use crate::target::{DropTarget, DropWindow};

pub type WindowsDropTarget = DropTarget<MethodChannel, Win32Window>;
type DropTargetObject = Counted<IDropTarget, WindowsDropTarget>;

impl ComInterface for IDropTarget {
    const IID: Uuid = IID_IDROPTARGET;
}

struct Ole;

impl Subsystem for Ole {
    fn initialize(&self) -> Result<()> {
        let hr = unsafe { OleInitialize(ptr::null_mut()) };
        if SUCCEEDED(hr) {
            Ok(())
        } else {
            Err(Error::Subsystem { code: hr })
        }
    }

    fn uninitialize(&self) {
        unsafe { OleUninitialize() }
    }
}

static OLE: SubsystemCounter = SubsystemCounter::new(&Ole);

pub struct Win32Window {
    hwnd: HWND,
}

impl DropWindow for Win32Window {
    type Interface = IDropTarget;

    fn register(&self, target: NonNull<IDropTarget>) -> std::result::Result<(), RegisterError> {
        match unsafe { RegisterDragDrop(self.hwnd, target.as_ptr()) } {
            S_OK => Ok(()),
            E_OUTOFMEMORY => Err(RegisterError::OutOfMemory),
            hr => Err(RegisterError::Other(hr)),
        }
    }

    fn revoke(&self) {
        let hr = unsafe { RevokeDragDrop(self.hwnd) };
        if hr != S_OK {
            tracing::debug!("RevokeDragDrop returned {:#010x}", hr);
        }
    }

    fn screen_to_client(&self, x: i32, y: i32) -> Point {
        let mut point = POINT { x, y };
        unsafe {
            ScreenToClient(self.hwnd, &mut point);
        }
        Point::new(point.x as f64, point.y as f64)
    }
}

/// Creates the drop target for `hwnd` and registers it with OLE.
pub fn create_drop_target(channel: MethodChannel, hwnd: HWND) -> CountedTarget<Win32Window> {
    let interface = IDropTarget { lpVtbl: &DROP_TARGET_VTBL as *const IDropTargetVtbl };
    DropTarget::create(channel, Win32Window { hwnd }, interface, &OLE)
}

fn uuid_from_guid(guid: &GUID) -> Uuid {
    Uuid::from_fields(guid.Data1, guid.Data2, guid.Data3, &guid.Data4)
}

unsafe fn from_interface<InterfaceT>(this: *mut InterfaceT) -> NonNull<DropTargetObject> {
    Counted::from_interface(this)
}

unsafe fn target<'a>(this: *mut IDropTarget) -> &'a WindowsDropTarget {
    Counted::value(from_interface(this))
}

// POINTL arrives by value, the winapi signature declares a pointer.
unsafe fn point(pt: *const POINTL) -> POINTL {
    std::mem::transmute(pt)
}

struct DropHandler;

#[allow(non_snake_case)]
impl DropHandler {
    pub unsafe extern "system" fn QueryInterface(
        this: *mut IUnknown, riid: REFIID, ppvObject: *mut *mut c_void,
    ) -> HRESULT {
        if ppvObject.is_null() || riid.is_null() {
            return E_POINTER;
        }
        match Counted::query_interface(from_interface(this), &uuid_from_guid(&*riid)) {
            Ok(interface) => {
                *ppvObject = interface.as_ptr() as *mut c_void;
                S_OK
            }
            Err(_) => {
                *ppvObject = ptr::null_mut();
                E_NOINTERFACE
            }
        }
    }

    pub unsafe extern "system" fn AddRef(this: *mut IUnknown) -> ULONG {
        Counted::add_ref(from_interface(this)) as ULONG
    }

    pub unsafe extern "system" fn Release(this: *mut IUnknown) -> ULONG {
        Counted::release(from_interface(this)) as ULONG
    }

    pub unsafe extern "system" fn DragEnter(
        this: *mut IDropTarget, pDataObj: *const IDataObject, _grfKeyState: DWORD, pt: *const POINTL,
        _pdwEffect: *mut DWORD,
    ) -> HRESULT {
        let pt = point(pt);
        let payload = DataObject::from_ptr(pDataObj);
        target(this).drag_enter(payload.as_ref(), pt.x, pt.y);
        S_OK
    }

    pub unsafe extern "system" fn DragOver(
        this: *mut IDropTarget, _grfKeyState: DWORD, pt: *const POINTL, _pdwEffect: *mut DWORD,
    ) -> HRESULT {
        let pt = point(pt);
        target(this).drag_over(pt.x, pt.y);
        S_OK
    }

    pub unsafe extern "system" fn DragLeave(this: *mut IDropTarget) -> HRESULT {
        target(this).drag_leave();
        S_OK
    }

    pub unsafe extern "system" fn Drop(
        this: *mut IDropTarget, pDataObj: *const IDataObject, _grfKeyState: DWORD, _pt: *const POINTL,
        _pdwEffect: *mut DWORD,
    ) -> HRESULT {
        let payload = DataObject::from_ptr(pDataObj);
        target(this).perform_drop(payload.as_ref());
        S_OK
    }
}

static DROP_TARGET_VTBL: IDropTargetVtbl = IDropTargetVtbl {
    parent: IUnknownVtbl {
        QueryInterface: DropHandler::QueryInterface,
        AddRef: DropHandler::AddRef,
        Release: DropHandler::Release,
    },
    DragEnter: DropHandler::DragEnter,
    DragOver: DropHandler::DragOver,
    DragLeave: DropHandler::DragLeave,
    Drop: DropHandler::Drop,
};
