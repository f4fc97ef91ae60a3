// HDROP access adapted from https://github.com/rust-windowing/winit/blob/master/src/platform_impl/windows/drop_handler.rs
use std::{marker::PhantomData, mem, ptr, ptr::NonNull};

use winapi::{
    shared::{
        minwindef::{HGLOBAL, UINT},
        winerror::{DV_E_FORMATETC, S_OK, SUCCEEDED},
        wtypes::{CLIPFORMAT, DVASPECT_CONTENT},
    },
    um::{
        objidl::{IDataObject, FORMATETC, STGMEDIUM, TYMED_HGLOBAL},
        ole2::ReleaseStgMedium,
        shellapi::{DragQueryFileW, HDROP},
        winbase::{GlobalLock, GlobalUnlock},
        winuser::CF_HDROP,
    },
};

use crate::files::{FileList, FilePayload};

/// Borrowed `IDataObject` handed to a drop target callback.
pub struct DataObject<'a> {
    ptr: NonNull<IDataObject>,
    _marker: PhantomData<&'a IDataObject>,
}

impl DataObject<'_> {
    pub unsafe fn from_ptr(ptr: *const IDataObject) -> Option<Self> {
        NonNull::new(ptr as *mut IDataObject).map(|ptr| DataObject { ptr, _marker: PhantomData })
    }

    fn get(&self) -> &IDataObject {
        unsafe { self.ptr.as_ref() }
    }
}

fn hdrop_format() -> FORMATETC {
    FORMATETC {
        cfFormat: CF_HDROP as CLIPFORMAT,
        ptd: ptr::null(),
        dwAspect: DVASPECT_CONTENT,
        lindex: -1,
        tymed: TYMED_HGLOBAL,
    }
}

impl FilePayload for DataObject<'_> {
    type Files = DropFiles;

    fn has_file_list(&self) -> bool {
        let mut format = hdrop_format();
        unsafe { self.get().QueryGetData(&mut format) == S_OK }
    }

    fn file_list(&self) -> Option<DropFiles> {
        let mut format = hdrop_format();
        let mut medium: STGMEDIUM = unsafe { mem::zeroed() };
        let result = unsafe { self.get().GetData(&mut format, &mut medium) };
        if !SUCCEEDED(result) {
            if result == DV_E_FORMATETC {
                tracing::debug!("dragged item is not a file");
            } else {
                tracing::debug!("GetData failed with {:#010x}", result);
            }
            return None;
        }

        // The union holds the HGLOBAL itself.
        let hglobal = medium.u as HGLOBAL;
        if unsafe { GlobalLock(hglobal) }.is_null() {
            unsafe { ReleaseStgMedium(&mut medium) };
            return None;
        }
        Some(DropFiles { medium, hglobal })
    }
}

/// A locked CF_HDROP medium. Unlocked and released on drop.
pub struct DropFiles {
    medium: STGMEDIUM,
    hglobal: HGLOBAL,
}

impl DropFiles {
    fn hdrop(&self) -> HDROP {
        self.hglobal as HDROP
    }
}

impl FileList for DropFiles {
    fn count(&self) -> u32 {
        // 0xFFFFFFFF asks for the item count
        unsafe { DragQueryFileW(self.hdrop(), 0xFFFFFFFF, ptr::null_mut(), 0) }
    }

    fn entry(&self, index: u32) -> Vec<u16> {
        unsafe {
            // Length without the terminating null. Paths may exceed MAX_PATH.
            let character_count = DragQueryFileW(self.hdrop(), index, ptr::null_mut(), 0) as usize;
            let mut path_buf = vec![0u16; character_count + 1];
            let copied = DragQueryFileW(
                self.hdrop(),
                index,
                path_buf.as_mut_ptr(),
                path_buf.len() as UINT,
            ) as usize;
            path_buf.truncate(copied.min(character_count));
            path_buf
        }
    }
}

impl Drop for DropFiles {
    fn drop(&mut self) {
        unsafe {
            GlobalUnlock(self.hglobal);
            ReleaseStgMedium(&mut self.medium);
        }
    }
}
