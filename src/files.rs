//! File list extraction from a drag payload.
//!
//! Two separate functions read the same payload: [`file_names`] gives base
//! names for the live preview during a gesture, [`file_paths`] gives full
//! paths for the drop itself.

use crate::encoding::wide_to_utf8;

/// A drag payload that may carry a list of file system paths.
pub trait FilePayload {
    type Files: FileList;

    /// Whether the payload offers a file-drop representation.
    fn has_file_list(&self) -> bool;

    /// Acquires the file list. The underlying medium is released when the
    /// returned value is dropped.
    fn file_list(&self) -> Option<Self::Files>;
}

/// An acquired file list, enumerated by index.
pub trait FileList {
    fn count(&self) -> u32;

    /// Wide path of the entry at `index`, without terminating null.
    fn entry(&self, index: u32) -> Vec<u16>;
}

/// Base names of every file in the payload, in OS order. Empty when the
/// payload carries no files.
pub fn file_names<P: FilePayload + ?Sized>(payload: &P) -> Vec<String> {
    collect(payload, |path| match base_name(&path) {
        Some(name) => name.to_owned(),
        None => path,
    })
}

/// Full paths of every file in the payload, in OS order.
pub fn file_paths<P: FilePayload + ?Sized>(payload: &P) -> Vec<String> {
    collect(payload, |path| path)
}

fn collect<P, F>(payload: &P, map: F) -> Vec<String>
where
    P: FilePayload + ?Sized,
    F: Fn(String) -> String,
{
    if !payload.has_file_list() {
        return Vec::new();
    }
    let files = match payload.file_list() {
        Some(files) => files,
        None => return Vec::new(),
    };
    (0..files.count()).map(|i| map(decode_entry(&files.entry(i)))).collect()
}

fn decode_entry(wide: &[u16]) -> String {
    match wide_to_utf8(wide) {
        Ok(path) => path,
        Err(e) => {
            tracing::debug!("keeping undecoded file name: {}", e);
            String::from_utf16_lossy(wide)
        }
    }
}

/// Final component of a Windows path. `None` when the path ends in a
/// separator or is only a drive.
pub fn base_name(path: &str) -> Option<&str> {
    let last = path.rsplit(|c| c == '\\' || c == '/').next()?;
    let last = match last.as_bytes() {
        [drive, b':', ..] if drive.is_ascii_alphabetic() => &last[2..],
        _ => last,
    };
    if last.is_empty() {
        None
    } else {
        Some(last)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    /// In-memory payload that counts acquired and released media.
    #[derive(Default)]
    pub(crate) struct MemoryPayload {
        entries: Option<Vec<Vec<u16>>>,
        refuse: bool,
        pub(crate) acquired: Rc<Cell<usize>>,
        pub(crate) released: Rc<Cell<usize>>,
    }

    impl MemoryPayload {
        pub(crate) fn files(paths: &[&str]) -> Self {
            Self::wide(paths.iter().map(|p| p.encode_utf16().collect()).collect())
        }

        pub(crate) fn wide(entries: Vec<Vec<u16>>) -> Self {
            Self { entries: Some(entries), ..Default::default() }
        }

        pub(crate) fn text() -> Self {
            Self::default()
        }

        fn refusing(paths: &[&str]) -> Self {
            Self { refuse: true, ..Self::files(paths) }
        }
    }

    pub(crate) struct MemoryFiles {
        entries: Vec<Vec<u16>>,
        released: Rc<Cell<usize>>,
    }

    impl FileList for MemoryFiles {
        fn count(&self) -> u32 {
            self.entries.len() as u32
        }

        fn entry(&self, index: u32) -> Vec<u16> {
            self.entries[index as usize].clone()
        }
    }

    impl Drop for MemoryFiles {
        fn drop(&mut self) {
            self.released.set(self.released.get() + 1);
        }
    }

    impl FilePayload for MemoryPayload {
        type Files = MemoryFiles;

        fn has_file_list(&self) -> bool {
            self.entries.is_some()
        }

        fn file_list(&self) -> Option<MemoryFiles> {
            if self.refuse {
                return None;
            }
            let entries = self.entries.clone()?;
            self.acquired.set(self.acquired.get() + 1);
            Some(MemoryFiles { entries, released: self.released.clone() })
        }
    }

    #[test]
    fn names_and_paths_keep_os_order() {
        let payload = MemoryPayload::files(&["C:\\Users\\x\\report.pdf", "C:\\Users\\x\\img.png"]);
        assert_eq!(file_names(&payload), vec!["report.pdf", "img.png"]);
        assert_eq!(file_paths(&payload), vec!["C:\\Users\\x\\report.pdf", "C:\\Users\\x\\img.png"]);
        assert_eq!(payload.acquired.get(), 2);
        assert_eq!(payload.released.get(), 2);
    }

    #[test]
    fn non_file_payload_is_empty() {
        let payload = MemoryPayload::text();
        assert!(file_names(&payload).is_empty());
        assert!(file_paths(&payload).is_empty());
        assert_eq!(payload.acquired.get(), 0);
    }

    #[test]
    fn refused_payload_is_empty() {
        let payload = MemoryPayload::refusing(&["C:\\a.txt"]);
        assert!(file_paths(&payload).is_empty());
    }

    #[test]
    fn empty_file_list_is_still_released() {
        let payload = MemoryPayload::wide(Vec::new());
        assert!(file_names(&payload).is_empty());
        assert_eq!(payload.acquired.get(), 1);
        assert_eq!(payload.released.get(), 1);
    }

    #[test]
    fn undecodable_entry_is_kept() {
        let mut broken: Vec<u16> = "C:\\dir\\bad".encode_utf16().collect();
        broken.push(0xDC00);
        let payload = MemoryPayload::wide(vec![broken, "C:\\ok.txt".encode_utf16().collect()]);

        let names = file_names(&payload);
        assert_eq!(names.len(), 2);
        assert_eq!(names[0], "bad\u{FFFD}");
        assert_eq!(names[1], "ok.txt");

        let paths = file_paths(&payload);
        assert_eq!(paths[0], "C:\\dir\\bad\u{FFFD}");
    }

    #[test]
    fn directory_path_falls_back_to_full_string() {
        let payload = MemoryPayload::files(&["C:\\Users\\x\\photos\\", "D:"]);
        assert_eq!(file_names(&payload), vec!["C:\\Users\\x\\photos\\", "D:"]);
    }

    #[test]
    fn base_name_rules() {
        assert_eq!(base_name("C:\\a\\b.txt"), Some("b.txt"));
        assert_eq!(base_name("\\\\server\\share\\c.doc"), Some("c.doc"));
        assert_eq!(base_name("C:/mixed\\sep/d.rs"), Some("d.rs"));
        assert_eq!(base_name("C:e.txt"), Some("e.txt"));
        assert_eq!(base_name("plain"), Some("plain"));
        assert_eq!(base_name("C:\\dir\\"), None);
        assert_eq!(base_name(""), None);
    }
}
