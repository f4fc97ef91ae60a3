use std::string::FromUtf16Error;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("segment {segment} is not valid UTF-16")]
    InvalidUtf16 {
        segment: usize,
        #[source]
        source: FromUtf16Error,
    },

    #[error("drag-drop registration failed: {0}")]
    Registration(#[from] RegisterError),

    #[error("subsystem initialization failed with code {code:#010x}")]
    Subsystem { code: i32 },

    #[error("channel closed while sending `{method}`")]
    ChannelClosed { method: String },
}

/// Why the OS refused to register a window as drop target.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterError {
    /// The OLE subsystem is not initialized on the calling thread. Reported by
    /// `RegisterDragDrop` as `E_OUTOFMEMORY`.
    #[error("out of memory (drag-drop subsystem not initialized)")]
    OutOfMemory,
    #[error("error code {0:#010x}")]
    Other(i32),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_error_converts_into_registration() {
        let error = Error::from(RegisterError::OutOfMemory);
        assert!(matches!(error, Error::Registration(RegisterError::OutOfMemory)));
        assert_eq!(
            error.to_string(),
            "drag-drop registration failed: out of memory (drag-drop subsystem not initialized)"
        );
        assert_eq!(
            Error::from(RegisterError::Other(0x8004_0101_u32 as i32)).to_string(),
            "drag-drop registration failed: error code 0x80040101"
        );
    }
}
