//! Wide string to UTF-8 conversion.

use crate::error::{Error, Result};

/// Converts a wide string to UTF-8.
///
/// Embedded nulls split the input into segments that are converted one by
/// one; each null is kept as a single `\0` in the output, and a trailing
/// segment without a terminating null is still converted. Unpaired
/// surrogates fail the whole conversion.
pub fn wide_to_utf8(wide: &[u16]) -> Result<String> {
    let mut out = String::with_capacity(wide.len());
    for (segment, chunk) in wide.split(|&c| c == 0).enumerate() {
        if segment > 0 {
            out.push('\0');
        }
        let converted = String::from_utf16(chunk)
            .map_err(|source| Error::InvalidUtf16 { segment, source })?;
        out.push_str(&converted);
    }
    Ok(out)
}
