// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::any::Any;

/// Readable text of a caught panic payload.
///
/// # Example
///
/// ```rust
/// use cogwheel::utils::panic_message;
///
/// let payload = std::panic::catch_unwind(|| panic!("out of memory")).unwrap_err();
/// assert_eq!(panic_message(payload.as_ref()), "out of memory");
/// ```
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic with a non-string payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_message() {
        let owned = std::panic::catch_unwind(|| panic!("{} failed", "step")).unwrap_err();
        assert_eq!(panic_message(owned.as_ref()), "step failed");

        let opaque = std::panic::catch_unwind(|| std::panic::panic_any(42)).unwrap_err();
        assert_eq!(panic_message(opaque.as_ref()), "panic with a non-string payload");
    }
}
