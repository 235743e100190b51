//! Cross-crate integration tests live in `tests/`.

#![forbid(unsafe_code)]
