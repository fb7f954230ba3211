//! Block cipher primitives used for key unwrapping, never on payload audio.

pub(crate) mod aes;
pub(crate) mod tea;
