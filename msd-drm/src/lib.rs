#![cfg_attr(docsrs, feature(doc_cfg))]

//! This crate contains decryption engines for proprietary DRM wrapped music files,
//! ported from reverse engineered vendor clients (NetEase `.ncm`, Tencent `.qmc*` /
//! `.mflac` / `.mgg` / `.tm*`, Kugou `.kgm` / `.vpr`, Kuwo `.kwm`, Xiami `.xm` and
//! Ximalaya `.x2m` / `.x3m`).
//!
//! The entry point is [`dispatch::open`], which maps a file name and its raw bytes
//! to a decryption [`Session`]. The session runs the vendor cipher over the buffer,
//! sniffs the real container type and resolves whatever metadata the wrapping
//! carried.
//!
//! ```no_run
//! let data = std::fs::read("song.ncm")?;
//! let mut session = msd_drm::dispatch::open(data, "song.ncm")?;
//! let metadata = session.decrypt()?.clone();
//! std::fs::write(&metadata.name, session.payload())?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Optional Features
//!
//! The following are a list of [Cargo features](https://doc.rust-lang.org/stable/cargo/reference/features.html#the-features-section) that can be
//! enabled or disabled:
//!
//! - **online**: Enables a blocking http implementation of [`OnlineClient`]
//!   used for cover art recovery.

pub mod dispatch;
pub mod sniff;
pub mod tag;
pub mod vendor;

mod buffer;
mod crypto;
mod error;
mod meta;
#[cfg(feature = "online")]
#[cfg_attr(docsrs, doc(cfg(feature = "online")))]
mod online;
mod reader;
mod session;
mod simd;

pub use buffer::MediaBuffer;
pub use error::DrmError;
pub use meta::{
    DeclineRename, MatchFields, Metadata, OnlineClient, RenameConfirm, TagStore, TagView,
};
#[cfg(feature = "online")]
#[cfg_attr(docsrs, doc(cfg(feature = "online")))]
pub use online::HttpOnlineClient;
pub use reader::Reader;
pub use session::Session;

/// A `Result` alias where the `Err` case is `msd_drm::DrmError`.
pub type Result<T> = std::result::Result<T, DrmError>;
