//! Extension driven vendor lookup, the entry point of the crate.

use crate::{
    DrmError, Result,
    buffer::MediaBuffer,
    session::Session,
    sniff::AudioKind,
    vendor::{self, Opened},
};

/// Every extension [`open`] can dispatch on, without the leading dot.
pub const KNOWN_EXTENSIONS: &[&str] = &[
    "ncm", "tm2", "tm6", "qmc0", "qmc3", "bkcmp3", "6d7033", "qmc2", "qmc4", "qmc6", "qmc8", "tkm",
    "bkcm4a", "6d3461", "qmcogg", "bkcogg", "mgg", "mgg1", "mggl", "6f6767", "qmcflac", "bkcflac",
    "mflac", "mflac0", "666c6163", "bkcwma", "bkcwav", "776176", "bkcape", "mmp4", "kgm", "kgma",
    "vpr", "kwm", "mp3", "m4a", "wav", "flac", "x2m", "x3m", "xm",
];

/// One vendor constructor a file extension can map to.
#[derive(Debug, Clone, Copy)]
enum Candidate {
    Kugou,
    Kuwo,
    Netease,
    Qmc(AudioKind),
    Tm(AudioKind),
    Xiami(AudioKind, bool),
    XimalayaDesktop,
    XimalayaX2m,
    XimalayaX3m,
}

impl Candidate {
    fn vendor(self) -> &'static str {
        match self {
            Self::Kugou => "kugou",
            Self::Kuwo => "kuwo",
            Self::Netease => "netease",
            Self::Qmc(_) => "qmc",
            Self::Tm(_) => "tm",
            Self::Xiami(..) => "xiami",
            Self::XimalayaDesktop | Self::XimalayaX2m | Self::XimalayaX3m => "ximalaya",
        }
    }

    fn open(self, buffer: &MediaBuffer) -> Result<Opened> {
        match self {
            Self::Kugou => vendor::kugou::open(buffer, AudioKind::Undefined),
            Self::Kuwo => vendor::kuwo::open(buffer, AudioKind::Undefined),
            Self::Netease => vendor::netease::open(buffer),
            Self::Qmc(kind) => vendor::tencent::open_qmc(buffer, kind),
            Self::Tm(kind) => vendor::tencent::open_tm(buffer, kind),
            Self::Xiami(kind, xm) => vendor::xiami::open(buffer, kind, xm),
            Self::XimalayaDesktop => vendor::ximalaya::open_desktop(buffer),
            Self::XimalayaX2m => vendor::ximalaya::open_x2m(buffer),
            Self::XimalayaX3m => vendor::ximalaya::open_x3m(buffer),
        }
    }
}

/// Candidates for a lowercased extension, most likely vendor first. The hex
/// named entries cover files renamed by an old qmc build that wrote the
/// container name bytewise.
fn candidates_for(extension: &str) -> Option<&'static [Candidate]> {
    Some(match extension {
        "ncm" => &[Candidate::Netease],
        "tm2" | "tm6" => &[Candidate::Tm(AudioKind::M4a)],
        "qmc0" | "qmc3" | "bkcmp3" | "6d7033" => &[Candidate::Qmc(AudioKind::Mpeg)],
        "qmc2" | "qmc4" | "qmc6" | "qmc8" | "tkm" | "bkcm4a" | "6d3461" => {
            &[Candidate::Qmc(AudioKind::M4a)]
        }
        "qmcogg" | "bkcogg" | "mgg" | "mgg1" | "mggl" | "6f6767" => {
            &[Candidate::Qmc(AudioKind::Ogg)]
        }
        "qmcflac" | "bkcflac" | "mflac" | "mflac0" | "666c6163" => {
            &[Candidate::Qmc(AudioKind::Flac)]
        }
        "bkcwma" => &[Candidate::Qmc(AudioKind::Wma)],
        "bkcwav" | "776176" => &[Candidate::Qmc(AudioKind::Wav)],
        "bkcape" => &[Candidate::Qmc(AudioKind::Ape)],
        "mmp4" => &[Candidate::Qmc(AudioKind::Mp4)],
        "kgm" | "kgma" | "vpr" => &[Candidate::Kugou],
        "kwm" => &[Candidate::Kuwo],
        "mp3" => &[Candidate::Xiami(AudioKind::Mpeg, false)],
        "m4a" => &[Candidate::Xiami(AudioKind::M4a, false)],
        "wav" => &[Candidate::Xiami(AudioKind::Wav, false)],
        "flac" => &[Candidate::Xiami(AudioKind::Flac, false)],
        "x2m" => &[Candidate::XimalayaX2m],
        "x3m" => &[Candidate::XimalayaX3m],
        "xm" => &[
            Candidate::XimalayaDesktop,
            Candidate::Xiami(AudioKind::Undefined, true),
        ],
        _ => return None,
    })
}

/// Builds a decryption [`Session`] over a file's bytes, picking the vendor
/// from the file name.
pub fn open(data: Vec<u8>, name: &str) -> Result<Session> {
    let buffer = MediaBuffer::from_vec(data);
    let (opened, effective) = resolve(&buffer, name)?;
    Session::new(buffer, opened, effective)
}

/// Resolves `name` against the candidate table and returns the first vendor
/// accepting the bytes, together with the name level it matched at.
fn resolve<'n>(buffer: &MediaBuffer, name: &'n str) -> Result<(Opened, &'n str)> {
    let Some((stem, extension)) = name.rsplit_once('.') else {
        return Err(DrmError::Format(format!(
            "\"{name}\" carries no extension to dispatch on"
        )));
    };
    let extension = extension.to_ascii_lowercase();

    // Double extensions resolve from the inside out, so a stray suffix over a
    // recognizable name never masks the real wrapping.
    if stem.contains('.') && let Ok(resolved) = resolve(buffer, stem) {
        return Ok(resolved);
    }

    let Some(candidates) = candidates_for(&extension) else {
        return Err(DrmError::Format(format!(
            "extension \"{extension}\" is not supported"
        )));
    };

    if let [candidate] = candidates {
        return candidate.open(buffer).map(|opened| (opened, name));
    }

    let mut attempts = Vec::new();
    for candidate in candidates {
        match candidate.open(buffer) {
            Ok(opened) => return Ok((opened, name)),
            Err(e) if e.is_vendor_mismatch() => attempts.push((candidate.vendor(), e.to_string())),
            Err(e) => return Err(e),
        }
    }
    Err(DrmError::NoMatch(attempts))
}
