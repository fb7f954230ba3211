//! Fixed signature classification of decrypted audio payloads and cover
//! images.

/// Audio container kinds this crate can recognize or that a vendor wrapper
/// declares through its extension.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AudioKind {
    #[default]
    Undefined,
    Aac,
    Ape,
    Dff,
    Flac,
    M4a,
    Mp4,
    Mpeg,
    Ogg,
    Wav,
    Wma,
}

impl AudioKind {
    /// Output file extension, without the dot. `None` for
    /// [`AudioKind::Undefined`], which is a soft outcome handled by the caller
    /// with a generic name.
    pub fn extension(&self) -> Option<&'static str> {
        match self {
            Self::Undefined => None,
            Self::Aac => Some("aac"),
            Self::Ape => Some("ape"),
            Self::Dff => Some("dff"),
            Self::Flac => Some("flac"),
            Self::M4a | Self::Mp4 => Some("m4a"),
            Self::Mpeg => Some("mp3"),
            Self::Ogg => Some("ogg"),
            Self::Wav => Some("wav"),
            Self::Wma => Some("wma"),
        }
    }
}

/// Cover image kinds recognized inside vendor wrappers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImageKind {
    #[default]
    Undefined,
    Gif,
    Jpeg,
    Png,
}

impl ImageKind {
    pub fn mime(&self) -> Option<&'static str> {
        match self {
            Self::Undefined => None,
            Self::Gif => Some("image/gif"),
            Self::Jpeg => Some("image/jpeg"),
            Self::Png => Some("image/png"),
        }
    }
}

const WMA_GUID: [u8; 16] = [
    0x30, 0x26, 0xb2, 0x75, 0x8e, 0x66, 0xcf, 0x11, 0xa6, 0xd9, 0x00, 0xaa, 0x00, 0x62, 0xce, 0x6c,
];

/// Classifies a decrypted payload by its leading signature. Signatures are
/// tried from the most to the least specific, so the weak two byte AAC sync
/// word cannot shadow a real container header.
pub fn sniff_audio(data: &[u8]) -> AudioKind {
    if data.starts_with(b"fLaC") {
        AudioKind::Flac
    } else if data.starts_with(b"ID3") {
        AudioKind::Mpeg
    } else if matches_at(data, 4, b"ftyp") {
        if matches_at(data, 8, b"M4A ") {
            AudioKind::M4a
        } else {
            AudioKind::Mp4
        }
    } else if data.starts_with(b"OggS") {
        AudioKind::Ogg
    } else if data.starts_with(b"MAC ") {
        AudioKind::Ape
    } else if data.starts_with(b"FRM8") {
        AudioKind::Dff
    } else if data.starts_with(b"RIFF") {
        AudioKind::Wav
    } else if data.starts_with(&WMA_GUID) {
        AudioKind::Wma
    } else if data.starts_with(&[0xff, 0xf1]) {
        AudioKind::Aac
    } else {
        AudioKind::Undefined
    }
}

/// Classifies candidate cover art bytes. Anything unrecognized is discarded by
/// the caller rather than embedded.
pub fn sniff_image(data: &[u8]) -> ImageKind {
    if data.starts_with(b"GIF8") {
        ImageKind::Gif
    } else if data.starts_with(&[0xff, 0xd8]) {
        ImageKind::Jpeg
    } else if data.starts_with(&[0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a]) {
        ImageKind::Png
    } else {
        ImageKind::Undefined
    }
}

fn matches_at(data: &[u8], at: usize, signature: &[u8]) -> bool {
    data.len() >= at + signature.len() && &data[at..at + signature.len()] == signature
}
