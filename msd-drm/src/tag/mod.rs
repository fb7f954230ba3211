//! Minimal ID3v2 frame reader.
//!
//! This is not a general tag library. It decodes just enough of ID3v2.3/2.4 to
//! recover crypto parameters and metadata the Ximalaya desktop client hides in
//! text frames before the file is otherwise parseable. Full tag editing stays
//! with the external tag collaborator.

pub mod synchsafe;

use crate::{DrmError, Result};

pub const TALB: [u8; 4] = *b"TALB";
pub const TIT2: [u8; 4] = *b"TIT2";
pub const TPE1: [u8; 4] = *b"TPE1";
pub const TENC: [u8; 4] = *b"TENC";
pub const TRCK: [u8; 4] = *b"TRCK";
pub const TSIZ: [u8; 4] = *b"TSIZ";
pub const TSRC: [u8; 4] = *b"TSRC";
pub const TSSE: [u8; 4] = *b"TSSE";

const HEADER_SIZE: usize = 10;

const FLAG_UNSYNCHRONISATION: u8 = 0x80;
const FLAG_EXTENDED_HEADER: u8 = 0x40;
const FLAG_FOOTER_PRESENT: u8 = 0x10;

/// A parsed ID3v2 tag, borrowing the frame bodies from the file bytes.
pub struct Id3Tag<'a> {
    total_size: usize,
    frames: Vec<Frame<'a>>,
}

#[derive(Clone, Copy)]
pub struct Frame<'a> {
    pub id: [u8; 4],
    pub body: &'a [u8],
}

impl<'a> Id3Tag<'a> {
    /// Parses the tag found at the start of `data`.
    pub fn parse(data: &'a [u8]) -> Result<Self> {
        if data.len() < HEADER_SIZE || &data[..3] != b"ID3" {
            return Err(DrmError::Format("ID3 header is unexpected".to_owned()));
        }

        let major = data[3];
        if !(3..=4).contains(&major) {
            return Err(DrmError::UnsupportedVariant(format!("ID3v2.{}", major)));
        }

        let flags = data[5];
        if flags & FLAG_UNSYNCHRONISATION != 0 {
            return Err(DrmError::UnsupportedVariant(
                "unsynchronized ID3 tag".to_owned(),
            ));
        }

        let size = synchsafe::decode([data[6], data[7], data[8], data[9]]) as usize;
        let total_size = if flags & FLAG_FOOTER_PRESENT != 0 {
            HEADER_SIZE + size + HEADER_SIZE
        } else {
            HEADER_SIZE + size
        };
        let body = data
            .get(HEADER_SIZE..HEADER_SIZE + size)
            .ok_or_else(|| DrmError::Format("ID3 tag is truncated".to_owned()))?;

        let frame_region = if flags & FLAG_EXTENDED_HEADER != 0 {
            let raw = body
                .get(..4)
                .ok_or_else(|| DrmError::Format("ID3 extended header is truncated".to_owned()))?;
            let extended = synchsafe::decode([raw[0], raw[1], raw[2], raw[3]]) as usize;
            if extended != 6 && extended != 10 {
                return Err(DrmError::Format("ID3 extended header is invalid".to_owned()));
            }
            if major == 4 && body.get(4) != Some(&1) {
                return Err(DrmError::Format("ID3 extended header is invalid".to_owned()));
            }
            body.get(4 + extended..)
                .ok_or_else(|| DrmError::Format("ID3 extended header is truncated".to_owned()))?
        } else {
            body
        };

        Ok(Self {
            total_size,
            frames: parse_frames(frame_region)?,
        })
    }

    /// Size of the whole tag on disk, including header and optional footer.
    /// The audio stream starts right after it.
    pub fn total_size(&self) -> usize {
        self.total_size
    }

    pub fn frames(&self) -> &[Frame<'a>] {
        &self.frames
    }

    /// Decoded text of the first frame with the given id, if present.
    pub fn text(&self, id: [u8; 4]) -> Option<Result<String>> {
        self.frames
            .iter()
            .find(|frame| frame.id == id)
            .map(Frame::text)
    }
}

fn parse_frames(mut region: &[u8]) -> Result<Vec<Frame<'_>>> {
    let mut frames = Vec::new();

    while region.len() >= HEADER_SIZE {
        let id = [region[0], region[1], region[2], region[3]];
        if id == [0; 4] {
            break;
        }

        let size = synchsafe::decode([region[4], region[5], region[6], region[7]]) as usize;
        let body = region
            .get(HEADER_SIZE..HEADER_SIZE + size)
            .ok_or_else(|| DrmError::Format("ID3 frame is truncated".to_owned()))?;

        frames.push(Frame { id, body });
        region = &region[HEADER_SIZE + size..];
    }

    Ok(frames)
}

impl Frame<'_> {
    /// Decodes a text frame body, honoring the leading encoding indicator.
    /// Trailing NUL terminators are dropped.
    pub fn text(&self) -> Result<String> {
        let text = match self.body {
            [0, rest @ ..] => rest.iter().map(|b| char::from(*b)).collect(),
            [1, 0xff, 0xfe, rest @ ..] => decode_utf16(rest, u16::from_le_bytes),
            [1, 0xfe, 0xff, rest @ ..] => decode_utf16(rest, u16::from_be_bytes),
            [2, rest @ ..] => decode_utf16(rest, u16::from_be_bytes),
            [3, rest @ ..] => String::from_utf8_lossy(rest).into_owned(),
            _ => {
                return Err(DrmError::Format(format!(
                    "text encoding of frame {} is invalid",
                    self.id.iter().map(|b| char::from(*b)).collect::<String>(),
                )));
            }
        };

        Ok(text.trim_end_matches('\0').to_owned())
    }
}

fn decode_utf16(data: &[u8], group: fn([u8; 2]) -> u16) -> String {
    let units = data
        .chunks_exact(2)
        .map(|pair| group([pair[0], pair[1]]))
        .collect::<Vec<_>>();

    char::decode_utf16(units)
        .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synchsafe_raw(value: u32) -> [u8; 4] {
        [
            (value >> 21) as u8 & 0x7f,
            (value >> 14) as u8 & 0x7f,
            (value >> 7) as u8 & 0x7f,
            value as u8 & 0x7f,
        ]
    }

    fn frame(id: &[u8; 4], body: &[u8]) -> Vec<u8> {
        let mut raw = Vec::new();
        raw.extend_from_slice(id);
        raw.extend_from_slice(&synchsafe_raw(body.len() as u32));
        raw.extend_from_slice(&[0, 0]);
        raw.extend_from_slice(body);
        raw
    }

    fn tag(frames: &[Vec<u8>]) -> Vec<u8> {
        let body = frames.concat();
        let mut raw = Vec::new();
        raw.extend_from_slice(b"ID3\x03\0\0");
        raw.extend_from_slice(&synchsafe_raw(body.len() as u32));
        raw.extend_from_slice(&body);
        raw
    }

    #[test]
    fn parses_text_frames() {
        let raw = tag(&[
            frame(&TIT2, b"\0Sunrise\0"),
            frame(&TPE1, b"\x03Performer"),
        ]);

        let parsed = Id3Tag::parse(&raw).unwrap();
        assert_eq!(parsed.total_size(), raw.len());
        assert_eq!(parsed.frames().len(), 2);
        assert_eq!(parsed.text(TIT2).unwrap().unwrap(), "Sunrise");
        assert_eq!(parsed.text(TPE1).unwrap().unwrap(), "Performer");
        assert!(parsed.text(TALB).is_none());
    }

    #[test]
    fn decodes_utf16_with_byte_order_marks() {
        let little: Vec<u8> = [1, 0xff, 0xfe]
            .into_iter()
            .chain("hi".encode_utf16().flat_map(u16::to_le_bytes))
            .collect();
        let big: Vec<u8> = [1, 0xfe, 0xff]
            .into_iter()
            .chain("hi".encode_utf16().flat_map(u16::to_be_bytes))
            .collect();

        let raw = tag(&[frame(&TIT2, &little), frame(&TALB, &big)]);
        let parsed = Id3Tag::parse(&raw).unwrap();
        assert_eq!(parsed.text(TIT2).unwrap().unwrap(), "hi");
        assert_eq!(parsed.text(TALB).unwrap().unwrap(), "hi");
    }

    #[test]
    fn rejects_unsupported_revisions() {
        let mut raw = tag(&[frame(&TIT2, b"\0x")]);
        raw[3] = 2;
        assert!(matches!(
            Id3Tag::parse(&raw),
            Err(DrmError::UnsupportedVariant(_))
        ));

        let mut raw = tag(&[frame(&TIT2, b"\0x")]);
        raw[5] = 0x80;
        assert!(matches!(
            Id3Tag::parse(&raw),
            Err(DrmError::UnsupportedVariant(_))
        ));
    }

    #[test]
    fn rejects_truncated_tags() {
        let mut raw = tag(&[frame(&TIT2, b"\0x")]);
        raw.truncate(raw.len() - 1);
        assert!(matches!(Id3Tag::parse(&raw), Err(DrmError::Format(_))));
        assert!(matches!(Id3Tag::parse(b"ID"), Err(DrmError::Format(_))));
    }

    #[test]
    fn stops_at_zeroed_frame_id() {
        let mut frames = vec![frame(&TIT2, b"\0x")];
        frames.push(vec![0; 14]);
        let raw = tag(&frames);
        let parsed = Id3Tag::parse(&raw).unwrap();
        assert_eq!(parsed.frames().len(), 1);
    }
}
