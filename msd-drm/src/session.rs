//! Decryption session driving one vendor cipher over one owned buffer.

use std::sync::LazyLock;

use regex::Regex;

use crate::{
    Result,
    buffer::MediaBuffer,
    meta::{DeclineRename, MatchFields, Metadata, OnlineClient, RenameConfirm, TagStore, TagView},
    sniff::{self, AudioKind, ImageKind},
    vendor::{Consumed, Decryptor, MetaOverride, Opened, VendorCipher},
};

/// Base names that are an opaque vendor hash rather than a human title.
static HASHED_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^[0-9A-F]{16,}$").unwrap());

/// Drives one vendor cipher over one in-memory file and resolves the output
/// metadata.
///
/// A session owns its buffer and cipher outright; nothing is shared between
/// sessions, so any number of them can run on parallel worker threads. The
/// optional collaborators are injected before the first [`Session::decrypt`]
/// call; all of their failures downgrade to warnings.
pub struct Session {
    buffer: MediaBuffer,
    cipher: VendorCipher,
    vendor: &'static str,
    kind: AudioKind,
    prefer_sniffed: bool,
    start_offset: u64,
    base_name: String,
    meta_override: Option<MetaOverride>,
    cover: Option<Vec<u8>>,
    cover_url: Option<String>,
    track_id: Option<u64>,
    warnings: Vec<String>,
    resolved: Option<Metadata>,
    tag_store: Option<Box<dyn TagStore>>,
    online: Option<Box<dyn OnlineClient>>,
    confirm: Box<dyn RenameConfirm>,
}

impl Session {
    pub(crate) fn new(mut buffer: MediaBuffer, opened: Opened, name: &str) -> Result<Self> {
        if let Some(len) = opened.payload_len {
            buffer.set_len(len);
        }
        buffer.set_origin(opened.origin)?;

        let base_name = std::path::Path::new(name)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or(name)
            .to_owned();

        Ok(Self {
            buffer,
            cipher: opened.cipher,
            vendor: opened.vendor,
            kind: opened.kind,
            prefer_sniffed: opened.prefer_sniffed,
            start_offset: opened.start_offset,
            base_name,
            meta_override: opened.meta,
            cover: opened.cover,
            cover_url: opened.cover_url,
            track_id: opened.track_id,
            warnings: opened.warnings,
            resolved: None,
            tag_store: None,
            online: None,
            confirm: Box::new(DeclineRename),
        })
    }

    pub fn with_tag_store(mut self, store: Box<dyn TagStore>) -> Self {
        self.tag_store = Some(store);
        self
    }

    pub fn with_online(mut self, client: Box<dyn OnlineClient>) -> Self {
        self.online = Some(client);
        self
    }

    pub fn with_rename_confirm(mut self, confirm: Box<dyn RenameConfirm>) -> Self {
        self.confirm = confirm;
        self
    }

    /// Which vendor wrapping this session is unwrapping.
    pub fn vendor(&self) -> &'static str {
        self.vendor
    }

    /// Runs the cipher pass and resolves metadata. Idempotent: the cipher runs
    /// exactly once, later calls return the already resolved metadata.
    pub fn decrypt(&mut self) -> Result<&Metadata> {
        let metadata = match self.resolved.take() {
            Some(metadata) => metadata,
            None => self.resolve()?,
        };
        Ok(self.resolved.insert(metadata))
    }

    /// The decrypted payload. Runs from the audio origin to the logical end;
    /// meaningful once [`Session::decrypt`] returned.
    pub fn payload(&self) -> &[u8] {
        self.buffer.as_slice()
    }

    /// Consumes the session and hands the payload out without copying.
    pub fn into_payload(self) -> Vec<u8> {
        self.buffer.into_vec()
    }

    /// Everything non fatal that happened so far, in order.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    fn resolve(&mut self) -> Result<Metadata> {
        self.run_cipher()?;

        let sniffed = sniff::sniff_audio(self.buffer.as_slice());
        let kind = if self.kind == AudioKind::Undefined
            || (self.prefer_sniffed && sniffed != AudioKind::Undefined)
        {
            sniffed
        } else {
            self.kind
        };
        if kind == AudioKind::Undefined {
            self.warn("unable to determine the real audio type");
        }

        self.fetch_cover();

        let mut metadata = Metadata {
            name: String::new(),
            title: None,
            performers: Vec::new(),
            album: None,
            cover: self.cover.clone(),
        };

        if kind == AudioKind::Dff {
            self.warn("tags are not supported for dff output");
        } else if let Some(store) = &self.tag_store {
            match store.open(self.buffer.as_slice(), kind) {
                Some(mut view) => {
                    let over = self.meta_override.clone();
                    let cover = self
                        .cover
                        .as_deref()
                        .and_then(|data| sniff::sniff_image(data).mime().map(|mime| (data, mime)));
                    if apply_overrides(view.as_mut(), over.as_ref(), cover) {
                        if let Some(rewritten) = view.save() {
                            self.buffer.replace_payload(&rewritten);
                        }
                    }
                    metadata.title = view.title();
                    metadata.performers = view.performers();
                    metadata.album = view.album();
                }
                None => {
                    if kind != AudioKind::Undefined {
                        self.warn("failed to open tags over the decrypted payload");
                    }
                }
            }
        }

        // The vendor override still names the output when no tag collaborator
        // was injected.
        if metadata.title.is_none() && metadata.performers.is_empty() {
            if let Some(over) = &self.meta_override {
                metadata.title = over.title.clone();
                metadata.performers = over.performers.clone();
                metadata.album = over.album.clone();
            }
        }

        let base = if HASHED_NAME.is_match(&self.base_name) {
            self.recover_name(&metadata)
                .unwrap_or_else(|| self.base_name.clone())
        } else {
            self.base_name.clone()
        };

        metadata.name = match kind.extension() {
            Some(ext) if base.to_ascii_lowercase().ends_with(&format!(".{ext}")) => base,
            Some(ext) => format!("{base}.{ext}"),
            None => base,
        };

        Ok(metadata)
    }

    fn run_cipher(&mut self) -> Result<()> {
        let mut offset = self.start_offset;
        while (offset as usize) < self.buffer.len() {
            let window = self.buffer.padded_span(offset as usize)?;
            match self.cipher.decrypt(window, offset)? {
                Consumed::Bytes(0) | Consumed::Rest => break,
                Consumed::Bytes(count) => offset += count as u64,
            }
        }

        let trim = self.cipher.trim_start();
        if trim > 0 {
            self.buffer.advance_origin(trim)?;
        }
        Ok(())
    }

    /// Plan B cover recovery over the wrapping's album art url.
    fn fetch_cover(&mut self) {
        if self.cover.is_some() {
            return;
        }
        let Some(url) = self.cover_url.take() else {
            return;
        };

        let fetched = self.online.as_deref().map(|client| client.fetch_cover(&url));
        match fetched {
            Some(Ok(bytes)) if sniff::sniff_image(&bytes) != ImageKind::Undefined => {
                self.cover = Some(bytes);
            }
            Some(Ok(_)) => self.warn("downloaded cover art is not a recognized image"),
            Some(Err(_)) => self.warn("failed to download cover art"),
            None => self.warn("file is missing cover art"),
        }
    }

    /// Builds a presentation name for a hash named file, gated behind the
    /// injected confirmation capability.
    fn recover_name(&mut self, metadata: &Metadata) -> Option<String> {
        let local = MatchFields {
            title: metadata.title.clone().unwrap_or_default(),
            performers: metadata.performers.join("; "),
            album: metadata.album.clone().unwrap_or_default(),
        };

        let matched = match (self.track_id, self.online.as_deref()) {
            (Some(id), Some(client)) => Some(client.match_track(id)),
            _ => None,
        };
        let proposed = match matched {
            Some(Ok(fields)) => fields,
            Some(Err(_)) => {
                self.warn("failed to match the hashed file against the vendor catalog");
                local.clone()
            }
            None => local.clone(),
        };

        if proposed.title.is_empty() || proposed.performers.is_empty() {
            self.warn("detected a hashed filename but found no metadata to rename with");
            return None;
        }
        if !self.confirm.confirm(&local, &proposed) {
            return None;
        }
        Some(sanitize_name(&format!(
            "{} - {}",
            proposed.performers, proposed.title
        )))
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("vendor", &self.vendor)
            .field("kind", &self.kind)
            .field("base_name", &self.base_name)
            .field("warnings", &self.warnings)
            .finish_non_exhaustive()
    }
}

fn apply_overrides(
    view: &mut dyn TagView,
    over: Option<&MetaOverride>,
    cover: Option<(&[u8], &'static str)>,
) -> bool {
    let mut modified = false;
    if let Some(over) = over {
        if let Some(title) = over.title.as_deref() {
            if over.replace || view.title().map_or(true, |t| t.is_empty()) {
                view.set_title(title);
                modified = true;
            }
        }
        if !over.performers.is_empty()
            && (over.replace || view.performers().first().map_or(true, |p| p.is_empty()))
        {
            view.set_performers(&over.performers);
            modified = true;
        }
        if let Some(album) = over.album.as_deref() {
            if over.replace || view.album().map_or(true, |a| a.is_empty()) {
                view.set_album(album);
                modified = true;
            }
        }
    }
    if let Some((data, mime)) = cover {
        view.set_cover(data, mime);
        modified = true;
    }
    modified
}

/// Replaces filesystem hostile characters so the name is writable anywhere.
fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if (c as u32) < 0x20 => '_',
            c => c,
        })
        .collect()
}
