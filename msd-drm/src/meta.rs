use crate::{Result, sniff::AudioKind};

/// Resolved output of one session: the presentation name plus whatever
/// metadata the vendor wrapping or the tag collaborator supplied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    /// Output file name, extension included when the container was recognized.
    pub name: String,
    pub title: Option<String>,
    pub performers: Vec<String>,
    pub album: Option<String>,
    pub cover: Option<Vec<u8>>,
}

/// One candidate in a rename confirmation, local tag state on one side and a
/// vendor online match on the other.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchFields {
    pub title: String,
    pub performers: String,
    pub album: String,
}

/// Narrow contract over an external tag library. The engine itself only reads
/// and patches the fields below; everything else about the container stays
/// opaque.
pub trait TagStore {
    /// Opens a tag view over a decrypted payload, or `None` when the store
    /// does not handle this container kind.
    fn open(&self, data: &[u8], kind: AudioKind) -> Option<Box<dyn TagView>>;
}

/// A mutable view of one file's tag fields.
pub trait TagView {
    fn title(&self) -> Option<String>;
    fn set_title(&mut self, title: &str);
    fn performers(&self) -> Vec<String>;
    fn set_performers(&mut self, performers: &[String]);
    fn album(&self) -> Option<String>;
    fn set_album(&mut self, album: &str);
    fn cover(&self) -> Option<Vec<u8>>;
    fn set_cover(&mut self, data: &[u8], mime: &str);

    /// Commits pending edits, returning the rewritten file when anything
    /// changed.
    fn save(&mut self) -> Option<Vec<u8>>;
}

/// Optional network collaborator. Both operations are best effort; failures
/// downgrade to session warnings and never abort a decrypt.
pub trait OnlineClient {
    /// Fetches cover art bytes from an absolute url.
    fn fetch_cover(&self, url: &str) -> Result<Vec<u8>>;

    /// Looks a track up by its vendor id, for hashed filename recovery.
    fn match_track(&self, id: u64) -> Result<MatchFields>;
}

/// Confirmation capability gating renames of hash named files. The default
/// non-interactive implementation always declines.
pub trait RenameConfirm {
    fn confirm(&self, local: &MatchFields, proposed: &MatchFields) -> bool;
}

/// Declining [`RenameConfirm`] used when no interactive capability is
/// injected.
pub struct DeclineRename;

impl RenameConfirm for DeclineRename {
    fn confirm(&self, _local: &MatchFields, _proposed: &MatchFields) -> bool {
        false
    }
}
