//! Drive link classification and direct-input detection.

use std::sync::LazyLock;

use regex::Regex;

static FOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/folders/([a-zA-Z0-9_-]+)").expect("valid regex"));

static FILE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/file/d/([a-zA-Z0-9_-]+)").expect("valid regex"));

static BARE_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_-]{25,}$").expect("valid regex"));

/// Host fragment identifying a Google Drive link.
pub const DRIVE_HOST: &str = "drive.google.com";

/// Display name given to links the user typed in directly.
pub const DIRECT_INPUT_NAME: &str = "Direct Input";

/// A link found by search or supplied by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredLink {
    /// Human-readable label, usually the anchor text on the source page.
    pub display_name: String,
    /// The raw link.
    pub url: String,
}

impl DiscoveredLink {
    /// Creates a link from a label and a URL.
    #[must_use]
    pub fn new(display_name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            url: url.into(),
        }
    }
}

/// What a Drive URL points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkReference {
    /// A folder whose contents should be listed.
    Folder {
        /// Drive folder id.
        id: String,
    },
    /// A single file.
    File {
        /// Drive file id.
        id: String,
    },
    /// Neither pattern matched; the link is skipped.
    Unrecognized,
}

/// Classifies a Drive URL as a folder, a single file, or unrecognized.
///
/// `/folders/<id>` is tested first, then `/file/d/<id>`.
///
/// # Panics
///
/// Panics if the internal regexes fail to compile (they are constants and
/// will not).
#[must_use]
pub fn classify(url: &str) -> LinkReference {
    if let Some(caps) = FOLDER_RE.captures(url) {
        return LinkReference::Folder {
            id: caps[1].to_string(),
        };
    }
    if let Some(caps) = FILE_RE.captures(url) {
        return LinkReference::File {
            id: caps[1].to_string(),
        };
    }
    LinkReference::Unrecognized
}

/// Returns `true` if `s` looks like a bare Drive folder id.
#[must_use]
pub fn is_bare_drive_id(s: &str) -> bool {
    BARE_ID_RE.is_match(s)
}

/// Interprets user input that bypasses link discovery.
///
/// A bare id of 25 or more `[A-Za-z0-9_-]` characters becomes a folder link,
/// and anything mentioning `drive.google.com` is passed through verbatim.
/// Returns `None` when the input should be searched for instead.
#[must_use]
pub fn parse_direct_input(input: &str) -> Option<Vec<DiscoveredLink>> {
    let input = input.trim();
    if is_bare_drive_id(input) {
        return Some(vec![DiscoveredLink::new(
            DIRECT_INPUT_NAME,
            format!("https://{DRIVE_HOST}/drive/folders/{input}"),
        )]);
    }
    if input.contains(DRIVE_HOST) {
        return Some(vec![DiscoveredLink::new(DIRECT_INPUT_NAME, input)]);
    }
    None
}
