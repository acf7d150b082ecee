use std::time::{Duration, Instant};

use tracing::{debug, error};

use crate::error::ClipboardError;
use crate::view::{ContainerId, Node, Region};

pub const COPY_GLYPH: &str = "📋";
pub const CONFIRM_GLYPH: &str = "✅";

/// How long the confirmation glyph stays up after a successful copy.
pub const FEEDBACK_WINDOW: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AffordanceKind {
    Url,
    PersistentId,
    AnalysisId,
}

impl AffordanceKind {
    pub fn title(self) -> &'static str {
        match self {
            AffordanceKind::Url => "Copy URL",
            AffordanceKind::PersistentId => "Copy Persistent Identifier",
            AffordanceKind::AnalysisId => "Copy Analysis ID",
        }
    }
}

/// Host clipboard capability. Writes may fail independently of everything else.
pub trait Clipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// The desktop clipboard. Kept alive for the whole run so the contents are not
/// dropped as soon as they are set.
pub struct SystemClipboard {
    inner: Result<arboard::Clipboard, String>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self {
            inner: arboard::Clipboard::new().map_err(|e| e.to_string()),
        }
    }
}

impl Default for SystemClipboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Clipboard for SystemClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        match self.inner.as_mut() {
            Ok(clipboard) => clipboard
                .set_text(text.to_string())
                .map_err(|e| ClipboardError::Write(e.to_string())),
            Err(reason) => Err(ClipboardError::Unavailable(reason.clone())),
        }
    }
}

/// A copy action bound to one value inside one container instance.
#[derive(Debug, Clone)]
pub struct Affordance {
    kind: AffordanceKind,
    source_value: String,
    container: ContainerId,
    confirmed_at: Option<Instant>,
}

impl PartialEq for Affordance {
    // The container binding is identity, not visible state.
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.source_value == other.source_value
            && self.confirmed_at == other.confirmed_at
    }
}

impl Eq for Affordance {}

impl Affordance {
    pub fn kind(&self) -> AffordanceKind {
        self.kind
    }

    pub fn source_value(&self) -> &str {
        &self.source_value
    }

    pub fn container(&self) -> ContainerId {
        self.container
    }

    /// Glyph to show at `now`: the confirmation mark inside the feedback window.
    pub fn indicator(&self, now: Instant) -> &'static str {
        match self.confirmed_at {
            Some(at) if now.saturating_duration_since(at) < FEEDBACK_WINDOW => CONFIRM_GLYPH,
            _ => COPY_GLYPH,
        }
    }

    /// Copy the bound value. A failure is logged and leaves the affordance untouched.
    pub fn activate(&mut self, clipboard: &mut dyn Clipboard, now: Instant) -> bool {
        match clipboard.write_text(&self.source_value) {
            Ok(()) => {
                debug!(kind = ?self.kind, "copied to clipboard");
                // A later copy restarts the window.
                self.confirmed_at = Some(now);
                true
            }
            Err(err) => {
                error!(kind = ?self.kind, %err, "copy failed");
                false
            }
        }
    }
}

/// Make `container` carry a copy affordance for `kind` iff `value` is non-blank.
///
/// Any affordance of this kind, and any affordance bound to an older instance
/// of the container, is removed first; a present value always gets a freshly
/// created affordance.
pub fn sync_affordance<'a>(
    container: &'a mut Region,
    kind: AffordanceKind,
    value: Option<&str>,
) -> Option<&'a Affordance> {
    let id = container.id();
    let before = container.nodes().len();
    container.retain_nodes(|node| match node {
        Node::Copy(a) => a.kind != kind && a.container == id,
        _ => true,
    });
    let removed = before - container.nodes().len();
    if removed > 0 {
        debug!(?kind, removed, "removed copy affordance");
    }

    let value = value.filter(|v| !v.trim().is_empty())?;
    container.push(Node::Copy(Affordance {
        kind,
        source_value: value.to_string(),
        container: id,
        confirmed_at: None,
    }));
    match container.nodes().last() {
        Some(Node::Copy(a)) => Some(a),
        _ => None,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Records writes; fails every write when `fail` is set.
    #[derive(Default)]
    pub(crate) struct MemoryClipboard {
        pub(crate) contents: Vec<String>,
        pub(crate) fail: bool,
    }

    impl Clipboard for MemoryClipboard {
        fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
            if self.fail {
                return Err(ClipboardError::Write("denied".into()));
            }
            self.contents.push(text.to_string());
            Ok(())
        }
    }

    fn copies(region: &Region) -> Vec<&Affordance> {
        region
            .nodes()
            .iter()
            .filter_map(|n| match n {
                Node::Copy(a) => Some(a),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn present_value_creates_affordance() {
        let mut region = Region::new();
        let a = sync_affordance(&mut region, AffordanceKind::Url, Some("https://a.example"))
            .expect("created");
        assert_eq!(a.source_value(), "https://a.example");
        assert_eq!(a.container(), region.id());
        assert_eq!(copies(&region).len(), 1);
    }

    #[test]
    fn blank_value_removes_existing_affordance() {
        let mut region = Region::new();
        sync_affordance(&mut region, AffordanceKind::Url, Some("x"));
        assert!(sync_affordance(&mut region, AffordanceKind::Url, Some("  ")).is_none());
        assert!(copies(&region).is_empty());
        assert!(sync_affordance(&mut region, AffordanceKind::Url, None).is_none());
    }

    #[test]
    fn resync_never_duplicates() {
        let mut region = Region::new();
        for v in ["a", "b", "c"] {
            sync_affordance(&mut region, AffordanceKind::AnalysisId, Some(v));
        }
        let all = copies(&region);
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].source_value(), "c");
    }

    #[test]
    fn successful_copy_shows_confirmation_for_window() {
        let mut region = Region::new();
        sync_affordance(&mut region, AffordanceKind::PersistentId, Some("DOI:10.1/X"));
        let mut clipboard = MemoryClipboard::default();
        let start = Instant::now();
        let a = region.affordance_mut(AffordanceKind::PersistentId).expect("present");

        assert_eq!(a.indicator(start), COPY_GLYPH);
        assert!(a.activate(&mut clipboard, start));
        assert_eq!(clipboard.contents, vec!["DOI:10.1/X".to_string()]);
        assert_eq!(a.indicator(start + Duration::from_millis(1499)), CONFIRM_GLYPH);
        assert_eq!(a.indicator(start + FEEDBACK_WINDOW), COPY_GLYPH);
    }

    #[test]
    fn failed_copy_leaves_indicator_alone_and_stays_usable() {
        let mut region = Region::new();
        sync_affordance(&mut region, AffordanceKind::Url, Some("u"));
        let mut clipboard = MemoryClipboard { fail: true, ..Default::default() };
        let now = Instant::now();
        let a = region.affordance_mut(AffordanceKind::Url).expect("present");

        assert!(!a.activate(&mut clipboard, now));
        assert_eq!(a.indicator(now), COPY_GLYPH);

        clipboard.fail = false;
        assert!(a.activate(&mut clipboard, now));
    }
}
