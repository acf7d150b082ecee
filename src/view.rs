//! Declarative UI state. The reconciler writes it; a renderer only reads it.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::affordance::{Affordance, AffordanceKind};

static NEXT_CONTAINER: AtomicU64 = AtomicU64::new(1);

/// Identity of one container instance. Rebuilding a region gives it a new id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContainerId(u64);

impl ContainerId {
    fn fresh() -> Self {
        ContainerId(NEXT_CONTAINER.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusClass {
    #[default]
    Muted,
    Ok,
    Err,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusLine {
    pub text: String,
    pub class: StatusClass,
}

impl StatusLine {
    pub fn new(text: impl Into<String>, class: StatusClass) -> Self {
        Self {
            text: text.into(),
            class,
        }
    }
}

/// A single line of text that is either shown or hidden.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Field {
    text: String,
    visible: bool,
}

impl Field {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn show(&mut self, text: impl Into<String>) {
        self.set(text);
        self.visible = true;
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.visible = false;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    pub text: String,
    pub href: String,
    pub navigable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Label(String),
    Text(String),
    Anchor(Anchor),
    Copy(Affordance),
}

/// A display region rebuilt from scratch on every render.
#[derive(Debug, Clone)]
pub struct Region {
    id: ContainerId,
    nodes: Vec<Node>,
    visible: bool,
}

impl PartialEq for Region {
    fn eq(&self, other: &Self) -> bool {
        self.visible == other.visible && self.nodes == other.nodes
    }
}

impl Eq for Region {}

impl Default for Region {
    fn default() -> Self {
        Self::new()
    }
}

impl Region {
    pub fn new() -> Self {
        Self {
            id: ContainerId::fresh(),
            nodes: Vec::new(),
            visible: false,
        }
    }

    pub fn id(&self) -> ContainerId {
        self.id
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Drop all children (affordances included) and become a new, hidden instance.
    pub fn rebuild(&mut self) {
        *self = Region::new();
    }

    pub fn push(&mut self, node: Node) {
        self.nodes.push(node);
    }

    pub fn retain_nodes(&mut self, keep: impl FnMut(&Node) -> bool) {
        self.nodes.retain(keep);
    }

    pub fn affordance(&self, kind: AffordanceKind) -> Option<&Affordance> {
        self.nodes.iter().find_map(|n| match n {
            Node::Copy(a) if a.kind() == kind => Some(a),
            _ => None,
        })
    }

    pub fn affordance_mut(&mut self, kind: AffordanceKind) -> Option<&mut Affordance> {
        self.nodes.iter_mut().find_map(|n| match n {
            Node::Copy(a) if a.kind() == kind => Some(a),
            _ => None,
        })
    }

    /// Label and text content, without affordances.
    pub fn text(&self) -> String {
        self.nodes
            .iter()
            .filter_map(|n| match n {
                Node::Label(s) | Node::Text(s) => Some(s.as_str()),
                Node::Anchor(a) => Some(a.text.as_str()),
                Node::Copy(_) => None,
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Raw payload viewer and the toggle that expands it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawView {
    text: String,
    toggle_visible: bool,
    expanded: bool,
}

impl RawView {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn toggle_visible(&self) -> bool {
        self.toggle_visible
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// Load new content; the viewer always starts collapsed.
    pub fn load(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.toggle_visible = !self.text.trim().is_empty();
        self.expanded = false;
    }

    pub fn clear(&mut self) {
        *self = RawView::default();
    }

    pub fn toggle_label(&self) -> &'static str {
        if self.expanded {
            "Hide raw JSON"
        } else {
            "Show raw JSON"
        }
    }

    /// Returns whether the viewer is now expanded. No-op while the toggle is hidden.
    pub fn toggle(&mut self) -> bool {
        if self.toggle_visible {
            self.expanded = !self.expanded;
        }
        self.expanded
    }
}

/// Everything the result view can show.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UiState {
    pub status: StatusLine,
    pub error: Field,
    pub headers: Field,

    pub title: Field,
    pub publication_date: Field,
    pub last_modification_date: Field,
    pub author: Field,
    pub authors: Field,
    pub description: Field,
    pub keywords: Field,
    pub publisher: Field,
    pub url: Region,
    pub pid: Region,
    pub extract: Field,
    pub raw: RawView,

    pub footer_visible: bool,
    pub analysis_id: Region,
    pub processed_at: Field,
    pub ip_address: Field,
}

impl UiState {
    /// The simple labelled fields, in display order.
    pub fn simple_fields(&self) -> [&Field; 8] {
        [
            &self.title,
            &self.publication_date,
            &self.last_modification_date,
            &self.author,
            &self.authors,
            &self.description,
            &self.keywords,
            &self.publisher,
        ]
    }

    /// Hide and empty every result field and destroy every affordance.
    pub fn clear_results(&mut self) {
        for field in [
            &mut self.error,
            &mut self.title,
            &mut self.publication_date,
            &mut self.last_modification_date,
            &mut self.author,
            &mut self.authors,
            &mut self.description,
            &mut self.keywords,
            &mut self.publisher,
            &mut self.extract,
            &mut self.processed_at,
            &mut self.ip_address,
        ] {
            field.clear();
        }
        self.url.rebuild();
        self.pid.rebuild();
        self.analysis_id.rebuild();
        self.raw.clear();
        self.footer_visible = false;
    }

    pub fn affordance(&self, kind: AffordanceKind) -> Option<&Affordance> {
        [&self.url, &self.pid, &self.analysis_id]
            .into_iter()
            .find_map(|r| r.affordance(kind))
    }

    pub fn affordance_mut(&mut self, kind: AffordanceKind) -> Option<&mut Affordance> {
        [&mut self.url, &mut self.pid, &mut self.analysis_id]
            .into_iter()
            .find_map(|r| r.affordance_mut(kind))
    }

    pub fn affordances(&self) -> impl Iterator<Item = &Affordance> {
        [&self.url, &self.pid, &self.analysis_id]
            .into_iter()
            .flat_map(|r| r.nodes())
            .filter_map(|n| match n {
                Node::Copy(a) => Some(a),
                _ => None,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rebuild_gives_a_new_container_instance() {
        let mut r = Region::new();
        let before = r.id();
        r.push(Node::Text("x".into()));
        r.set_visible(true);
        r.rebuild();
        assert_ne!(before, r.id());
        assert!(r.nodes().is_empty());
        assert!(!r.is_visible());
    }

    #[test]
    fn raw_view_starts_collapsed_and_toggles() {
        let mut raw = RawView::default();
        assert!(!raw.toggle());

        raw.load("{}");
        assert!(raw.toggle_visible());
        assert!(!raw.is_expanded());
        assert_eq!(raw.toggle_label(), "Show raw JSON");
        assert!(raw.toggle());
        assert_eq!(raw.toggle_label(), "Hide raw JSON");

        raw.load("   ");
        assert!(!raw.toggle_visible());
        assert!(!raw.is_expanded());
    }
}
