use crate::field::NOT_AVAILABLE;

/// Link target used when there is nothing to navigate to.
pub const PLACEHOLDER_HREF: &str = "#";

/// The page URL as shown in the result view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlDisplay {
    raw: Option<String>,
    display_text: String,
}

impl UrlDisplay {
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw.map(str::trim).filter(|s| !s.is_empty()) {
            Some(url) => UrlDisplay {
                raw: raw.map(str::to_string),
                display_text: url.to_string(),
            },
            None => UrlDisplay {
                raw: None,
                display_text: NOT_AVAILABLE.to_string(),
            },
        }
    }

    pub fn raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }

    pub fn display_text(&self) -> &str {
        &self.display_text
    }

    pub fn is_navigable(&self) -> bool {
        self.raw.is_some()
    }

    pub fn href(&self) -> &str {
        if self.is_navigable() {
            &self.display_text
        } else {
            PLACEHOLDER_HREF
        }
    }

    /// Value a copy action binds to; `None` means no copy action.
    pub fn copy_value(&self) -> Option<&str> {
        self.is_navigable().then_some(self.display_text.as_str())
    }
}
