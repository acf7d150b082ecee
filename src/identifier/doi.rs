use once_cell::sync::Lazy;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use regex::Regex;

const PATH_SEGMENT_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

const RESOLVER: &str = "https://doi.org/";

static DOI_SCHEME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^\s*doi:\s*").unwrap());
static DOI_RESOLVER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^https?://(dx\.)?doi\.org/").unwrap());

/// A persistent identifier as shown in the result view.
///
/// The display text is the value as received, trimmed and uppercased, so a
/// `doi:` or resolver prefix stays visible. The link is built from the bare
/// identifier with those prefixes stripped. The two can therefore disagree
/// on prefixes; that asymmetry is intentional.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoiDisplay {
    raw: String,
    display_text: String,
    bare: String,
}

impl DoiDisplay {
    /// `None` for missing or blank input: no link and no copy action.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }

        let bare = DOI_SCHEME_RE.replace(trimmed, "");
        let bare = DOI_RESOLVER_RE.replace(&bare, "").trim().to_string();

        Some(DoiDisplay {
            raw: raw.to_string(),
            display_text: trimmed.to_uppercase(),
            bare,
        })
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn display_text(&self) -> &str {
        &self.display_text
    }

    /// The identifier without any `doi:` or `doi.org` prefix.
    pub fn bare(&self) -> &str {
        &self.bare
    }

    pub fn resolved_link(&self) -> String {
        let enc = utf8_percent_encode(&self.bare, PATH_SEGMENT_ENCODE_SET).to_string();
        format!("{RESOLVER}{enc}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::strategy::Strategy;

    fn doi_core() -> impl Strategy<Value = String> {
        (
            proptest::collection::vec(
                proptest::sample::select(('0'..='9').collect::<Vec<_>>()),
                4..=9,
            )
            .prop_map(|v| v.into_iter().collect::<String>()),
            "[A-Za-z0-9._;()/:-]{1,32}",
        )
            .prop_map(|(digits, suffix)| format!("10.{digits}/{suffix}"))
    }

    #[test]
    fn textual_prefix_stays_in_display_but_not_in_link() {
        let d = DoiDisplay::parse("doi:10.1/ABC").expect("should parse");
        assert_eq!(d.resolved_link(), "https://doi.org/10.1/ABC");
        assert_eq!(d.display_text(), "DOI:10.1/ABC");
    }

    #[test]
    fn resolver_url_is_stripped_for_link() {
        let d = DoiDisplay::parse("https://doi.org/10.2/xyz").expect("should parse");
        assert_eq!(d.resolved_link(), "https://doi.org/10.2/xyz");
        assert_eq!(d.display_text(), "HTTPS://DOI.ORG/10.2/XYZ");

        let d = DoiDisplay::parse("http://dx.doi.org/10.3/q").expect("should parse");
        assert_eq!(d.bare(), "10.3/q");
    }

    #[test]
    fn blank_input_has_no_identifier() {
        assert!(DoiDisplay::parse("").is_none());
        assert!(DoiDisplay::parse(" \t ").is_none());
    }

    #[test]
    fn unsafe_characters_are_percent_encoded() {
        let d = DoiDisplay::parse("10.1000/a b#c").expect("should parse");
        assert_eq!(d.resolved_link(), "https://doi.org/10.1000/a%20b%23c");
    }

    #[test]
    fn any_prefix_form_links_to_the_same_place() {
        let prefixes = vec!["", "doi:", "DOI: ", "https://doi.org/", "HTTP://DX.DOI.ORG/"];
        proptest::proptest!(|(
            core in doi_core(),
            pre in proptest::sample::select(prefixes.clone()),
            ws in "[ \t]{0,3}"
        )| {
            let raw = format!("{ws}{pre}{core}{ws}");
            let d = DoiDisplay::parse(&raw).expect("should parse");
            proptest::prop_assert_eq!(d.bare(), core.as_str());
            proptest::prop_assert_eq!(d.display_text(), raw.trim().to_uppercase());
        })
    }
}
