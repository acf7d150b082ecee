use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use tracing::debug;

use crate::affordance::{AffordanceKind, sync_affordance};
use crate::field::{NOT_AVAILABLE, display};
use crate::identifier::{DoiDisplay, UrlDisplay};
use crate::payload::{AnalysisView, NormalizedMetadata, RequestInfo};
use crate::view::{Anchor, Node, StatusLine, UiState};

/// Owns the displayed state and the metadata it was built from.
#[derive(Debug, Default)]
pub struct Reconciler {
    state: UiState,
    current: Option<NormalizedMetadata>,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &UiState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut UiState {
        &mut self.state
    }

    /// Metadata of the last successful render, if any.
    pub fn metadata(&self) -> Option<&NormalizedMetadata> {
        self.current.as_ref()
    }

    pub fn set_status(&mut self, status: StatusLine) {
        self.state.status = status;
    }

    pub fn set_headers(&mut self, headers: &[(String, String)]) {
        let lines = headers
            .iter()
            .map(|(k, v)| format!("{k}: {v}"))
            .collect::<Vec<_>>();
        if lines.is_empty() {
            self.state.headers.clear();
        } else {
            self.state.headers.show(lines.join("\n"));
        }
    }

    /// Reset before a new request goes out.
    pub fn clear(&mut self) {
        self.state.clear_results();
        self.state.headers.clear();
        self.current = None;
    }

    /// Replace the result view, headers included, with `message`.
    pub fn show_error(&mut self, message: &str) {
        self.state.clear_results();
        self.state.headers.clear();
        self.current = None;
        self.state.error.show(message);
    }

    pub fn reconcile_view(&mut self, view: &AnalysisView) {
        self.reconcile(
            view.title.as_deref(),
            view.metadata.clone(),
            view.body_text.as_deref(),
            Some(view.raw_payload.as_str()),
            &view.info,
        );
    }

    /// Rebuild the whole result view from one response. Calling this twice with
    /// the same input yields the same visible state.
    pub fn reconcile(
        &mut self,
        title: Option<&str>,
        metadata: NormalizedMetadata,
        body_text: Option<&str>,
        raw_payload: Option<&str>,
        info: &RequestInfo,
    ) {
        let state = &mut self.state;
        state.clear_results();

        let m = &metadata;
        state.title.show(format!("Title: {}", display(title)));
        for (field, label, value) in [
            (&mut state.publication_date, "Publication date", &m.publication_date),
            (
                &mut state.last_modification_date,
                "Last modification date",
                &m.last_modification_date,
            ),
            (&mut state.author, "Author", &m.author),
            (&mut state.authors, "Authors", &m.authors),
            (&mut state.description, "Description", &m.description),
            (&mut state.keywords, "Keywords", &m.keywords),
            (&mut state.publisher, "Publisher", &m.publisher),
        ] {
            field.show(format!("{label}: {}", display(value.as_deref())));
        }

        let url = UrlDisplay::from_raw(m.url.as_deref());
        debug!(raw = ?url.raw(), navigable = url.is_navigable(), "page url");
        state.url.push(Node::Label("URL:".into()));
        state.url.push(Node::Anchor(Anchor {
            text: url.display_text().to_string(),
            href: url.href().to_string(),
            navigable: url.is_navigable(),
        }));
        sync_affordance(&mut state.url, AffordanceKind::Url, url.copy_value());
        state.url.set_visible(true);

        let doi = m.doi.as_deref().and_then(DoiDisplay::parse);
        if let Some(doi) = &doi {
            debug!(raw = doi.raw(), bare = doi.bare(), "persistent identifier");
        }
        state.pid.push(Node::Label("Persistent Identifier:".into()));
        match &doi {
            Some(doi) => state.pid.push(Node::Anchor(Anchor {
                text: doi.display_text().to_string(),
                href: doi.resolved_link(),
                navigable: true,
            })),
            None => state.pid.push(Node::Text(NOT_AVAILABLE.into())),
        }
        sync_affordance(
            &mut state.pid,
            AffordanceKind::PersistentId,
            doi.as_ref().map(DoiDisplay::display_text),
        );
        state.pid.set_visible(true);

        let analysis_id = info.analysis_id.as_deref();
        state
            .analysis_id
            .push(Node::Text(format!("Analysis ID: {}", display(analysis_id))));
        sync_affordance(&mut state.analysis_id, AffordanceKind::AnalysisId, analysis_id);
        state.analysis_id.set_visible(true);

        let processed = info.processed_at.as_deref().and_then(localize_timestamp);
        state
            .processed_at
            .show(format!("Processed at: {}", display(processed.as_deref())));
        state
            .ip_address
            .show(format!("IP address: {}", display(m.ip_address.as_deref())));
        state.footer_visible = true;

        match body_text.filter(|b| !b.trim().is_empty()) {
            Some(body) => state.extract.show(body),
            None => state.extract.clear(),
        }

        state.raw.load(raw_payload.unwrap_or_default());

        debug!(affordances = state.affordances().count(), "reconciled result view");
        self.current = Some(metadata);
    }

    /// Render what is known about a 2xx response whose body is not JSON.
    pub fn show_degraded(&mut self, status: u16, text: &str) {
        let state = &mut self.state;
        state.clear_results();
        self.current = None;

        state.title.show(format!("Title: {NOT_AVAILABLE}"));
        state.raw.load(format!("(non-JSON response, status {status})\n\n{text}"));

        state
            .analysis_id
            .push(Node::Text(format!("Analysis ID: {NOT_AVAILABLE}")));
        state.analysis_id.set_visible(true);
        state.processed_at.show(format!("Processed at: {NOT_AVAILABLE}"));
        state.footer_visible = true;
    }

    pub fn toggle_raw(&mut self) -> bool {
        self.state.raw.toggle()
    }
}

/// Processed-at in the local time zone; `None` when unparseable.
pub fn localize_timestamp(raw: &str) -> Option<String> {
    localize_in(raw, &Local)
}

pub fn localize_in<Tz: TimeZone>(raw: &str, tz: &Tz) -> Option<String>
where
    Tz::Offset: std::fmt::Display,
{
    let raw = raw.trim();
    let at = if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        dt.with_timezone(tz)
    } else if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
    {
        // No offset given: wall-clock time in the target zone.
        tz.from_local_datetime(&naive).earliest()?
    } else {
        // Bare dates are midnight UTC.
        let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
        Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?)
            .with_timezone(tz)
    };
    Some(at.format("%Y-%m-%d %H:%M:%S").to_string())
}
