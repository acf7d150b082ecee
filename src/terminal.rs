//! Terminal presentation of [`UiState`]. Reads state, never changes it.

use std::fmt::Write as _;
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;

use crate::controller::StatusObserver;
use crate::view::{Field, Node, Region, StatusClass, StatusLine, UiState};

#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub color: bool,
    pub show_headers: bool,
    pub now: Instant,
}

pub fn render(state: &UiState, opts: &RenderOptions) -> String {
    let mut out = String::new();
    let paint = Painter(opts.color);

    if !state.status.text.is_empty() {
        let _ = writeln!(out, "{}", paint.status(&state.status));
    }
    if opts.show_headers && state.headers.is_visible() {
        let _ = writeln!(out, "{}", paint.dim(state.headers.text()));
    }
    if state.error.is_visible() {
        let _ = writeln!(out, "{}", paint.err(state.error.text()));
        return out;
    }

    for field in state.simple_fields() {
        line(&mut out, field);
    }
    region(&mut out, &state.url, &paint, opts.now);
    region(&mut out, &state.pid, &paint, opts.now);

    if state.extract.is_visible() {
        let _ = writeln!(out, "\n{}", state.extract.text());
    }

    if state.raw.toggle_visible() {
        let _ = writeln!(out, "\n{}", paint.dim(&format!("[{}]", state.raw.toggle_label())));
        if state.raw.is_expanded() {
            let _ = writeln!(out, "{}", state.raw.text());
        }
    }

    if state.footer_visible {
        out.push('\n');
        region(&mut out, &state.analysis_id, &paint, opts.now);
        line(&mut out, &state.processed_at);
        line(&mut out, &state.ip_address);
    }
    out
}

fn line(out: &mut String, field: &Field) {
    if field.is_visible() {
        let _ = writeln!(out, "{}", field.text());
    }
}

fn region(out: &mut String, region: &Region, paint: &Painter, now: Instant) {
    if !region.is_visible() {
        return;
    }
    let parts = region
        .nodes()
        .iter()
        .map(|node| match node {
            Node::Label(s) | Node::Text(s) => s.clone(),
            Node::Anchor(a) if a.navigable && a.href != a.text => {
                format!("{} <{}>", paint.link(&a.text), a.href)
            }
            Node::Anchor(a) if a.navigable => paint.link(&a.text),
            Node::Anchor(a) => a.text.clone(),
            Node::Copy(a) => format!("[copy {}]", a.indicator(now)),
        })
        .collect::<Vec<_>>();
    let _ = writeln!(out, "{}", parts.join(" "));
}

struct Painter(bool);

impl Painter {
    fn status(&self, status: &StatusLine) -> String {
        if !self.0 {
            return status.text.clone();
        }
        match status.class {
            StatusClass::Muted => status.text.dimmed().to_string(),
            StatusClass::Ok => status.text.green().to_string(),
            StatusClass::Err => status.text.red().to_string(),
        }
    }

    fn err(&self, s: &str) -> String {
        if self.0 { s.red().bold().to_string() } else { s.to_string() }
    }

    fn dim(&self, s: &str) -> String {
        if self.0 { s.dimmed().to_string() } else { s.to_string() }
    }

    fn link(&self, s: &str) -> String {
        if self.0 { s.blue().underline().to_string() } else { s.to_string() }
    }
}

/// Mirrors the status line on a stderr spinner while a request is in flight.
pub struct SpinnerObserver {
    bar: ProgressBar,
}

impl SpinnerObserver {
    pub fn new(enabled: bool) -> Self {
        let bar = if enabled {
            ProgressBar::new_spinner()
        } else {
            ProgressBar::hidden()
        };
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
            bar.set_style(style);
        }
        Self { bar }
    }
}

impl StatusObserver for SpinnerObserver {
    fn status_changed(&mut self, status: &StatusLine) {
        match status.class {
            StatusClass::Muted => {
                self.bar.set_message(status.text.clone());
                self.bar.enable_steady_tick(Duration::from_millis(80));
            }
            StatusClass::Ok | StatusClass::Err => self.bar.finish_and_clear(),
        }
    }
}
