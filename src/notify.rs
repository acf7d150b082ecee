//! Fire-and-forget submission: post the URL and tell the user how it went.

use owo_colors::OwoColorize;
use tracing::{info, warn};

use crate::controller::{ActiveTab, AnalyzeRequest, Endpoint, SubmitMode, Transport};

pub const NOTIFICATION_TITLE: &str = "Analyze URL";

/// Host capability for short user-facing notices.
pub trait Notifier {
    fn notify(&mut self, title: &str, message: &str);
}

/// Writes notices to stderr.
pub struct TerminalNotifier {
    pub color: bool,
}

impl Notifier for TerminalNotifier {
    fn notify(&mut self, title: &str, message: &str) {
        if self.color {
            eprintln!("{} {message}", format!("{title}:").bold());
        } else {
            eprintln!("{title}: {message}");
        }
    }
}

/// Send the active URL without rendering anything and emit one notification.
/// Returns the message that was shown.
pub fn send_and_notify(
    transport: &impl Transport,
    endpoint: &Endpoint,
    mode: SubmitMode,
    tab: &dyn ActiveTab,
    notifier: &mut dyn Notifier,
) -> String {
    let message = match tab.active_url() {
        None => "No URL available.".to_string(),
        Some(target) => {
            let request = AnalyzeRequest {
                endpoint: endpoint.clone(),
                target,
                mode,
            };
            info!(target = %request.target, "sending URL");
            match transport.send(&request) {
                Ok(reply) if reply.is_success() => "URL sent successfully.".to_string(),
                Ok(reply) => format!("Server responded: {}", reply.status),
                Err(err) => {
                    warn!(%err, "send failed");
                    format!("Network error: {err}")
                }
            }
        }
    };
    notifier.notify(NOTIFICATION_TITLE, &message);
    message
}
