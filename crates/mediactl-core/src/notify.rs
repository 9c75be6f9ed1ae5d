// ── Notification collaborator ──
//
// Both core components surface outcomes through a fire-and-forget notifier
// instead of returning transport errors to the host. The trait is object
// safe so hosts can inject a terminal printer, a desktop toast, or a test
// recorder without the components knowing the difference.

use std::sync::Arc;

/// How loudly a notice should be displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

/// One user-visible notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub message: String,
    pub severity: Severity,
    /// Where to send the user for more context (e.g. a bug report form).
    pub help_url: Option<String>,
    /// Whether the host may dismiss the notice on its own after a delay.
    pub auto_close: bool,
}

impl Notice {
    pub fn new(severity: Severity, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            severity,
            help_url: None,
            auto_close: true,
        }
    }

    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Info, title, message)
    }

    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Success, title, message)
    }

    pub fn warning(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, title, message)
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, title, message)
    }

    pub fn with_help_url(mut self, url: impl Into<String>) -> Self {
        self.help_url = Some(url.into());
        self
    }

    pub fn sticky(mut self) -> Self {
        self.auto_close = false;
        self
    }
}

/// Fire-and-forget notification sink.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Notifier that routes notices into the tracing pipeline.
///
/// The default for headless hosts; the CLI installs its own printer.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        match notice.severity {
            Severity::Error => tracing::error!(title = %notice.title, "{}", notice.message),
            Severity::Warning => tracing::warn!(title = %notice.title, "{}", notice.message),
            Severity::Success | Severity::Info => {
                tracing::info!(title = %notice.title, "{}", notice.message);
            }
        }
    }
}

/// Recording notifier for tests.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: std::sync::Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().map(|n| n.clone()).unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        if let Ok(mut notices) = self.notices.lock() {
            notices.push(notice);
        }
    }
}
