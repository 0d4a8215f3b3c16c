//! Severity-gated diagnostics and the last-error latch.
//!
//! Every message goes to the [`log`] facade under the `libepub` target.
//! Independently, a per-handle verbosity threshold decides whether the
//! message is also written to a side stream (stderr unless a writer is
//! injected), formatted as `libepub (WW): \t<message>`.
//!
//! Error-level messages are additionally latched: the most recent one is
//! kept and can be read back with [`Diagnostics::last_error`]. The latch is
//! a single slot, not a history.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::io::{self, Write};

/// Verbosity threshold and message severity.
///
/// Ordered from quietest to noisiest, so a message is shown when its level
/// is `<=` the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum DebugLevel {
    None,
    #[default]
    Error,
    Warning,
    Info,
    Verbose,
}

impl DebugLevel {
    /// Map a numeric level (0 = none … 4 = verbose); larger values saturate.
    pub fn from_number(n: u8) -> Self {
        match n {
            0 => DebugLevel::None,
            1 => DebugLevel::Error,
            2 => DebugLevel::Warning,
            3 => DebugLevel::Info,
            _ => DebugLevel::Verbose,
        }
    }

    /// Two-letter tag used on the side stream.
    fn tag(self) -> &'static str {
        match self {
            DebugLevel::None => "--",
            DebugLevel::Error => "EE",
            DebugLevel::Warning => "WW",
            DebugLevel::Info => "II",
            DebugLevel::Verbose => "VV",
        }
    }

    fn log_level(self) -> Option<log::Level> {
        match self {
            DebugLevel::None => None,
            DebugLevel::Error => Some(log::Level::Error),
            DebugLevel::Warning => Some(log::Level::Warn),
            DebugLevel::Info => Some(log::Level::Info),
            DebugLevel::Verbose => Some(log::Level::Debug),
        }
    }
}

impl fmt::Display for DebugLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DebugLevel::None => "none",
            DebugLevel::Error => "error",
            DebugLevel::Warning => "warning",
            DebugLevel::Info => "info",
            DebugLevel::Verbose => "verbose",
        };
        f.write_str(name)
    }
}

/// Diagnostics channel owned by one open handle.
pub struct Diagnostics {
    threshold: Cell<DebugLevel>,
    sink: RefCell<Box<dyn Write + Send>>,
    last_error: RefCell<Option<String>>,
}

impl Diagnostics {
    /// Channel writing shown messages to stderr.
    pub fn new(threshold: DebugLevel) -> Self {
        Self::with_writer(threshold, io::stderr())
    }

    /// Channel writing shown messages to `writer`.
    pub fn with_writer(threshold: DebugLevel, writer: impl Write + Send + 'static) -> Self {
        Self {
            threshold: Cell::new(threshold),
            sink: RefCell::new(Box::new(writer)),
            last_error: RefCell::new(None),
        }
    }

    pub fn threshold(&self) -> DebugLevel {
        self.threshold.get()
    }

    pub fn set_threshold(&self, threshold: DebugLevel) {
        self.threshold.set(threshold);
    }

    /// Report `message` at `level`.
    ///
    /// Error-level messages are also latched.
    pub fn log(&self, level: DebugLevel, message: impl fmt::Display) {
        let Some(log_level) = level.log_level() else {
            return;
        };
        let message = message.to_string();
        log::log!(target: "libepub", log_level, "{message}");

        if level == DebugLevel::Error {
            self.latch_error(&message);
        }

        if level <= self.threshold.get() {
            let mut sink = self.sink.borrow_mut();
            let _ = writeln!(sink, "libepub ({}): \t{}", level.tag(), message);
        }
    }

    pub fn error(&self, message: impl fmt::Display) {
        self.log(DebugLevel::Error, message);
    }

    pub fn warn(&self, message: impl fmt::Display) {
        self.log(DebugLevel::Warning, message);
    }

    pub fn info(&self, message: impl fmt::Display) {
        self.log(DebugLevel::Info, message);
    }

    pub fn verbose(&self, message: impl fmt::Display) {
        self.log(DebugLevel::Verbose, message);
    }

    /// Overwrite the latched error without emitting anything.
    pub fn latch_error(&self, message: &str) {
        *self.last_error.borrow_mut() = Some(message.to_owned());
    }

    /// Copy of the most recently latched error message.
    pub fn last_error(&self) -> Option<String> {
        self.last_error.borrow().clone()
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new(DebugLevel::default())
    }
}

impl fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Diagnostics")
            .field("threshold", &self.threshold.get())
            .field("last_error", &self.last_error.borrow())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Shared in-memory writer for asserting on the side stream.
    #[derive(Clone, Default)]
    pub(crate) struct Capture(Arc<Mutex<Vec<u8>>>);

    impl Capture {
        pub(crate) fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_threshold_gates_side_stream() {
        let capture = Capture::default();
        let diag = Diagnostics::with_writer(DebugLevel::Warning, capture.clone());

        diag.error("broken");
        diag.warn("odd");
        diag.info("chatty");
        diag.verbose("very chatty");

        let text = capture.text();
        assert!(text.contains("libepub (EE): \tbroken"));
        assert!(text.contains("libepub (WW): \todd"));
        assert!(!text.contains("chatty"));
    }

    #[test]
    fn test_none_threshold_still_latches() {
        let capture = Capture::default();
        let diag = Diagnostics::with_writer(DebugLevel::None, capture.clone());

        diag.error("first");
        diag.error("second");

        assert!(capture.text().is_empty());
        assert_eq!(diag.last_error().as_deref(), Some("second"));
    }

    #[test]
    fn test_only_errors_are_latched() {
        let diag = Diagnostics::with_writer(DebugLevel::Verbose, io::sink());
        diag.warn("not an error");
        diag.info("also not");
        assert_eq!(diag.last_error(), None);

        diag.latch_error("manual");
        assert_eq!(diag.last_error().as_deref(), Some("manual"));
    }

    #[test]
    fn test_last_error_is_an_independent_copy() {
        let diag = Diagnostics::with_writer(DebugLevel::None, io::sink());
        diag.error("stable message");

        let mut copy = diag.last_error().unwrap();
        copy.push_str(" mutated");

        assert_eq!(diag.last_error().as_deref(), Some("stable message"));
    }

    #[test]
    fn test_level_ordering_and_numbers() {
        assert!(DebugLevel::None < DebugLevel::Error);
        assert!(DebugLevel::Info < DebugLevel::Verbose);
        assert_eq!(DebugLevel::from_number(0), DebugLevel::None);
        assert_eq!(DebugLevel::from_number(3), DebugLevel::Info);
        assert_eq!(DebugLevel::from_number(9), DebugLevel::Verbose);
        assert_eq!(DebugLevel::Warning.to_string(), "warning");
    }

    #[test]
    fn test_set_threshold() {
        let capture = Capture::default();
        let diag = Diagnostics::with_writer(DebugLevel::Error, capture.clone());
        diag.info("hidden");
        diag.set_threshold(DebugLevel::Info);
        diag.info("shown");

        assert_eq!(diag.threshold(), DebugLevel::Info);
        let text = capture.text();
        assert!(!text.contains("hidden"));
        assert!(text.contains("(II): \tshown"));
    }
}
