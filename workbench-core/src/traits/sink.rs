//! Destinations for derivation steps
//!
//! Every traced computation writes its steps through a [`StepSink`]. The
//! explaining entry points pass a `Vec<String>`; internal recursion and the
//! plain numeric entry points pass [`Silent`], so the same code path serves
//! both "compute" and "compute and explain".

/// Receives derivation lines in execution order
pub trait StepSink {
    /// Append one line to the trace
    fn record(&mut self, line: String);

    /// Whether lines are kept
    ///
    /// Callers use this to skip building expensive lines (formatted
    /// matrices, minors) when nothing would be kept.
    fn is_recording(&self) -> bool {
        true
    }

    /// Append the line `line` builds, calling it only when lines are kept
    fn record_with(&mut self, line: impl FnOnce() -> String) {
        if self.is_recording() {
            self.record(line());
        }
    }

    /// Append an empty separator line
    fn blank(&mut self) {
        self.record(String::new());
    }
}

impl StepSink for Vec<String> {
    fn record(&mut self, line: String) {
        self.push(line);
    }
}

/// Sink that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl StepSink for Silent {
    fn record(&mut self, _line: String) {}

    fn is_recording(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_sink_keeps_order() {
        let mut steps = Vec::new();
        steps.record("first".to_string());
        steps.blank();
        steps.record("second".to_string());
        assert_eq!(steps, vec!["first", "", "second"]);
        assert!(steps.is_recording());
    }

    #[test]
    fn test_silent_sink() {
        let mut sink = Silent;
        sink.record("dropped".to_string());
        assert!(!sink.is_recording());
    }

    #[test]
    fn test_record_with_builds_lines_lazily() {
        let mut built = 0;
        let mut silent = Silent;
        silent.record_with(|| {
            built += 1;
            "dropped".to_string()
        });
        assert_eq!(built, 0);

        let mut steps = Vec::new();
        steps.record_with(|| {
            built += 1;
            format!("kept {built}")
        });
        assert_eq!(built, 1);
        assert_eq!(steps, vec!["kept 1"]);
    }
}
