//! Debug UI seam
//!
//! The crate does not depend on a GUI toolkit. Hosts implement [`DebugUi`]
//! over whatever immediate-mode UI they use; [`TextPanel`] collects the output
//! in memory for logs and tests.

/// Minimal panel/text sink
pub trait DebugUi {
    /// Opens a panel; returns `false` if it is collapsed and content should be
    /// skipped. [`end_panel`](Self::end_panel) is only called after `true`.
    fn begin_panel(&mut self, title: &str) -> bool;

    /// Emits one line of text into the open panel
    fn text(&mut self, line: &str);

    /// Closes the panel opened by the last successful `begin_panel`
    fn end_panel(&mut self);
}

/// [`DebugUi`] that records lines in memory
#[derive(Debug, Default, Clone)]
pub struct TextPanel {
    lines: Vec<String>,
    depth: usize,
}

impl TextPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded lines; panel titles appear as `[title]`
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Everything recorded so far, newline-separated
    pub fn render(&self) -> String {
        self.lines.join("\n")
    }
}

impl DebugUi for TextPanel {
    fn begin_panel(&mut self, title: &str) -> bool {
        self.lines.push(format!("{}[{title}]", "  ".repeat(self.depth)));
        self.depth += 1;
        true
    }

    fn text(&mut self, line: &str) {
        self.lines.push(format!("{}{line}", "  ".repeat(self.depth)));
    }

    fn end_panel(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}
