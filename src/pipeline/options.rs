//! Render options.

use std::fmt;
use std::io::{self, Write};
use std::rc::Rc;
use std::time::Duration;

use crossterm::event::Event;

use crate::error::Error;
use crate::renderer::CaptureSink;

use super::terminal::{CrosstermInput, CrosstermSize, FixedSize, InputSource, ScriptedInput, SizeProvider};

/// Called with every frame failure and every effect panic under the root.
pub type ErrorCallback = Rc<dyn Fn(&Error)>;

/// Called with every input event the loop does not consume itself.
pub type InputCallback = Rc<dyn Fn(&Event)>;

/// How and where [`render`](super::render) draws.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use tessel::pipeline::RenderOptions;
///
/// let options = RenderOptions::new()
///     .with_alternate_screen(true)
///     .with_poll_interval(Duration::from_millis(33))
///     .on_error(|err| eprintln!("frame failed: {err}"));
/// assert!(options.alternate_screen());
/// ```
pub struct RenderOptions {
    pub(crate) output: Box<dyn Write>,
    pub(crate) size: Box<dyn SizeProvider>,
    pub(crate) input: Box<dyn InputSource>,
    pub(crate) alternate_screen: bool,
    pub(crate) exit_on_ctrl_c: bool,
    pub(crate) hide_cursor: bool,
    pub(crate) synchronized_output: bool,
    pub(crate) poll_interval: Duration,
    pub(crate) on_error: Option<ErrorCallback>,
    pub(crate) on_input: Option<InputCallback>,
}

impl RenderOptions {
    /// Real terminal: stdout, crossterm size and crossterm input.
    pub fn new() -> Self {
        Self {
            output: Box::new(io::stdout()),
            size: Box::new(CrosstermSize),
            input: Box::new(CrosstermInput::new()),
            alternate_screen: false,
            exit_on_ctrl_c: true,
            hide_cursor: true,
            synchronized_output: true,
            poll_interval: Duration::from_millis(16),
            on_error: None,
            on_input: None,
        }
    }

    /// No terminal at all: frames go to `sink`, the size is `size`, and
    /// there is no input.
    pub fn headless(sink: CaptureSink, size: FixedSize) -> Self {
        Self::new()
            .with_output(sink)
            .with_size_provider(size)
            .with_input(ScriptedInput::new())
    }

    pub fn with_output(mut self, output: impl Write + 'static) -> Self {
        self.output = Box::new(output);
        self
    }

    pub fn with_size_provider(mut self, size: impl SizeProvider + 'static) -> Self {
        self.size = Box::new(size);
        self
    }

    pub fn with_input(mut self, input: impl InputSource + 'static) -> Self {
        self.input = Box::new(input);
        self
    }

    /// Draw on the alternate screen and restore the original on unmount.
    pub fn with_alternate_screen(mut self, enabled: bool) -> Self {
        self.alternate_screen = enabled;
        self
    }

    pub fn with_exit_on_ctrl_c(mut self, enabled: bool) -> Self {
        self.exit_on_ctrl_c = enabled;
        self
    }

    pub fn with_hide_cursor(mut self, enabled: bool) -> Self {
        self.hide_cursor = enabled;
        self
    }

    /// Wrap each frame in DEC 2026 begin/end so terminals paint it atomically.
    pub fn with_synchronized_output(mut self, enabled: bool) -> Self {
        self.synchronized_output = enabled;
        self
    }

    /// How long one input poll waits.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn on_error(mut self, f: impl Fn(&Error) + 'static) -> Self {
        self.on_error = Some(Rc::new(f));
        self
    }

    pub fn on_input(mut self, f: impl Fn(&Event) + 'static) -> Self {
        self.on_input = Some(Rc::new(f));
        self
    }

    pub fn alternate_screen(&self) -> bool {
        self.alternate_screen
    }

    pub fn exit_on_ctrl_c(&self) -> bool {
        self.exit_on_ctrl_c
    }

    pub fn hide_cursor(&self) -> bool {
        self.hide_cursor
    }

    pub fn synchronized_output(&self) -> bool {
        self.synchronized_output
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RenderOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderOptions")
            .field("alternate_screen", &self.alternate_screen)
            .field("exit_on_ctrl_c", &self.exit_on_ctrl_c)
            .field("hide_cursor", &self.hide_cursor)
            .field("synchronized_output", &self.synchronized_output)
            .field("poll_interval", &self.poll_interval)
            .field("on_error", &self.on_error.is_some())
            .field("on_input", &self.on_input.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = RenderOptions::new();
        assert!(!options.alternate_screen());
        assert!(options.exit_on_ctrl_c());
        assert!(options.hide_cursor());
        assert!(options.synchronized_output());
        assert_eq!(options.poll_interval(), Duration::from_millis(16));
    }

    #[test]
    fn test_builder_chain() {
        let options = RenderOptions::headless(CaptureSink::new(), FixedSize::new(10, 2))
            .with_exit_on_ctrl_c(false)
            .with_synchronized_output(false)
            .on_input(|_| {});
        assert!(!options.exit_on_ctrl_c());
        assert!(!options.synchronized_output());
        let debug = format!("{options:?}");
        assert!(debug.contains("on_input: true"));
    }
}
