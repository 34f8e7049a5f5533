//! Terminal collaborators: where the size comes from and where input comes from.
//!
//! The render loop only talks to these traits, so a test can swap the real
//! terminal for a fixed size and a scripted event list.

use std::cell::Cell;
use std::collections::VecDeque;
use std::io;
use std::rc::Rc;
use std::time::Duration;

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers,
};

// =============================================================================
// Size
// =============================================================================

/// Reports the terminal size in cells (columns, rows).
pub trait SizeProvider {
    fn size(&mut self) -> io::Result<(u16, u16)>;
}

/// Asks the real terminal via crossterm.
#[derive(Debug, Default, Clone, Copy)]
pub struct CrosstermSize;

impl SizeProvider for CrosstermSize {
    fn size(&mut self) -> io::Result<(u16, u16)> {
        crossterm::terminal::size()
    }
}

/// A size set by hand. Clones share the value, so a test can keep one and
/// resize the "terminal" after handing the other to the renderer.
#[derive(Debug, Clone)]
pub struct FixedSize {
    size: Rc<Cell<(u16, u16)>>,
}

impl FixedSize {
    pub fn new(width: u16, height: u16) -> Self {
        Self { size: Rc::new(Cell::new((width, height))) }
    }

    pub fn set(&self, width: u16, height: u16) {
        self.size.set((width, height));
    }

    pub fn get(&self) -> (u16, u16) {
        self.size.get()
    }
}

impl SizeProvider for FixedSize {
    fn size(&mut self) -> io::Result<(u16, u16)> {
        Ok(self.size.get())
    }
}

// =============================================================================
// Input
// =============================================================================

/// Source of terminal events for `wait_until_exit`.
pub trait InputSource {
    /// Called once before the first frame (e.g. to enter raw mode).
    fn enable(&mut self) -> io::Result<()> {
        Ok(())
    }

    /// Called on unmount; undoes `enable`.
    fn disable(&mut self) -> io::Result<()> {
        Ok(())
    }

    /// Wait up to `timeout` for the next event.
    fn poll(&mut self, timeout: Duration) -> io::Result<Option<Event>>;

    /// True when no event will ever arrive again. The event loop stops
    /// waiting once its source is exhausted.
    fn is_exhausted(&self) -> bool {
        false
    }
}

/// Reads events from the real terminal in raw mode.
#[derive(Debug, Default)]
pub struct CrosstermInput {
    raw: bool,
}

impl CrosstermInput {
    pub fn new() -> Self {
        Self::default()
    }
}

impl InputSource for CrosstermInput {
    fn enable(&mut self) -> io::Result<()> {
        if !self.raw {
            crossterm::terminal::enable_raw_mode()?;
            self.raw = true;
        }
        Ok(())
    }

    fn disable(&mut self) -> io::Result<()> {
        if self.raw {
            crossterm::terminal::disable_raw_mode()?;
            self.raw = false;
        }
        Ok(())
    }

    fn poll(&mut self, timeout: Duration) -> io::Result<Option<Event>> {
        if crossterm::event::poll(timeout)? {
            Ok(Some(crossterm::event::read()?))
        } else {
            Ok(None)
        }
    }
}

impl Drop for CrosstermInput {
    fn drop(&mut self) {
        let _ = self.disable();
    }
}

/// A fixed list of events, delivered one per poll.
///
/// ```
/// use tessel::pipeline::ScriptedInput;
///
/// let input = ScriptedInput::new().key('a').resize(100, 30).ctrl_c();
/// assert_eq!(input.remaining(), 3);
/// ```
#[derive(Debug, Default)]
pub struct ScriptedInput {
    events: VecDeque<Event>,
}

impl ScriptedInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn event(mut self, event: Event) -> Self {
        self.events.push_back(event);
        self
    }

    /// A plain key press.
    pub fn key(self, c: char) -> Self {
        self.event(key_press(KeyCode::Char(c), KeyModifiers::NONE))
    }

    pub fn resize(self, width: u16, height: u16) -> Self {
        self.event(Event::Resize(width, height))
    }

    pub fn ctrl_c(self) -> Self {
        self.event(key_press(KeyCode::Char('c'), KeyModifiers::CONTROL))
    }

    pub fn remaining(&self) -> usize {
        self.events.len()
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self, _timeout: Duration) -> io::Result<Option<Event>> {
        Ok(self.events.pop_front())
    }

    fn is_exhausted(&self) -> bool {
        self.events.is_empty()
    }
}

fn key_press(code: KeyCode, modifiers: KeyModifiers) -> Event {
    Event::Key(KeyEvent {
        code,
        modifiers,
        kind: KeyEventKind::Press,
        state: KeyEventState::NONE,
    })
}

/// True for a Ctrl+C press (or repeat).
pub fn is_ctrl_c(event: &Event) -> bool {
    match event {
        Event::Key(key) => {
            key.kind != KeyEventKind::Release
                && key.modifiers.contains(KeyModifiers::CONTROL)
                && matches!(key.code, KeyCode::Char('c' | 'C'))
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_size_shared() {
        let size = FixedSize::new(80, 24);
        let mut provider = size.clone();
        size.set(100, 40);
        assert_eq!(provider.size().unwrap(), (100, 40));
    }

    #[test]
    fn test_scripted_input_drains() {
        let mut input = ScriptedInput::new().key('x').ctrl_c();
        assert!(!input.is_exhausted());
        let first = input.poll(Duration::ZERO).unwrap();
        assert!(!first.as_ref().is_some_and(is_ctrl_c));
        let second = input.poll(Duration::ZERO).unwrap();
        assert!(second.as_ref().is_some_and(is_ctrl_c));
        assert!(input.is_exhausted());
        assert!(input.poll(Duration::ZERO).unwrap().is_none());
    }

    #[test]
    fn test_is_ctrl_c_ignores_plain_c() {
        assert!(!is_ctrl_c(&key_press(KeyCode::Char('c'), KeyModifiers::NONE)));
        assert!(!is_ctrl_c(&Event::Resize(1, 1)));
    }
}
