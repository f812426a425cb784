use crossterm::event::{poll, read, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal;
use log::warn;
use std::collections::HashMap;
use std::io;
use std::time::Duration;

/// the left-hand side of a qwerty keyboard, laid out like the COSMAC keypad:
///   1 2 3 4      1 2 3 C
///   q w e r  =>  4 5 6 D
///   a s d f      7 8 9 E
///   z x c v      A 0 B F
pub const CHIP8_CONVENTIONAL_KEYMAP: [(char, u8); 16] = [
    ('x', 0x00),
    ('1', 0x01),
    ('2', 0x02),
    ('3', 0x03),
    ('q', 0x04),
    ('w', 0x05),
    ('e', 0x06),
    ('a', 0x07),
    ('s', 0x08),
    ('d', 0x09),
    ('z', 0x0a),
    ('c', 0x0b),
    ('4', 0x0c),
    ('r', 0x0d),
    ('f', 0x0e),
    ('v', 0x0f),
];

/// reads keypresses
pub trait Input {
    /// get a list of all the mapped keys that have been pressed recently,
    /// without flushing them from the buffer
    fn peek_keys(&mut self) -> Result<&[u8], io::Error>;

    /// flush all the keypresses from the buffer
    fn flush_keys(&mut self) -> Result<(), io::Error>;

    /// has the user asked to leave
    fn quit_requested(&self) -> bool;
}

/// map a raw key event to a keypad key; `None` for anything unmapped
fn map_key(keymap: &HashMap<char, u8>, evt: &KeyEvent) -> Option<u8> {
    match evt.code {
        KeyCode::Char(key) => keymap.get(&key.to_ascii_lowercase()).copied(),
        _ => None,
    }
}

/// where terminal events come from; `None` once nothing is waiting
type EventSource = fn() -> Result<Option<Event>, io::Error>;

fn next_terminal_event() -> Result<Option<Event>, io::Error> {
    if poll(Duration::from_millis(0))? {
        Ok(Some(read()?))
    } else {
        Ok(None)
    }
}

/// Input from the terminal, using crossterm. Puts the terminal into raw mode
/// for as long as it lives.
pub struct TermInput {
    buffer: Vec<u8>,
    keymap: HashMap<char, u8>,
    quit: bool,
    events: EventSource,
    raw_mode: bool,
}

impl TermInput {
    pub fn new() -> Result<Self, io::Error> {
        terminal::enable_raw_mode()?;
        let mut input = Self::with_events(next_terminal_event);
        input.raw_mode = true;
        Ok(input)
    }

    fn with_events(events: EventSource) -> Self {
        TermInput {
            buffer: Vec::new(),
            keymap: HashMap::from(CHIP8_CONVENTIONAL_KEYMAP),
            quit: false,
            events,
            raw_mode: false,
        }
    }

    fn read_terminal(&mut self) -> Result<(), io::Error> {
        while let Some(event) = (self.events)()? {
            match event {
                Event::Key(evt) => match evt.code {
                    KeyCode::Esc => self.quit = true,
                    KeyCode::Char('c') if evt.modifiers.contains(KeyModifiers::CONTROL) => {
                        self.quit = true
                    }
                    _ => match map_key(&self.keymap, &evt) {
                        Some(mapped_key) => self.buffer.push(mapped_key),
                        None => warn!("can't map {:?} to a COSMAC key", evt.code),
                    },
                },
                Event::Resize(..) => {}
                _ => warn!("unknown event received"),
            }
        }
        Ok(())
    }
}

impl Drop for TermInput {
    fn drop(&mut self) {
        if self.raw_mode {
            let _ = terminal::disable_raw_mode();
        }
    }
}

impl Input for TermInput {
    fn peek_keys(&mut self) -> Result<&[u8], io::Error> {
        self.read_terminal()?;
        Ok(self.buffer.as_slice())
    }

    /// forget what `peek_keys` read; anything typed since stays queued
    fn flush_keys(&mut self) -> Result<(), io::Error> {
        self.buffer.clear();
        Ok(())
    }

    fn quit_requested(&self) -> bool {
        self.quit
    }
}

/// dummy Input implementation for testing: hands out one batch of keys per
/// flush, then asks to quit once the script runs out
pub struct DummyInput {
    script: Vec<Vec<u8>>,
    quit_when_done: bool,
}

impl DummyInput {
    pub fn new(keys: &[u8]) -> Self {
        DummyInput {
            script: vec![Vec::from(keys)],
            quit_when_done: false,
        }
    }

    /// one batch of keys per frame, quitting after the last
    pub fn scripted(frames: &[&[u8]]) -> Self {
        DummyInput {
            script: frames.iter().rev().map(|f| f.to_vec()).collect(),
            quit_when_done: true,
        }
    }
}

impl Input for DummyInput {
    fn peek_keys(&mut self) -> Result<&[u8], io::Error> {
        Ok(self.script.last().map(|k| k.as_slice()).unwrap_or(&[]))
    }

    fn flush_keys(&mut self) -> Result<(), io::Error> {
        if self.script.len() > 1 || self.quit_when_done {
            self.script.pop();
        } else if let Some(keys) = self.script.last_mut() {
            keys.clear();
        }
        Ok(())
    }

    fn quit_requested(&self) -> bool {
        self.quit_when_done && self.script.is_empty()
    }
}
