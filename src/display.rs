use crossterm::cursor::{Hide, Show};
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use std::io;
use tui::backend::CrosstermBackend;
use tui::layout::Rect;
use tui::style::{Color, Modifier, Style};
use tui::symbols::Marker;
use tui::widgets::canvas::{Canvas, Points};
use tui::widgets::{Block, Borders, Paragraph};
use tui::Terminal;

use crate::framebuffer::{FRAMEBUFFER_HEIGHT, FRAMEBUFFER_WIDTH};

/// Display is used by the environment to put the framebuffer on a screen. It
/// should abstract the implementation details, so a variety of kinds of
/// screen would work.
pub trait Display {
    /// draw a packed bitplane, plus a line of status text
    fn draw(&mut self, data: &[u8], status: &str) -> Result<(), io::Error>;

    /// how big the display data should be
    fn get_display_size_bytes(&self) -> usize;
}

// store useful metadata about the terminal
struct Resolution(usize, usize, usize);

impl Resolution {
    fn pixel_count(&self) -> usize {
        self.0 * self.1
    }
    fn byte_count(&self) -> usize {
        self.0 * self.1 * self.2 / 8
    }

    fn x_bounds(&self) -> [f64; 2] {
        [0.0, (self.0 - 1) as f64]
    }

    fn y_bounds(&self) -> [f64; 2] {
        [-1.0 * (self.1 - 1) as f64, 0.0]
    }

    /// coords of every pixel whose bit equals `bitplane`, y pointing down
    fn bitplane_from_data<'a>(
        &self,
        data: &'a [u8],
        bitplane: u8,
    ) -> impl std::iter::Iterator<Item = (f64, f64)> + 'a {
        let mut count = self.pixel_count();
        let w = self.0;
        std::iter::from_fn(move || {
            while count > 0 {
                count -= 1;
                let bit = 1 & (data[count / 8] >> (7 - count % 8));
                if bit == bitplane {
                    return Some((
                        (count % w) as f64,        // x
                        -1.0 * (count / w) as f64, // y
                    ));
                }
            }
            None
        })
    }
}

/// monochrome display in a terminal, rendered using TUI and crossterm
pub struct MonoTermDisplay {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    resolution: Resolution,
    title: String,
}

impl MonoTermDisplay {
    pub fn new(title: &str) -> Result<MonoTermDisplay, io::Error> {
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, Hide)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;
        Ok(MonoTermDisplay {
            terminal,
            resolution: Resolution(FRAMEBUFFER_WIDTH, FRAMEBUFFER_HEIGHT, 1),
            title: format!("CHIP-8: {}", title),
        })
    }
}

impl Drop for MonoTermDisplay {
    fn drop(&mut self) {
        // nothing sensible to do if the terminal has gone away
        let _ = execute!(io::stdout(), Show, LeaveAlternateScreen);
    }
}

impl Display for MonoTermDisplay {
    fn draw(&mut self, data: &[u8], status: &str) -> Result<(), io::Error> {
        // make sure we're given exactly the right amount of data to draw
        assert_eq!(
            data.len(),
            self.resolution.byte_count(),
            "MonoTermDisplay must have correct-sized data to draw"
        );

        let resolution = &self.resolution;
        let title = self.title.as_str();
        // for now this assumes a 1:1 ratio between terminal, chip8 and the
        // internal TUI canvas
        self.terminal.draw(|f| {
            let screen = f.size();
            let canvas_area = Rect::new(
                0,
                0,
                2 + resolution.0 as u16,
                2 + resolution.1 as u16,
            )
            .intersection(screen);
            let status_area =
                Rect::new(0, 2 + resolution.1 as u16, 2 + resolution.0 as u16, 1)
                    .intersection(screen);

            let canvas = Canvas::default()
                .block(
                    Block::default()
                        .title(title)
                        .borders(Borders::ALL)
                        .style(Style::default().bg(Color::Black)),
                )
                .x_bounds(resolution.x_bounds())
                .y_bounds(resolution.y_bounds())
                .marker(Marker::Block)
                .paint(|ctx| {
                    // lit pixels only; the block background is already black
                    ctx.draw(&Points {
                        coords: &resolution.bitplane_from_data(data, 1).collect::<Vec<_>>(),
                        color: Color::White,
                    });
                });
            f.render_widget(canvas, canvas_area);

            if status_area.area() > 0 {
                let line = Paragraph::new(status.to_string())
                    .style(Style::default().add_modifier(Modifier::REVERSED));
                f.render_widget(line, status_area);
            }
        })?;
        Ok(())
    }

    /// how big the display data should be
    fn get_display_size_bytes(&self) -> usize {
        self.resolution.byte_count()
    }
}

/// useful for testing non-display routines; remembers the last frame
pub struct DummyDisplay {
    pub frames: usize,
    pub last_frame: Vec<u8>,
    pub last_status: String,
}

impl Default for DummyDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl DummyDisplay {
    pub fn new() -> DummyDisplay {
        DummyDisplay {
            frames: 0,
            last_frame: Vec::new(),
            last_status: String::new(),
        }
    }
}

impl Display for DummyDisplay {
    fn draw(&mut self, data: &[u8], status: &str) -> Result<(), io::Error> {
        self.frames += 1;
        self.last_frame = data.to_vec();
        self.last_status = status.to_string();
        Ok(())
    }
    fn get_display_size_bytes(&self) -> usize {
        0x100
    }
}
