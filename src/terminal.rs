// Copyright (c) 2026 rezky_nightky

use std::io::{stdout, Result, Stdout, Write};
use std::time::Duration;

use crossterm::{
    cursor, event,
    style::{
        Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
    },
    terminal, ExecutableCommand, QueueableCommand,
};

use crate::cell::Cell;
use crate::frame::Frame;

/// Current SGR state, so escape codes are only emitted on change.
#[derive(Default)]
struct Pen {
    fg: Option<Color>,
    bg: Option<Color>,
    bold: bool,
}

impl Pen {
    fn apply<W: Write>(&mut self, out: &mut W, cell: &Cell) -> Result<()> {
        if cell.fg != self.fg {
            out.queue(SetForegroundColor(cell.fg.unwrap_or(Color::Reset)))?;
            self.fg = cell.fg;
        }
        if cell.bg != self.bg {
            out.queue(SetBackgroundColor(cell.bg.unwrap_or(Color::Reset)))?;
            self.bg = cell.bg;
        }
        if cell.bold != self.bold {
            out.queue(SetAttribute(if cell.bold {
                Attribute::Bold
            } else {
                Attribute::NormalIntensity
            }))?;
            self.bold = cell.bold;
        }
        Ok(())
    }
}

/// Raw-mode alternate screen. Restored on drop.
pub struct Terminal {
    stdout: Stdout,
    last_size: Option<(u16, u16)>,
    run_buf: String,
    order: Vec<usize>,
}

impl Terminal {
    pub fn new() -> Result<Self> {
        let mut out = stdout();
        terminal::enable_raw_mode()?;
        let init_res: Result<()> = (|| {
            out.execute(terminal::EnterAlternateScreen)?;
            out.execute(cursor::Hide)?;
            let _ = out.execute(terminal::DisableLineWrap);
            out.execute(SetAttribute(Attribute::Reset))?;
            out.execute(ResetColor)?;
            out.execute(terminal::Clear(terminal::ClearType::All))?;
            out.flush()?;
            Ok(())
        })();
        if let Err(e) = init_res {
            restore_terminal_best_effort();
            return Err(e);
        }
        Ok(Self {
            stdout: out,
            last_size: None,
            run_buf: String::with_capacity(64),
            order: Vec::new(),
        })
    }

    pub fn size(&self) -> Result<(u16, u16)> {
        terminal::size()
    }

    pub fn poll_event(timeout: Duration) -> Result<bool> {
        event::poll(timeout)
    }

    pub fn read_event() -> Result<event::Event> {
        event::read()
    }

    /// Flush the frame's changes to the screen and mark it clean.
    pub fn draw(&mut self, frame: &mut Frame) -> Result<()> {
        let size = (frame.width, frame.height);
        let total = frame.width as usize * frame.height as usize;
        let full = frame.is_dirty_all()
            || self.last_size != Some(size)
            || frame.dirty_indices().len() >= total / 3;

        if full {
            self.draw_full(frame)?;
        } else {
            self.draw_dirty(frame)?;
        }

        self.stdout.queue(SetAttribute(Attribute::Reset))?;
        self.stdout.queue(ResetColor)?;
        self.stdout.flush()?;
        self.last_size = Some(size);
        frame.clear_dirty();
        Ok(())
    }

    fn draw_full(&mut self, frame: &Frame) -> Result<()> {
        if self.last_size != Some((frame.width, frame.height)) {
            self.stdout
                .queue(terminal::Clear(terminal::ClearType::All))?;
        }
        let mut pen = Pen::default();
        self.stdout.queue(SetForegroundColor(Color::Reset))?;
        self.stdout.queue(SetBackgroundColor(Color::Reset))?;
        for y in 0..frame.height {
            self.stdout.queue(cursor::MoveTo(0, y))?;
            for x in 0..frame.width {
                let cell = frame.cell_at_index(y as usize * frame.width as usize + x as usize);
                pen.apply(&mut self.stdout, &cell)?;
                self.stdout.queue(Print(cell.ch))?;
            }
        }
        Ok(())
    }

    /// Repaint changed cells, merging horizontal neighbours with the same
    /// style into a single print.
    fn draw_dirty(&mut self, frame: &Frame) -> Result<()> {
        self.order.clear();
        self.order.extend_from_slice(frame.dirty_indices());
        self.order.sort_unstable();

        let width = frame.width as usize;
        let mut pen = Pen::default();
        self.stdout.queue(SetForegroundColor(Color::Reset))?;
        self.stdout.queue(SetBackgroundColor(Color::Reset))?;

        let mut i = 0usize;
        while i < self.order.len() {
            let idx0 = self.order[i];
            let cell0 = frame.cell_at_index(idx0);
            let (x0, y0) = ((idx0 % width) as u16, (idx0 / width) as u16);

            self.run_buf.clear();
            self.run_buf.push(cell0.ch);
            let mut last = idx0;
            let mut j = i + 1;
            while j < self.order.len() {
                let idx1 = self.order[j];
                if idx1 != last + 1 || idx1 % width == 0 {
                    break;
                }
                let cell1 = frame.cell_at_index(idx1);
                if cell1.fg != cell0.fg || cell1.bg != cell0.bg || cell1.bold != cell0.bold {
                    break;
                }
                self.run_buf.push(cell1.ch);
                last = idx1;
                j += 1;
            }

            self.stdout.queue(cursor::MoveTo(x0, y0))?;
            pen.apply(&mut self.stdout, &cell0)?;
            self.stdout.queue(Print(self.run_buf.as_str()))?;
            i = j;
        }
        Ok(())
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        restore_terminal_best_effort();
    }
}

/// Leave raw mode and the alternate screen, ignoring errors. Safe to call
/// from panic hooks and signal handlers.
pub fn restore_terminal_best_effort() {
    let mut out = stdout();
    let _ = out.execute(SetAttribute(Attribute::Reset));
    let _ = out.execute(ResetColor);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::EnableLineWrap);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
    let _ = out.flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pen_only_emits_on_change() {
        let cell = Cell {
            ch: 'a',
            fg: Some(Color::White),
            bg: None,
            bold: true,
        };
        let mut pen = Pen::default();
        let mut buf: Vec<u8> = Vec::new();

        pen.apply(&mut buf, &cell).unwrap();
        let first = buf.len();
        assert!(first > 0);

        pen.apply(&mut buf, &cell).unwrap();
        assert_eq!(buf.len(), first);
    }
}
