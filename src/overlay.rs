// Copyright (c) 2026 rezky_nightky

//! Foreground message box composited over the rain.

use crossterm::style::Color;

use crate::cell::Cell;
use crate::frame::Frame;

const PAD_X: u16 = 2;
const PAD_Y: u16 = 1;

#[derive(Clone, Debug)]
struct MsgChr {
    line: u16,
    col: u16,
    val: char,
}

#[derive(Clone, Debug, Default)]
pub struct Overlay {
    cells: Vec<MsgChr>,
}

impl Overlay {
    /// Lay `text` out centered on a `cols` x `lines` screen. Lines longer
    /// than the screen wrap; rows that don't fit are dropped.
    pub fn layout(text: &str, cols: u16, lines: u16, border: bool) -> Self {
        let border: u16 = if border { 1 } else { 0 };
        let chrome_w = 2 * border + 2 * PAD_X;
        let chrome_h = 2 * border + 2 * PAD_Y;
        if cols <= chrome_w || lines <= chrome_h {
            return Self::default();
        }

        let max_w = (cols - chrome_w) as usize;
        let max_h = (lines - chrome_h) as usize;

        let mut content: Vec<Vec<char>> = Vec::new();
        for raw in text.split('\n') {
            let chars: Vec<char> = raw.chars().filter(|c| !c.is_control()).collect();
            if chars.is_empty() {
                content.push(Vec::new());
            }
            content.extend(chars.chunks(max_w).map(|c| c.to_vec()));
        }
        content.truncate(max_h);

        let content_w = content.iter().map(Vec::len).max().unwrap_or(0).max(1) as u16;
        let content_h = content.len().max(1) as u16;
        let box_w = content_w + chrome_w;
        let box_h = content_h + chrome_h;
        let start_col = cols / 2 - box_w / 2;
        let start_line = lines / 2 - box_h / 2;

        let mut cells = Vec::with_capacity(box_w as usize * box_h as usize);
        for y in 0..box_h {
            for x in 0..box_w {
                let mut val = ' ';
                if border == 1 {
                    let edge_y = y == 0 || y + 1 == box_h;
                    let edge_x = x == 0 || x + 1 == box_w;
                    val = match (edge_y, edge_x) {
                        (true, true) => '+',
                        (true, false) => '-',
                        (false, true) => '|',
                        (false, false) => ' ',
                    };
                }

                let inner_y = y.checked_sub(border + PAD_Y);
                let inner_x = x.checked_sub(border + PAD_X);
                if let (Some(iy), Some(ix)) = (inner_y, inner_x) {
                    if let Some(row) = content.get(iy as usize) {
                        let left_pad = (content_w as usize - row.len()) / 2;
                        let ix = ix as usize;
                        if ix >= left_pad && ix < left_pad + row.len() {
                            val = row[ix - left_pad];
                        }
                    }
                }

                cells.push(MsgChr {
                    line: start_line + y,
                    col: start_col + x,
                    val,
                });
            }
        }

        Self { cells }
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn draw(&self, frame: &mut Frame, fg: Option<Color>, bg: Option<Color>) {
        for mc in &self.cells {
            let visible = mc.val != ' ';
            frame.set(
                mc.col,
                mc.line,
                Cell {
                    ch: mc.val,
                    fg: if visible { fg } else { None },
                    bg,
                    bold: visible,
                },
            );
        }
    }
}
