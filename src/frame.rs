// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;

use crate::cell::Cell;

/// Terminal cell grid with change tracking for incremental redraws.
#[derive(Clone, Debug)]
pub struct Frame {
    pub width: u16,
    pub height: u16,
    cells: Vec<Cell>,
    blank: Cell,
    dirty_all: bool,
    dirty_map: Vec<bool>,
    dirty: Vec<usize>,
}

impl Frame {
    pub fn new(width: u16, height: u16, bg: Option<Color>) -> Self {
        let len = width as usize * height as usize;
        let blank = Cell::blank_with_bg(bg);
        Self {
            width,
            height,
            cells: vec![blank; len],
            blank,
            dirty_all: true,
            dirty_map: vec![false; len],
            dirty: Vec::new(),
        }
    }

    pub fn is_dirty_all(&self) -> bool {
        self.dirty_all
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty_all || !self.dirty.is_empty()
    }

    pub fn dirty_indices(&self) -> &[usize] {
        &self.dirty
    }

    pub fn clear_dirty(&mut self) {
        if self.dirty_all {
            self.dirty_all = false;
            self.dirty_map.fill(false);
            self.dirty.clear();
            return;
        }

        for &i in &self.dirty {
            if let Some(v) = self.dirty_map.get_mut(i) {
                *v = false;
            }
        }
        self.dirty.clear();
    }

    pub fn index(&self, x: u16, y: u16) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    pub fn cell_at_index(&self, i: usize) -> Cell {
        self.cells.get(i).copied().unwrap_or(self.blank)
    }

    /// Store `cell`, recording the index only when the content changes.
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) {
        let Some(i) = self.index(x, y) else {
            return;
        };
        if self.cells[i] == cell {
            return;
        }
        self.cells[i] = cell;
        if !self.dirty_all && !self.dirty_map[i] {
            self.dirty_map[i] = true;
            self.dirty.push(i);
        }
    }
}
