use crate::{ColorRule, Loc, WallError};
use log::{debug, trace};
use std::collections::VecDeque;
use std::ops::{Index, IndexMut};
use std::time::{Duration, Instant};

/// A wall of bricks whose colors are palette indices.
///
/// Every brick has two colors: the logical one, which `assign` changes
/// immediately, and the displayed one, which only catches up as queued
/// assignments are released by `drain`. Consumers computing new colors read
/// the logical colors; renderers read the displayed ones.
#[derive(Clone, Debug)]
pub struct Grid<C>
where
    C: Copy,
{
    size: u32,
    palette: Vec<C>,
    initial_color: usize,
    logical: TriangularCells<usize>,
    displayed: TriangularCells<usize>,
    queue: VecDeque<CellUpdate>,
    last_drain: Instant,
    update_delay: Duration,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellUpdate {
    pub loc: Loc,
    pub color: usize,
}

impl<C> Grid<C>
where
    C: Copy,
{
    pub fn new(
        size: u32,
        palette: Vec<C>,
        initial_color: usize,
        update_delay: Duration,
    ) -> Result<Self, WallError> {
        if size == 0 {
            return Err(WallError::InvalidSize);
        }
        if palette.is_empty() {
            return Err(WallError::EmptyPalette);
        }
        if initial_color >= palette.len() {
            return Err(WallError::InvalidPaletteIndex {
                index: initial_color,
                num_colors: palette.len(),
            });
        }
        Ok(Self {
            size,
            palette,
            initial_color,
            logical: TriangularCells::new(size, initial_color),
            displayed: TriangularCells::new(size, initial_color),
            queue: VecDeque::new(),
            last_drain: Instant::now(),
            update_delay,
        })
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn num_cells(&self) -> usize {
        self.logical.num_cells()
    }

    pub fn palette(&self) -> &[C] {
        &self.palette
    }

    pub fn num_colors(&self) -> usize {
        self.palette.len()
    }

    pub fn color(&self, index: usize) -> Option<C> {
        self.palette.get(index).copied()
    }

    pub fn update_delay(&self) -> Duration {
        self.update_delay
    }

    pub fn last_drain(&self) -> Instant {
        self.last_drain
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn is_settled(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn is_valid(&self, loc: Loc) -> bool {
        loc.triangular_index(self.size).is_some()
    }

    pub fn locs(&self) -> impl Iterator<Item = Loc> + Clone + use<C> {
        let size = self.size;
        (0..size).flat_map(move |row| (0..size - row).map(move |col| Loc::new(row, col)))
    }

    pub fn read(&self, loc: Loc) -> Result<usize, WallError> {
        self.logical.get(loc).copied().ok_or_else(|| self.out_of_range(loc))
    }

    pub fn read_displayed(&self, loc: Loc) -> Result<usize, WallError> {
        self.displayed.get(loc).copied().ok_or_else(|| self.out_of_range(loc))
    }

    pub fn displayed_color(&self, loc: Loc) -> Result<C, WallError> {
        let index = self.read_displayed(loc)?;
        Ok(self.palette[index])
    }

    pub fn displayed_iter(&self) -> impl Iterator<Item = (Loc, C)> + '_ {
        self.locs()
            .zip(self.displayed.cells_iter())
            .map(|(loc, &index)| (loc, self.palette[index]))
    }

    /// Sets the logical color of `loc` right away and queues the same change
    /// for display.
    pub fn assign(&mut self, loc: Loc, color: usize) -> Result<(), WallError> {
        if color >= self.palette.len() {
            return Err(WallError::InvalidPaletteIndex {
                index: color,
                num_colors: self.palette.len(),
            });
        }
        let cell = self
            .logical
            .get_mut(loc)
            .ok_or(WallError::OutOfRange {
                loc,
                size: self.size,
            })?;
        *cell = color;
        self.queue.push_back(CellUpdate { loc, color });
        Ok(())
    }

    pub fn assign_top_row(&mut self, colors: &[usize]) -> Result<(), WallError> {
        for (col, &color) in colors.iter().enumerate() {
            self.assign(Loc::new(0, col as u32), color)?;
        }
        Ok(())
    }

    /// Colors every brick below the top row from the two logical colors
    /// directly above it, top to bottom.
    pub fn propagate<R>(&mut self, rule: &R) -> Result<(), WallError>
    where
        R: ColorRule + ?Sized,
    {
        rule.ensure_covers(self.num_colors())?;
        for row in 1..self.size {
            for col in 0..self.size - row {
                let left = self.read(Loc::new(row - 1, col))?;
                let right = self.read(Loc::new(row - 1, col + 1))?;
                self.assign(Loc::new(row, col), rule.compute(left, right))?;
            }
        }
        debug!("Propagated rule, {} updates pending", self.queue.len());
        Ok(())
    }

    /// Releases the queued updates that are due at `now`, oldest first, and
    /// returns how many were applied.
    ///
    /// One update is due per `update_delay` elapsed since the previous drain,
    /// rounded up. A zero delay releases everything at once. Draining an empty
    /// queue leaves the clock alone, so idle time never builds up a backlog of
    /// due updates.
    pub fn drain(&mut self, now: Instant) -> usize {
        if self.queue.is_empty() {
            return 0;
        }

        let due = self.due_count(now).min(self.queue.len());
        for update in self.queue.drain(..due) {
            self.displayed[update.loc] = update.color;
        }
        self.last_drain = now;
        trace!("Drained {} updates, {} pending", due, self.queue.len());
        due
    }

    fn due_count(&self, now: Instant) -> usize {
        if self.update_delay.is_zero() {
            return self.queue.len();
        }
        let elapsed = now.saturating_duration_since(self.last_drain).as_nanos();
        let due = elapsed.div_ceil(self.update_delay.as_nanos());
        usize::try_from(due).unwrap_or(usize::MAX)
    }

    pub fn start_clock(&mut self, now: Instant) {
        self.last_drain = now;
    }

    pub fn reset(&mut self) {
        self.queue.clear();
        self.logical.fill(self.initial_color);
        self.displayed.fill(self.initial_color);
        debug!("Reset wall of size {}", self.size);
    }

    fn out_of_range(&self, loc: Loc) -> WallError {
        WallError::OutOfRange {
            loc,
            size: self.size,
        }
    }
}

/// Triangular array: row `r` holds `size - r` cells, stored row after row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TriangularCells<T>
where
    T: Copy,
{
    cells: Vec<T>,
    size: u32,
}

impl<T> TriangularCells<T>
where
    T: Copy,
{
    pub fn new(size: u32, value: T) -> Self {
        let size_usize = size as usize;
        Self {
            cells: vec![value; size_usize * (size_usize + 1) / 2],
            size,
        }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn num_cells(&self) -> usize {
        self.cells.len()
    }

    pub fn cells_iter(&self) -> impl DoubleEndedIterator<Item = &T> + Clone {
        self.cells.iter()
    }

    pub fn get(&self, loc: Loc) -> Option<&T> {
        loc.triangular_index(self.size)
            .map(|index| &self.cells[index])
    }

    pub fn get_mut(&mut self, loc: Loc) -> Option<&mut T> {
        loc.triangular_index(self.size)
            .map(|index| &mut self.cells[index])
    }

    pub fn fill(&mut self, value: T) {
        self.cells.fill(value);
    }
}

impl<T> Index<Loc> for TriangularCells<T>
where
    T: Copy,
{
    type Output = T;

    fn index(&self, loc: Loc) -> &Self::Output {
        self.get(loc)
            .unwrap_or_else(|| panic!("Index {} out of bounds for size {}", loc, self.size))
    }
}

impl<T> IndexMut<Loc> for TriangularCells<T>
where
    T: Copy,
{
    fn index_mut(&mut self, loc: Loc) -> &mut Self::Output {
        let size = self.size;
        self.get_mut(loc)
            .unwrap_or_else(|| panic!("Index_mut {} out of bounds for size {}", loc, size))
    }
}
