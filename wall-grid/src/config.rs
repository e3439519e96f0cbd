use crate::{Grid, Shape, WallError};
use std::time::Duration;

/// Everything needed to set up one wall.
#[derive(Clone, Debug)]
pub struct WallConfig<C> {
    pub size: u32,
    pub palette: Vec<C>,
    pub initial_color: usize,
    /// Time one queued color change takes to show.
    pub update_delay: Duration,
    pub shape: Shape,
}

impl<C> WallConfig<C>
where
    C: Copy,
{
    pub fn build_grid(&self) -> Result<Grid<C>, WallError> {
        Grid::new(
            self.size,
            self.palette.clone(),
            self.initial_color,
            self.update_delay,
        )
    }
}
