#![deny(clippy::all)]
#![forbid(unsafe_code)]

use embedded_graphics::pixelcolor::Rgb888;
use log::error;
use std::process::ExitCode;
use std::time::Duration;
use wall_grid::{RowSampler, RuleTable, Shape, WallConfig};
use wall_pixels_support::{HostError, animate, log_error};

/// Bricks in the top row.
const SIZE: u32 = 32;
/// Time one brick takes to change color.
const UPDATE_DELAY_MILLIS: u64 = 10;
const INITIAL_COLOR: usize = 0;
const DEFAULT_SHAPE: Shape = Shape::Hexagon;

const LIGHT_YELLOW: Rgb888 = Rgb888::new(0xff, 0xff, 0xe0);
const DARK_SLATE_BLUE: Rgb888 = Rgb888::new(0x48, 0x3d, 0x8b);
const LIGHT_CORAL: Rgb888 = Rgb888::new(0xf0, 0x80, 0x80);

/// `RULES[left][right]` is the color of a brick below bricks `left` and `right`.
const RULES: [[usize; 3]; 3] = [[0, 2, 1], [2, 1, 0], [1, 0, 2]];

fn main() -> ExitCode {
    env_logger::init();

    let shape = match std::env::args().nth(1).map(|arg| arg.parse::<Shape>()) {
        None => DEFAULT_SHAPE,
        Some(Ok(shape)) => shape,
        Some(Err(err)) => {
            error!("{err}");
            return ExitCode::FAILURE;
        }
    };

    match run(shape) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log_error("run", err);
            ExitCode::FAILURE
        }
    }
}

fn run(shape: Shape) -> Result<(), HostError> {
    let config = WallConfig {
        size: SIZE,
        palette: vec![LIGHT_YELLOW, DARK_SLATE_BLUE, LIGHT_CORAL],
        initial_color: INITIAL_COLOR,
        update_delay: Duration::from_millis(UPDATE_DELAY_MILLIS),
        shape,
    };
    let rule = RuleTable::new(RULES.iter().map(|row| row.to_vec()).collect())?;
    let mut sampler = RowSampler::new();

    animate(config, rule, move |grid, rule| {
        let top_row = sampler.sample(grid.size(), grid.num_colors());
        grid.assign_top_row(&top_row)?;
        grid.propagate(rule)
    })
}
