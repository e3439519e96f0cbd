#![deny(clippy::all)]
#![forbid(unsafe_code)]

mod error;
mod frame_buffer;

pub use error::HostError;
pub use frame_buffer::FrameBuffer;

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::Size;
use error_iter::ErrorIter as _;
use log::{debug, error, info};
use pixels::wgpu::Color;
use pixels::{Pixels, PixelsBuilder, SurfaceTexture};
use std::sync::Arc;
use std::time::Instant;
use wall_grid::{ColorRule, FrameRequest, Grid, Legend, Renderer, WallConfig, WallError};
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::{ElementState, KeyEvent, StartCause, WindowEvent};
use winit::error::EventLoopError;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

const BACKGROUND_COLOR: Color = Color::WHITE;
const INITIAL_WINDOW_SIZE: LogicalSize<u32> = LogicalSize::new(1024, 768);

/// Opens a window showing the configured wall. Each run request (space or
/// enter) resets the wall and calls `populate` to assign new colors, which are
/// then revealed one update delay at a time. Returns the first failure that
/// ended the event loop.
pub fn animate<R, F>(config: WallConfig<Rgb888>, rule: R, populate: F) -> Result<(), HostError>
where
    R: ColorRule,
    F: FnMut(&mut Grid<Rgb888>, &R) -> Result<(), WallError>,
{
    let grid = config.build_grid()?;
    let legend = Legend::new(&grid, &rule)?;
    let wall = Wall {
        renderer: Renderer::new(config.shape, Size::zero(), grid.size()),
        grid,
        legend,
        rule,
        populate,
    };

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut handler = AppEventHandler::new(wall);
    let result = event_loop.run_app(&mut handler);
    handler.finish(result)
}

pub fn log_error<E: std::error::Error + 'static>(method_name: &str, err: E) {
    error!("{method_name}() failed: {err}");
    for source in err.sources().skip(1) {
        error!("  Caused by: {source}");
    }
}

/// The host-independent half of the app: model, renderer, and run wiring.
struct Wall<R, F> {
    grid: Grid<Rgb888>,
    renderer: Renderer,
    legend: Legend<Rgb888>,
    rule: R,
    populate: F,
}

impl<R, F> Wall<R, F>
where
    R: ColorRule,
    F: FnMut(&mut Grid<Rgb888>, &R) -> Result<(), WallError>,
{
    fn on_run_requested(&mut self, now: Instant) -> Result<FrameRequest, WallError> {
        self.grid.reset();
        (self.populate)(&mut self.grid, &self.rule)?;
        self.grid.start_clock(now);
        debug!("Run started with {} updates pending", self.grid.pending());
        Ok(FrameRequest::Immediate)
    }

    fn on_viewport_resize(&mut self, size: PhysicalSize<u32>) -> FrameRequest {
        self.renderer.on_viewport_resize(size.width, size.height)
    }

    fn on_next_shape(&mut self) -> FrameRequest {
        let shape = self.renderer.shape().successor();
        info!("Switching to {} bricks", shape);
        self.renderer.set_shape(shape)
    }

    fn paint(&mut self, buffer: &mut FrameBuffer, now: Instant) -> FrameRequest {
        let Ok(request) = self.renderer.frame(&mut self.grid, buffer, now);
        let Ok(()) = self.legend.draw(buffer);
        request
    }
}

struct Surface {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    size: PhysicalSize<u32>,
}

impl Surface {
    fn new(event_loop: &ActiveEventLoop) -> Result<Self, HostError> {
        let window_attributes = Window::default_attributes()
            .with_title("Brick wall")
            .with_inner_size(INITIAL_WINDOW_SIZE)
            .with_visible(false);
        let window = Arc::new(event_loop.create_window(window_attributes)?);

        let size = window.inner_size();
        let surface_texture = SurfaceTexture::new(size.width, size.height, window.clone());
        let pixels = PixelsBuilder::new(size.width, size.height, surface_texture)
            .clear_color(BACKGROUND_COLOR)
            .build()?;
        Ok(Self {
            window,
            pixels,
            size,
        })
    }

    fn resize(&mut self, size: PhysicalSize<u32>) -> Result<(), pixels::TextureError> {
        self.pixels.resize_surface(size.width, size.height)?;
        self.pixels.resize_buffer(size.width, size.height)?;
        self.size = size;
        Ok(())
    }
}

struct AppEventHandler<R, F> {
    wall: Wall<R, F>,
    surface: Option<Surface>,
    next_frame: Option<Instant>,
    failure: Option<HostError>,
}

impl<R, F> AppEventHandler<R, F>
where
    R: ColorRule,
    F: FnMut(&mut Grid<Rgb888>, &R) -> Result<(), WallError>,
{
    fn new(wall: Wall<R, F>) -> Self {
        Self {
            wall,
            surface: None,
            next_frame: None,
            failure: None,
        }
    }

    /// Keeps the first failure for `finish`; later ones are only logged.
    fn record(&mut self, err: impl Into<HostError>) {
        let err = err.into();
        match self.failure {
            None => self.failure = Some(err),
            Some(_) => error!("Further failure: {err}"),
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: impl Into<HostError>) {
        self.record(err);
        event_loop.exit();
    }

    fn finish(self, result: Result<(), EventLoopError>) -> Result<(), HostError> {
        match (self.failure, result) {
            (Some(failure), Err(err)) => {
                error!("Event loop also failed: {err}");
                Err(failure)
            }
            (Some(failure), Ok(())) => Err(failure),
            (None, result) => Ok(result?),
        }
    }

    fn on_create(&mut self, event_loop: &ActiveEventLoop) {
        let surface = match Surface::new(event_loop) {
            Ok(surface) => surface,
            Err(err) => return self.fail(event_loop, err),
        };
        let request = self.wall.on_viewport_resize(surface.size);
        surface.window.set_visible(true);
        self.surface = Some(surface);
        self.schedule(request);
        info!("Press space to build the wall, tab to change bricks");
    }

    fn schedule(&mut self, request: FrameRequest) {
        match request {
            FrameRequest::Idle => self.next_frame = None,
            FrameRequest::Immediate => {
                if let Some(surface) = &self.surface {
                    surface.window.request_redraw();
                }
            }
            FrameRequest::After(delay) => self.next_frame = Some(Instant::now() + delay),
        }
    }

    fn on_resize(&mut self, event_loop: &ActiveEventLoop, size: PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return;
        }
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        if let Err(err) = surface.resize(size) {
            return self.fail(event_loop, err);
        }
        let request = self.wall.on_viewport_resize(size);
        self.schedule(request);
    }

    fn on_run(&mut self, event_loop: &ActiveEventLoop) {
        match self.wall.on_run_requested(Instant::now()) {
            Ok(request) => self.schedule(request),
            Err(err) => self.fail(event_loop, err),
        }
    }

    fn on_redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        let size = surface.size;
        let mut buffer = FrameBuffer::new(surface.pixels.frame_mut(), size.width, size.height);
        let request = self.wall.paint(&mut buffer, Instant::now());
        if let Err(err) = surface.pixels.render() {
            return self.fail(event_loop, err);
        }
        self.schedule(request);
    }
}

impl<R, F> ApplicationHandler for AppEventHandler<R, F>
where
    R: ColorRule,
    F: FnMut(&mut Grid<Rgb888>, &R) -> Result<(), WallError>,
{
    fn new_events(&mut self, _event_loop: &ActiveEventLoop, cause: StartCause) {
        if let StartCause::ResumeTimeReached { .. } = cause
            && self.next_frame.is_some_and(|next_frame| next_frame <= Instant::now())
        {
            self.next_frame = None;
            self.schedule(FrameRequest::Immediate);
        }
    }

    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.surface.is_none() {
            self.on_create(event_loop);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: ElementState::Released,
                        repeat: false,
                        ..
                    },
                ..
            } => match code {
                KeyCode::Escape | KeyCode::KeyQ | KeyCode::KeyX => {
                    event_loop.exit();
                }
                KeyCode::Space | KeyCode::Enter => self.on_run(event_loop),
                KeyCode::Tab => {
                    let request = self.wall.on_next_shape();
                    self.schedule(request);
                }
                _ => (),
            },
            WindowEvent::Resized(size) => self.on_resize(event_loop, size),
            WindowEvent::RedrawRequested => self.on_redraw(event_loop),
            _ => (),
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        match self.next_frame {
            Some(next_frame) => event_loop.set_control_flow(ControlFlow::WaitUntil(next_frame)),
            None => event_loop.set_control_flow(ControlFlow::Wait),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wall_grid::{Loc, RuleTable, Shape};

    const YELLOW: Rgb888 = Rgb888::new(0xff, 0xff, 0xe0);
    const BLUE: Rgb888 = Rgb888::new(0x48, 0x3d, 0x8b);
    const CORAL: Rgb888 = Rgb888::new(0xf0, 0x80, 0x80);

    type Populate = fn(&mut Grid<Rgb888>, &RuleTable) -> Result<(), WallError>;

    fn wall(populate: Populate) -> Wall<RuleTable, Populate> {
        let config = WallConfig {
            size: 3,
            palette: vec![YELLOW, BLUE, CORAL],
            initial_color: 0,
            update_delay: Duration::from_millis(10),
            shape: Shape::Square,
        };
        let grid = config.build_grid().unwrap();
        let rule = RuleTable::new(vec![vec![0, 2, 1], vec![2, 1, 0], vec![1, 0, 2]]).unwrap();
        Wall {
            renderer: Renderer::new(config.shape, Size::new(300, 300), grid.size()),
            legend: Legend::new(&grid, &rule).unwrap(),
            grid,
            rule,
            populate,
        }
    }

    fn populate_example(grid: &mut Grid<Rgb888>, rule: &RuleTable) -> Result<(), WallError> {
        grid.assign_top_row(&[0, 1, 2])?;
        grid.propagate(rule)
    }

    #[test]
    fn run_request_resets_then_populates() {
        let mut wall = wall(populate_example);
        wall.grid.assign(Loc::new(2, 0), 2).unwrap();

        let start = Instant::now();
        assert_eq!(wall.on_run_requested(start), Ok(FrameRequest::Immediate));
        assert_eq!(wall.grid.pending(), 6);
        assert_eq!(wall.grid.read(Loc::new(2, 0)), Ok(1));
        assert_eq!(wall.grid.read_displayed(Loc::new(2, 0)), Ok(0));
        assert_eq!(wall.grid.last_drain(), start);
    }

    #[test]
    fn run_request_reports_populate_failures() {
        let mut wall = wall(|grid, _rule| grid.assign(Loc::new(3, 0), 0));
        assert!(matches!(
            wall.on_run_requested(Instant::now()),
            Err(WallError::OutOfRange { .. })
        ));
    }

    #[test]
    fn paint_paces_run_until_settled() {
        let mut wall = wall(populate_example);
        let start = Instant::now();
        wall.on_run_requested(start).unwrap();

        let mut frame = vec![0u8; 4 * 300 * 300];
        let mut now = start;
        let mut frames = 0;
        loop {
            let mut buffer = FrameBuffer::new(&mut frame, 300, 300);
            match wall.paint(&mut buffer, now) {
                FrameRequest::After(delay) => now += delay,
                request => {
                    assert_eq!(request, FrameRequest::Idle);
                    break;
                }
            }
            frames += 1;
        }

        assert!(frames >= 5);
        for loc in wall.grid.locs() {
            assert_eq!(wall.grid.read_displayed(loc), wall.grid.read(loc));
        }
    }

    #[test]
    fn first_failure_ends_animate_with_an_error() {
        let mut handler = AppEventHandler::new(wall(populate_example));
        handler.record(WallError::InvalidSize);
        handler.record(EventLoopError::RecreationAttempt);
        assert!(matches!(
            handler.finish(Err(EventLoopError::RecreationAttempt)),
            Err(HostError::Wall(WallError::InvalidSize))
        ));
    }

    #[test]
    fn event_loop_errors_end_animate_with_an_error() {
        let handler = AppEventHandler::new(wall(populate_example));
        assert!(matches!(
            handler.finish(Err(EventLoopError::RecreationAttempt)),
            Err(HostError::EventLoop(_))
        ));
        let handler = AppEventHandler::new(wall(populate_example));
        assert!(handler.finish(Ok(())).is_ok());
    }

    #[test]
    fn resize_and_shape_change_request_immediate_repaint() {
        let mut wall = wall(populate_example);
        assert_eq!(
            wall.on_viewport_resize(PhysicalSize::new(640, 480)),
            FrameRequest::Immediate
        );
        assert_eq!(wall.on_next_shape(), FrameRequest::Immediate);
        assert_eq!(wall.renderer.shape(), Shape::Hexagon);
    }
}
