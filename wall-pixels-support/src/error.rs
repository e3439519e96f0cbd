use std::error::Error;
use std::fmt;
use wall_grid::WallError;
use winit::error::{EventLoopError, OsError};

/// Why `animate` gave up.
#[derive(Debug)]
pub enum HostError {
    Wall(WallError),
    EventLoop(EventLoopError),
    Window(OsError),
    Pixels(pixels::Error),
    Texture(pixels::TextureError),
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostError::Wall(err) => write!(f, "{}", err),
            HostError::EventLoop(_) => write!(f, "Event loop failed"),
            HostError::Window(_) => write!(f, "Could not open a window"),
            HostError::Pixels(_) => write!(f, "Pixels surface failed"),
            HostError::Texture(_) => write!(f, "Could not resize the pixels surface"),
        }
    }
}

impl Error for HostError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            HostError::Wall(_) => None,
            HostError::EventLoop(err) => Some(err),
            HostError::Window(err) => Some(err),
            HostError::Pixels(err) => Some(err),
            HostError::Texture(err) => Some(err),
        }
    }
}

impl From<WallError> for HostError {
    fn from(err: WallError) -> Self {
        HostError::Wall(err)
    }
}

impl From<EventLoopError> for HostError {
    fn from(err: EventLoopError) -> Self {
        HostError::EventLoop(err)
    }
}

impl From<OsError> for HostError {
    fn from(err: OsError) -> Self {
        HostError::Window(err)
    }
}

impl From<pixels::Error> for HostError {
    fn from(err: pixels::Error) -> Self {
        HostError::Pixels(err)
    }
}

impl From<pixels::TextureError> for HostError {
    fn from(err: pixels::TextureError) -> Self {
        HostError::Texture(err)
    }
}
