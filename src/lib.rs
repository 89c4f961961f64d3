//! A graphics-context backend that keeps device-independent descriptions
//! (paths, stroke styles, pen and brush specifications) apart from their
//! device-dependent realizations, and realizes the latter lazily against a
//! render target that may be lost and recreated at any frame.
//!
//! The core is generic over a [`Backend`]. Two are provided: the Direct2D
//! backend ([`d2d::Direct2D`], Windows only) and the headless
//! [`recording::Recorder`], which stores committed frames as display lists.

mod backend;
mod bitmap;
mod brush;
mod context;
#[cfg(windows)]
pub mod d2d;
pub mod error;
mod matrix;
mod outline;
mod path;
mod pen;
pub mod recording;
mod renderer;
mod resource;
mod shape;
mod stroke_style;
mod surface;
mod utility;

pub use backend::*;
pub use bitmap::*;
pub use brush::*;
pub use context::*;
#[cfg(windows)]
pub use d2d::Direct2D;
pub use error::{Error, ErrorKind};
pub use gecl;
pub use matrix::*;
pub use path::*;
pub use pen::*;
pub use recording::Recorder;
pub use renderer::*;
pub use resource::DeviceResource;
pub use shape::*;
pub use stroke_style::*;
pub use surface::*;
pub use utility::*;

pub type Result<T> = core::result::Result<T, Error>;
