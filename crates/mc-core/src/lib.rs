pub mod color;
pub mod config;
pub mod error;
pub mod geometry;
pub mod id;
pub mod model;
pub mod scene;
pub mod theme;
pub mod view;

pub use color::Rgba;
pub use config::{EngineConfig, Lod};
pub use error::{CanvasError, Result};
pub use geometry::{BorderEdge, Point, Rect, Shape};
pub use id::{BlockId, LinkId};
pub use model::*;
pub use scene::Scene;
pub use theme::{Palette, Theme};
pub use view::{Camera, Viewport};
