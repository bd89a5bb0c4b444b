pub mod blocks;
pub mod frame;
pub mod hit;
pub mod legend;
pub mod links;
pub mod paint;
pub mod path;
pub mod recording;
pub mod surface;

pub use frame::{FrameInput, FrameStats, PendingConnector, render_frame};
pub use legend::Legend;
pub use links::LinkCurve;
pub use recording::RecordingSurface;
pub use surface::{Paint, Shadow, StrokeStyle, Surface, TextAlign, TextBaseline, TextRun};
