pub mod debounce;
pub mod engine;
pub mod events;
pub mod input;
pub mod interaction;
pub mod persist;
pub mod shortcuts;

pub use engine::CanvasEngine;
pub use events::{CanvasEvent, EventBus, EventKind, SubscriptionId};
pub use input::{InputEvent, Modifiers, PointerButton};
pub use interaction::{Gesture, Mode};
pub use persist::{GeometrySink, GeometryUpdate, PersistKey};
