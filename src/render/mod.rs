pub mod renderer;
pub mod replay;

pub use renderer::{Renderer, View};
pub use replay::{FrameMark, TraceFrame, TraceReplay};
