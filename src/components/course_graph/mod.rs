mod component;
mod render;
mod state;

pub use component::CourseGraphCanvas;
pub use state::CourseGraphState;
