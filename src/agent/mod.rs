pub mod event;
pub mod stream;

pub use event::{Event, Visualize};
pub use stream::StreamChunk;
