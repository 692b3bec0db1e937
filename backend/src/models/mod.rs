pub mod lesson;
pub mod time;
pub mod timetable;

pub use lesson::*;
pub use time::*;
pub use timetable::*;
