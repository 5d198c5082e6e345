mod align;
mod grid;
mod reading;
mod schedule;
mod series;
mod time_range;

pub use self::{
    align::{align_lenient, align_strict},
    grid::{TimeGrid, estimate_reading_count},
    reading::Reading,
    schedule::Schedule,
    series::Series,
    time_range::{TimeRange, find_common_time_range},
};
