//! Repository operations on live rows

pub mod live;

pub use live::{delete_live_row, update_live_column};
