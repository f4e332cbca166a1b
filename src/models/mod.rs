pub mod seat;
pub mod snapshot;
pub mod report;

pub use seat::{PriceCode, SeatRecord, OPEN_STATUS};
pub use snapshot::{Cell, PageSnapshot, PriceInfo};
pub use report::{AdjacentGroup, Buckets, PriceRange, Report, Summary};
