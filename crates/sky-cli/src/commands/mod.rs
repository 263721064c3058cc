pub mod dispatch;
pub mod map;
pub mod regions;
pub mod research;
pub mod status;
