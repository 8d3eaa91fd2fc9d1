pub mod error;
pub mod summary;
pub mod work_order;
pub mod work_week;
