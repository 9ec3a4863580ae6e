pub mod catalog;
pub mod estimate;
