pub mod estimate;
pub mod frame;
