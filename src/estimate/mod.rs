mod aggregate;
mod scale;

pub use aggregate::{constituency_estimates, with_cell_weights};
pub use scale::{scale_table, with_scaled};
