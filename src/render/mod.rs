// Render module
// Removes the center of each detected event and crossfades the seam

pub mod splice;

pub use splice::{plan_splices, render_splices, spliced_len, SpliceSettings};
