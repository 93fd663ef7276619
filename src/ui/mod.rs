/// Rendering: side/top panels, page bodies and charts.
pub mod format;
pub mod pages;
pub mod panels;
pub mod plot;
