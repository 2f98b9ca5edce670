pub mod dialog;
pub mod log_viewer;
pub mod status_bar;
