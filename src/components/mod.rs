pub mod bank_panel;
pub mod grid_view;
pub mod large_view;
pub mod thumbnails;
