pub mod details_view;
pub mod logs_view;
pub mod popup_view;
pub mod relations_view;
pub mod resource_table;
