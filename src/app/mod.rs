pub mod api;
pub mod board;
pub mod format;
pub mod models;
pub mod notify;
pub mod task_form;
pub mod ui;
