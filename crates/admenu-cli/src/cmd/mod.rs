pub mod list;
pub mod menu;
