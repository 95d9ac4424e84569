mod name_entry;
mod quiz;
mod quiz_select;
mod render;
mod results;

pub use render::render;
