pub mod box_drawer;
pub mod html_report;
pub mod text_card;
mod theme;
