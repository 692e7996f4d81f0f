pub mod form_panel;
pub mod status_bar;
