//! Widget styles with shadows and rounded corners.

mod buttons;
mod containers;
mod inputs;
pub mod palette;
mod shadows;

pub use buttons::{
    danger_button_style, ghost_button_style, primary_button_style, secondary_button_style,
    segment_button_style,
};
pub use containers::{
    assistant_bubble_style, caller_bubble_style, card_style, divider_style, modal_style,
    notice_style, overlay_style, page_style, summary_style,
};
pub use inputs::{field_input_style, scrollable_style};
