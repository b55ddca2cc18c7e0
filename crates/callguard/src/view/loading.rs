//! Startup loading screen.

use iced::widget::{column, container, text};
use iced::{Alignment, Element, Length};

use crate::message::Message;
use crate::style::widgets;
use crate::style::widgets::palette;

/// Render the loading screen shown while the session is restored.
pub fn view_loading() -> Element<'static, Message> {
    let p = palette::current();

    container(
        column![
            text("\u{23F3}").size(48), // hourglass spinner
            text("Loading...").size(16).color(p.text_secondary),
        ]
        .spacing(16)
        .align_x(Alignment::Center),
    )
    .width(Length::Fill)
    .height(Length::Fill)
    .center_x(Length::Fill)
    .center_y(Length::Fill)
    .style(widgets::page_style)
    .into()
}
