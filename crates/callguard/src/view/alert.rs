//! Modal overlays: the alert dialog and the dimmed backdrop.

use callguard_core::{Alert, AlertKind};
use iced::widget::{button, center, column, container, mouse_area, opaque, stack, text};
use iced::{Element, Length};

use crate::message::Message;
use crate::style::widgets;
use crate::style::widgets::palette;

/// Render an alert dialog with a single OK button.
pub fn view_alert(alert: &Alert) -> Element<'_, Message> {
    let p = palette::current();

    let (icon, accent) = match alert.kind {
        AlertKind::Error => ("\u{2716}", p.accent_red),
        AlertKind::Success => ("\u{2714}", p.accent_green),
        AlertKind::Info => ("\u{2139}", p.primary),
    };

    let ok = button(
        container(text("OK").size(14))
            .width(Length::Fill)
            .center_x(Length::Fill),
    )
    .on_press(Message::DismissAlert)
    .width(Length::Fill)
    .padding([10, 20])
    .style(widgets::primary_button_style);

    container(
        column![
            text(icon).size(32).color(accent),
            text(alert.title.as_str()).size(18).color(p.text_primary),
            text(alert.message.as_str())
                .size(14)
                .color(p.text_secondary),
            ok,
        ]
        .spacing(12)
        .align_x(iced::Alignment::Center),
    )
    .padding(24)
    .max_width(360)
    .style(widgets::modal_style)
    .into()
}

/// Float `dialog` over `base` on a dimmed backdrop.
///
/// Clicking the backdrop sends `on_dismiss`.
pub fn modal<'a>(
    base: impl Into<Element<'a, Message>>,
    dialog: impl Into<Element<'a, Message>>,
    on_dismiss: Message,
) -> Element<'a, Message> {
    stack![
        base.into(),
        opaque(
            mouse_area(center(opaque(dialog)).style(widgets::overlay_style))
                .on_press(on_dismiss)
        )
    ]
    .into()
}
