//! Settings panel.
//!
//! Screening on/off, the screening role, call forwarding and logout.

use iced::widget::{Space, button, column, container, row, scrollable, text};
use iced::{Alignment, Element, Length};

use crate::message::{Message, SettingsMessage};
use crate::style::widgets;
use crate::style::widgets::palette;

/// Render the settings panel for the current screening flag.
pub fn view_settings(screening_enabled: bool) -> Element<'static, Message> {
    let p = palette::current();

    let header = row![
        text("Settings")
            .size(22)
            .color(p.text_primary)
            .width(Length::Fill),
        button(text("\u{2715}").size(16))
            .on_press(Message::CloseSettings)
            .padding([4, 10])
            .style(widgets::ghost_button_style),
    ]
    .align_y(Alignment::Center);

    let content = column![
        header,
        screening_section(screening_enabled),
        role_section(),
        forwarding_section(),
        account_section(),
    ]
    .spacing(20)
    .padding(24);

    container(scrollable(content).style(widgets::scrollable_style))
        .max_width(460)
        .style(widgets::modal_style)
        .into()
}

fn screening_section(enabled: bool) -> Element<'static, Message> {
    let p = palette::current();

    let switch = row![
        segment(
            "Enabled",
            p.accent_green,
            enabled,
            SettingsMessage::ToggleScreening(true)
        ),
        segment(
            "Disabled",
            p.accent_red,
            !enabled,
            SettingsMessage::ToggleScreening(false)
        ),
    ]
    .spacing(8);

    let note = if enabled {
        "\u{2139} Unknown numbers will receive busy signal"
    } else {
        "\u{26A0} All calls will ring normally"
    };

    section(
        "Call Screening Status",
        column![switch, notice(note, enabled)].spacing(10),
    )
}

fn role_section() -> Element<'static, Message> {
    let buttons = row![
        action("Enable", SettingsMessage::RequestRole),
        action("Check Status", SettingsMessage::CheckStatus),
    ]
    .spacing(8);

    section(
        "Call Screening Permission",
        column![
            buttons,
            notice("\u{2139} Choose \"CallGuard\" when the role dialog appears", true),
        ]
        .spacing(10),
    )
}

fn forwarding_section() -> Element<'static, Message> {
    let buttons = row![
        action("Enable", SettingsMessage::EnableForwarding),
        action("Disable", SettingsMessage::DisableForwarding),
    ]
    .spacing(8);

    section(
        "Call Forwarding",
        column![
            buttons,
            notice(
                "\u{26A0} Wait for activation code to complete before closing dialer",
                false
            ),
        ]
        .spacing(10),
    )
}

fn account_section() -> Element<'static, Message> {
    let logout = button(
        container(text("Logout").size(14))
            .width(Length::Fill)
            .center_x(Length::Fill),
    )
    .on_press(Message::Settings(SettingsMessage::Logout))
    .width(Length::Fill)
    .padding([10, 20])
    .style(widgets::danger_button_style);

    section("Account", logout)
}

/// Create a section with title and content.
fn section(
    title: &'static str,
    content: impl Into<Element<'static, Message>>,
) -> Element<'static, Message> {
    let p = palette::current();

    column![
        text(title).size(15).color(p.text_primary),
        Space::new().height(4),
        content.into(),
    ]
    .spacing(4)
    .into()
}

fn segment(
    label: &'static str,
    accent: iced::Color,
    selected: bool,
    message: SettingsMessage,
) -> Element<'static, Message> {
    button(
        container(text(label).size(14))
            .width(Length::Fill)
            .center_x(Length::Fill),
    )
    .on_press(Message::Settings(message))
    .width(Length::Fill)
    .padding([10, 16])
    .style(widgets::segment_button_style(accent, selected))
    .into()
}

fn action(label: &'static str, message: SettingsMessage) -> Element<'static, Message> {
    button(
        container(text(label).size(14))
            .width(Length::Fill)
            .center_x(Length::Fill),
    )
    .on_press(Message::Settings(message))
    .width(Length::Fill)
    .padding([10, 16])
    .style(widgets::secondary_button_style)
    .into()
}

fn notice(message: &'static str, positive: bool) -> Element<'static, Message> {
    let p = palette::current();

    container(text(message).size(12).color(p.text_secondary))
        .padding([8, 12])
        .width(Length::Fill)
        .style(widgets::notice_style(positive))
        .into()
}
