//! Login wizard view.
//!
//! One card per step: phone number, passcode, then display name for new
//! users.

use callguard_core::{LoginFlow, LoginStep, ValidationError};
use iced::widget::{Space, button, column, container, row, text, text_input};
use iced::{Alignment, Element, Length};

use crate::message::{LoginMessage, Message};
use crate::model::LoginForm;
use crate::style::widgets;
use crate::style::widgets::palette;

/// Render the login screen for the flow's current step.
///
/// `field_error` is shown under the step's input.
pub fn view_login<'a>(
    flow: &'a LoginFlow,
    form: &'a LoginForm,
    field_error: Option<ValidationError>,
) -> Element<'a, Message> {
    let p = palette::current();
    let busy = flow.is_busy();

    let subtitle = match flow.step() {
        LoginStep::Phone => "Enter your phone number to receive OTP via WhatsApp",
        LoginStep::Otp => "Enter the OTP sent to your WhatsApp",
        LoginStep::Name | LoginStep::Authenticated => "Complete your profile",
    };

    let body = match flow.step() {
        LoginStep::Phone => phone_step(form, busy),
        LoginStep::Otp => code_step(flow.phone_number(), form, busy),
        LoginStep::Name | LoginStep::Authenticated => name_step(form, busy),
    };

    let error: Element<'a, Message> = field_error.map_or_else(
        || Space::new().height(0).into(),
        |error| text(error.message()).size(13).color(p.accent_red).into(),
    );

    let card = container(
        column![
            text("Welcome").size(28).color(p.text_primary),
            text(subtitle).size(14).color(p.text_secondary),
            Space::new().height(12),
            body,
            error,
        ]
        .spacing(8),
    )
    .padding(32)
    .max_width(420)
    .style(widgets::card_style);

    container(card)
        .width(Length::Fill)
        .height(Length::Fill)
        .center_x(Length::Fill)
        .center_y(Length::Fill)
        .style(widgets::page_style)
        .into()
}

fn phone_step(form: &LoginForm, busy: bool) -> Element<'_, Message> {
    let p = palette::current();

    let input = text_input("Phone number", &form.phone)
        .on_input(|value| Message::Login(LoginMessage::PhoneChanged(value)))
        .on_submit(Message::Login(LoginMessage::SubmitPhone))
        .padding(12)
        .size(16)
        .style(widgets::field_input_style);

    let auto_fill = button(text("Auto-fill").size(13))
        .on_press(Message::Login(LoginMessage::AutoFill))
        .padding([12, 14])
        .style(widgets::secondary_button_style);

    column![
        row![
            text("+91").size(16).color(p.text_secondary),
            input,
            auto_fill
        ]
        .spacing(8)
        .align_y(Alignment::Center),
        text("Tap \"Auto-fill\" to use your device's phone number")
            .size(12)
            .color(p.text_muted),
        Space::new().height(8),
        submit_button(
            if busy { "Sending..." } else { "Send OTP" },
            (!busy && form.phone_complete()).then_some(Message::Login(LoginMessage::SubmitPhone)),
        ),
    ]
    .spacing(8)
    .into()
}

fn code_step<'a>(phone_number: &'a str, form: &'a LoginForm, busy: bool) -> Element<'a, Message> {
    let p = palette::current();

    let input = text_input("Enter OTP", &form.code)
        .on_input(|value| Message::Login(LoginMessage::CodeChanged(value)))
        .on_submit(Message::Login(LoginMessage::SubmitCode))
        .padding(12)
        .size(18)
        .style(widgets::field_input_style);

    column![
        row![
            text("OTP sent to WhatsApp").size(14).color(p.text_secondary),
            text(format!("+91{phone_number}"))
                .size(14)
                .color(p.text_primary),
        ]
        .spacing(6),
        input,
        Space::new().height(8),
        submit_button(
            if busy { "Verifying..." } else { "Verify OTP" },
            (!busy && form.code_complete()).then_some(Message::Login(LoginMessage::SubmitCode)),
        ),
        row![
            button(text("Change phone number").size(13))
                .on_press(Message::Login(LoginMessage::Back))
                .padding([8, 0])
                .style(widgets::ghost_button_style),
            Space::new().width(Length::Fill),
            button(text("Resend OTP").size(13))
                .on_press_maybe((!busy).then_some(Message::Login(LoginMessage::Resend)))
                .padding([8, 0])
                .style(widgets::ghost_button_style),
        ],
    ]
    .spacing(8)
    .into()
}

fn name_step(form: &LoginForm, busy: bool) -> Element<'_, Message> {
    let p = palette::current();

    let input = text_input("Your name", &form.name)
        .on_input(|value| Message::Login(LoginMessage::NameChanged(value)))
        .on_submit(Message::Login(LoginMessage::SubmitName))
        .padding(12)
        .size(16)
        .style(widgets::field_input_style);

    column![
        text("\u{2714} Verification successful")
            .size(14)
            .color(p.accent_green),
        input,
        Space::new().height(8),
        submit_button(
            if busy { "Submitting..." } else { "Submit" },
            (!busy).then_some(Message::Login(LoginMessage::SubmitName)),
        ),
    ]
    .spacing(8)
    .into()
}

fn submit_button(label: &str, on_press: Option<Message>) -> Element<'_, Message> {
    button(
        container(text(label).size(15))
            .width(Length::Fill)
            .center_x(Length::Fill),
    )
    .on_press_maybe(on_press)
    .width(Length::Fill)
    .padding([12, 20])
    .style(widgets::primary_button_style)
    .into()
}
