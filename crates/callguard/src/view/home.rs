//! Home screen: greeting, last screened call and conversation history.

use callguard_core::{AppState, ConversationRecord, Exchange, ScreenedCall};
use chrono::Local;
use iced::widget::{Column, Space, button, column, container, row, scrollable, text};
use iced::{Alignment, Color, Element, Length};

use crate::message::Message;
use crate::style::widgets;
use crate::style::widgets::palette;

/// Render the home screen.
pub fn view_home(state: &AppState) -> Element<'_, Message> {
    let user_name = state.session().map_or("", |s| s.user_name.as_str());

    let mut content = column![view_greeting(user_name)].spacing(20);
    if let Some(call) = state.last_call() {
        content = content.push(view_last_call(call));
    }
    content = content.push(view_history(state));

    container(
        scrollable(
            container(content.padding(24).max_width(720)).center_x(Length::Fill),
        )
        .style(widgets::scrollable_style),
    )
    .width(Length::Fill)
    .height(Length::Fill)
    .style(widgets::page_style)
    .into()
}

fn view_greeting(user_name: &str) -> Element<'_, Message> {
    let p = palette::current();

    let settings = button(text("\u{2699} Settings").size(14))
        .on_press(Message::OpenSettings)
        .padding([10, 16])
        .style(widgets::primary_button_style);

    row![
        column![
            text(format!("Hi, {user_name}")).size(28).color(p.text_primary),
            setup_step("1.", "Call Screening"),
            setup_step("2.", "Call Forwarding"),
        ]
        .spacing(6)
        .width(Length::Fill),
        settings,
    ]
    .align_y(Alignment::Start)
    .into()
}

fn setup_step(number: &'static str, feature: &'static str) -> Element<'static, Message> {
    let p = palette::current();

    row![
        text(number).size(14).color(p.primary),
        text("Enable").size(14).color(p.text_secondary),
        text(feature).size(14).color(p.text_primary),
        text("from settings").size(14).color(p.text_secondary),
    ]
    .spacing(4)
    .into()
}

fn view_last_call(call: &ScreenedCall) -> Element<'_, Message> {
    let p = palette::current();

    let mut details = column![
        detail(format!("\u{1F4F2} {}", call.phone_number)),
        detail(format!("\u{1F464} {}", call.contact_label())),
    ]
    .spacing(6);
    if let Some(sim) = call.sim_number.as_deref().filter(|s| !s.is_empty()) {
        details = details.push(detail(format!("\u{1F4DE} SIM Number: {sim}")));
    }
    details = details
        .push(detail(format!("\u{2139} {}", call.action_label())))
        .push(detail(format!("\u{1F6E1} {}", call.verification_status)));

    container(
        column![
            text("Last Screened Call").size(18).color(p.text_primary),
            details,
        ]
        .spacing(12),
    )
    .padding(20)
    .width(Length::Fill)
    .style(widgets::card_style)
    .into()
}

fn view_history(state: &AppState) -> Element<'_, Message> {
    let p = palette::current();
    let refreshing = state.is_refreshing();

    let refresh = button(
        text(if refreshing {
            "Refreshing..."
        } else {
            "\u{21BB} Refresh"
        })
        .size(13),
    )
    .on_press_maybe((!refreshing).then_some(Message::Refresh))
    .padding([8, 14])
    .style(widgets::primary_button_style);

    let header = row![
        text("Conversation History")
            .size(18)
            .color(p.text_primary)
            .width(Length::Fill),
        refresh,
    ]
    .align_y(Alignment::Center);

    let records = state.conversations().records();
    let body: Element<'_, Message> = if records.is_empty() {
        container(text("No conversations").size(14).color(p.text_muted))
            .padding(24)
            .center_x(Length::Fill)
            .into()
    } else {
        let mut list = Column::new().spacing(16);
        for (idx, record) in records.iter().enumerate() {
            if idx > 0 {
                list = list.push(
                    container(Space::new().height(1))
                        .width(Length::Fill)
                        .style(widgets::divider_style),
                );
            }
            list = list.push(view_record(record, state.is_expanded(&record.key)));
        }
        list.into()
    };

    container(column![header, body].spacing(16))
        .padding(20)
        .width(Length::Fill)
        .style(widgets::card_style)
        .into()
}

fn view_record(record: &ConversationRecord, expanded: bool) -> Element<'_, Message> {
    let p = palette::current();
    let caller = record.caller_number();

    let redial = button(text("\u{1F4DE} Redial").size(13))
        .on_press(Message::Redial(caller.to_string()))
        .padding([6, 12])
        .style(widgets::primary_button_style);

    let mut content = column![
        row![
            column![
                text(format!("Call from {caller}"))
                    .size(15)
                    .color(p.text_primary),
                text(format!("at {}", timestamp_label(record)))
                    .size(12)
                    .color(p.text_secondary),
            ]
            .spacing(2)
            .width(Length::Fill),
            redial,
        ]
        .align_y(Alignment::Center),
    ]
    .spacing(10);

    let summary = record
        .summary
        .summary
        .as_deref()
        .filter(|s| !s.trim().is_empty());
    if summary.is_some() || record.has_transcript() {
        let mut panel = Column::new().spacing(8);
        if let Some(summary) = summary {
            panel = panel
                .push(text("\u{1F4F0} Summary").size(13).color(p.accent_amber))
                .push(text(summary).size(14));
        }
        if record.has_transcript() {
            panel = panel.push(
                button(
                    text(if expanded {
                        "Hide Conversation"
                    } else {
                        "View Conversation"
                    })
                    .size(13),
                )
                .on_press(Message::ToggleConversation(record.key.clone()))
                .padding([6, 12])
                .style(widgets::secondary_button_style),
            );
        }
        content = content.push(
            container(panel)
                .padding(12)
                .width(Length::Fill)
                .style(widgets::summary_style),
        );
    }

    if expanded {
        content = content.push(view_call_details(record));
        for exchange in &record.conversation {
            content = content.push(view_exchange(exchange));
        }
    }

    content.into()
}

fn view_call_details(record: &ConversationRecord) -> Element<'_, Message> {
    let p = palette::current();
    let from = record
        .summary
        .from_number
        .as_deref()
        .filter(|n| !n.is_empty())
        .unwrap_or("Unknown");
    let when = record.summary.timestamp.map_or_else(
        || "N/A".to_string(),
        |ts| {
            ts.with_timezone(&Local)
                .format("%d/%m/%Y, %H:%M:%S")
                .to_string()
        },
    );

    row![
        text(format!("\u{1F4F1} {from}")).size(12).color(p.accent_amber),
        text(format!("\u{1F552} {when}")).size(12).color(p.accent_amber),
        text(format!("\u{1F4AC} {} messages", record.message_count()))
            .size(12)
            .color(p.accent_amber),
    ]
    .spacing(16)
    .into()
}

fn view_exchange(exchange: &Exchange) -> Element<'_, Message> {
    let p = palette::current();

    column![
        container(bubble("\u{1F464} User", &exchange.user, p.primary))
            .padding(10)
            .width(Length::Fill)
            .style(widgets::caller_bubble_style),
        container(bubble("\u{1F916} Assistant", &exchange.bot, p.accent_green))
            .padding(10)
            .width(Length::Fill)
            .style(widgets::assistant_bubble_style),
    ]
    .spacing(6)
    .into()
}

fn bubble<'a>(label: &'static str, body: &'a str, color: Color) -> Element<'a, Message> {
    column![
        text(label).size(11).color(color),
        text(body).size(14).color(palette::current().text_primary),
    ]
    .spacing(4)
    .into()
}

fn detail(value: String) -> Element<'static, Message> {
    text(value)
        .size(14)
        .color(palette::current().text_secondary)
        .into()
}

fn timestamp_label(record: &ConversationRecord) -> String {
    record.summary.timestamp.map_or_else(
        || "unknown time".to_string(),
        |ts| {
            ts.with_timezone(&Local)
                .format("%a %b %d %Y %-I:%M:%S %p")
                .to_string()
        },
    )
}
