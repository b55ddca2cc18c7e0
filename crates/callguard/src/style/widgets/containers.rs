//! Container style functions.

use iced::widget::container;
use iced::{Background, Border, Color};

use super::palette;
use super::shadows;
use super::shadows::radius;

/// Page background.
pub fn page_style(_theme: &iced::Theme) -> container::Style {
    let p = palette::current();

    container::Style {
        background: Some(Background::Color(p.background)),
        text_color: Some(p.text_primary),
        ..Default::default()
    }
}

/// Card style - white panel with a hairline border.
pub fn card_style(_theme: &iced::Theme) -> container::Style {
    let p = palette::current();

    container::Style {
        background: Some(Background::Color(p.surface)),
        border: Border {
            color: p.border_subtle,
            width: 1.0,
            radius: radius::LARGE.into(),
        },
        shadow: shadows::subtle(),
        ..Default::default()
    }
}

/// Dialog panel floating over the overlay.
pub fn modal_style(_theme: &iced::Theme) -> container::Style {
    let p = palette::current();

    container::Style {
        background: Some(Background::Color(p.surface)),
        border: Border {
            color: p.border_subtle,
            width: 1.0,
            radius: radius::XLARGE.into(),
        },
        shadow: shadows::large(),
        ..Default::default()
    }
}

/// Dimmed backdrop behind dialogs.
pub fn overlay_style(_theme: &iced::Theme) -> container::Style {
    container::Style {
        background: Some(Background::Color(palette::current().overlay)),
        ..Default::default()
    }
}

/// Call summary panel.
pub fn summary_style(_theme: &iced::Theme) -> container::Style {
    let p = palette::current();

    container::Style {
        background: Some(Background::Color(p.tint_amber)),
        text_color: Some(p.accent_amber),
        border: Border {
            color: Color::TRANSPARENT,
            width: 0.0,
            radius: radius::MEDIUM.into(),
        },
        ..Default::default()
    }
}

/// Caller side of a transcript exchange.
pub fn caller_bubble_style(_theme: &iced::Theme) -> container::Style {
    let p = palette::current();

    container::Style {
        background: Some(Background::Color(p.tint_indigo)),
        border: Border {
            color: Color::TRANSPARENT,
            width: 0.0,
            radius: radius::MEDIUM.into(),
        },
        ..Default::default()
    }
}

/// Assistant side of a transcript exchange.
pub fn assistant_bubble_style(_theme: &iced::Theme) -> container::Style {
    let p = palette::current();

    container::Style {
        background: Some(Background::Color(p.tint_green)),
        border: Border {
            color: Color::TRANSPARENT,
            width: 0.0,
            radius: radius::MEDIUM.into(),
        },
        ..Default::default()
    }
}

/// Informational note under a settings section.
///
/// `positive` picks the green tint, otherwise red.
pub fn notice_style(positive: bool) -> impl Fn(&iced::Theme) -> container::Style {
    move |_theme| {
        let p = palette::current();
        let (background, accent) = if positive {
            (p.tint_green, p.accent_green)
        } else {
            (p.tint_red, p.accent_red)
        };

        container::Style {
            background: Some(Background::Color(background)),
            border: Border {
                color: accent,
                width: 1.0,
                radius: radius::SMALL.into(),
            },
            ..Default::default()
        }
    }
}

/// One-pixel divider between list rows.
pub fn divider_style(_theme: &iced::Theme) -> container::Style {
    container::Style {
        background: Some(Background::Color(palette::current().border_subtle)),
        ..Default::default()
    }
}
