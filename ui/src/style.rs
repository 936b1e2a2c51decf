//! Shared colors and container styles for the dashboard.

use iced::widget::container::Appearance;
use iced::{theme, Border, Color, Theme};

/// Color palette for status labels and notifications.
pub struct Palette;

impl Palette {
    pub const SAFE: Color = Color {
        r: 0.13,
        g: 0.55,
        b: 0.13,
        a: 1.0,
    };
    pub const FLAGGED: Color = Color {
        r: 0.80,
        g: 0.35,
        b: 0.0,
        a: 1.0,
    };
    pub const ERROR: Color = Color {
        r: 0.80,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };
    pub const SUCCESS: Color = Color {
        r: 0.13,
        g: 0.45,
        b: 0.22,
        a: 1.0,
    };

    pub const SPACING: u16 = 16;
}

/// Container style for gallery cards.
pub fn card() -> theme::Container {
    theme::Container::Custom(Box::new(|_theme: &Theme| Appearance {
        text_color: None,
        background: Some(Color::from_rgb(0.98, 0.98, 0.98).into()),
        border: Border {
            color: Color::from_rgb(0.85, 0.85, 0.85),
            width: 1.0,
            radius: 4.0.into(),
        },
        shadow: Default::default(),
    }))
}

/// Container style for success toasts.
pub fn toast_success() -> theme::Container {
    theme::Container::Custom(Box::new(|_theme: &Theme| Appearance {
        text_color: Some(Color::WHITE),
        background: Some(Palette::SUCCESS.into()),
        border: Border {
            color: Palette::SUCCESS,
            width: 1.0,
            radius: 4.0.into(),
        },
        shadow: Default::default(),
    }))
}

/// Container style for error toasts.
pub fn toast_error() -> theme::Container {
    theme::Container::Custom(Box::new(|_theme: &Theme| Appearance {
        text_color: Some(Color::WHITE),
        background: Some(Palette::ERROR.into()),
        border: Border {
            color: Palette::ERROR,
            width: 1.0,
            radius: 4.0.into(),
        },
        shadow: Default::default(),
    }))
}
