use ratatui::style::Color;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

pub struct Palette {
    pub primary: Color,
    pub secondary: Color,
    pub background: Color,
    pub paper: Color,
    pub text: Color,
    pub muted: Color,
    pub error: Color,
}

const GREEN_500: Color = Color::Rgb(0x4c, 0xaf, 0x50);
const BLUE_GREY_500: Color = Color::Rgb(0x60, 0x7d, 0x8b);

impl Theme {
    /// Guess from the terminal's `COLORFGBG` (`"fg;bg"`), falling back to dark.
    pub fn detect() -> Self {
        std::env::var("COLORFGBG")
            .ok()
            .and_then(|value| Self::from_colorfgbg(&value))
            .unwrap_or(Theme::Dark)
    }

    fn from_colorfgbg(value: &str) -> Option<Self> {
        let bg: u8 = value.rsplit(';').next()?.trim().parse().ok()?;
        // 7 (white) and 15 (bright white) are the light backgrounds
        match bg {
            7 | 15 => Some(Theme::Light),
            _ => Some(Theme::Dark),
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Label of the toggle, naming the mode it switches to.
    pub fn toggle_label(self) -> &'static str {
        match self {
            Theme::Dark => "Mode Clair ☀️",
            Theme::Light => "Mode Sombre 🌙",
        }
    }

    pub fn palette(self) -> Palette {
        match self {
            Theme::Light => Palette {
                primary: GREEN_500,
                secondary: BLUE_GREY_500,
                background: Color::Rgb(0xfa, 0xfa, 0xfa),
                paper: Color::Rgb(0xff, 0xff, 0xff),
                text: Color::Rgb(0x21, 0x21, 0x21),
                muted: Color::Rgb(0x75, 0x75, 0x75),
                error: Color::Rgb(0xd3, 0x2f, 0x2f),
            },
            Theme::Dark => Palette {
                primary: GREEN_500,
                secondary: BLUE_GREY_500,
                background: Color::Rgb(0x12, 0x12, 0x12),
                paper: Color::Rgb(0x1e, 0x1e, 0x1e),
                text: Color::Rgb(0xff, 0xff, 0xff),
                muted: Color::Rgb(0xb0, 0xb0, 0xb0),
                error: Color::Rgb(0xf4, 0x43, 0x36),
            },
        }
    }
}
