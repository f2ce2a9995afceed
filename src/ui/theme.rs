//! Colour themes.
//!
//! Dark and light palettes, picked from the terminal background unless the
//! configuration forces one.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

use crate::data::{Polarity, Tier};
use crate::settings::ThemeChoice;

#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent for titles and the active tab.
    pub accent: Color,
    pub stable: Color,
    pub elevated: Color,
    pub critical: Color,
    /// Muted text: timestamps, secondary labels.
    pub muted: Color,
    pub border: Color,
    pub history_line: Color,
    pub forecast_line: Color,
    pub header: Style,
    pub selected: Style,
    pub tab_active: Style,
    pub tab_inactive: Style,
    pub border_type: BorderType,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            accent: Color::Cyan,
            stable: Color::Green,
            elevated: Color::Yellow,
            critical: Color::Red,
            muted: Color::Gray,
            border: Color::Gray,
            history_line: Color::Cyan,
            forecast_line: Color::Magenta,
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::Gray),
            border_type: BorderType::Rounded,
        }
    }

    pub fn light() -> Self {
        Self {
            accent: Color::Blue,
            stable: Color::Green,
            elevated: Color::Yellow,
            critical: Color::Red,
            muted: Color::DarkGray,
            border: Color::DarkGray,
            history_line: Color::Blue,
            forecast_line: Color::Magenta,
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::LightBlue).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::DarkGray),
            border_type: BorderType::Rounded,
        }
    }

    /// Pick a palette from the terminal background luminance.
    pub fn auto_detect() -> Self {
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    pub fn from_choice(choice: ThemeChoice) -> Self {
        match choice {
            ThemeChoice::Auto => Self::auto_detect(),
            ThemeChoice::Dark => Self::dark(),
            ThemeChoice::Light => Self::light(),
        }
    }

    pub fn tier_color(&self, tier: Tier) -> Color {
        match tier {
            Tier::Stable => self.stable,
            Tier::Elevated => self.elevated,
            Tier::Critical => self.critical,
        }
    }

    pub fn tier_style(&self, tier: Tier) -> Style {
        let style = Style::default().fg(self.tier_color(tier));
        match tier {
            Tier::Critical => style.add_modifier(Modifier::BOLD),
            _ => style,
        }
    }

    /// Reverse-video pill used for the status and event badges.
    pub fn pill_style(&self, tier: Tier) -> Style {
        Style::default()
            .fg(Color::Black)
            .bg(self.tier_color(tier))
            .add_modifier(Modifier::BOLD)
    }

    /// Positive weights raise the index and are shown in the alarm colour.
    pub fn polarity_style(&self, polarity: Polarity) -> Style {
        match polarity {
            Polarity::Positive => Style::default().fg(self.critical),
            Polarity::Negative => Style::default().fg(self.stable),
        }
    }

    pub fn muted_style(&self) -> Style {
        Style::default().fg(self.muted)
    }
}
