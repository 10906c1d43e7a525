use crate::config::{Palette, ThemeConfig};
use crate::ui::color_parser::parse_color;
use ratatui::style::Color;

#[derive(Debug, Clone, PartialEq)]
pub struct ThemeTokens {
    pub fg: Color,
    pub bg: Color,
    pub muted: Color,
    pub accent: Color,
    pub border: Color,
    pub tab_active_fg: Color,
    pub tab_active_bg: Color,
    pub done: Color,
    pub danger: Color,
    pub toast: Color,
}

impl ThemeTokens {
    pub fn from_palette(palette: &Palette) -> Self {
        Self {
            fg: parse_color(&palette.fg),
            bg: parse_color(&palette.bg),
            muted: parse_color(&palette.muted),
            accent: parse_color(&palette.accent),
            border: parse_color(&palette.border),
            tab_active_fg: parse_color(&palette.tab_active_fg),
            tab_active_bg: parse_color(&palette.tab_active_bg),
            done: parse_color(&palette.done),
            danger: parse_color(&palette.danger),
            toast: parse_color(&palette.toast),
        }
    }

    pub fn resolve(theme: &ThemeConfig, is_dark: bool) -> Self {
        if is_dark {
            Self::from_palette(&theme.dark)
        } else {
            Self::from_palette(&theme.light)
        }
    }
}
