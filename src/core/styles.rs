//! Terminal styles for help output and finding lines
//!
//! Painting is explicit: callers pass whether colour is wanted, so output
//! written to files or pipes stays free of escape codes.
//!
//! ```
//! use vulnguard::core::styles::StyleRole;
//! assert_eq!(StyleRole::RiskHigh.paint("High", false), "High");
//! assert!(StyleRole::RiskHigh.paint("High", true).starts_with("\x1b["));
//! ```

use crate::client::types::RiskLevel;
use clap::builder::styling::{AnsiColor, Color as ClapColor, Style, Styles};
use colored::Color;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StyleRole {
    /// Section headings in `--help`
    Heading,
    /// Flags and literal values in `--help`
    Flag,
    /// Value placeholders in `--help`
    Placeholder,
    Error,
    RiskHigh,
    RiskMedium,
    RiskLow,
    RiskInfo,
}

impl StyleRole {
    pub fn for_risk(risk: RiskLevel) -> Self {
        match risk {
            RiskLevel::High => Self::RiskHigh,
            RiskLevel::Medium => Self::RiskMedium,
            RiskLevel::Low => Self::RiskLow,
            RiskLevel::Informational => Self::RiskInfo,
        }
    }

    pub fn color(self) -> Option<Color> {
        match self {
            Self::Heading => Some(Color::Yellow),
            Self::Flag => Some(Color::Cyan),
            Self::Placeholder => Some(Color::Green),
            Self::Error | Self::RiskHigh => Some(Color::BrightRed),
            Self::RiskMedium => Some(Color::Yellow),
            Self::RiskLow => Some(Color::Blue),
            Self::RiskInfo => None,
        }
    }

    /// SGR parameter for the foreground colour, e.g. `33`
    pub fn ansi_code(self) -> Option<String> {
        self.color().map(|c| c.to_fg_str().into_owned())
    }

    pub fn paint(self, text: &str, enabled: bool) -> String {
        match self.ansi_code() {
            Some(code) if enabled => format!("\x1b[{}m{}\x1b[0m", code, text),
            _ => text.to_string(),
        }
    }

    fn clap_style(self) -> Style {
        let style = Style::new();
        match self.color().and_then(basic_ansi) {
            Some(color) => style.fg_color(Some(ClapColor::Ansi(color))),
            None => style,
        }
    }
}

// clap only takes the sixteen basic colours
fn basic_ansi(c: Color) -> Option<AnsiColor> {
    Some(match c {
        Color::Black => AnsiColor::Black,
        Color::Red => AnsiColor::Red,
        Color::Green => AnsiColor::Green,
        Color::Yellow => AnsiColor::Yellow,
        Color::Blue => AnsiColor::Blue,
        Color::Magenta => AnsiColor::Magenta,
        Color::Cyan => AnsiColor::Cyan,
        Color::White => AnsiColor::White,
        Color::BrightBlack => AnsiColor::BrightBlack,
        Color::BrightRed => AnsiColor::BrightRed,
        Color::BrightGreen => AnsiColor::BrightGreen,
        Color::BrightYellow => AnsiColor::BrightYellow,
        Color::BrightBlue => AnsiColor::BrightBlue,
        Color::BrightMagenta => AnsiColor::BrightMagenta,
        Color::BrightCyan => AnsiColor::BrightCyan,
        Color::BrightWhite => AnsiColor::BrightWhite,
        _ => return None,
    })
}

/// clap help styles built from the same roles
pub fn palette_to_clap(enabled: bool) -> Styles {
    if !enabled {
        return Styles::plain();
    }

    Styles::styled()
        .header(StyleRole::Heading.clap_style().bold())
        .usage(StyleRole::Heading.clap_style().bold())
        .literal(StyleRole::Flag.clap_style())
        .placeholder(StyleRole::Placeholder.clap_style())
        .valid(StyleRole::Placeholder.clap_style())
        .invalid(StyleRole::Error.clap_style())
        .error(StyleRole::Error.clap_style().bold())
}
