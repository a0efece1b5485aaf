use ratatui::style::{Color, Modifier, Style};

pub const THEME_NAMES: &[&str] = &["dark", "light"];

#[derive(Debug, Clone)]
pub struct Theme {
    // Terminal background the palette was designed for; picks the syntax theme
    pub background_color: Color,

    // Chat message styles
    pub user_prefix_style: Style,
    pub user_text_style: Style,
    pub assistant_text_style: Style,
    pub math_style: Style,

    // Code blocks
    pub code_label_style: Style,
    pub code_text_style: Style,
    pub code_background: Option<Color>,

    // Notices
    pub info_style: Style,
    pub warning_style: Style,
    pub error_style: Style,
    pub streaming_indicator_style: Style,
}

impl Theme {
    pub fn dark() -> Self {
        Theme {
            background_color: Color::Black,
            user_prefix_style: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            user_text_style: Style::default().fg(Color::Cyan),
            assistant_text_style: Style::default().fg(Color::White),
            math_style: Style::default()
                .fg(Color::LightYellow)
                .add_modifier(Modifier::ITALIC),

            code_label_style: Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
            code_text_style: Style::default().fg(Color::Gray),
            code_background: Some(Color::Rgb(30, 30, 30)),

            info_style: Style::default().fg(Color::Gray),
            warning_style: Style::default().fg(Color::Yellow),
            error_style: Style::default()
                .fg(Color::LightRed)
                .add_modifier(Modifier::BOLD),
            streaming_indicator_style: Style::default().fg(Color::DarkGray),
        }
    }

    pub fn light() -> Self {
        Theme {
            background_color: Color::White,
            user_prefix_style: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            user_text_style: Style::default().fg(Color::Blue),
            assistant_text_style: Style::default().fg(Color::Black),
            math_style: Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::ITALIC),

            code_label_style: Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::ITALIC),
            code_text_style: Style::default().fg(Color::DarkGray),
            code_background: Some(Color::Rgb(240, 240, 240)),

            info_style: Style::default().fg(Color::DarkGray),
            warning_style: Style::default().fg(Color::Rgb(160, 110, 0)),
            error_style: Style::default()
                .fg(Color::Red)
                .add_modifier(Modifier::BOLD),
            streaming_indicator_style: Style::default().fg(Color::Gray),
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "dark" | "default" => Some(Self::dark()),
            "light" => Some(Self::light()),
            _ => None,
        }
    }

    /// Theme named in the config, falling back to dark for unset or unknown
    /// names.
    pub fn from_config_name(name: Option<&str>) -> Self {
        name.and_then(Self::from_name).unwrap_or_else(Self::dark)
    }

    pub fn is_dark(&self) -> bool {
        match self.background_color {
            Color::Rgb(r, g, b) => {
                let brightness = 0.2126 * (r as f32) + 0.7152 * (g as f32) + 0.0722 * (b as f32);
                brightness < 128.0
            }
            Color::White | Color::Gray => false,
            _ => true,
        }
    }

    pub fn strong(&self, base: Style) -> Style {
        base.add_modifier(Modifier::BOLD)
    }
}
