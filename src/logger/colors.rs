/// ANSI display colors used by the console loggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Green,
    Cyan,
    Yellow,
    Red,
    Blue,
    Magenta,
    Reset,
}

impl Color {
    pub fn ansi(self) -> &'static str {
        match self {
            Color::Green => "\x1b[32m",
            Color::Cyan => "\x1b[36m",
            Color::Yellow => "\x1b[33m",
            Color::Red => "\x1b[31m",
            Color::Blue => "\x1b[34m",
            Color::Magenta => "\x1b[35m",
            Color::Reset => "\x1b[0m",
        }
    }
}

/// Color for a response status code.
///
/// 2xx is green, 3xx cyan, 4xx yellow and 5xx (or anything above) red.
/// Informational and out-of-range codes fall back to `Reset`.
pub fn status_color(status: u16) -> Color {
    match status {
        200..=299 => Color::Green,
        300..=399 => Color::Cyan,
        400..=499 => Color::Yellow,
        500.. => Color::Red,
        _ => Color::Reset,
    }
}

/// Color for a request method. Matching is case-sensitive.
pub fn method_color(method: &str) -> Color {
    match method {
        "GET" => Color::Blue,
        "POST" => Color::Green,
        "PUT" | "PATCH" => Color::Yellow,
        "DELETE" => Color::Red,
        _ => Color::Reset,
    }
}

/// Wraps `text` in `color`, or returns it untouched when colors are off.
pub fn paint(text: impl std::fmt::Display, color: Color, enabled: bool) -> String {
    if enabled {
        format!("{}{}{}", color.ansi(), text, Color::Reset.ansi())
    } else {
        text.to_string()
    }
}
