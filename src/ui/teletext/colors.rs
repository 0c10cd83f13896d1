use crossterm::style::Color;

// Constants for teletext appearance
pub fn header_bg() -> Color {
    Color::AnsiValue(21)
} // Bright blue
pub fn header_fg() -> Color {
    Color::AnsiValue(21)
} // Bright blue
pub fn subheader_fg() -> Color {
    Color::AnsiValue(46)
} // Bright green
pub fn text_fg() -> Color {
    Color::AnsiValue(231)
} // Pure white
pub fn rank_fg() -> Color {
    Color::AnsiValue(226)
} // Bright yellow
pub fn score_fg() -> Color {
    Color::AnsiValue(51)
} // Bright cyan
pub fn column_header_fg() -> Color {
    Color::AnsiValue(201)
} // Bright magenta
pub fn error_fg() -> Color {
    Color::AnsiValue(196)
} // Bright red
pub fn title_bg() -> Color {
    Color::AnsiValue(46)
} // Bright green
