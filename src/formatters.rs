use crate::constants::{FONT_FACE, FONT_SIZE_SUB, FONT_SIZE_TOP};
use crate::severity::SeverityLevel;

// ============================================================================
// Render directives
// ============================================================================

/// Colouring of a menu line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Severity(SeverityLevel),
    /// No colour at all.
    Neutral,
    /// Degraded state, e.g. no connectivity.
    Alert,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Style {
    pub tone: Tone,
    pub size: Option<u8>,
    pub font: Option<&'static str>,
    pub href: Option<String>,
}

impl Style {
    /// Style of top-level menu entries.
    pub fn top() -> Self {
        Self {
            tone: Tone::Neutral,
            size: Some(FONT_SIZE_TOP),
            font: Some(FONT_FACE),
            href: None,
        }
    }

    /// Style of submenu entries.
    pub fn sub() -> Self {
        Self {
            size: Some(FONT_SIZE_SUB),
            ..Self::top()
        }
    }

    pub fn with_tone(mut self, tone: Tone) -> Self {
        self.tone = tone;
        self
    }

    pub fn with_severity(self, level: Option<&SeverityLevel>) -> Self {
        self.with_tone(level.map_or(Tone::Neutral, |l| Tone::Severity(*l)))
    }

    pub fn with_href(mut self, href: impl Into<String>) -> Self {
        self.href = Some(href.into());
        self
    }
}

/// One line of the hierarchical menu, independent of the output encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuLine {
    Item {
        depth: usize,
        text: String,
        style: Style,
    },
    Separator {
        depth: usize,
    },
}

impl MenuLine {
    pub fn item(depth: usize, text: impl Into<String>, style: Style) -> Self {
        MenuLine::Item {
            depth,
            text: text.into(),
            style,
        }
    }

    pub fn separator(depth: usize) -> Self {
        MenuLine::Separator { depth }
    }
}

// ============================================================================
// Line formatting
// ============================================================================

/// Pads `label` with spaces, or cuts it, to exactly `width` characters.
pub fn fit_label(label: &str, width: usize) -> String {
    let len = label.chars().count();
    if len >= width {
        label.chars().take(width).collect()
    } else {
        format!("{}{}", label, " ".repeat(width - len))
    }
}

/// Width of the widest label, counted in characters.
pub fn column_width<'a>(labels: impl IntoIterator<Item = &'a str>) -> usize {
    labels
        .into_iter()
        .map(|l| l.chars().count())
        .max()
        .unwrap_or(0)
}

/// Formats the entries of one menu block so their values line up.
///
/// The column width is fixed when the formatter is built, from the labels of
/// that block only.
#[derive(Debug, Clone, Copy)]
pub struct LineFormatter {
    depth: usize,
    width: usize,
}

impl LineFormatter {
    pub fn new(depth: usize, width: usize) -> Self {
        Self { depth, width }
    }

    pub fn for_labels<'a>(depth: usize, labels: impl IntoIterator<Item = &'a str>) -> Self {
        Self::new(depth, column_width(labels))
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// A pollutant detail line: `label  value unit`, coloured but without emoji.
    pub fn reading(
        &self,
        label: &str,
        value: f64,
        unit: &str,
        severity: Option<&SeverityLevel>,
    ) -> MenuLine {
        let text = format!("{} {:>8.2} {}", fit_label(label, self.width), value, unit);
        MenuLine::item(self.depth, text, Style::sub().with_severity(severity))
    }

    /// A composite index line: `label  value emoji`.
    pub fn index(
        &self,
        label: &str,
        value: f64,
        severity: Option<&SeverityLevel>,
        style: Style,
    ) -> MenuLine {
        let mut text = format!("{} {:.0}", fit_label(label, self.width), value);
        if let Some(level) = severity {
            text.push(' ');
            text.push_str(level.emoji);
        }
        MenuLine::item(self.depth, text, style.with_severity(severity))
    }

    /// A legend entry: `range  emoji  label`.
    pub fn legend(&self, level: &SeverityLevel) -> MenuLine {
        let text = format!(
            "{} {}  {}",
            fit_label(level.range, self.width),
            level.emoji,
            level.label
        );
        MenuLine::item(self.depth, text, Style::sub().with_severity(Some(level)))
    }
}

// ============================================================================
// Output encodings
// ============================================================================

/// Turns render directives into text for a particular output target.
pub trait Renderer {
    fn render_line(&self, line: &MenuLine) -> String;

    fn render(&self, lines: &[MenuLine]) -> String {
        let mut output = String::new();
        for line in lines {
            output.push_str(&self.render_line(line));
            output.push('\n');
        }
        output
    }
}

/// The status-bar menu protocol: `--` per nesting level, directives after `|`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MenuProtocol;

impl Renderer for MenuProtocol {
    fn render_line(&self, line: &MenuLine) -> String {
        match line {
            MenuLine::Separator { depth } => format!("{}---", "--".repeat(*depth)),
            MenuLine::Item { depth, text, style } => {
                let mut directives = Vec::new();
                if let Some(href) = &style.href {
                    directives.push(format!("href={}", href));
                }
                match style.tone {
                    Tone::Severity(level) => directives.push(format!("color={}", level.color)),
                    Tone::Alert => directives.push("color=red".to_string()),
                    Tone::Neutral => {}
                }
                if let Some(size) = style.size {
                    directives.push(format!("size={}", size));
                }
                if let Some(font) = style.font {
                    directives.push(format!("font='{}'", font));
                }

                let prefix = "--".repeat(*depth);
                if directives.is_empty() {
                    format!("{}{}", prefix, text)
                } else {
                    format!("{}{} | {}", prefix, text, directives.join(" "))
                }
            }
        }
    }
}

/// Plain terminal output: indentation per level and 256-colour escapes.
#[derive(Debug, Clone, Copy, Default)]
pub struct Terminal;

const ANSI_RESET: &str = "\x1b[0m";
const ANSI_ALERT: u8 = 196;

impl Renderer for Terminal {
    fn render_line(&self, line: &MenuLine) -> String {
        match line {
            MenuLine::Separator { depth } => format!("{}{}", "  ".repeat(*depth), "-".repeat(24)),
            MenuLine::Item { depth, text, style } => {
                let indent = "  ".repeat(*depth);
                let ansi = match style.tone {
                    Tone::Severity(level) => Some(level.ansi),
                    Tone::Alert => Some(ANSI_ALERT),
                    Tone::Neutral => None,
                };
                match ansi {
                    Some(code) => format!("{}\x1b[38;5;{}m{}{}", indent, code, text, ANSI_RESET),
                    None => format!("{}{}", indent, text),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::severity::SeverityPalette;

    fn moderate() -> SeverityLevel {
        *SeverityPalette::standard().level(1).unwrap()
    }

    fn text_of(line: &MenuLine) -> &str {
        match line {
            MenuLine::Item { text, .. } => text,
            MenuLine::Separator { .. } => panic!("expected an item, got a separator"),
        }
    }

    // --- Labels -------------------------------------------------------------

    #[test]
    fn test_fit_label_counts_characters_not_bytes() {
        assert_eq!(fit_label("PM₂.₅", 8), "PM₂.₅   ");
        assert_eq!(fit_label("HUMIDITY", 3), "HUM");
        assert_eq!(fit_label("CO", 2), "CO");
    }

    #[test]
    fn test_block_labels_share_one_width() {
        let formatter = LineFormatter::for_labels(1, ["CO", "PM₂.₅"]);
        assert_eq!(formatter.width(), 5);

        let co = formatter.reading("CO", 6.2, "ppm", None);
        let pm = formatter.reading("PM₂.₅", 153.0, "μg/m³", None);
        let label_field = |line: &MenuLine| text_of(line).chars().take(formatter.width()).count();
        assert_eq!(label_field(&co), label_field(&pm));
        assert_eq!(text_of(&co), "CO        6.20 ppm");
        assert_eq!(text_of(&pm), "PM₂.₅   153.00 μg/m³");
    }

    // --- Entries ------------------------------------------------------------

    #[test]
    fn test_reading_is_coloured_without_emoji() {
        let level = moderate();
        let line = LineFormatter::new(1, 4).reading("O₃", 60.0, "ppb", Some(&level));
        assert_eq!(
            MenuProtocol.render_line(&line),
            "--O₃      60.00 ppb | color=#ffff00 size=14 font='Menlo'"
        );
    }

    #[test]
    fn test_unclassified_reading_has_no_colour() {
        let line = LineFormatter::new(1, 6).reading("DEW PT", 18.0, "°C", None);
        let rendered = MenuProtocol.render_line(&line);
        assert!(!rendered.contains("color="), "got {}", rendered);
    }

    #[test]
    fn test_index_line_carries_emoji() {
        let level = moderate();
        let line = LineFormatter::new(0, 5).index("AQI :", 77.0, Some(&level), Style::top());
        assert_eq!(
            MenuProtocol.render_line(&line),
            "AQI : 77 🙁 | color=#ffff00 size=13 font='Menlo'"
        );
    }

    #[test]
    fn test_formatting_is_deterministic() {
        let level = moderate();
        let formatter = LineFormatter::new(1, 8);
        let a = formatter.reading("PRESSURE", 1012.456, "mm.Hg", Some(&level));
        let b = formatter.reading("PRESSURE", 1012.456, "mm.Hg", Some(&level));
        assert_eq!(MenuProtocol.render_line(&a), MenuProtocol.render_line(&b));
        assert!(text_of(&a).contains("1012.46"));
    }

    // --- Encodings ----------------------------------------------------------

    #[test]
    fn test_separators_nest_with_depth() {
        assert_eq!(MenuProtocol.render_line(&MenuLine::separator(0)), "---");
        assert_eq!(MenuProtocol.render_line(&MenuLine::separator(1)), "-----");
    }

    #[test]
    fn test_href_and_alert_directives() {
        let link = MenuLine::item(1, "Delhi", Style::sub().with_href("https://aqicn.org/city/delhi"));
        assert_eq!(
            MenuProtocol.render_line(&link),
            "--Delhi | href=https://aqicn.org/city/delhi size=14 font='Menlo'"
        );
        let alert = MenuLine::item(0, "AQI: 🛰", Style::top().with_tone(Tone::Alert));
        assert_eq!(
            MenuProtocol.render_line(&alert),
            "AQI: 🛰 | color=red size=13 font='Menlo'"
        );
    }

    #[test]
    fn test_terminal_uses_ansi_colours() {
        let level = moderate();
        let line = MenuLine::item(1, "x", Style::sub().with_severity(Some(&level)));
        assert_eq!(Terminal.render_line(&line), "  \x1b[38;5;226mx\x1b[0m");
        assert_eq!(
            Terminal.render(&[MenuLine::item(0, "plain", Style::top())]),
            "plain\n"
        );
    }
}
