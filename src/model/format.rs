//! Segment and block formats.
//!
//! Formats are plain values independent from DOM styling. The converters map
//! them to and from tags, attributes and inline CSS:
//!
//! - [`TextStyle`]: bitflags for bold, italic, underline, strikethrough
//! - [`SegmentFormat`]: text style plus font and colors
//! - [`BlockFormat`]: direction, alignment and indentation of a block
//!
//! # Examples
//!
//! ```
//! use contentmodel_rust::model::{SegmentFormat, TextStyle};
//!
//! let heading = SegmentFormat::default().with_bold().with_font_size("20px");
//! let merged = heading.merge(&SegmentFormat::default().with_italic());
//! assert!(merged.style.contains(TextStyle::BOLD | TextStyle::ITALIC));
//! ```

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Boolean text decorations.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct TextStyle: u8 {
        const BOLD          = 0x01;
        const ITALIC        = 0x02;
        const UNDERLINE     = 0x04;
        const STRIKETHROUGH = 0x08;
    }
}

/// Format carried by every segment.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentFormat {
    #[serde(default, skip_serializing_if = "TextStyle::is_empty")]
    pub style: TextStyle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
}

impl SegmentFormat {
    /// Return a copy with `style` flags added.
    #[must_use]
    pub fn with_style(mut self, style: TextStyle) -> Self {
        self.style |= style;
        self
    }

    #[must_use]
    pub fn with_bold(self) -> Self {
        self.with_style(TextStyle::BOLD)
    }

    #[must_use]
    pub fn with_italic(self) -> Self {
        self.with_style(TextStyle::ITALIC)
    }

    #[must_use]
    pub fn with_underline(self) -> Self {
        self.with_style(TextStyle::UNDERLINE)
    }

    #[must_use]
    pub fn with_font_family(mut self, family: &str) -> Self {
        self.font_family = Some(family.to_string());
        self
    }

    #[must_use]
    pub fn with_font_size(mut self, size: &str) -> Self {
        self.font_size = Some(size.to_string());
        self
    }

    #[must_use]
    pub fn with_text_color(mut self, color: &str) -> Self {
        self.text_color = Some(color.to_string());
        self
    }

    /// Check if this format has any non-default properties.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.style.is_empty()
            && self.font_family.is_none()
            && self.font_size.is_none()
            && self.text_color.is_none()
            && self.background_color.is_none()
    }

    /// Merge two formats, with `other` taking precedence for set values.
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            style: self.style | other.style,
            font_family: other.font_family.clone().or_else(|| self.font_family.clone()),
            font_size: other.font_size.clone().or_else(|| self.font_size.clone()),
            text_color: other.text_color.clone().or_else(|| self.text_color.clone()),
            background_color: other
                .background_color
                .clone()
                .or_else(|| self.background_color.clone()),
        }
    }

    /// Apply the effect of an inline formatting tag (`b`, `em`, `u`, ...).
    ///
    /// Returns false for tags that carry no segment format.
    pub fn apply_tag(&mut self, tag: &str) -> bool {
        let flag = match tag {
            "b" | "strong" => TextStyle::BOLD,
            "i" | "em" => TextStyle::ITALIC,
            "u" => TextStyle::UNDERLINE,
            "s" | "strike" | "del" => TextStyle::STRIKETHROUGH,
            _ => return false,
        };
        self.style |= flag;
        true
    }

    /// Apply the segment-related declarations of an inline CSS string.
    pub fn apply_css(&mut self, css: &str) {
        for (name, value) in css_declarations(css) {
            match name.as_str() {
                "font-weight" => {
                    let bold = matches!(value.as_str(), "bold" | "bolder" | "600" | "700" | "800" | "900");
                    self.style.set(TextStyle::BOLD, bold);
                }
                "font-style" => self.style.set(TextStyle::ITALIC, value == "italic"),
                "text-decoration" | "text-decoration-line" => {
                    self.style.set(TextStyle::UNDERLINE, value.contains("underline"));
                    self.style
                        .set(TextStyle::STRIKETHROUGH, value.contains("line-through"));
                }
                "font-family" => self.font_family = Some(value),
                "font-size" => self.font_size = Some(value),
                "color" => self.text_color = Some(value),
                "background-color" => self.background_color = Some(value),
                _ => {}
            }
        }
    }

    /// Inline CSS for this format. Empty when the format is empty.
    #[must_use]
    pub fn to_css(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        if let Some(family) = &self.font_family {
            parts.push(format!("font-family:{family}"));
        }
        if let Some(size) = &self.font_size {
            parts.push(format!("font-size:{size}"));
        }
        if self.style.contains(TextStyle::BOLD) {
            parts.push("font-weight:bold".to_string());
        }
        if self.style.contains(TextStyle::ITALIC) {
            parts.push("font-style:italic".to_string());
        }
        let decoration = match (
            self.style.contains(TextStyle::UNDERLINE),
            self.style.contains(TextStyle::STRIKETHROUGH),
        ) {
            (true, true) => Some("underline line-through"),
            (true, false) => Some("underline"),
            (false, true) => Some("line-through"),
            (false, false) => None,
        };
        if let Some(decoration) = decoration {
            parts.push(format!("text-decoration:{decoration}"));
        }
        if let Some(color) = &self.text_color {
            parts.push(format!("color:{color}"));
        }
        if let Some(color) = &self.background_color {
            parts.push(format!("background-color:{color}"));
        }
        parts.join(";")
    }
}

/// Base direction of a block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    Ltr,
    Rtl,
}

impl Direction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ltr => "ltr",
            Self::Rtl => "rtl",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "ltr" => Some(Self::Ltr),
            "rtl" => Some(Self::Rtl),
            _ => None,
        }
    }
}

/// Format carried by blocks and table cells.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockFormat {
    /// Written as the `dir` attribute.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_align: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin_left: Option<String>,
}

impl BlockFormat {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.direction.is_none() && self.text_align.is_none() && self.margin_left.is_none()
    }

    pub fn apply_css(&mut self, css: &str) {
        for (name, value) in css_declarations(css) {
            match name.as_str() {
                "text-align" => self.text_align = Some(value),
                "margin-left" => self.margin_left = Some(value),
                "direction" => self.direction = Direction::parse(&value),
                _ => {}
            }
        }
    }

    /// Inline CSS for the alignment and indentation parts.
    #[must_use]
    pub fn to_css(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        if let Some(align) = &self.text_align {
            parts.push(format!("text-align:{align}"));
        }
        if let Some(margin) = &self.margin_left {
            parts.push(format!("margin-left:{margin}"));
        }
        parts.join(";")
    }
}

/// Split `a:b; c:d` into lower-cased names and trimmed values.
fn css_declarations(css: &str) -> impl Iterator<Item = (String, String)> + '_ {
    css.split(';').filter_map(|declaration| {
        let (name, value) = declaration.split_once(':')?;
        let name = name.trim().to_ascii_lowercase();
        let value = value.trim();
        if name.is_empty() || value.is_empty() {
            None
        } else {
            Some((name, value.to_string()))
        }
    })
}

/// Whether an inline CSS string contains segment-level declarations.
#[must_use]
pub fn has_segment_css(css: &str) -> bool {
    let mut format = SegmentFormat::default();
    format.apply_css(css);
    !format.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_css_round_trip() {
        let format = SegmentFormat::default()
            .with_bold()
            .with_underline()
            .with_style(TextStyle::STRIKETHROUGH)
            .with_font_family("Arial")
            .with_text_color("red");
        let css = format.to_css();
        assert_eq!(
            css,
            "font-family:Arial;font-weight:bold;text-decoration:underline line-through;color:red"
        );

        let mut parsed = SegmentFormat::default();
        parsed.apply_css(&css);
        assert_eq!(parsed, format);
    }

    #[test]
    fn test_explicit_normal_weight_clears_inherited_bold() {
        let mut format = SegmentFormat::default().with_bold();
        format.apply_css("font-weight: normal");
        assert!(!format.style.contains(TextStyle::BOLD));
    }

    #[test]
    fn test_apply_tag() {
        let mut format = SegmentFormat::default();
        assert!(format.apply_tag("strong"));
        assert!(format.apply_tag("em"));
        assert!(!format.apply_tag("span"));
        assert_eq!(format.style, TextStyle::BOLD | TextStyle::ITALIC);
    }

    #[test]
    fn test_merge_precedence() {
        let base = SegmentFormat::default().with_font_size("10pt").with_bold();
        let overlay = SegmentFormat::default().with_font_size("12pt");
        let merged = base.merge(&overlay);
        assert_eq!(merged.font_size.as_deref(), Some("12pt"));
        assert!(merged.style.contains(TextStyle::BOLD));
    }

    #[test]
    fn test_block_format_css() {
        let mut format = BlockFormat::default();
        format.apply_css("text-align: center; margin-left: 40px; color: red");
        assert_eq!(format.text_align.as_deref(), Some("center"));
        assert_eq!(format.to_css(), "text-align:center;margin-left:40px");
        assert!(has_segment_css("color: red"));
        assert!(!has_segment_css("text-align: center"));
    }

    #[test]
    fn test_serde_skips_defaults() {
        let json = serde_json::to_string(&SegmentFormat::default()).unwrap();
        assert_eq!(json, "{}");
    }
}
