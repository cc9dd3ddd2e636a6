//! Visual attachments.
//!
//! These are stored on the entity but interpreted only by the rendering
//! collaborator. The simulation never reads them except to update colours of
//! text runs (typed progress, fading text).

use serde::{Deserialize, Serialize};

/// A rectangle within a sprite sheet, in source pixels.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SheetRect {
    pub sx: f32,
    pub sy: f32,
    pub s_width: f32,
    pub s_height: f32,
}

/// A reference to a sprite asset by path or key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpriteRef {
    /// Asset key understood by the image collaborator.
    pub path: String,
    /// Sub-rectangle when the asset is a sheet.
    pub sheet: Option<SheetRect>,
}

impl SpriteRef {
    /// A whole-image sprite.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            sheet: None,
        }
    }

    /// Select a sub-rectangle of a sprite sheet.
    #[must_use]
    pub fn with_sheet(mut self, sheet: SheetRect) -> Self {
        self.sheet = Some(sheet);
        self
    }
}

/// One run of text drawn with a single font and colour.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TextRun {
    /// The text to draw.
    pub value: String,
    /// CSS-style font description, if not the renderer default.
    pub font: Option<String>,
    /// Fill colour, if not the renderer default.
    pub fill: Option<String>,
}

impl TextRun {
    /// A run with default font and colour.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            font: None,
            fill: None,
        }
    }

    /// Set the font.
    #[must_use]
    pub fn with_font(mut self, font: impl Into<String>) -> Self {
        self.font = Some(font.into());
        self
    }

    /// Set the fill colour.
    #[must_use]
    pub fn with_fill(mut self, fill: impl Into<String>) -> Self {
        self.fill = Some(fill.into());
        self
    }
}

/// Everything the renderer needs besides position and size.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Visual {
    pub fill: Option<String>,
    pub stroke: Option<String>,
    pub sprite: Option<SpriteRef>,
    /// Text runs drawn left to right.
    pub text: Vec<TextRun>,
}

impl Visual {
    /// An empty visual (nothing drawn).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fill colour (CSS colour string).
    #[must_use]
    pub fn with_fill(mut self, fill: impl Into<String>) -> Self {
        self.fill = Some(fill.into());
        self
    }

    #[must_use]
    pub fn with_stroke(mut self, stroke: impl Into<String>) -> Self {
        self.stroke = Some(stroke.into());
        self
    }

    #[must_use]
    pub fn with_sprite(mut self, sprite: SpriteRef) -> Self {
        self.sprite = Some(sprite);
        self
    }

    /// Append a text run.
    #[must_use]
    pub fn with_text(mut self, run: TextRun) -> Self {
        self.text.push(run);
        self
    }

    /// The concatenated text of all runs.
    #[must_use]
    pub fn text_value(&self) -> String {
        self.text.iter().map(|run| run.value.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_chain() {
        let visual = Visual::new()
            .with_fill("white")
            .with_sprite(SpriteRef::new("enemyShip").with_sheet(SheetRect {
                sx: 64.0,
                sy: 64.0,
                s_width: 32.0,
                s_height: 32.0,
            }))
            .with_text(TextRun::new("ca").with_fill("red"))
            .with_text(TextRun::new("t"));
        assert_eq!(visual.fill.as_deref(), Some("white"));
        assert_eq!(visual.text_value(), "cat");
        assert!(visual.sprite.and_then(|s| s.sheet).is_some());
    }
}
