//! Spiral tag-cloud layout.
//!
//! Words are placed greedily in input order, walking an Archimedean-ish
//! spiral out from the centre until the word's box overlaps nothing placed
//! so far. Earlier words get bigger fonts, so callers pass words ordered by
//! importance.

use serde::Serialize;

pub const MIN_FONT_SIZE: f64 = 14.0;
pub const MAX_FONT_SIZE: f64 = 24.0;

const START_RADIUS: f64 = 20.0;
const ANGLE_PER_WORD: f64 = 0.2;
const ANGLE_STEP: f64 = 0.03;
const RADIUS_STEP: f64 = 0.4;
const MAX_ATTEMPTS: usize = 3000;

/// Average glyph advance relative to the font size, plus horizontal padding.
const GLYPH_WIDTH_RATIO: f64 = 0.6;
const BOX_PADDING: f64 = 20.0;
const LINE_HEIGHT_RATIO: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl Rect {
    fn centered(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            left: x - width / 2.0,
            right: x + width / 2.0,
            top: y - height / 2.0,
            bottom: y + height / 2.0,
        }
    }

    /// Touching edges count as overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        !(self.right < other.left
            || self.left > other.right
            || self.bottom < other.top
            || self.top > other.bottom)
    }
}

/// A word that found a slot. `x`/`y` is the centre of its box.
#[derive(Debug, Clone, Serialize)]
pub struct PlacedWord {
    pub text: String,
    pub index: usize,
    pub x: f64,
    pub y: f64,
    pub font_size: f64,
    pub hue: u32,
}

/// Font size of the `index`-th of `count` words, linear from max to min.
pub fn font_size(index: usize, count: usize) -> f64 {
    if count == 0 {
        return MAX_FONT_SIZE;
    }
    MIN_FONT_SIZE + (MAX_FONT_SIZE - MIN_FONT_SIZE) * (1.0 - index as f64 / count as f64)
}

/// Estimated rendered box of `text` at `font_size`.
pub fn word_box(text: &str, font_size: f64) -> (f64, f64) {
    let chars = text.chars().map(char_weight).sum::<f64>();
    (chars * GLYPH_WIDTH_RATIO * font_size + BOX_PADDING, font_size * LINE_HEIGHT_RATIO)
}

// CJK and fullwidth glyphs are roughly twice as wide as Latin ones
fn char_weight(c: char) -> f64 {
    match c {
        '\u{1100}'..='\u{115F}'
        | '\u{2E80}'..='\u{A4CF}'
        | '\u{AC00}'..='\u{D7A3}'
        | '\u{F900}'..='\u{FAFF}'
        | '\u{FE30}'..='\u{FE4F}'
        | '\u{FF00}'..='\u{FF60}'
        | '\u{FFE0}'..='\u{FFE6}' => 2.0,
        _ => 1.0,
    }
}

pub fn hue(index: usize) -> u32 {
    ((index * 24) % 360) as u32
}

/// Lay out `words` inside a `width` x `height` area.
/// Words that find no free slot within the attempt budget are left out.
pub fn layout<S: AsRef<str>>(words: &[S], width: f64, height: f64) -> Vec<PlacedWord> {
    let center_x = width / 2.0;
    let center_y = height / 2.0;
    let count = words.len();

    let mut placed_rects: Vec<Rect> = Vec::with_capacity(count);
    let mut placed = Vec::with_capacity(count);

    for (index, word) in words.iter().enumerate() {
        let text = word.as_ref();
        let size = font_size(index, count);
        let (box_w, box_h) = word_box(text, size);

        let mut angle = index as f64 * ANGLE_PER_WORD;
        let mut radius = START_RADIUS;

        for _ in 0..MAX_ATTEMPTS {
            let x = center_x + radius * angle.cos();
            let y = center_y + radius * angle.sin();
            let rect = Rect::centered(x, y, box_w, box_h);

            if placed_rects.iter().all(|r| !rect.overlaps(r)) {
                placed_rects.push(rect);
                placed.push(PlacedWord {
                    text: text.to_string(),
                    index,
                    x,
                    y,
                    font_size: size,
                    hue: hue(index),
                });
                break;
            }

            angle += ANGLE_STEP;
            radius += RADIUS_STEP;
        }
    }

    placed
}
