use super::draw::DrawContext;
use super::math::Color;

// Segments: A(top), B(top-right), C(bottom-right), D(bottom),
// E(bottom-left), F(top-left), G(middle)
const SEGMENT_MAP: [[bool; 7]; 10] = [
    [true, true, true, true, true, true, false],     // 0
    [false, true, true, false, false, false, false], // 1
    [true, true, false, true, true, false, true],    // 2
    [true, true, true, true, false, false, true],    // 3
    [false, true, true, false, false, true, true],   // 4
    [true, false, true, true, false, true, true],    // 5
    [true, false, true, true, true, true, true],     // 6
    [true, true, true, false, false, false, false],  // 7
    [true, true, true, true, true, true, true],      // 8
    [true, true, true, true, false, true, true],     // 9
];

/// Width of a digit cell for a given digit height.
pub fn digit_width(height: f32) -> f32 {
    height * 0.56
}

pub fn render_digit(draw: &mut DrawContext, digit: u8, x: f32, y: f32, height: f32, color: Color) {
    if digit > 9 {
        return;
    }
    let width = digit_width(height);
    let t = width * 0.16;
    let inset = t * 0.6;
    let half = height * 0.5;

    for (seg, &on) in SEGMENT_MAP[digit as usize].iter().enumerate() {
        if !on {
            continue;
        }
        match seg {
            0 => draw.rect(x + inset, y, width - inset * 2.0, t, color),
            1 => draw.rect(x + width - t, y + inset, t, half - inset * 1.5, color),
            2 => draw.rect(x + width - t, y + half + inset * 0.5, t, half - inset * 1.5, color),
            3 => draw.rect(x + inset, y + height - t, width - inset * 2.0, t, color),
            4 => draw.rect(x, y + half + inset * 0.5, t, half - inset * 1.5, color),
            5 => draw.rect(x, y + inset, t, half - inset * 1.5, color),
            6 => draw.rect(x + inset, y + half - t * 0.5, width - inset * 2.0, t, color),
            _ => {}
        }
    }
}

/// Renders `value` right-aligned so its last digit ends at `right`. Returns the used width.
pub fn render_number(
    draw: &mut DrawContext,
    value: u32,
    right: f32,
    y: f32,
    height: f32,
    spacing: f32,
    color: Color,
) -> f32 {
    let digits = digits_of(value);
    let w = digit_width(height);
    let total = digits.len() as f32 * (w + spacing) - spacing;
    let mut x = right - total;
    for d in digits {
        render_digit(draw, d, x, y, height, color);
        x += w + spacing;
    }
    total
}

pub fn digits_of(mut value: u32) -> Vec<u8> {
    let mut digits = Vec::new();
    loop {
        digits.push((value % 10) as u8);
        value /= 10;
        if value == 0 {
            break;
        }
    }
    digits.reverse();
    digits
}
