use crate::config::Theme;
use crate::gfx::anim::{lerp, Transition};
use crate::gfx::draw::DrawContext;
use crate::gfx::font::{self, draw_text};
use crate::gfx::math::Rect;
use crate::gfx::segments;
use crate::timeline::{phase_progress, FrameClock, Timeline};
use log::debug;

const LABEL_FADE_SECS: f64 = 0.5;
const DESCRIPTION_FADE_SECS: f64 = 0.6;
const BAR_EASE_SECS: f64 = 0.4;
const LABEL_SLIDE_PX: f32 = 8.0;
const DESCRIPTION_SLIDE_PX: f32 = 6.0;

// Panel metrics, in multiples of the layout scale.
const PAD: f32 = 22.0;
const SMALL_DOT: f32 = 1.6;
const LARGE_DOT: f32 = 3.2;
const LABEL_TRACKING: f32 = 1.5;
const DESCRIPTION_GAP: f32 = 12.0;
const ROW_GAP: f32 = 14.0;
const WRAPPED_LINE_GAP: f32 = 6.0;
const BAR_HEIGHT: f32 = 8.0;
const PIP_GAP: f32 = 8.0;
const PIP_HEIGHT: f32 = 2.0;

/// Where the phase description goes for a given panel width.
#[derive(Debug, Clone, PartialEq)]
pub struct DescriptionLayout {
    /// Fits on the label's line, after the label.
    pub inline: bool,
    pub lines: Vec<String>,
}

pub fn layout_description(label: &str, description: &str, panel_width: f32, scale: f32) -> DescriptionLayout {
    let inner = (panel_width - 2.0 * PAD * scale).max(0.0);
    let small = SMALL_DOT * scale;
    let label_w = font::text_width(label, LARGE_DOT * scale, LABEL_TRACKING * scale);
    let desc_w = font::text_width(description, small, scale);
    if label_w + DESCRIPTION_GAP * scale + desc_w <= inner {
        return DescriptionLayout {
            inline: true,
            lines: vec![description.to_string()],
        };
    }
    let cols = ((inner + small + scale) / font::advance(small, scale)).floor().max(1.0) as usize;
    DescriptionLayout {
        inline: false,
        lines: font::wrap(description, cols),
    }
}

/// Panel height needed to show `label` and `description` at `panel_width`.
pub fn panel_height(label: &str, description: &str, panel_width: f32, scale: f32) -> f32 {
    let text = text_block_height(&layout_description(label, description, panel_width, scale), scale);
    (PAD * 2.0 + header_height(scale) + ROW_GAP * 2.0 + text + BAR_HEIGHT + PIP_GAP + PIP_HEIGHT) * scale
}

// Heights below are in unscaled units.
fn header_height(scale: f32) -> f32 {
    font::line_height(SMALL_DOT * scale) * 1.6 / scale
}

// Label row plus any wrapped description lines.
fn text_block_height(layout: &DescriptionLayout, scale: f32) -> f32 {
    let label = font::line_height(LARGE_DOT * scale) / scale;
    if layout.inline || layout.lines.is_empty() {
        return label;
    }
    let n = layout.lines.len() as f32;
    let line = font::line_height(SMALL_DOT * scale) / scale;
    label + PIP_GAP + n * line + (n - 1.0) * WRAPPED_LINE_GAP
}

/// Eases the displayed bar width toward the latest phase progress.
#[derive(Debug, Clone)]
struct BarTween {
    from: f32,
    to: f32,
    transition: Transition,
}

impl BarTween {
    fn settled_at(value: f32) -> Self {
        Self {
            from: value,
            to: value,
            transition: Transition::settled(BAR_EASE_SECS),
        }
    }

    fn value(&self) -> f32 {
        lerp(self.from, self.to, self.transition.eased_progress()).clamp(0.0, 1.0)
    }

    fn retarget(&mut self, target: f32, now: f64) -> f32 {
        self.transition.update(now);
        if target != self.to {
            self.from = self.value();
            self.to = target;
            self.transition.start(now);
        }
        self.value()
    }
}

/// Development-timeline readout: current phase, its description and progress.
///
/// Which phase is shown depends only on the clock. The one piece of retained
/// state is the fade/slide played when the label changes.
pub struct Ticker {
    shown_label: Option<String>,
    label_transition: Transition,
    description_transition: Transition,
    bar: Option<BarTween>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TickerFrame {
    pub label: String,
    pub description: String,
    pub phase_index: usize,
    pub phase_count: usize,
    /// Whole-loop completion, 0..=100.
    pub loop_percent: u8,
    /// Progress through the active phase, 0..=1.
    pub bar_fill: f32,
    /// Width actually drawn: `bar_fill` approached with an ease-out.
    pub bar_display: f32,
    pub label_reveal: f32,
    pub description_reveal: f32,
}

impl Ticker {
    pub fn new() -> Self {
        Self {
            shown_label: None,
            label_transition: Transition::settled(LABEL_FADE_SECS),
            description_transition: Transition::settled(DESCRIPTION_FADE_SECS),
            bar: None,
        }
    }

    pub fn refresh(&mut self, clock: &FrameClock, timeline: &Timeline) -> TickerFrame {
        let phase = timeline.active_phase(clock.progress);
        let now = clock.elapsed_secs;

        if self.shown_label.as_deref() != Some(phase.label.as_str()) {
            debug!("ticker phase -> {} at {:.3}", phase.label, clock.progress);
            self.shown_label = Some(phase.label.clone());
            self.label_transition.start(now);
            self.description_transition.start(now);
        }
        self.label_transition.update(now);
        self.description_transition.update(now);

        let bar_fill = phase_progress(clock.progress, phase);
        // The first frame shows the current width without animating from zero.
        let bar_display = match &mut self.bar {
            Some(bar) => bar.retarget(bar_fill, now),
            None => {
                self.bar = Some(BarTween::settled_at(bar_fill));
                bar_fill
            }
        };

        TickerFrame {
            label: phase.label.clone(),
            description: phase.description.clone(),
            phase_index: timeline.phase_index(phase),
            phase_count: timeline.phases().len(),
            loop_percent: (clock.progress * 100.0).round().clamp(0.0, 100.0) as u8,
            bar_fill,
            bar_display,
            label_reveal: self.label_transition.eased_progress(),
            description_reveal: self.description_transition.eased_progress(),
        }
    }
}

impl Default for Ticker {
    fn default() -> Self {
        Self::new()
    }
}

impl TickerFrame {
    pub fn render(&self, draw: &mut DrawContext, panel: Rect, scale: f32, theme: &Theme) {
        let pad = PAD * scale;
        let small = SMALL_DOT * scale;
        let large = LARGE_DOT * scale;

        draw.rect(panel.x, panel.y, panel.width, panel.height, theme.panel);
        let edge = scale.max(1.0);
        draw.rect(panel.x, panel.y, panel.width, edge, theme.panel_border);
        draw.rect(panel.x, panel.y + panel.height - edge, panel.width, edge, theme.panel_border);

        let left = panel.x + pad;
        let right = panel.x + panel.width - pad;
        let mut y = panel.y + pad;

        draw_text(draw, "Development Timeline", left, y, small, 4.0 * scale, theme.muted);
        let digit_h = header_height(scale) * scale;
        let percent_w = font::text_width("%", small, 0.0);
        draw_text(draw, "%", right - percent_w, y + digit_h - font::line_height(small), small, 0.0, theme.muted);
        segments::render_number(
            draw,
            self.loop_percent as u32,
            right - percent_w - 4.0 * scale,
            y,
            digit_h,
            3.0 * scale,
            theme.muted,
        );
        y += digit_h + ROW_GAP * scale;

        let label_y = y + lerp(LABEL_SLIDE_PX * scale, 0.0, self.label_reveal);
        let label_w = draw_text(
            draw,
            &self.label,
            left,
            label_y,
            large,
            LABEL_TRACKING * scale,
            theme.text.fade(self.label_reveal),
        );

        let description = layout_description(&self.label, &self.description, panel.width, scale);
        let slide = lerp(DESCRIPTION_SLIDE_PX * scale, 0.0, self.description_reveal);
        let desc_color = theme.muted.fade(self.description_reveal);
        if description.inline {
            let desc_y = y + font::line_height(large) - font::line_height(small) + slide;
            draw_text(draw, &self.description, left + label_w + DESCRIPTION_GAP * scale, desc_y, small, scale, desc_color);
        } else {
            let mut line_y = y + font::line_height(large) + PIP_GAP * scale + slide;
            for line in &description.lines {
                draw_text(draw, line, left, line_y, small, scale, desc_color);
                line_y += font::line_height(small) + WRAPPED_LINE_GAP * scale;
            }
        }
        y += text_block_height(&description, scale) * scale + ROW_GAP * scale;

        let bar_h = BAR_HEIGHT * scale;
        let bar_w = right - left;
        draw.rect(left, y, bar_w, bar_h, theme.track);
        let fill = bar_w * self.bar_display.clamp(0.0, 1.0);
        // Two-tone fill standing in for the page's gradient.
        draw.rect(left, y, fill * 0.6, bar_h, theme.accent);
        draw.rect(left + fill * 0.6, y, fill * 0.4, bar_h, theme.accent_end);

        // One pip per phase under the bar.
        let pip_y = y + bar_h + PIP_GAP * scale;
        let pip_w = (bar_w - (self.phase_count.saturating_sub(1)) as f32 * 4.0 * scale)
            / self.phase_count.max(1) as f32;
        for i in 0..self.phase_count {
            let color = if i <= self.phase_index { theme.accent } else { theme.track };
            draw.rect(left + i as f32 * (pip_w + 4.0 * scale), pip_y, pip_w, PIP_HEIGHT * scale, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::Phase;
    use std::time::Duration;

    fn scenario() -> Timeline {
        Timeline::new(
            40.0,
            vec![
                Phase::new("Survey", "Walking the plot", 0.0, 0.25),
                Phase::new("Foundation", "Pouring concrete", 0.25, 0.6),
                Phase::new("Skyline", "Lights on", 0.6, 1.0),
            ],
        )
        .unwrap()
    }

    fn frame_at(ticker: &mut Ticker, timeline: &Timeline, secs: f64) -> TickerFrame {
        let clock = FrameClock::sample(Duration::from_secs_f64(secs), timeline);
        ticker.refresh(&clock, timeline)
    }

    #[test]
    fn resolves_phase_and_progress_from_time() {
        let timeline = scenario();
        let mut ticker = Ticker::new();
        let frame = frame_at(&mut ticker, &timeline, 5.0);
        assert_eq!(frame.label, "Survey");
        assert_eq!(frame.description, "Walking the plot");
        assert!((frame.bar_fill - 0.5).abs() < 1e-5);
        assert_eq!(frame.loop_percent, 13);
        assert_eq!(frame.phase_index, 0);
        assert_eq!(frame.phase_count, 3);
    }

    #[test]
    fn wraps_back_to_first_phase() {
        let timeline = scenario();
        let mut ticker = Ticker::new();
        frame_at(&mut ticker, &timeline, 30.0);
        let frame = frame_at(&mut ticker, &timeline, 42.0);
        assert_eq!(frame.label, "Survey");
        assert_eq!(frame.loop_percent, 5);
    }

    #[test]
    fn label_change_restarts_the_reveal() {
        let timeline = scenario();
        let mut ticker = Ticker::new();
        frame_at(&mut ticker, &timeline, 1.0);
        let settled = frame_at(&mut ticker, &timeline, 2.0);
        assert_eq!(settled.label_reveal, 1.0);
        assert_eq!(settled.description_reveal, 1.0);

        // 10 s is the Survey -> Foundation boundary.
        let changed = frame_at(&mut ticker, &timeline, 10.1);
        assert_eq!(changed.label, "Foundation");
        assert_eq!(changed.label_reveal, 0.0);

        let changed = frame_at(&mut ticker, &timeline, 10.3);
        assert!(changed.label_reveal > 0.0 && changed.label_reveal < 1.0);
        assert!(changed.description_reveal < changed.label_reveal);

        let later = frame_at(&mut ticker, &timeline, 10.7);
        assert_eq!(later.label_reveal, 1.0);
    }

    #[test]
    fn shown_phase_has_no_hysteresis() {
        let timeline = scenario();
        let mut fresh = Ticker::new();
        let mut warmed = Ticker::new();
        for s in 0..30 {
            frame_at(&mut warmed, &timeline, s as f64);
        }
        let a = frame_at(&mut fresh, &timeline, 31.0);
        let b = frame_at(&mut warmed, &timeline, 31.0);
        assert_eq!(a.label, b.label);
        assert_eq!(a.bar_fill, b.bar_fill);
        assert_eq!(a.loop_percent, b.loop_percent);
    }

    #[test]
    fn first_frame_shows_the_bar_without_easing() {
        let timeline = scenario();
        let mut ticker = Ticker::new();
        let frame = frame_at(&mut ticker, &timeline, 5.0);
        assert_eq!(frame.bar_display, frame.bar_fill);
    }

    #[test]
    fn bar_eases_back_down_after_a_phase_change() {
        let timeline = scenario();
        let mut ticker = Ticker::new();
        let full = frame_at(&mut ticker, &timeline, 9.95);
        assert!(full.bar_display > 0.99);

        // New phase: the target drops near zero but the drawn bar starts full.
        let changed = frame_at(&mut ticker, &timeline, 10.05);
        assert!(changed.bar_fill < 0.01);
        assert!(changed.bar_display > 0.9);

        let easing = frame_at(&mut ticker, &timeline, 10.25);
        assert!(easing.bar_display > 0.05 && easing.bar_display < 0.5);

        let settled = frame_at(&mut ticker, &timeline, 10.7);
        assert!(settled.bar_display < 0.1);
    }

    #[test]
    fn long_descriptions_wrap_below_the_label() {
        let scale = 1.0;
        let width = 640.0;
        let short = layout_description("Dig", "Soil", width, scale);
        assert!(short.inline);

        let long = layout_description(
            "Structural Frame",
            "Steel and concrete rise floor by floor",
            width,
            scale,
        );
        assert!(!long.inline);
        let inner = width - 2.0 * PAD * scale;
        for line in &long.lines {
            assert!(font::text_width(line, SMALL_DOT * scale, scale) <= inner);
        }
        assert!(panel_height("Structural Frame", "Steel and concrete rise floor by floor", width, scale)
            > panel_height("Dig", "Soil", width, scale));
    }

    #[test]
    fn narrow_panels_wrap_onto_more_lines() {
        let text = "Cranes arrive as podium foundations are poured";
        let wide = layout_description("Foundations", text, 640.0, 1.0);
        let narrow = layout_description("Foundations", text, 240.0, 1.0);
        assert!(narrow.lines.len() > wide.lines.len());
        assert_eq!(narrow.lines.join(" "), text);
    }
}
