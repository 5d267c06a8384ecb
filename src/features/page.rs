use crate::config::Theme;
use crate::features::ticker;
use crate::gfx::draw::DrawContext;
use crate::gfx::font::{self, draw_text, text_width, wrap};
use crate::gfx::math::{Rect, Vec2};
use crate::timeline::Phase;
use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::process::{Child, Command, ExitStatus};
use std::thread::{self, JoinHandle};

// Highlight card metrics, in multiples of the layout scale.
const CARD_WIDTH: f32 = 300.0;
const CARD_PAD: f32 = 16.0;
const CARD_GAP: f32 = 16.0;
const CARD_TITLE_ROW: f32 = 28.0;
const CARD_DOT: f32 = 1.4;
const CARD_LINE_GAP: f32 = 6.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkPlacement {
    Header,
    #[default]
    Footer,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub text: String,
    pub href: String,
    #[serde(default)]
    pub placement: LinkPlacement,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Highlight {
    pub title: String,
    pub description: String,
}

/// Static promotional copy around the timelapse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageCopy {
    pub brand: String,
    pub brand_suffix: String,
    pub eyebrow: String,
    pub headline: String,
    pub intro: String,
    pub highlights: Vec<Highlight>,
    pub tags: Vec<String>,
    pub owner: String,
    pub links: Vec<Link>,
}

impl Default for PageCopy {
    fn default() -> Self {
        let highlight = |title: &str, description: &str| Highlight {
            title: title.to_string(),
            description: description.to_string(),
        };
        let link = |text: &str, href: &str, placement| Link {
            text: text.to_string(),
            href: href.to_string(),
            placement,
        };
        Self {
            brand: "Skyline Estates".to_string(),
            brand_suffix: "Development Group".to_string(),
            eyebrow: "Website Under Development".to_string(),
            headline: "A new city landmark is emerging. Experience the journey from untouched earth to illuminated skyline.".to_string(),
            intro: "Our digital flagship launches alongside the completion of Skyline Residences, a 14-acre community of curated homes, hospitality, and culture. Preview the transformation below and secure your place on the reservation list.".to_string(),
            highlights: vec![
                highlight(
                    "Signature Residences",
                    "Curated homes that capture skyline views, refined amenities, and architecture tailored to discerning owners.",
                ),
                highlight(
                    "Integrated Urban Living",
                    "Walkable promenades, boutique retail, dining, and green corridors connect every address within the master plan.",
                ),
                highlight(
                    "Sustainable Operations",
                    "Geo-thermal systems, smart glass, and water-conscious landscaping reduce consumption without compromising luxury.",
                ),
            ],
            tags: vec![
                "Launching Q1 · 2025".to_string(),
                "Partnered with Atelier Nova".to_string(),
            ],
            owner: "Skyline Estates Development Group".to_string(),
            links: vec![
                link("Request A Brief", "mailto:hello@skylineestates.com", LinkPlacement::Header),
                link(
                    "2150 Meridian Avenue, Suite 280 · Boston, MA",
                    "https://maps.google.com/?q=Skyline%20Estates%20Show%20Gallery",
                    LinkPlacement::Footer,
                ),
                link("+1 (617) 555-0123", "tel:+16175550123", LinkPlacement::Footer),
            ],
        }
    }
}

/// A highlight card sized to its wrapped description.
#[derive(Debug, Clone, PartialEq)]
pub struct HighlightCard {
    pub rect: Rect,
    pub lines: Vec<String>,
}

/// Positions of the interactive and dynamic parts for one surface size.
#[derive(Debug, Clone, PartialEq)]
pub struct PageLayout {
    pub viewport: [f32; 2],
    pub scale: f32,
    pub margin: f32,
    pub ticker: Rect,
    pub links: Vec<Rect>,
    /// Empty when there is no room beside the ticker column.
    pub highlights: Vec<HighlightCard>,
}

impl PageLayout {
    pub fn link_at(&self, pos: Vec2) -> Option<usize> {
        self.links.iter().position(|r| r.contains(pos))
    }
}

pub struct Page {
    copy: PageCopy,
    year: i32,
}

impl Page {
    pub fn new(copy: PageCopy) -> Self {
        let now = time::OffsetDateTime::now_local().unwrap_or_else(|_| time::OffsetDateTime::now_utc());
        Self { copy, year: now.year() }
    }

    pub fn link(&self, index: usize) -> Option<&Link> {
        self.copy.links.get(index)
    }

    /// Lays the page out for `viewport`. The ticker panel is sized for the
    /// tallest of `phases` so it never resizes while the loop plays.
    pub fn layout(&self, viewport: [f32; 2], phases: &[Phase]) -> PageLayout {
        let [w, h] = viewport;
        let scale = (h / 900.0).clamp(0.6, 2.0);
        let margin = 48.0 * scale;
        let small = 1.6 * scale;

        let ticker_w = (640.0 * scale).min(w - margin * 2.0).max(0.0);
        let ticker_h = phases
            .iter()
            .map(|p| ticker::panel_height(&p.label, &p.description, ticker_w, scale))
            .fold(0.0, f32::max);
        let ticker = Rect::new(margin, h - margin - 60.0 * scale - ticker_h, ticker_w, ticker_h);
        let highlights = self.layout_highlights(w, scale, margin, ticker);

        let mut links = Vec::with_capacity(self.copy.links.len());
        let mut footer_right = w - margin;
        let footer_y = h - margin - font::line_height(small);
        for link in &self.copy.links {
            let text_w = text_width(&link.text, small, 2.0 * scale);
            let rect = match link.placement {
                LinkPlacement::Header => {
                    let pad = 14.0 * scale;
                    Rect::new(
                        w - margin - text_w - pad * 2.0,
                        margin,
                        text_w + pad * 2.0,
                        font::line_height(small) + pad * 1.4,
                    )
                }
                LinkPlacement::Footer => {
                    footer_right -= text_w;
                    let r = Rect::new(footer_right, footer_y, text_w, font::line_height(small));
                    footer_right -= 24.0 * scale;
                    r
                }
            };
            links.push(rect);
        }

        PageLayout {
            viewport,
            scale,
            margin,
            ticker,
            links,
            highlights,
        }
    }

    // Cards stack upward from the ticker's bottom edge in the right column.
    fn layout_highlights(&self, w: f32, s: f32, margin: f32, ticker: Rect) -> Vec<HighlightCard> {
        let card_w = CARD_WIDTH * s;
        let x = w - margin - card_w;
        if x < ticker.x + ticker.width + CARD_GAP * s {
            return Vec::new();
        }

        let dot = CARD_DOT * s;
        let pad = CARD_PAD * s;
        let cols = ((card_w - pad * 2.0 + dot + s) / font::advance(dot, s)).floor().max(8.0) as usize;
        let mut cards: Vec<HighlightCard> = self
            .copy
            .highlights
            .iter()
            .map(|card| {
                let lines = wrap(&card.description, cols);
                let n = lines.len() as f32;
                let text_h = n * font::line_height(dot) + (n - 1.0).max(0.0) * CARD_LINE_GAP * s;
                HighlightCard {
                    rect: Rect::new(x, 0.0, card_w, pad * 2.0 + CARD_TITLE_ROW * s + text_h),
                    lines,
                }
            })
            .collect();

        let mut bottom = ticker.y + ticker.height;
        for card in cards.iter_mut().rev() {
            card.rect.y = bottom - card.rect.height;
            bottom = card.rect.y - CARD_GAP * s;
        }
        cards
    }

    pub fn render(&self, draw: &mut DrawContext, layout: &PageLayout, hovered: Option<usize>, theme: &Theme) {
        let [w, h] = layout.viewport;
        let s = layout.scale;
        let m = layout.margin;
        let small = 1.6 * s;

        render_backdrop(draw, w, h, theme);

        // Header
        draw_text(draw, &self.copy.brand, m, m, 1.4 * s, 5.0 * s, theme.accent.fade(0.8));
        draw_text(draw, &self.copy.brand_suffix, m, m + 16.0 * s, 3.6 * s, 1.5 * s, theme.text);

        // Hero copy, above the ticker
        let mut y = m + 110.0 * s;
        draw_text(draw, &self.copy.eyebrow, m, y, small, 6.0 * s, theme.accent.fade(0.7));
        y += 30.0 * s;
        let headline_cols = ((layout.ticker.width / (6.0 * 4.0 * s + s)) as usize).max(12);
        for line in wrap(&self.copy.headline, headline_cols) {
            draw_text(draw, &line, m, y, 4.0 * s, s, theme.text);
            y += font::line_height(4.0 * s) + 14.0 * s;
        }
        y += 10.0 * s;
        let intro_cols = ((layout.ticker.width / (6.0 * small + s)) as usize).max(20);
        for line in wrap(&self.copy.intro, intro_cols) {
            if y + font::line_height(small) > layout.ticker.y - 20.0 * s {
                break;
            }
            draw_text(draw, &line, m, y, small, s, theme.muted);
            y += font::line_height(small) + 10.0 * s;
        }

        self.render_highlights(draw, layout, theme);

        // Footer
        let footer_y = h - m - font::line_height(small);
        draw.rect(m, footer_y - 24.0 * s, w - m * 2.0, s.max(1.0), theme.panel_border);
        let owner = format!("© {} {}", self.year, self.copy.owner);
        draw_text(draw, &owner, m, footer_y, small, 2.0 * s, theme.muted);

        for (i, (link, rect)) in self.copy.links.iter().zip(&layout.links).enumerate() {
            let hot = hovered == Some(i);
            let color = if hot { theme.text } else { theme.muted };
            match link.placement {
                LinkPlacement::Header => {
                    let fill = if hot { theme.panel_border } else { theme.panel };
                    draw.rect(rect.x, rect.y, rect.width, rect.height, fill);
                    let pad = 14.0 * s;
                    draw_text(draw, &link.text, rect.x + pad, rect.y + pad * 0.7, small, 2.0 * s, theme.text);
                }
                LinkPlacement::Footer => {
                    draw_text(draw, &link.text, rect.x, rect.y, small, 2.0 * s, color);
                }
            }
        }
    }

    fn render_highlights(&self, draw: &mut DrawContext, layout: &PageLayout, theme: &Theme) {
        let s = layout.scale;
        let pad = CARD_PAD * s;
        let dot = CARD_DOT * s;
        for (card, placed) in self.copy.highlights.iter().zip(&layout.highlights) {
            let r = placed.rect;
            draw.rect(r.x, r.y, r.width, r.height, theme.panel);
            draw_text(draw, &card.title, r.x + pad, r.y + pad, 2.0 * s, s, theme.text);
            let mut line_y = r.y + pad + CARD_TITLE_ROW * s;
            for line in &placed.lines {
                draw_text(draw, line, r.x + pad, line_y, dot, s, theme.muted);
                line_y += font::line_height(dot) + CARD_LINE_GAP * s;
            }
        }

        let Some(first) = layout.highlights.first() else {
            return;
        };
        let mut tag_x = first.rect.x;
        let tag_y = layout.ticker.y + layout.ticker.height + 20.0 * s;
        for tag in &self.copy.tags {
            let tw = draw_text(draw, tag, tag_x, tag_y, 1.2 * s, 3.0 * s, theme.muted);
            tag_x += tw + 24.0 * s;
        }
    }
}

/// Darkening bands so the copy stays readable over the scene.
fn render_backdrop(draw: &mut DrawContext, w: f32, h: f32, theme: &Theme) {
    const BANDS: usize = 24;
    let band_h = h / BANDS as f32;
    for i in 0..BANDS {
        let t = i as f32 / (BANDS - 1) as f32;
        // Heavy at the top, light in the middle, heaviest at the bottom.
        let alpha = if t < 0.5 {
            0.55 + (0.15 - 0.55) * (t / 0.5)
        } else {
            0.15 + (0.7 - 0.15) * ((t - 0.5) / 0.5)
        };
        draw.rect(0.0, i as f32 * band_h, w, band_h + 1.0, theme.background.with_alpha(alpha));
    }
}

/// Hands a link to the desktop's default handler.
pub fn open_link(link: &Link) -> Result<()> {
    info!("Opening link {} ({})", link.text, link.href);
    let child = Command::new("xdg-open")
        .arg(&link.href)
        .spawn()
        .with_context(|| format!("failed to launch xdg-open for {}", link.href))?;
    reap(child, link.href.clone());
    Ok(())
}

/// Waits for `child` off the render thread so it never lingers as a zombie.
fn reap(mut child: Child, href: String) -> JoinHandle<Option<ExitStatus>> {
    thread::spawn(move || match child.wait() {
        Ok(status) => {
            if !status.success() {
                warn!("xdg-open {} exited with {}", href, status);
            }
            Some(status)
        }
        Err(e) => {
            warn!("Failed to wait for xdg-open {}: {}", href, e);
            None
        }
    })
}
