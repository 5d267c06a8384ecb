use crate::clock::{ClockSource, MonotonicClock};
use crate::config::Config;
use crate::features::page::{Link, Page, PageLayout};
use crate::features::ticker::{Ticker, TickerFrame};
use crate::gfx::{draw::DrawContext, math::Vec2};
use crate::scene::{Scene, SceneFrame, ScenePainter};
use crate::timeline::{FrameClock, Timeline};
use anyhow::Result;
use log::{debug, info};

const BTN_LEFT: u32 = 0x110;

#[derive(Debug, Clone)]
pub enum UiEvent {
    PointerEnter { pos: Vec2 },
    PointerLeave,
    PointerMove { pos: Vec2 },
    PointerDown { pos: Vec2, button: u32 },
}

pub struct App {
    pub config: Config,
    timeline: Timeline,
    scene: Scene,
    page: Page,
    ticker: Ticker,
    clock: Box<dyn ClockSource>,

    scene_frame: Option<SceneFrame>,
    ticker_frame: Option<TickerFrame>,
    pub needs_redraw: bool,

    viewport: [f32; 2],
    layout: PageLayout,
    hovered_link: Option<usize>,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        Self::with_clock(config, Box::new(MonotonicClock::new()))
    }

    pub fn with_clock(config: Config, clock: Box<dyn ClockSource>) -> Result<Self> {
        let timeline = config.timeline()?;
        info!(
            "Timeline: {} phases over {:?}",
            timeline.phases().len(),
            timeline.loop_duration()
        );
        let scene = Scene::new(&config);
        let page = Page::new(config.page.clone());
        let viewport = [1.0, 1.0];
        let layout = page.layout(viewport, timeline.phases());
        Ok(Self {
            config,
            timeline,
            scene,
            page,
            ticker: Ticker::new(),
            clock,
            scene_frame: None,
            ticker_frame: None,
            needs_redraw: true,
            viewport,
            layout,
            hovered_link: None,
        })
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn scene_frame(&self) -> Option<&SceneFrame> {
        self.scene_frame.as_ref()
    }

    pub fn ticker_frame(&self) -> Option<&TickerFrame> {
        self.ticker_frame.as_ref()
    }

    pub fn layout(&self) -> &PageLayout {
        &self.layout
    }

    pub fn hovered_link(&self) -> Option<usize> {
        self.hovered_link
    }

    fn sample(&self) -> FrameClock {
        FrameClock::sample(self.clock.elapsed(), &self.timeline)
    }

    /// Scene refresh callback: re-derives every entity state from the clock.
    pub fn refresh_scene(&mut self) {
        let clock = self.sample();
        self.scene_frame = Some(self.scene.evaluate(&clock));
        self.needs_redraw = true;
    }

    /// Ticker refresh callback. Samples the clock separately from the scene.
    pub fn refresh_ticker(&mut self) {
        let clock = self.sample();
        let frame = self.ticker.refresh(&clock, &self.timeline);
        if self.ticker_frame.as_ref() != Some(&frame) {
            self.ticker_frame = Some(frame);
            self.needs_redraw = true;
        }
    }

    pub fn set_viewport(&mut self, size: [u32; 2]) {
        let viewport = [size[0].max(1) as f32, size[1].max(1) as f32];
        if viewport != self.viewport {
            debug!("Viewport {}x{}", size[0], size[1]);
            self.viewport = viewport;
            self.layout = self.page.layout(viewport, self.timeline.phases());
            self.hovered_link = None;
            self.needs_redraw = true;
        }
    }

    /// Tracks hover; returns the link to open when one is clicked.
    pub fn handle_event(&mut self, event: UiEvent) -> Option<Link> {
        match event {
            UiEvent::PointerEnter { pos } | UiEvent::PointerMove { pos } => {
                self.hover(self.layout.link_at(pos));
                None
            }
            UiEvent::PointerLeave => {
                self.hover(None);
                None
            }
            UiEvent::PointerDown { pos, button } => {
                if button != BTN_LEFT {
                    return None;
                }
                let index = self.layout.link_at(pos)?;
                self.page.link(index).cloned()
            }
        }
    }

    fn hover(&mut self, link: Option<usize>) {
        if link != self.hovered_link {
            self.hovered_link = link;
            self.needs_redraw = true;
        }
    }

    pub fn render(&mut self, draw: &mut DrawContext) {
        let theme = &self.config.theme;
        draw.begin(self.viewport, theme.background);

        if let Some(frame) = &self.scene_frame {
            let camera = self.scene.camera(self.viewport);
            let mut painter =
                ScenePainter::new(draw, &camera, frame.sun.direction(), theme.background);
            self.scene.render(frame, &mut painter);
        }

        self.page.render(draw, &self.layout, self.hovered_link, theme);
        if let Some(ticker) = &self.ticker_frame {
            ticker.render(draw, self.layout.ticker, self.layout.scale, theme);
        }

        draw.flush();
        self.needs_redraw = false;
    }
}
