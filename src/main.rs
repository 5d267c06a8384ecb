mod app;
mod clock;
mod config;
mod features;
mod gfx;
mod scene;
mod schedule;
mod timeline;
mod wayland;

use anyhow::{anyhow, Result};
use app::App;
use config::Config;
use features::page::open_link;
use gfx::{draw::DrawContext, gl::load_scene_program};
use log::{info, warn};
use schedule::{frame_interval, FrameScheduler};
use std::io::ErrorKind;
use wayland::egl::EglContext;
use wayland::WaylandState;
use wayland_client::backend::WaylandError;
use wayland_client::{Connection, Proxy};
use wayland_protocols_wlr::layer_shell::v1::client::zwlr_layer_surface_v1::Anchor;

fn main() -> Result<()> {
    env_logger::init();
    info!("Starting skyline...");

    let config = Config::load()?;
    let interval = frame_interval(config.fps_cap);
    let layer = config.layer;
    let mut app = App::new(config)?;

    // Connect to Wayland
    let conn = Connection::connect_to_env()?;
    let display = conn.display();

    let mut event_queue = conn.new_event_queue();
    let qh = event_queue.handle();

    let _registry = display.get_registry(&qh, ());

    let mut state = WaylandState::new();
    event_queue.roundtrip(&mut state)?;

    let compositor = state
        .compositor
        .clone()
        .ok_or_else(|| anyhow!("compositor does not advertise wl_compositor"))?;
    let layer_shell = state
        .layer_shell
        .clone()
        .ok_or_else(|| anyhow!("compositor does not support zwlr_layer_shell_v1"))?;

    // One surface covering the whole output.
    let surface = compositor.create_surface(&qh, ());
    let layer_surface = layer_shell.get_layer_surface(
        &surface,
        state.output.as_ref(),
        layer.into(),
        "skyline".to_string(),
        &qh,
        (),
    );
    layer_surface.set_anchor(Anchor::Top | Anchor::Bottom | Anchor::Left | Anchor::Right);
    layer_surface.set_exclusive_zone(-1);
    layer_surface.set_size(0, 0);
    surface.commit();

    state.surface = Some(surface.clone());
    state.layer_surface = Some(layer_surface);

    while !state.configured {
        event_queue.blocking_dispatch(&mut state)?;
    }
    let size = state.surface_size();
    info!("Surface configured at {}x{}", size[0], size[1]);
    app.set_viewport(size);

    let display_ptr = display.id().as_ptr() as *mut _;
    let mut egl = EglContext::new(display_ptr)?;
    egl.create_surface(&surface, size[0] as i32, size[1] as i32)?;

    let gl = unsafe { glow::Context::from_loader_function(|s| egl.get_proc_address(s)) };
    let program = load_scene_program(&gl)?;
    let mut draw_context = DrawContext::new(gl, program)?;

    let mut event_loop: calloop::EventLoop<App> = calloop::EventLoop::try_new()?;
    let scheduler = FrameScheduler::new(event_loop.handle(), interval);
    let mut scene_frames = scheduler.request_frames("scene", App::refresh_scene)?;
    let mut ticker_frames = scheduler.request_frames("ticker", App::refresh_ticker)?;

    info!("Running at up to {} fps", app.config.fps_cap);
    while state.running {
        event_queue.dispatch_pending(&mut state)?;
        event_queue.flush()?;
        if let Some(guard) = event_queue.prepare_read() {
            match guard.read() {
                Ok(_) => {}
                Err(WaylandError::Io(e)) if e.kind() == ErrorKind::WouldBlock => {}
                Err(e) => return Err(e.into()),
            }
        }
        event_queue.dispatch_pending(&mut state)?;

        for ev in state.pending_events.drain(..) {
            if let Some(link) = app.handle_event(ev) {
                if let Err(e) = open_link(&link) {
                    warn!("{:#}", e);
                }
            }
        }

        if state.pending_resize {
            state.pending_resize = false;
            let [w, h] = state.surface_size();
            egl.resize(w as i32, h as i32);
            app.set_viewport([w, h]);
        }

        // Sleeps until the next frame callback is due.
        event_loop.dispatch(Some(interval), &mut app)?;

        if app.needs_redraw {
            egl.make_current()?;
            app.render(&mut draw_context);
            egl.swap_buffers()?;
            surface.commit();
        }
    }

    info!("Shutting down");
    scene_frames.cancel();
    ticker_frames.cancel();
    drop(draw_context);
    drop(egl);

    if let Some(layer_surface) = state.layer_surface.take() {
        layer_surface.destroy();
    }
    surface.destroy();
    event_queue.flush()?;

    Ok(())
}
