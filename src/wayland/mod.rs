pub mod egl;

use crate::app::UiEvent;
use crate::config::LayerKind;
use crate::gfx::math::Vec2;
use log::{debug, info};
use wayland_client::{
    protocol::{wl_compositor, wl_output, wl_pointer, wl_registry, wl_seat, wl_surface},
    Connection, Dispatch, QueueHandle, WEnum,
};
use wayland_protocols_wlr::layer_shell::v1::client::{zwlr_layer_shell_v1, zwlr_layer_surface_v1};

impl From<LayerKind> for zwlr_layer_shell_v1::Layer {
    fn from(kind: LayerKind) -> Self {
        match kind {
            LayerKind::Background => zwlr_layer_shell_v1::Layer::Background,
            LayerKind::Bottom => zwlr_layer_shell_v1::Layer::Bottom,
            LayerKind::Top => zwlr_layer_shell_v1::Layer::Top,
            LayerKind::Overlay => zwlr_layer_shell_v1::Layer::Overlay,
        }
    }
}

pub struct WaylandState {
    pub running: bool,
    pub configured: bool,
    pub compositor: Option<wl_compositor::WlCompositor>,
    pub layer_shell: Option<zwlr_layer_shell_v1::ZwlrLayerShellV1>,
    pub surface: Option<wl_surface::WlSurface>,
    pub layer_surface: Option<zwlr_layer_surface_v1::ZwlrLayerSurfaceV1>,
    pub seat: Option<wl_seat::WlSeat>,
    pub output: Option<wl_output::WlOutput>,
    pub output_size: Option<[u32; 2]>,
    pub pointer: Option<wl_pointer::WlPointer>,
    pub surface_pos: Vec2,
    pub pending_events: Vec<UiEvent>,
    /// Size from the latest configure; the compositor picks it for a fully anchored surface.
    pub configured_size: Option<[u32; 2]>,
    pub pending_resize: bool,
}

impl WaylandState {
    pub fn new() -> Self {
        Self {
            running: true,
            configured: false,
            compositor: None,
            layer_shell: None,
            surface: None,
            layer_surface: None,
            seat: None,
            output: None,
            output_size: None,
            pointer: None,
            surface_pos: Vec2::new(0.0, 0.0),
            pending_events: Vec::new(),
            configured_size: None,
            pending_resize: false,
        }
    }

    /// Configured size, then the output mode, then a fixed fallback.
    pub fn surface_size(&self) -> [u32; 2] {
        self.configured_size
            .or(self.output_size)
            .unwrap_or([1920, 1080])
    }
}

impl Default for WaylandState {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatch<wl_registry::WlRegistry, ()> for WaylandState {
    fn event(
        state: &mut Self,
        registry: &wl_registry::WlRegistry,
        event: wl_registry::Event,
        _: &(),
        _: &Connection,
        qh: &QueueHandle<Self>,
    ) {
        if let wl_registry::Event::Global {
            name,
            interface,
            version,
        } = event
        {
            match &interface[..] {
                "wl_compositor" => {
                    let compositor = registry.bind::<wl_compositor::WlCompositor, _, _>(
                        name,
                        version.min(4),
                        qh,
                        (),
                    );
                    state.compositor = Some(compositor);
                }
                "zwlr_layer_shell_v1" => {
                    let layer_shell = registry.bind::<zwlr_layer_shell_v1::ZwlrLayerShellV1, _, _>(
                        name,
                        version.min(1),
                        qh,
                        (),
                    );
                    state.layer_shell = Some(layer_shell);
                }
                "wl_seat" => {
                    let seat = registry.bind::<wl_seat::WlSeat, _, _>(name, version.min(5), qh, ());
                    state.seat = Some(seat);
                }
                // First output only; the wallpaper lives on one screen.
                "wl_output" if state.output.is_none() => {
                    let output = registry.bind::<wl_output::WlOutput, _, _>(name, version.min(2), qh, ());
                    state.output = Some(output);
                }
                _ => {}
            }
        }
    }
}

impl Dispatch<wl_compositor::WlCompositor, ()> for WaylandState {
    fn event(_: &mut Self, _: &wl_compositor::WlCompositor, _: wl_compositor::Event, _: &(), _: &Connection, _: &QueueHandle<Self>) {}
}

impl Dispatch<wl_surface::WlSurface, ()> for WaylandState {
    fn event(_: &mut Self, _: &wl_surface::WlSurface, _: wl_surface::Event, _: &(), _: &Connection, _: &QueueHandle<Self>) {}
}

impl Dispatch<wl_pointer::WlPointer, ()> for WaylandState {
    fn event(
        state: &mut Self,
        _: &wl_pointer::WlPointer,
        event: wl_pointer::Event,
        _: &(),
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
        match event {
            wl_pointer::Event::Enter { surface_x, surface_y, .. } => {
                state.surface_pos = Vec2::new(surface_x as f32, surface_y as f32);
                state.pending_events.push(UiEvent::PointerEnter { pos: state.surface_pos });
            }
            wl_pointer::Event::Leave { .. } => {
                state.pending_events.push(UiEvent::PointerLeave);
                state.surface_pos = Vec2::new(0.0, 0.0);
            }
            wl_pointer::Event::Motion { surface_x, surface_y, .. } => {
                state.surface_pos = Vec2::new(surface_x as f32, surface_y as f32);
                state.pending_events.push(UiEvent::PointerMove { pos: state.surface_pos });
            }
            wl_pointer::Event::Button {
                button,
                state: WEnum::Value(wl_pointer::ButtonState::Pressed),
                ..
            } => {
                state.pending_events.push(UiEvent::PointerDown { pos: state.surface_pos, button });
            }
            _ => {}
        }
    }
}

impl Dispatch<wl_seat::WlSeat, ()> for WaylandState {
    fn event(
        state: &mut Self,
        seat: &wl_seat::WlSeat,
        event: wl_seat::Event,
        _: &(),
        _: &Connection,
        qh: &QueueHandle<Self>,
    ) {
        if let wl_seat::Event::Capabilities { capabilities: WEnum::Value(caps) } = event {
            if caps.contains(wl_seat::Capability::Pointer) && state.pointer.is_none() {
                state.pointer = Some(seat.get_pointer(qh, ()));
            }
        }
    }
}

impl Dispatch<wl_output::WlOutput, ()> for WaylandState {
    fn event(
        state: &mut Self,
        _: &wl_output::WlOutput,
        event: wl_output::Event,
        _: &(),
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
        if let wl_output::Event::Mode { width, height, .. } = event {
            state.output_size = Some([width as u32, height as u32]);
        }
    }
}

impl Dispatch<zwlr_layer_shell_v1::ZwlrLayerShellV1, ()> for WaylandState {
    fn event(_: &mut Self, _: &zwlr_layer_shell_v1::ZwlrLayerShellV1, _: zwlr_layer_shell_v1::Event, _: &(), _: &Connection, _: &QueueHandle<Self>) {}
}

impl Dispatch<zwlr_layer_surface_v1::ZwlrLayerSurfaceV1, ()> for WaylandState {
    fn event(
        state: &mut Self,
        surface: &zwlr_layer_surface_v1::ZwlrLayerSurfaceV1,
        event: zwlr_layer_surface_v1::Event,
        _: &(),
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
        match event {
            zwlr_layer_surface_v1::Event::Configure {
                serial,
                width,
                height,
            } => {
                debug!("Layer surface configured: {}x{} (serial {})", width, height, serial);
                if width > 0 && height > 0 && state.configured_size != Some([width, height]) {
                    state.configured_size = Some([width, height]);
                    state.pending_resize = state.configured;
                }
                surface.ack_configure(serial);
                state.configured = true;
            }
            zwlr_layer_surface_v1::Event::Closed => {
                info!("Layer surface closed by compositor");
                state.running = false;
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surface_size_prefers_configure() {
        let mut state = WaylandState::new();
        assert_eq!(state.surface_size(), [1920, 1080]);
        state.output_size = Some([2560, 1440]);
        assert_eq!(state.surface_size(), [2560, 1440]);
        state.configured_size = Some([2560, 1400]);
        assert_eq!(state.surface_size(), [2560, 1400]);
    }

    #[test]
    fn layer_kinds_map_to_protocol_layers() {
        let layer: zwlr_layer_shell_v1::Layer = LayerKind::Background.into();
        assert_eq!(layer, zwlr_layer_shell_v1::Layer::Background);
        let layer: zwlr_layer_shell_v1::Layer = LayerKind::Overlay.into();
        assert_eq!(layer, zwlr_layer_shell_v1::Layer::Overlay);
    }
}
