//! Settings overlay.
//!
//! [`SettingsPanel`] lays out a small floating panel of widgets and maps clicks
//! and key presses onto the [`FrameState`]:
//!
//! | Widget              | Click              | Key          |
//! |---------------------|--------------------|--------------|
//! | Camera radio row    | select camera mode | `0`–`4`      |
//! | Layout checkbox     | mobile / grid      | `G`          |
//! | Grid size `-` / `+` | shrink / grow grid | `Down`/`Up`  |
//!
//! Changes take effect in the same frame they are reported. [`UiPass`] draws
//! the panel as flat quads on top of the scene.

use glam::Vec2;
use winit::event::MouseButton;
use winit::keyboard::KeyCode;

use crate::camera::CameraMode;
use crate::frame::FrameState;
use crate::generator::InstanceLayout;
use crate::gpu::GpuContext;
use crate::input::Input;

/// A rectangle in screen-space pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x
            && point.x < self.x + self.width
            && point.y >= self.y
            && point.y < self.y + self.height
    }

    /// Shrink by `amount` on every side.
    pub fn inset(&self, amount: f32) -> Self {
        Self::new(
            self.x + amount,
            self.y + amount,
            (self.width - 2.0 * amount).max(0.0),
            (self.height - 2.0 * amount).max(0.0),
        )
    }
}

/// RGBA color.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Panel background.
    pub const PANEL_BG: Color = Color::rgba(0.1, 0.1, 0.1, 0.85);
    pub const PANEL_BORDER: Color = Color::rgba(0.4, 0.4, 0.4, 1.0);
    pub const TITLE_BG: Color = Color::rgba(0.15, 0.15, 0.15, 0.95);
    pub const WIDGET: Color = Color::rgba(0.3, 0.3, 0.32, 1.0);
    pub const WIDGET_DISABLED: Color = Color::rgba(0.18, 0.18, 0.18, 1.0);
    pub const ACCENT: Color = Color::rgba(0.26, 0.59, 0.98, 1.0);
}

/// Something in the panel that reacts to input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Widget {
    Camera(CameraMode),
    LayoutToggle,
    GridDown,
    GridUp,
}

impl Widget {
    /// Keyboard shortcut for a widget.
    pub fn for_key(key: KeyCode) -> Option<Self> {
        let widget = match key {
            KeyCode::Digit0 | KeyCode::Numpad0 => Widget::Camera(CameraMode::Default),
            KeyCode::Digit1 | KeyCode::Numpad1 => Widget::Camera(CameraMode::Front),
            KeyCode::Digit2 | KeyCode::Numpad2 => Widget::Camera(CameraMode::Top),
            KeyCode::Digit3 | KeyCode::Numpad3 => Widget::Camera(CameraMode::Side),
            KeyCode::Digit4 | KeyCode::Numpad4 => Widget::Camera(CameraMode::Bottom),
            KeyCode::KeyG => Widget::LayoutToggle,
            KeyCode::ArrowDown => Widget::GridDown,
            KeyCode::ArrowUp => Widget::GridUp,
            _ => return None,
        };
        Some(widget)
    }

    /// Apply the widget's action. Returns true if the state changed.
    pub fn apply(self, state: &mut FrameState, max_grid_size: u32) -> bool {
        match self {
            Widget::Camera(mode) => {
                let changed = state.camera_mode != mode;
                state.camera_mode = mode;
                changed
            }
            Widget::LayoutToggle => {
                state.layout = state.layout.toggled();
                true
            }
            Widget::GridDown | Widget::GridUp if state.layout != InstanceLayout::Grid => false,
            Widget::GridDown => {
                let size = state.grid_size.saturating_sub(1).max(1);
                let changed = size != state.grid_size;
                state.grid_size = size;
                changed
            }
            Widget::GridUp => {
                let size = (state.grid_size + 1).min(max_grid_size);
                let changed = size != state.grid_size;
                state.grid_size = size;
                changed
            }
        }
    }
}

const ROW_HEIGHT: f32 = 24.0;
const PANEL_WIDTH: f32 = 180.0;
const BOX_SIZE: f32 = 14.0;
const PADDING: f32 = 8.0;

/// Layout and input handling for the settings panel.
#[derive(Clone, Copy, Debug)]
pub struct SettingsPanel {
    origin: Vec2,
}

impl Default for SettingsPanel {
    fn default() -> Self {
        Self::new(Vec2::new(10.0, 10.0))
    }
}

impl SettingsPanel {
    pub fn new(origin: Vec2) -> Self {
        Self { origin }
    }

    /// Title bar, five camera rows, the layout row, the grid row.
    const ROWS: usize = 8;

    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.origin.x,
            self.origin.y,
            PANEL_WIDTH,
            ROW_HEIGHT * Self::ROWS as f32,
        )
    }

    fn row(&self, index: usize) -> Rect {
        Rect::new(
            self.origin.x,
            self.origin.y + ROW_HEIGHT * index as f32,
            PANEL_WIDTH,
            ROW_HEIGHT,
        )
    }

    /// The square box at the start of a row.
    fn row_box(&self, index: usize) -> Rect {
        let row = self.row(index);
        Rect::new(
            row.x + PADDING,
            row.y + (ROW_HEIGHT - BOX_SIZE) / 2.0,
            BOX_SIZE,
            BOX_SIZE,
        )
    }

    fn camera_row(mode: CameraMode) -> usize {
        1 + mode.index()
    }

    const LAYOUT_ROW: usize = 6;
    const GRID_ROW: usize = 7;

    fn grid_down_box(&self) -> Rect {
        self.row_box(Self::GRID_ROW)
    }

    fn grid_up_box(&self) -> Rect {
        let row = self.row(Self::GRID_ROW);
        let left = self.row_box(Self::GRID_ROW);
        Rect::new(row.x + row.width - PADDING - BOX_SIZE, left.y, BOX_SIZE, BOX_SIZE)
    }

    fn grid_track(&self) -> Rect {
        let down = self.grid_down_box();
        let up = self.grid_up_box();
        let x = down.x + down.width + PADDING;
        Rect::new(x, down.y + BOX_SIZE / 2.0 - 2.0, up.x - PADDING - x, 4.0)
    }

    /// The widget under `point`, if any. Whole camera and layout rows are clickable.
    pub fn hit(&self, point: Vec2) -> Option<Widget> {
        if !self.bounds().contains(point) {
            return None;
        }

        for mode in CameraMode::ALL {
            if self.row(Self::camera_row(mode)).contains(point) {
                return Some(Widget::Camera(mode));
            }
        }
        if self.row(Self::LAYOUT_ROW).contains(point) {
            return Some(Widget::LayoutToggle);
        }
        if self.grid_down_box().contains(point) {
            return Some(Widget::GridDown);
        }
        if self.grid_up_box().contains(point) {
            return Some(Widget::GridUp);
        }
        None
    }

    /// Apply this frame's clicks and shortcuts to `state`.
    ///
    /// Returns true if anything changed.
    pub fn update(&self, input: &Input, state: &mut FrameState, max_grid_size: u32) -> bool {
        let mut changed = false;

        if input.mouse_pressed(MouseButton::Left) {
            if let Some(widget) = self.hit(input.mouse_position()) {
                changed |= widget.apply(state, max_grid_size);
            }
        }

        for key in input.keys_pressed() {
            if let Some(widget) = Widget::for_key(key) {
                changed |= widget.apply(state, max_grid_size);
            }
        }

        if changed {
            log::debug!(
                "settings: camera {:?}, layout {:?}, grid {}",
                state.camera_mode,
                state.layout,
                state.grid_size
            );
        }
        changed
    }

    /// Quads that draw the panel for `state`, back to front.
    pub fn quads(&self, state: &FrameState, max_grid_size: u32) -> Vec<(Rect, Color)> {
        let bounds = self.bounds();
        let mut quads = vec![
            (bounds, Color::PANEL_BORDER),
            (bounds.inset(1.0), Color::PANEL_BG),
            (self.row(0).inset(1.0), Color::TITLE_BG),
        ];

        for mode in CameraMode::ALL {
            let radio = self.row_box(Self::camera_row(mode));
            quads.push((radio, Color::WIDGET));
            if mode == state.camera_mode {
                quads.push((radio.inset(3.0), Color::ACCENT));
            }
        }

        let checkbox = self.row_box(Self::LAYOUT_ROW);
        quads.push((checkbox, Color::WIDGET));
        if state.layout == InstanceLayout::Grid {
            quads.push((checkbox.inset(3.0), Color::ACCENT));
        }

        let grid_enabled = state.layout == InstanceLayout::Grid;
        let widget = if grid_enabled {
            Color::WIDGET
        } else {
            Color::WIDGET_DISABLED
        };
        let track = self.grid_track();
        quads.push((self.grid_down_box(), widget));
        quads.push((self.grid_up_box(), widget));
        quads.push((track, widget));
        if grid_enabled {
            let fraction = state.grid_size as f32 / max_grid_size.max(1) as f32;
            let fill = Rect::new(track.x, track.y, track.width * fraction.min(1.0), track.height);
            quads.push((fill, Color::ACCENT));
        }

        quads
    }
}

/// Vertex for UI quads.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct UiVertex {
    position: [f32; 2],
    color: [f32; 4],
}

impl UiVertex {
    const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<UiVertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x2,
            },
            wgpu::VertexAttribute {
                offset: 8,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x4,
            },
        ],
    };
}

/// Uniforms for the UI shader.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct UiUniforms {
    resolution: [f32; 2],
    _padding: [f32; 2],
}

const MAX_VERTICES: usize = 1024;

/// Immediate-mode quad renderer for the overlay.
///
/// Draws on top of the scene with alpha blending and no depth test.
pub struct UiPass {
    pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    vertices: Vec<UiVertex>,
}

impl UiPass {
    pub fn new(gpu: &GpuContext) -> Self {
        let device = &gpu.device;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("UI Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/ui.wgsl").into()),
        });

        let vertex_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("UI Vertex Buffer"),
            size: (MAX_VERTICES * std::mem::size_of::<UiVertex>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("UI Uniforms"),
            size: std::mem::size_of::<UiUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("UI Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("UI Bind Group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("UI Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("UI Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs"),
                buffers: &[UiVertex::LAYOUT],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: gpu.config.format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            // The cube pass's depth attachment is still bound; the overlay ignores it.
            depth_stencil: Some(wgpu::DepthStencilState {
                format: crate::renderer::DEPTH_FORMAT,
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::Always,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Self {
            pipeline,
            vertex_buffer,
            uniform_buffer,
            bind_group,
            vertices: Vec::with_capacity(MAX_VERTICES),
        }
    }

    /// Clear all queued quads.
    pub fn clear(&mut self) {
        self.vertices.clear();
    }

    /// Queue quads for this frame. Quads past the vertex budget are dropped.
    pub fn extend(&mut self, quads: &[(Rect, Color)]) {
        for (rect, color) in quads {
            if self.vertices.len() + 6 > MAX_VERTICES {
                log::warn!("UI vertex budget exhausted, dropping quads");
                break;
            }
            self.push_quad(rect, color);
        }
    }

    fn push_quad(&mut self, rect: &Rect, color: &Color) {
        let x0 = rect.x;
        let y0 = rect.y;
        let x1 = rect.x + rect.width;
        let y1 = rect.y + rect.height;
        let c = [color.r, color.g, color.b, color.a];

        for position in [[x0, y0], [x1, y0], [x0, y1], [x1, y0], [x1, y1], [x0, y1]] {
            self.vertices.push(UiVertex { position, color: c });
        }
    }

    /// Render all queued quads into the current pass.
    pub fn render(&self, gpu: &GpuContext, render_pass: &mut wgpu::RenderPass) {
        if self.vertices.is_empty() {
            return;
        }

        let uniforms = UiUniforms {
            resolution: [gpu.width() as f32, gpu.height() as f32],
            _padding: [0.0, 0.0],
        };
        gpu.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[uniforms]));

        gpu.queue
            .write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(&self.vertices));

        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.draw(0..self.vertices.len() as u32, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panel() -> SettingsPanel {
        SettingsPanel::new(Vec2::new(10.0, 10.0))
    }

    fn grid_state(grid_size: u32) -> FrameState {
        FrameState {
            layout: InstanceLayout::Grid,
            grid_size,
            ..FrameState::default()
        }
    }

    fn center(rect: Rect) -> Vec2 {
        Vec2::new(rect.x + rect.width / 2.0, rect.y + rect.height / 2.0)
    }

    #[test]
    fn click_selects_camera_row() {
        let panel = panel();
        for mode in CameraMode::ALL {
            let row = panel.row(SettingsPanel::camera_row(mode));
            assert_eq!(panel.hit(center(row)), Some(Widget::Camera(mode)));
        }
    }

    #[test]
    fn clicks_outside_panel_miss() {
        let panel = panel();
        assert_eq!(panel.hit(Vec2::new(5.0, 5.0)), None);
        assert_eq!(panel.hit(Vec2::new(500.0, 40.0)), None);
        // Title bar is inert.
        assert_eq!(panel.hit(center(panel.row(0))), None);
    }

    #[test]
    fn grid_buttons_hit() {
        let panel = panel();
        assert_eq!(panel.hit(center(panel.grid_down_box())), Some(Widget::GridDown));
        assert_eq!(panel.hit(center(panel.grid_up_box())), Some(Widget::GridUp));
        assert_eq!(panel.hit(center(panel.grid_track())), None);
    }

    #[test]
    fn camera_selection_reports_changes() {
        let mut state = FrameState::default();
        assert!(Widget::Camera(CameraMode::Top).apply(&mut state, 32));
        assert_eq!(state.camera_mode, CameraMode::Top);
        assert!(!Widget::Camera(CameraMode::Top).apply(&mut state, 32));
    }

    #[test]
    fn grid_size_stays_in_range() {
        let mut state = grid_state(1);
        assert!(!Widget::GridDown.apply(&mut state, 4));
        assert_eq!(state.grid_size, 1);

        let mut state = grid_state(4);
        assert!(!Widget::GridUp.apply(&mut state, 4));
        assert!(Widget::GridDown.apply(&mut state, 4));
        assert_eq!(state.grid_size, 3);
    }

    #[test]
    fn grid_buttons_inactive_for_mobile() {
        let mut state = FrameState {
            grid_size: 3,
            ..FrameState::default()
        };
        assert!(!Widget::GridUp.apply(&mut state, 8));
        assert_eq!(state.grid_size, 3);
    }

    #[test]
    fn keys_map_to_widgets() {
        assert_eq!(
            Widget::for_key(KeyCode::Digit2),
            Some(Widget::Camera(CameraMode::Top))
        );
        assert_eq!(Widget::for_key(KeyCode::KeyG), Some(Widget::LayoutToggle));
        assert_eq!(Widget::for_key(KeyCode::KeyQ), None);
    }

    #[test]
    fn selected_radio_is_highlighted() {
        let panel = panel();
        let state = FrameState {
            camera_mode: CameraMode::Side,
            ..FrameState::default()
        };
        let quads = panel.quads(&state, 32);
        let highlight = panel.row_box(SettingsPanel::camera_row(CameraMode::Side)).inset(3.0);

        let accents: Vec<_> = quads.iter().filter(|(_, c)| *c == Color::ACCENT).collect();
        assert_eq!(accents.len(), 1);
        assert_eq!(accents[0].0, highlight);
    }

    #[test]
    fn grid_fill_tracks_grid_size() {
        let panel = panel();
        let quads = panel.quads(&grid_state(8), 32);
        let track = panel.grid_track();
        let fill = quads
            .iter()
            .find(|(r, c)| *c == Color::ACCENT && r.y == track.y)
            .map(|(r, _)| r.width)
            .unwrap();
        assert!((fill - track.width / 4.0).abs() < 1e-4);
    }
}
