use std::sync::Arc;
use std::time::Instant;
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::KeyCode;
use winit::window::{Window, WindowAttributes, WindowId};

use crate::camera::CameraMode;
use crate::config::AppConfig;
use crate::error::InitError;
use crate::frame::FrameState;
use crate::gpu::GpuContext;
use crate::input::Input;
use crate::renderer::InstancedRenderer;
use crate::texture::Texture;
use crate::ui::{SettingsPanel, UiPass};

/// Seed for the built-in checker texture grain.
const CHECKER_SEED: u32 = 0x5eed;

/// Open a window and animate the mobile until it is closed.
///
/// The config is validated first, so builder-made configs get the same checks
/// as ones read from TOML. Returns the first fatal error hit while validating
/// or while bringing up the window, device or GPU resources.
///
/// # Example
/// ```ignore
/// instanced_mobile::run(AppConfig::new().title("Mobile").size(800, 600))?;
/// ```
pub fn run(config: AppConfig) -> Result<(), InitError> {
    config.validate()?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    log::info!(
        "starting: {}x{}, layout {}, capacity {} instances",
        config.width,
        config.height,
        config.layout.name(),
        config.max_instances()
    );

    let mut app = MobileApp::Pending { config };
    event_loop.run_app(&mut app)?;

    match app {
        MobileApp::Failed(err) => Err(err),
        _ => Ok(()),
    }
}

enum MobileApp {
    Pending { config: AppConfig },
    Running(Box<Running>),
    Failed(InitError),
}

struct Running {
    window: Arc<Window>,
    gpu: GpuContext,
    renderer: InstancedRenderer,
    ui: UiPass,
    panel: SettingsPanel,
    input: Input,
    state: FrameState,
    title: String,
    max_grid_size: u32,
    last_frame: Instant,
}

impl Running {
    fn new(event_loop: &ActiveEventLoop, config: &AppConfig) -> Result<Self, InitError> {
        let window_attrs = WindowAttributes::default()
            .with_title(&config.title)
            .with_inner_size(winit::dpi::LogicalSize::new(config.width, config.height));

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        let gpu = GpuContext::new(window.clone(), config.vsync)?;

        let texture = match &config.texture {
            Some(path) => Texture::from_file(&gpu, path)?,
            None => Texture::checker(&gpu, CHECKER_SEED),
        };

        let renderer = InstancedRenderer::new(&gpu, &texture, config.max_instances())?;
        log::info!(
            "cube texture {}x{}, instance capacity {}",
            texture.width,
            texture.height,
            renderer.max_instances()
        );
        let ui = UiPass::new(&gpu);

        let state = FrameState {
            camera_mode: CameraMode::from_index(config.camera_mode),
            layout: config.layout,
            grid_size: config.effective_grid_size(),
            spin_rate: config.spin_rate,
            ..FrameState::default()
        };

        let running = Self {
            window,
            gpu,
            renderer,
            ui,
            panel: SettingsPanel::default(),
            input: Input::new(),
            state,
            title: config.title.clone(),
            max_grid_size: config.max_grid_size,
            last_frame: Instant::now(),
        };
        running.update_title();
        Ok(running)
    }

    fn update_title(&self) {
        let layout = self.state.layout;
        self.window.set_title(&format!(
            "{} | camera: {} | layout: {} | {} instances",
            self.title,
            self.state.camera_mode.name(),
            layout.name(),
            layout.instance_count(self.state.grid_size)
        ));
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.gpu.resize(width, height);
        self.renderer.ensure_depth_size(&self.gpu);
    }

    /// Render one frame. Returns false when the app should exit.
    fn redraw(&mut self) -> bool {
        let now = Instant::now();
        let dt = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        if self
            .panel
            .update(&self.input, &mut self.state, self.max_grid_size)
        {
            self.update_title();
        }

        let output = match self.gpu.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("surface lost or outdated, reconfiguring");
                self.gpu.reconfigure();
                return true;
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("surface acquire failed: out of memory");
                return false;
            }
            Err(err) => {
                log::warn!("skipping frame: {}", err);
                return true;
            }
        };

        let plan = self.state.next_frame(dt, self.gpu.aspect());
        if let Err(err) = self.renderer.prepare(&plan) {
            log::error!("{}", err);
            return false;
        }

        self.ui.clear();
        self.ui
            .extend(&self.panel.quads(&self.state, self.max_grid_size));

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        {
            let mut render_pass = self.renderer.begin_pass(&mut encoder, &view);
            self.renderer.draw(&mut render_pass, plan.draw);
            self.ui.render(&self.gpu, &mut render_pass);
        }

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        true
    }
}

impl ApplicationHandler for MobileApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let MobileApp::Pending { config } = self {
            match Running::new(event_loop, config) {
                Ok(running) => *self = MobileApp::Running(Box::new(running)),
                Err(err) => {
                    log::error!("initialization failed: {}", err);
                    *self = MobileApp::Failed(err);
                    event_loop.exit();
                }
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let MobileApp::Running(app) = self else {
            return;
        };

        app.input.handle_event(&event);
        if app.input.key_pressed(KeyCode::Escape) {
            event_loop.exit();
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                app.resize(size.width, size.height);
            }
            WindowEvent::RedrawRequested => {
                if !app.redraw() {
                    event_loop.exit();
                    return;
                }
                app.input.begin_frame();
                app.window.request_redraw();
            }
            _ => {}
        }
    }
}
