//! Falcon Flight - fly a spaceship through a skybox under a ship-mounted spotlight

mod assets;
mod config;
mod controls;
mod events;
mod flight;
mod flight_scene;
mod help_panel;
mod layout;
mod render;
mod update;

use anyhow::Result;
use clap::Parser;
use engine_core::Time;
use renderer::{Model, Renderer};
use std::path::PathBuf;
use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::assets::{AssetKind, AssetLoader};
use crate::config::DemoConfig;
use crate::controls::Controls;
use crate::flight_scene::FlightScene;
use crate::layout::{logical_width, ship_model_scale, ScreenLayout};
use crate::render::overlay::OverlayView;

#[derive(Parser, Debug)]
#[command(author, version, about = "Fly a spaceship through a skybox", long_about = None)]
struct Cli {
    /// Config file (RON). Defaults to falcon.ron in the working directory.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Write the effective config to the config path and exit.
    #[arg(long)]
    write_config: bool,
    /// Override the window width (logical pixels).
    #[arg(long)]
    width: Option<u32>,
    /// Override the window height (logical pixels).
    #[arg(long)]
    height: Option<u32>,
}

/// Everything the running demo owns.
pub struct DemoState {
    renderer: Renderer,
    config: DemoConfig,
    time: Time,
    controls: Controls,
    layout: ScreenLayout,
    world: FlightScene,
    /// GPU models, indexed by `ModelId`.
    models: Vec<Model>,
    loader: AssetLoader,
    /// Last reported ship load percentage.
    ship_progress: f32,
    running: bool,
}

impl DemoState {
    async fn new(window: Arc<Window>, config: DemoConfig) -> Result<Self> {
        let renderer = Renderer::new(window.clone(), config.window.vsync).await?;
        let size = renderer.size;

        let mut world = FlightScene::new(&config)?;
        world.camera.set_aspect(size.width, size.height);

        let mut loader = AssetLoader::new();
        loader.spawn(AssetKind::Skybox, config.assets.skybox.clone());
        loader.spawn(AssetKind::Ship, config.assets.ship.clone());

        let mut state = Self {
            layout: ScreenLayout::new(size.width, size.height, window.scale_factor()),
            controls: Controls::new(config.ui.latch_interval_secs),
            renderer,
            config,
            time: Time::new(),
            world,
            models: Vec::new(),
            loader,
            ship_progress: 0.0,
            running: true,
        };
        state.apply_ship_scale();
        Ok(state)
    }

    /// Shrink the ship on narrow windows, measured in logical pixels.
    fn apply_ship_scale(&mut self) {
        let width = logical_width(self.renderer.size.width, self.renderer.window.scale_factor());
        let scale = ship_model_scale(
            width,
            self.config.ui.narrow_width_threshold,
            self.config.ui.narrow_ship_scale,
        );
        if let Err(e) = self.world.set_ship_scale(scale) {
            log::error!("Could not scale ship: {}", e);
        }
    }

    fn overlay_view(&self) -> OverlayView {
        OverlayView {
            panel_visible: self.controls.help_panel.is_visible(),
            flight: self.controls.input.flight(),
            ship_loading: self.loader.is_pending(AssetKind::Ship).then_some(self.ship_progress),
        }
    }

    fn render(&mut self) -> Result<()> {
        render::run(self)
    }
}

/// Application handler for winit.
struct App {
    config: DemoConfig,
    state: Option<DemoState>,
}

impl App {
    fn new(config: DemoConfig) -> Self {
        Self { config, state: None }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_none() {
            let window_attrs = Window::default_attributes()
                .with_title(self.config.window.title.clone())
                .with_inner_size(winit::dpi::LogicalSize::new(
                    self.config.window.width,
                    self.config.window.height,
                ));

            let window = match event_loop.create_window(window_attrs) {
                Ok(w) => Arc::new(w),
                Err(e) => {
                    log::error!("Failed to create window: {}", e);
                    event_loop.exit();
                    return;
                }
            };

            let state = pollster::block_on(DemoState::new(window.clone(), self.config.clone()));
            match state {
                Ok(s) => {
                    self.state = Some(s);
                    window.request_redraw();
                }
                Err(e) => {
                    log::error!("Failed to initialize demo: {}", e);
                    event_loop.exit();
                }
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if let Some(state) = &mut self.state {
            if state.handle_window_event(event) || !state.running {
                event_loop.exit();
            }
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(config::default_config_path);
    let mut config = DemoConfig::load(&config_path);
    if let Some(width) = cli.width {
        config.window.width = width;
    }
    if let Some(height) = cli.height {
        config.window.height = height;
    }

    if cli.write_config {
        config.save(&config_path)?;
        log::info!("Wrote config to {:?}", config_path);
        return Ok(());
    }

    println!("╔══════════════════════════════════════════════╗");
    println!("║                Falcon Flight                 ║");
    println!("╠══════════════════════════════════════════════╣");
    println!("║  CONTROLS:                                   ║");
    println!("║    W / Up     - Advance                      ║");
    println!("║    A / Left   - Turn left                    ║");
    println!("║    D / Right  - Turn right                   ║");
    println!("║    Tab        - Toggle help panel            ║");
    println!("║    On-screen buttons work with mouse/touch   ║");
    println!("╚══════════════════════════════════════════════╝");

    log::info!("Starting Falcon Flight");

    let event_loop = EventLoop::new()?;
    // Poll keeps the fixed-tick clock fed at display rate.
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;

    Ok(())
}
