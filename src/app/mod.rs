use crate::config::{AppConfig, AppConfigOverrides};
use crate::controller::SheetController;
use crate::input::InputTranslator;
use crate::renderer::{HeadlessRenderer, Renderer};

use anyhow::{Context, Result};
use std::sync::Arc;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::window::{Window, WindowId};

pub const CONFIG_PATH: &str = "config/app.json";

pub fn run() -> Result<()> {
    run_with_overrides(AppConfigOverrides::default())
}

pub fn run_with_overrides(overrides: AppConfigOverrides) -> Result<()> {
    let mut config = AppConfig::load_or_default(CONFIG_PATH);
    if !overrides.is_empty() {
        log::info!("[cli] overriding {}", overrides.applied_fields().join(", "));
        config.apply_overrides(&overrides);
    }
    let event_loop = EventLoop::new().context("Failed to create winit event loop")?;
    let mut app = App::new(config, Box::new(HeadlessRenderer::new()));
    event_loop.run_app(&mut app).context("Event loop execution failed")?;
    Ok(())
}

pub struct App {
    config: AppConfig,
    window: Option<Arc<Window>>,
    sheet: SheetController,
    translator: InputTranslator,
    renderer: Box<dyn Renderer>,
    title: String,
    should_close: bool,
}

impl App {
    pub fn new(config: AppConfig, renderer: Box<dyn Renderer>) -> Self {
        let sheet = SheetController::from_config(&config);
        Self {
            title: config.window.title.clone(),
            config,
            window: None,
            sheet,
            translator: InputTranslator::new(),
            renderer,
            should_close: false,
        }
    }

    pub fn sheet(&self) -> &SheetController {
        &self.sheet
    }

    /// Window title doubles as the status line: active cell, camera mode and any notice.
    fn status_title(&self) -> String {
        let mut title = self.config.window.title.clone();
        if let Some(start) = self.sheet.selection().start() {
            title.push_str(&format!(" | {}", self.sheet.space().cell_name(start)));
            let text = self.sheet.store().text(start);
            if !text.is_empty() {
                title.push_str(&format!(" = {text}"));
            }
        }
        title.push_str(&format!(" | {}", self.sheet.rig().mode().label()));
        if self.sheet.quantum().is_active() {
            title.push_str(" | quantum");
        }
        if let Some(notice) = self.sheet.notice() {
            title.push_str(&format!(" | {notice} (Enter to dismiss)"));
        }
        title
    }

    fn refresh_title(&mut self) {
        let title = self.status_title();
        if title != self.title {
            if let Some(window) = &self.window {
                window.set_title(&title);
            }
            self.title = title;
        }
    }

    fn redraw(&mut self) {
        self.sheet.update();
        if let Err(err) = self.sheet.render(self.renderer.as_mut()) {
            log::error!("Render error: {err:?}");
        }
        self.refresh_title();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let size = PhysicalSize::new(self.config.window.width, self.config.window.height);
        let attributes = Window::default_attributes().with_title(self.title.clone()).with_inner_size(size);
        match event_loop.create_window(attributes) {
            Ok(window) => {
                let actual = window.inner_size();
                self.sheet.resize(actual.width, actual.height);
                self.window = Some(Arc::new(window));
            }
            Err(err) => {
                log::error!("Failed to create window: {err:?}");
                self.should_close = true;
            }
        }
    }

    fn window_event(&mut self, _el: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        if self.window.as_ref().map(|w| w.id()) != Some(id) {
            return;
        }
        match &event {
            WindowEvent::CloseRequested => {
                self.should_close = true;
                return;
            }
            WindowEvent::RedrawRequested => {
                self.redraw();
                return;
            }
            _ => {}
        }
        if let Some(input) = self.translator.translate(&event) {
            self.sheet.handle(&input);
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.should_close {
            event_loop.exit();
            return;
        }
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}
