//! A minimal Vulkan demo: one colored quad, one frame in flight.

mod app;
mod buffer;
mod command;
mod device;
mod instance;
mod pipeline;
mod swapchain;
mod vertex;

use anyhow::Result;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, Event, WindowEvent};
use winit::event_loop::EventLoop;
use winit::keyboard::{Key, NamedKey};
use winit::window::WindowBuilder;

use crate::app::App;

const WINDOW_WIDTH: u32 = 800;
const WINDOW_HEIGHT: u32 = 600;

fn main() -> Result<()> {
    pretty_env_logger::init();

    let event_loop = EventLoop::new()?;
    let window = WindowBuilder::new()
        .with_title("quad-vk")
        .with_inner_size(LogicalSize::new(WINDOW_WIDTH, WINDOW_HEIGHT))
        .with_resizable(false)
        .build(&event_loop)?;

    let mut app = unsafe { App::create(&window)? };

    event_loop.run(move |event, target| match event {
        Event::WindowEvent {
            event: WindowEvent::CloseRequested,
            ..
        } => {
            unsafe {
                app.destroy();
            }
            target.exit();
        }
        Event::WindowEvent {
            event: WindowEvent::KeyboardInput { event, .. },
            ..
        } => {
            if event.state == ElementState::Released
                && event.logical_key == Key::Named(NamedKey::Escape)
            {
                unsafe {
                    app.destroy();
                }
                target.exit();
            }
        }
        Event::WindowEvent {
            event: WindowEvent::RedrawRequested,
            ..
        } => {
            // Any failing Vulkan call is fatal: report and halt.
            if let Err(error) = unsafe { app.render() } {
                log::error!("render failed: {error:?}");
                std::process::exit(1);
            }
        }
        Event::AboutToWait => {
            window.request_redraw();
        }
        _ => {}
    })?;

    Ok(())
}
