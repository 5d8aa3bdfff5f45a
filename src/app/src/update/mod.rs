mod config;
mod device;
mod firmware;
mod navigation;
mod polling;
mod ui;

use crux_core::{render::render, Command};

use crate::events::Event;
use crate::model::Model;
use crate::Effect;

/// Main update dispatcher - routes events to domain-specific handlers
pub fn update(event: Event, model: &mut Model) -> Command<Effect, Event> {
    match event {
        // Page load
        Event::Initialize => Command::all([
            device::load_info(),
            config::load(),
            polling::start(model),
            render(),
        ]),

        // Router
        Event::Navigate { token } => navigation::handle(&token, model),

        // Domain handlers
        Event::Device(device_event) => device::handle(device_event, model),
        Event::Config(config_event) => config::handle(config_event, model),
        Event::Firmware(firmware_event) => firmware::handle(firmware_event, model),
        Event::Poll(poll_event) => polling::handle(poll_event, model),
        Event::Ui(ui_event) => ui::handle(ui_event, model),
    }
}
