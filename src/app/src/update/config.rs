use crux_core::{render::render, Command};

use crate::events::{ConfigEvent, Event};
use crate::model::Model;
use crate::types::{ConsoleError, TransportOutcome, View, CONFIG_SCHEMA_VERSION};
use crate::{device_get, device_post, Effect};

/// Handle configuration load, edit and save events
pub fn handle(event: ConfigEvent, model: &mut Model) -> Command<Effect, Event> {
    match event {
        ConfigEvent::Reload => load(),
        ConfigEvent::LoadResponse(outcome) => handle_load_response(outcome, model),

        ConfigEvent::FieldChanged { key, value } => {
            if model.config.form.value(key) == value {
                return Command::done();
            }
            model.config.form.set(key, value);
            render()
        }

        ConfigEvent::TogglePasswordVisibility { key } => {
            if model.config.form.toggle_reveal(key) {
                render()
            } else {
                Command::done()
            }
        }

        ConfigEvent::Save => save(model),
        ConfigEvent::SaveResponse(outcome) => {
            model.config.is_saving = false;
            model.log_outcome("Save config", outcome);
            render()
        }
    }
}

pub fn load() -> Command<Effect, Event> {
    device_get!("/config.json", |outcome| {
        Event::Config(ConfigEvent::LoadResponse(outcome))
    })
}

fn handle_load_response(outcome: TransportOutcome, model: &mut Model) -> Command<Effect, Event> {
    let loaded = outcome
        .into_result()
        .and_then(|body| model.config.load_from(&body).map_err(ConsoleError::from));

    if let Err(e) = loaded {
        model.log_failure("Load config", &e);
        return render();
    }

    if let Some(reported) = model.config.version_drift() {
        model.log.warning(format!(
            "Device reported config v{reported}, it will be saved as v{CONFIG_SCHEMA_VERSION}"
        ));
        return render();
    }

    if model.is_visible(View::Config) {
        render()
    } else {
        Command::done()
    }
}

fn save(model: &mut Model) -> Command<Effect, Event> {
    if model.config.is_saving {
        log::debug!("save already in flight");
        return Command::done();
    }

    let json = match model.config.export_for_save() {
        Ok(json) => json,
        Err(e) => {
            model
                .log
                .error(format!("Failed to create Save config request: {e}"));
            return render();
        }
    };

    log::info!("saving config v{CONFIG_SCHEMA_VERSION}");
    model.config.is_saving = true;
    Command::all([
        render(),
        device_post!("/config.json", body_string: json, |outcome| {
            Event::Config(ConfigEvent::SaveResponse(outcome))
        }),
    ])
}
