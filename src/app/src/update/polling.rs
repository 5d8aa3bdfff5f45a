use crux_core::{render::render, Command};

use crate::commands::timer::TimerOutput;
use crate::events::{Event, PollEvent};
use crate::model::Model;
use crate::types::{JsonStore, TransportOutcome, View};
use crate::{device_get, Effect, TimerCmd};

/// Handle the background status loop
pub fn handle(event: PollEvent, model: &mut Model) -> Command<Effect, Event> {
    match event {
        PollEvent::Start => start(model),

        PollEvent::Stop => {
            if model.polling.active {
                log::debug!("status polling stopped after {} ticks", model.polling.ticks);
            }
            model.polling.active = false;
            Command::done()
        }

        PollEvent::Elapsed { timer } => {
            if !model.polling.active || timer != model.polling.timer_id {
                return Command::done();
            }
            Command::all([fetch_status(model), arm_timer(model)])
        }

        PollEvent::StatusResponse { tick, outcome } => handle_status_response(tick, outcome, model),
    }
}

/// Fetch status now and every interval from here on. Starting an active
/// loop is a no-op.
pub fn start(model: &mut Model) -> Command<Effect, Event> {
    if model.polling.active {
        return Command::done();
    }
    model.polling.active = true;
    Command::all([fetch_status(model), arm_timer(model)])
}

fn fetch_status(model: &mut Model) -> Command<Effect, Event> {
    model.polling.ticks += 1;
    let tick = model.polling.ticks;
    device_get!("/status.json", move |outcome| {
        Event::Poll(PollEvent::StatusResponse { tick, outcome })
    })
}

// The next tick does not wait for the fetch issued alongside it.
fn arm_timer(model: &mut Model) -> Command<Effect, Event> {
    model.polling.timer_id += 1;
    TimerCmd::start(model.polling.timer_id, model.polling.interval_ms)
        .build()
        .then_send(|TimerOutput::Elapsed { id }| Event::Poll(PollEvent::Elapsed { timer: id }))
}

/// Responses are applied in arrival order, whatever tick they belong to.
fn handle_status_response(
    tick: u64,
    outcome: TransportOutcome,
    model: &mut Model,
) -> Command<Effect, Event> {
    let body = match outcome.into_result() {
        Ok(body) => body,
        Err(e) => {
            log::debug!("status tick {tick}: {e}");
            return Command::done();
        }
    };

    if let Err(e) = model.live_status.load_from(&body) {
        log::debug!("status tick {tick}: {e}");
        return Command::done();
    }

    log::trace!("status tick {tick}: {:?}", model.live_status);
    if model.is_visible(View::Home) {
        render()
    } else {
        Command::done()
    }
}
