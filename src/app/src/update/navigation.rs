use crux_core::{render::render, Command};

use crate::events::Event;
use crate::model::Model;
use crate::types::View;
use crate::Effect;

/// Show exactly the view named by `token`; anything unknown shows Home.
///
/// A view re-reads its store when it becomes visible, so entering Config
/// rebinds the form from the last loaded record.
pub fn handle(token: &str, model: &mut Model) -> Command<Effect, Event> {
    let view = View::from_token(token);
    log::debug!("navigate {token:?} -> {view:?}");

    model.view = view;
    if view == View::Config {
        model.config.bind();
    }
    render()
}
