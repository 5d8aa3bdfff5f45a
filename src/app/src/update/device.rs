use crux_core::{render::render, Command};

use crate::events::{DeviceEvent, Event};
use crate::model::Model;
use crate::types::{
    parse_command_data, CommandRequest, ConsoleError, DeviceCommand, JsonStore, TransportOutcome,
    View,
};
use crate::{device_get, device_post, Effect};

/// Handle board identity and command events
pub fn handle(event: DeviceEvent, model: &mut Model) -> Command<Effect, Event> {
    match event {
        DeviceEvent::LoadInfo => load_info(),
        DeviceEvent::InfoResponse(outcome) => handle_info_response(outcome, model),
        DeviceEvent::SendCommand {
            command: DeviceCommand::Reset,
            ..
        }
        | DeviceEvent::ResetBoard => reset_board(model),
        DeviceEvent::SendCommand { command, data_hex } => send_command(command, &data_hex, model),
        DeviceEvent::CommandResponse(outcome) => {
            model.log_outcome("Send", outcome);
            render()
        }
        DeviceEvent::ResetResponse(outcome) => {
            model.log_outcome("Reset", outcome);
            render()
        }
    }
}

pub fn load_info() -> Command<Effect, Event> {
    device_get!("/info.json", |outcome| {
        Event::Device(DeviceEvent::InfoResponse(outcome))
    })
}

fn handle_info_response(outcome: TransportOutcome, model: &mut Model) -> Command<Effect, Event> {
    let header = (
        model.device_info.title.clone(),
        model.device_info.tagline.clone(),
    );

    let loaded = outcome
        .into_result()
        .and_then(|body| model.device_info.load_from(&body).map_err(ConsoleError::from));

    match loaded {
        Ok(()) => {
            log::info!("device info: {:?}", model.device_info);
            let header_changed =
                header != (model.device_info.title.clone(), model.device_info.tagline.clone());
            if header_changed || model.is_visible(View::System) {
                render()
            } else {
                Command::done()
            }
        }
        Err(e) => {
            model.log_failure("Load info", &e);
            render()
        }
    }
}

fn send_command(command: DeviceCommand, data_hex: &str, model: &mut Model) -> Command<Effect, Event> {
    let data = match parse_command_data(data_hex) {
        Ok(data) => data,
        Err(e) => {
            model
                .log
                .error(format!("Invalid command data {data_hex:?}: {e}"));
            return render();
        }
    };

    let request = CommandRequest::new(command, data);
    log::info!("sending command {} with data {:#x}", request.cmd, request.data);
    device_post!(model, "Send", "/cmd.json", body_json: &request, |outcome| {
        Event::Device(DeviceEvent::CommandResponse(outcome))
    })
}

fn reset_board(model: &mut Model) -> Command<Effect, Event> {
    if !model.upload.controls.reset {
        log::warn!("reset requested while the reset control is disabled");
        return Command::done();
    }

    let request = CommandRequest::new(DeviceCommand::Reset, 0);
    device_post!(model, "Reset", "/cmd.json", body_json: &request, |outcome| {
        Event::Device(DeviceEvent::ResetResponse(outcome))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{expect_http, http_requests, network_error, ok, status};
    use crate::types::Severity;

    mod info {
        use super::*;

        #[test]
        fn loads_identity_and_renders_changed_header() {
            let mut model = Model::default();
            let mut cmd = load_info();

            let mut request = expect_http(&mut cmd);
            assert_eq!(request.operation.url, "https://relative/info.json");
            request
                .resolve(ok(r#"{"title":"PAX","tagline":"counter","hwInfo":"S3"}"#))
                .unwrap();

            let event = cmd.events().next().unwrap();
            let mut cmd = crate::update::update(event, &mut model);

            assert_eq!(model.device_info.title, "PAX");
            assert_eq!(model.device_info.hw_info, "S3");
            assert!(matches!(cmd.effects().next(), Some(Effect::Render(_))));
        }

        #[test]
        fn unchanged_header_on_hidden_view_skips_render() {
            let mut model = Model::default();
            model.device_info.title = "PAX".to_string();

            let mut cmd = handle(
                DeviceEvent::InfoResponse(TransportOutcome::from_status(
                    200,
                    r#"{"title":"PAX","appVersion":"1.2"}"#,
                )),
                &mut model,
            );

            assert_eq!(model.device_info.app_version, "1.2");
            assert!(cmd.effects().next().is_none());
        }

        #[test]
        fn malformed_payload_keeps_identity_and_logs() {
            let mut model = Model::default();
            model.device_info.title = "PAX".to_string();

            let _ = handle(
                DeviceEvent::InfoResponse(TransportOutcome::from_status(200, "{not json")),
                &mut model,
            );

            assert_eq!(model.device_info.title, "PAX");
            let entry = model.log.latest().unwrap();
            assert_eq!(entry.severity, Severity::Error);
            assert!(entry.message.starts_with("Load info failed: malformed JSON"));
        }
    }

    mod commands {
        use super::*;

        #[test]
        fn posts_hex_data_as_integer() {
            let mut model = Model::default();
            let mut cmd = handle(
                DeviceEvent::SendCommand {
                    command: DeviceCommand::Command2,
                    data_hex: " 0x1F ".to_string(),
                },
                &mut model,
            );

            let effects: Vec<Effect> = cmd.effects().collect();
            let requests = http_requests(&effects);
            assert_eq!(requests.len(), 1);
            assert_eq!(requests[0].method, "POST");
            assert_eq!(requests[0].url, "https://relative/cmd.json");
            assert_eq!(requests[0].body, br#"{"cmd":2,"data":31}"#.to_vec());
        }

        #[test]
        fn invalid_hex_is_logged_and_not_sent() {
            let mut model = Model::default();
            let mut cmd = handle(
                DeviceEvent::SendCommand {
                    command: DeviceCommand::Command1,
                    data_hex: "xyz".to_string(),
                },
                &mut model,
            );

            let effects: Vec<Effect> = cmd.effects().collect();
            assert!(http_requests(&effects).is_empty());
            assert_eq!(model.log.latest().unwrap().severity, Severity::Error);
        }

        #[test]
        fn outcomes_are_logged_with_their_severity() {
            let mut model = Model::default();

            let mut cmd = handle(
                DeviceEvent::SendCommand {
                    command: DeviceCommand::Command3,
                    data_hex: String::new(),
                },
                &mut model,
            );
            let mut request = expect_http(&mut cmd);
            assert_eq!(request.operation.body, br#"{"cmd":3,"data":0}"#.to_vec());
            request.resolve(status(500, "busy")).unwrap();
            let event = cmd.events().next().unwrap();
            let _ = crate::update::update(event, &mut model);
            let entry = model.log.latest().unwrap();
            assert_eq!(
                (entry.severity, entry.message.as_str()),
                (Severity::Error, "Send failed: 500 busy")
            );

            let _ = handle(
                DeviceEvent::CommandResponse(TransportOutcome::from_status(200, "OK")),
                &mut model,
            );
            let entry = model.log.latest().unwrap();
            assert_eq!((entry.severity, entry.message.as_str()), (Severity::Info, "OK"));

            let mut cmd = handle(
                DeviceEvent::SendCommand {
                    command: DeviceCommand::Command1,
                    data_hex: "1".to_string(),
                },
                &mut model,
            );
            let mut request = expect_http(&mut cmd);
            request.resolve(network_error("unreachable")).unwrap();
            let event = cmd.events().next().unwrap();
            let _ = crate::update::update(event, &mut model);
            assert_eq!(
                model.log.latest().unwrap().message,
                "Send error: IO error: unreachable"
            );
        }
    }

    mod reset {
        use super::*;

        #[test]
        fn ignored_while_control_disabled() {
            let mut model = Model::default();
            assert!(!model.upload.controls.reset);

            let mut cmd = handle(DeviceEvent::ResetBoard, &mut model);

            assert!(cmd.effects().next().is_none());
        }

        #[test]
        fn sends_reset_command_when_enabled() {
            let mut model = Model::default();
            model.upload.controls.reset = true;

            let mut cmd = handle(
                DeviceEvent::SendCommand {
                    command: DeviceCommand::Reset,
                    data_hex: "ff".to_string(),
                },
                &mut model,
            );

            let mut request = expect_http(&mut cmd);
            assert_eq!(request.operation.body, br#"{"cmd":254,"data":0}"#.to_vec());
            request.resolve(ok("")).unwrap();
            let event = cmd.events().next().unwrap();
            let _ = crate::update::update(event, &mut model);
            assert_eq!(model.log.latest().unwrap().message, "Reset done");
        }
    }
}
