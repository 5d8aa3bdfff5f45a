use super::*;
use crux_core::{App as _, Command, Request};
use crux_http::protocol::{HttpRequest, HttpResponse, HttpResult};

use crate::events::{ConfigEvent, FirmwareEvent, PollEvent};
use crate::view::Page;

pub(crate) fn ok(body: &str) -> HttpResult {
    status(200, body)
}

pub(crate) fn status(code: u16, body: &str) -> HttpResult {
    HttpResult::Ok(HttpResponse::status(code).body(body).build())
}

pub(crate) fn network_error(message: &str) -> HttpResult {
    HttpResult::Err(crux_http::HttpError::Io(message.to_string()))
}

/// Runs `cmd` and returns its first HTTP request; other effects are dropped.
pub(crate) fn expect_http(cmd: &mut Command<Effect, Event>) -> Request<HttpRequest> {
    cmd.effects()
        .find_map(|effect| match effect {
            Effect::Http(request) => Some(request),
            _ => None,
        })
        .expect("expected an HTTP request")
}

pub(crate) fn http_requests(effects: &[Effect]) -> Vec<HttpRequest> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            Effect::Http(request) => Some(request.operation.clone()),
            _ => None,
        })
        .collect()
}

pub(crate) fn timer_requests(effects: &[Effect]) -> Vec<TimerOperation> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            Effect::Timer(request) => Some(request.operation.clone()),
            _ => None,
        })
        .collect()
}

fn run(event: Event, model: &mut Model) -> Vec<Effect> {
    update::update(event, model).effects().collect()
}

#[test]
fn config_round_trip_stamps_client_version() {
    let mut model = Model::default();
    let _ = run(
        Event::Navigate {
            token: "#config".to_string(),
        },
        &mut model,
    );

    let mut reload = update::update(Event::Config(ConfigEvent::Reload), &mut model);
    let mut request = expect_http(&mut reload);
    assert_eq!(request.operation.method, "GET");
    request.resolve(ok(r#"{"version":2,"name":"dev"}"#)).unwrap();
    let loaded = reload.events().next().unwrap();
    let _ = run(loaded, &mut model);

    let Page::Config(page) = App.view(&model).page else {
        panic!("config page expected");
    };
    assert_eq!(page.version_label, "v3");
    let name = page.fields.iter().find(|f| f.key == ConfigKey::Name).unwrap();
    assert_eq!(name.value, "dev");

    let _ = run(
        Event::Config(ConfigEvent::FieldChanged {
            key: ConfigKey::PrimarySsid,
            value: "workshop".to_string(),
        }),
        &mut model,
    );
    let effects = run(Event::Config(ConfigEvent::Save), &mut model);
    let requests = http_requests(&effects);
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url, "https://relative/config.json");
    assert_eq!(
        String::from_utf8(requests[0].body.clone()).unwrap(),
        concat!(
            r#"{"version":3,"name":"dev","pass":"","primarySsid":"workshop","#,
            r#""primaryPass":"","backupSsid":"","backupPass":"","ipAddress":"","#,
            r#""ipMask":"","ipGateway":"","ipDns":""}"#
        )
    );
}

#[test]
fn overlapping_polls_keep_the_later_arrival() {
    let mut model = Model::default();

    let mut first = update::update(Event::Poll(PollEvent::Start), &mut model);
    let mut first_fetch = expect_http(&mut first);

    let mut second = update::update(Event::Poll(PollEvent::Elapsed { timer: 1 }), &mut model);
    let mut second_fetch = expect_http(&mut second);

    // the second request is answered first
    second_fetch.resolve(ok(r#"{"exampleStatusData":2}"#)).unwrap();
    let _ = run(second.events().next().unwrap(), &mut model);
    first_fetch.resolve(ok(r#"{"exampleStatusData":1}"#)).unwrap();
    let _ = run(first.events().next().unwrap(), &mut model);

    assert_eq!(model.live_status.example_status_data, Some(1));
    let Page::Home(home) = App.view(&model).page else {
        panic!("home page expected");
    };
    assert_eq!(home.status_hex, "1");
}

#[test]
fn upload_lifecycle_is_visible_on_system_page() {
    let mut model = Model::default();
    let _ = run(
        Event::Navigate {
            token: "system".to_string(),
        },
        &mut model,
    );
    let _ = run(
        Event::Firmware(FirmwareEvent::FilesPicked {
            files: vec![FirmwareFile {
                name: "pax-1.1.bin".to_string(),
                size: 4096,
            }],
        }),
        &mut model,
    );

    let Page::System(page) = App.view(&model).page else {
        panic!("system page expected");
    };
    assert_eq!(page.file_label.as_deref(), Some("pax-1.1.bin, size: 4096 bytes"));
    assert!(page.controls.upload && !page.abort_enabled);

    let _ = run(Event::Firmware(FirmwareEvent::StartUpload), &mut model);
    let _ = run(
        Event::Firmware(FirmwareEvent::Transfer {
            session: 1,
            output: FirmwareOutput::Progress {
                loaded: 1024,
                total: 4096,
            },
        }),
        &mut model,
    );

    let Page::System(page) = App.view(&model).page else {
        panic!("system page expected");
    };
    assert_eq!(page.progress_label.as_deref(), Some("25%"));
    assert!(page.abort_enabled);
    assert!(!page.controls.select && !page.controls.upload && !page.controls.reset);

    let _ = run(
        Event::Firmware(FirmwareEvent::Transfer {
            session: 1,
            output: FirmwareOutput::Finished(TransportOutcome::from_status(200, "OK")),
        }),
        &mut model,
    );

    let vm = App.view(&model);
    let Page::System(page) = vm.page else {
        panic!("system page expected");
    };
    assert_eq!(page.progress_label.as_deref(), Some("100%"));
    assert!(page.controls.select && page.controls.upload && page.controls.reset);
    assert_eq!(vm.log[0].message, "OK");
}

#[test]
fn routing_falls_back_to_home() {
    let mut model = Model::default();

    for token in ["", "#", "#firmware", "#Config", "##config"] {
        let _ = run(
            Event::Navigate {
                token: "#system".to_string(),
            },
            &mut model,
        );
        let _ = run(
            Event::Navigate {
                token: token.to_string(),
            },
            &mut model,
        );
        assert!(matches!(App.view(&model).page, Page::Home(_)), "{token:?}");
    }
}

#[test]
fn log_keeps_five_newest_and_clears() {
    let mut model = Model::default();

    for n in 0..7 {
        let _ = run(
            Event::Device(events::DeviceEvent::CommandResponse(
                TransportOutcome::from_status(200, format!("reply {n}")),
            )),
            &mut model,
        );
    }

    let log = App.view(&model).log;
    assert_eq!(log.len(), LOG_CAPACITY);
    assert_eq!(log[0].message, "reply 6");
    assert_eq!(log[4].message, "reply 2");
    assert!(log[0].seq > log[1].seq);

    let effects = run(Event::Ui(events::UiEvent::ClearLog), &mut model);
    assert!(matches!(effects.as_slice(), [Effect::Render(_)]));
    assert!(App.view(&model).log.is_empty());
}
