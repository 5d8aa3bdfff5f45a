use crux_core::{render::render, Command};

use crate::commands::firmware::FirmwareOutput;
use crate::events::{Event, FirmwareEvent};
use crate::model::Model;
use crate::types::View;
use crate::{build_url, Effect, FirmwareCmd};

/// Handle firmware selection, upload progress and completion
pub fn handle(event: FirmwareEvent, model: &mut Model) -> Command<Effect, Event> {
    match event {
        FirmwareEvent::FilesPicked { files } => {
            if model.upload.select(files) {
                render()
            } else {
                log::debug!("file pick ignored in state {:?}", model.upload.state);
                Command::done()
            }
        }

        FirmwareEvent::StartUpload => start_upload(model),

        FirmwareEvent::Abort => match model.upload.active_session() {
            Some(session) => {
                log::info!("aborting upload session {session}");
                FirmwareCmd::abort(session)
                    .build()
                    .then_send(move |output| {
                        Event::Firmware(FirmwareEvent::Transfer { session, output })
                    })
            }
            None => Command::done(),
        },

        FirmwareEvent::Transfer { session, output } => match output {
            FirmwareOutput::Progress { loaded, total } => {
                if model.upload.report_progress(session, loaded, total)
                    && model.is_visible(View::System)
                {
                    render()
                } else {
                    Command::done()
                }
            }
            FirmwareOutput::Finished(outcome) => match model.upload.finish(session, outcome) {
                Some(Ok(text)) => {
                    model.log_success("Upload", &text);
                    render()
                }
                Some(Err(e)) => {
                    model.log_failure("Upload", &e);
                    render()
                }
                None => {
                    log::debug!("dropping outcome of stale upload session {session}");
                    Command::done()
                }
            },
        },
    }
}

fn start_upload(model: &mut Model) -> Command<Effect, Event> {
    let Some((session, file)) = model.upload.begin() else {
        log::debug!("upload ignored: nothing selected or already uploading");
        return Command::done();
    };

    log::info!("uploading {} ({} bytes), session {session}", file.name, file.size);
    let file_name = file.name.clone();
    Command::all([
        render(),
        FirmwareCmd::upload(session, build_url("/update"), file_name)
            .then_send(move |output| Event::Firmware(FirmwareEvent::Transfer { session, output })),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::firmware::FirmwareOperation;
    use crate::types::{FirmwareFile, Severity, TransportOutcome, UploadState};

    fn pick(model: &mut Model, files: Vec<FirmwareFile>) {
        let _ = handle(FirmwareEvent::FilesPicked { files }, model);
    }

    fn image() -> FirmwareFile {
        FirmwareFile {
            name: "pax.bin".to_string(),
            size: 1000,
        }
    }

    fn transfer(session: u32, output: FirmwareOutput) -> FirmwareEvent {
        FirmwareEvent::Transfer { session, output }
    }

    #[test]
    fn picking_zero_or_many_files_stays_idle() {
        let mut model = Model::default();

        pick(&mut model, vec![]);
        pick(&mut model, vec![image(), image()]);

        assert_eq!(model.upload.state, UploadState::Idle);
        assert!(!model.upload.controls.upload);
    }

    #[test]
    fn start_locks_controls_and_asks_shell_to_upload() {
        let mut model = Model::default();
        pick(&mut model, vec![image()]);

        let mut cmd = handle(FirmwareEvent::StartUpload, &mut model);

        let operations: Vec<FirmwareOperation> = cmd
            .effects()
            .filter_map(|effect| match effect {
                Effect::Firmware(request) => Some(request.operation),
                _ => None,
            })
            .collect();
        assert_eq!(
            operations,
            [FirmwareOperation::Upload {
                session: 1,
                url: "https://relative/update".to_string(),
                file_name: "pax.bin".to_string(),
            }]
        );
        let controls = model.upload.controls;
        assert!(!controls.select && !controls.upload && !controls.reset);

        let mut again = handle(FirmwareEvent::StartUpload, &mut model);
        assert!(again.effects().next().is_none());
    }

    #[test]
    fn shell_stream_drives_the_session() {
        let mut model = Model {
            view: View::System,
            ..Default::default()
        };
        pick(&mut model, vec![image()]);

        let mut cmd = handle(FirmwareEvent::StartUpload, &mut model);
        let mut request = cmd
            .effects()
            .find_map(|effect| match effect {
                Effect::Firmware(request) => Some(request),
                _ => None,
            })
            .unwrap();

        request
            .resolve(FirmwareOutput::Progress {
                loaded: 250,
                total: 1000,
            })
            .unwrap();
        request
            .resolve(FirmwareOutput::Finished(TransportOutcome::from_status(
                200, "Update OK",
            )))
            .unwrap();

        for event in cmd.events().collect::<Vec<_>>() {
            let _ = crate::update::update(event, &mut model);
        }

        assert_eq!(model.upload.state, UploadState::Done);
        assert_eq!(model.upload.progress, 100);
        assert!(model.upload.controls.reset);
        assert_eq!(model.log.latest().unwrap().message, "Update OK");
    }

    #[test]
    fn progress_renders_only_on_system_view() {
        let mut model = Model::default();
        pick(&mut model, vec![image()]);
        let _ = handle(FirmwareEvent::StartUpload, &mut model);

        let mut cmd = handle(
            transfer(
                1,
                FirmwareOutput::Progress {
                    loaded: 500,
                    total: 1000,
                },
            ),
            &mut model,
        );

        assert_eq!(model.upload.progress, 50);
        assert!(cmd.effects().next().is_none());
    }

    mod abort {
        use super::*;

        #[test]
        fn abort_reverts_with_warning_and_ignores_late_outcome() {
            let mut model = Model::default();
            pick(&mut model, vec![image()]);
            let _ = handle(FirmwareEvent::StartUpload, &mut model);

            let mut cmd = handle(FirmwareEvent::Abort, &mut model);
            let mut request = cmd
                .effects()
                .find_map(|effect| match effect {
                    Effect::Firmware(request) => Some(request),
                    _ => None,
                })
                .unwrap();
            assert_eq!(request.operation, FirmwareOperation::Abort { session: 1 });
            request
                .resolve(FirmwareOutput::Finished(TransportOutcome::Aborted))
                .unwrap();
            let event = cmd.events().next().unwrap();
            let _ = crate::update::update(event, &mut model);

            assert!(matches!(model.upload.state, UploadState::Failed { .. }));
            assert!(model.upload.controls.select && model.upload.controls.upload);
            let entry = model.log.latest().unwrap();
            assert_eq!(
                (entry.severity, entry.message.as_str()),
                (Severity::Warning, "Upload canceled")
            );

            let _ = handle(
                transfer(
                    1,
                    FirmwareOutput::Finished(TransportOutcome::from_status(200, "late")),
                ),
                &mut model,
            );
            assert!(matches!(model.upload.state, UploadState::Failed { .. }));
            assert_eq!(model.log.latest().unwrap().message, "Upload canceled");
        }

        #[test]
        fn abort_without_upload_is_a_no_op() {
            let mut model = Model::default();

            let mut cmd = handle(FirmwareEvent::Abort, &mut model);

            assert!(cmd.effects().next().is_none());
        }
    }

    #[test]
    fn failed_upload_unlocks_for_retry() {
        let mut model = Model::default();
        pick(&mut model, vec![image()]);
        let _ = handle(FirmwareEvent::StartUpload, &mut model);

        let _ = handle(
            transfer(
                1,
                FirmwareOutput::Finished(TransportOutcome::from_status(500, "flash error")),
            ),
            &mut model,
        );

        assert_eq!(
            model.upload.state,
            UploadState::Failed {
                reason: "500 flash error".to_string()
            }
        );
        assert_eq!(
            model.log.latest().unwrap().message,
            "Upload failed: 500 flash error"
        );

        let mut cmd = handle(FirmwareEvent::StartUpload, &mut model);
        assert!(cmd
            .effects()
            .any(|effect| matches!(effect, Effect::Firmware(_))));
        assert_eq!(model.upload.active_session(), Some(2));
    }
}
