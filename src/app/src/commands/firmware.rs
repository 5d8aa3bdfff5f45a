//! Firmware transfer command definitions.
//!
//! The shell owns the picked file and performs the binary upload; the Core
//! only names the session and consumes the progress/outcome stream.

use crux_core::{capability::Operation, command, Command};
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;

use crate::types::TransportOutcome;

// Operations that the Shell performs for a firmware upload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum FirmwareOperation {
    /// POST the picked file as raw body. Answered by any number of
    /// `Progress` outputs followed by exactly one `Finished`.
    Upload {
        session: u32,
        url: String,
        file_name: String,
    },
    /// Cancel the transfer of `session`. Answered by `Finished(Aborted)`.
    Abort { session: u32 },
}

// What the shell reports back about a transfer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum FirmwareOutput {
    Progress { loaded: u64, total: u64 },
    Finished(TransportOutcome),
}

impl Operation for FirmwareOperation {
    type Output = FirmwareOutput;
}

/// Command-based firmware transfer API
pub struct Firmware<Effect, Event> {
    _effect: PhantomData<Effect>,
    _event: PhantomData<Event>,
}

impl<Effect, Event> Firmware<Effect, Event>
where
    Effect: Send + From<crux_core::Request<FirmwareOperation>> + 'static,
    Event: Send + 'static,
{
    /// Upload the file picked for `session` to `url`
    pub fn upload(
        session: u32,
        url: impl Into<String>,
        file_name: impl Into<String>,
    ) -> UploadBuilder<Effect, Event> {
        UploadBuilder {
            operation: FirmwareOperation::Upload {
                session,
                url: url.into(),
                file_name: file_name.into(),
            },
            _effect: PhantomData,
            _event: PhantomData,
        }
    }

    /// Cancel the in-flight transfer of `session`
    pub fn abort(session: u32) -> RequestBuilder<Effect, Event> {
        RequestBuilder {
            operation: FirmwareOperation::Abort { session },
            _effect: PhantomData,
            _event: PhantomData,
        }
    }
}

/// Builder for the streaming upload operation
#[must_use]
pub struct UploadBuilder<Effect, Event> {
    operation: FirmwareOperation,
    _effect: PhantomData<Effect>,
    _event: PhantomData<fn() -> Event>,
}

impl<Effect, Event> UploadBuilder<Effect, Event>
where
    Effect: Send + From<crux_core::Request<FirmwareOperation>> + 'static,
    Event: Send + 'static,
{
    /// Turn every output of the transfer into an event
    pub fn then_send<F>(self, make_event: F) -> Command<Effect, Event>
    where
        F: Fn(FirmwareOutput) -> Event + Send + 'static,
    {
        Command::stream_from_shell(self.operation).then_send(make_event)
    }
}

/// Request builder for single-answer firmware operations
#[must_use]
pub struct RequestBuilder<Effect, Event> {
    operation: FirmwareOperation,
    _effect: PhantomData<Effect>,
    _event: PhantomData<fn() -> Event>,
}

impl<Effect, Event> RequestBuilder<Effect, Event>
where
    Effect: Send + From<crux_core::Request<FirmwareOperation>> + 'static,
    Event: Send + 'static,
{
    /// Build the request into a Command RequestBuilder
    pub fn build(
        self,
    ) -> command::RequestBuilder<Effect, Event, impl std::future::Future<Output = FirmwareOutput>>
    {
        command::RequestBuilder::new(move |ctx| async move {
            Command::request_from_shell(self.operation)
                .into_future(ctx)
                .await
        })
    }
}
