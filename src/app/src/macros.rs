/// Content type every body sent to the device is labelled with.
pub const JSON_CONTENT_TYPE: &str = "application/json;charset=UTF-8";

/// Macro for device GET requests.
///
/// The response, whatever its status, is folded into a
/// [`TransportOutcome`](crate::TransportOutcome) and handed to the mapper.
///
/// ```ignore
/// device_get!("/api/status", move |outcome| {
///     Event::Poll(PollEvent::StatusResponse { tick, outcome })
/// })
/// ```
#[macro_export]
macro_rules! device_get {
    ($endpoint:expr, $on_outcome:expr) => {{
        let on_outcome = $on_outcome;
        $crate::HttpCmd::get($crate::build_url($endpoint))
            .build()
            .then_send(move |result| on_outcome($crate::transport_outcome(result)))
    }};
}

/// Macro for device POST requests.
///
/// # Patterns
///
/// Pattern 1: POST an already serialized JSON document
/// ```ignore
/// device_post!("/api/config", body_string: json, |outcome| {
///     Event::Config(ConfigEvent::SaveResponse(outcome))
/// })
/// ```
///
/// Pattern 2: POST a serializable value; a serialization failure is
/// logged against `$action` and only a render is returned
/// ```ignore
/// device_post!(model, "Command", "/api/command", body_json: &request, |outcome| {
///     Event::Device(DeviceEvent::CommandResponse(outcome))
/// })
/// ```
#[macro_export]
macro_rules! device_post {
    // Pattern 1: pre-serialized body
    ($endpoint:expr, body_string: $body:expr, $on_outcome:expr) => {{
        let on_outcome = $on_outcome;
        $crate::HttpCmd::post($crate::build_url($endpoint))
            .body_string($body)
            .header("Content-Type", $crate::macros::JSON_CONTENT_TYPE)
            .build()
            .then_send(move |result| on_outcome($crate::transport_outcome(result)))
    }};

    // Pattern 2: serializable body
    ($model:expr, $action:expr, $endpoint:expr, body_json: $body:expr, $on_outcome:expr) => {{
        let on_outcome = $on_outcome;
        match $crate::HttpCmd::post($crate::build_url($endpoint)).body_json($body) {
            Ok(builder) => builder
                .header("Content-Type", $crate::macros::JSON_CONTENT_TYPE)
                .build()
                .then_send(move |result| on_outcome($crate::transport_outcome(result))),
            Err(e) => {
                $model
                    .log
                    .error(format!("Failed to create {} request: {}", $action, e));
                crux_core::render::render()
            }
        }
    }};
}
