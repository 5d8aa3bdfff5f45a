use anyhow::Result;
use crux_core::typegen::TypeGen;
use pax_console_core::{
    events::{ConfigEvent, DeviceEvent, FirmwareEvent, PollEvent, UiEvent},
    types::{ConfigKey, DeviceCommand, Severity, TransportOutcome, UploadState, View},
    view::Page,
    App, FirmwareOperation, FirmwareOutput, TimerOperation, TimerOutput,
};
use std::path::PathBuf;

fn main() -> Result<()> {
    println!("cargo:rerun-if-changed=../app");

    let mut gen = TypeGen::new();

    gen.register_app::<App>()?;

    // Explicitly register domain event enums to ensure all variants are traced
    gen.register_type::<DeviceEvent>()?;
    gen.register_type::<ConfigEvent>()?;
    gen.register_type::<FirmwareEvent>()?;
    gen.register_type::<PollEvent>()?;
    gen.register_type::<UiEvent>()?;

    // Shell operations and their outputs
    gen.register_type::<FirmwareOperation>()?;
    gen.register_type::<FirmwareOutput>()?;
    gen.register_type::<TimerOperation>()?;
    gen.register_type::<TimerOutput>()?;
    gen.register_type::<TransportOutcome>()?;

    // Explicitly register other enums to ensure all variants are traced
    gen.register_type::<View>()?;
    gen.register_type::<Page>()?;
    gen.register_type::<Severity>()?;
    gen.register_type::<DeviceCommand>()?;
    gen.register_type::<ConfigKey>()?;
    gen.register_type::<UploadState>()?;

    let output_root = PathBuf::from("./generated");

    gen.typescript("shared_types", output_root.join("typescript"))?;

    Ok(())
}
