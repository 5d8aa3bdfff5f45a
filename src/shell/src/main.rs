mod config;
mod executor;
mod render;
mod transport;

use crate::{config::ShellConfig, executor::Executor, render::Printer, transport::DeviceClient};
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use env_logger::{Builder, Env, Target};
use log::{error, info};
use pax_console_core::{
    events::{ConfigEvent, DeviceEvent, FirmwareEvent, PollEvent},
    view::Page,
    ConfigKey, DeviceCommand, Event, FirmwareFile, UploadState, View, ViewModel,
};
use std::{io::Write, path::PathBuf};

/// Console for pax devices.
#[derive(Parser, Debug)]
#[command(name = "pax-console", version, about = "Console for pax devices")]
struct Cli {
    /// Device origin, overrides PAX_DEVICE_URL.
    #[arg(long, global = true)]
    device: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Follow the live status until Ctrl-C.
    Watch,

    /// Show board identity.
    Info,

    /// Show or change the configuration.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Send a user command.
    Command {
        /// Command number.
        #[arg(value_parser = clap::value_parser!(u8).range(1..=3))]
        number: u8,
        /// Command data in hex, e.g. 0x1f.
        #[arg(default_value = "")]
        data: String,
    },

    /// Upload a firmware image. Ctrl-C aborts the transfer.
    Upload {
        /// Firmware image.
        file: PathBuf,
        /// Restart the board once the upload succeeded.
        #[arg(long)]
        reset: bool,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the configuration.
    Show,
    /// Change fields and save, e.g. `primarySsid=workshop`.
    Set {
        #[arg(required = true, value_parser = parse_assignment)]
        assignments: Vec<(ConfigKey, String)>,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("application error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    initialize();

    let config = ShellConfig::load(cli.device.as_deref())?;
    info!("device: {}", config.device_url);
    let client = DeviceClient::new(&config)?;
    let mut executor = Executor::new(client);
    let mut printer = Printer::new();

    match cli.command {
        Commands::Watch => {
            executor.send(Event::Navigate {
                token: View::Home.token().to_string(),
            });
            executor.send(Event::Initialize);
            executor
                .run_until_interrupted(|view| printer.render(view))
                .await?;
            executor.send(Event::Poll(PollEvent::Stop));
        }

        Commands::Info => {
            executor.send(Event::Navigate {
                token: View::System.token().to_string(),
            });
            executor.send(Event::Device(DeviceEvent::LoadInfo));
            executor.run_until_idle(|view| printer.render(view)).await?;

            let view = executor.view();
            let Page::System(page) = &view.page else {
                bail!("unexpected page {:?}", view.page);
            };
            for line in render::system_lines(page) {
                println!("{line}");
            }
        }

        Commands::Config { action } => {
            executor.send(Event::Navigate {
                token: View::Config.token().to_string(),
            });
            executor.send(Event::Config(ConfigEvent::Reload));
            executor.run_until_idle(|view| printer.render(view)).await?;

            if let ConfigAction::Set { assignments } = action {
                // saving an unloaded form would blank every other field on the device
                if !config_loaded(&executor.view()) {
                    bail!("configuration could not be read from the device, nothing was saved");
                }
                for (key, value) in assignments {
                    executor.send(Event::Config(ConfigEvent::FieldChanged { key, value }));
                }
                executor.send(Event::Config(ConfigEvent::Save));
                executor.run_until_idle(|view| printer.render(view)).await?;
            }

            let view = executor.view();
            let Page::Config(page) = &view.page else {
                bail!("unexpected page {:?}", view.page);
            };
            for line in render::config_lines(page) {
                println!("{line}");
            }
        }

        Commands::Command { number, data } => {
            let command = match number {
                1 => DeviceCommand::Command1,
                2 => DeviceCommand::Command2,
                _ => DeviceCommand::Command3,
            };
            executor.send(Event::Device(DeviceEvent::SendCommand {
                command,
                data_hex: data,
            }));
            executor.run_until_idle(|view| printer.render(view)).await?;
        }

        Commands::Upload { file, reset } => {
            let metadata = tokio::fs::metadata(&file)
                .await
                .with_context(|| format!("failed to read firmware image {file:?}"))?;
            let name = file
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| file.display().to_string());

            executor.set_firmware(&file);
            executor.send(Event::Navigate {
                token: View::System.token().to_string(),
            });
            executor.send(Event::Firmware(FirmwareEvent::FilesPicked {
                files: vec![FirmwareFile {
                    name,
                    size: metadata.len(),
                }],
            }));
            executor.send(Event::Firmware(FirmwareEvent::StartUpload));
            executor.run_until_idle(|view| printer.render(view)).await?;

            if !upload_succeeded(&executor.view()) {
                bail!("upload did not complete");
            }
            if reset {
                executor.send(Event::Device(DeviceEvent::ResetBoard));
                executor.run_until_idle(|view| printer.render(view)).await?;
            }
        }
    }

    Ok(())
}

fn initialize() {
    log_panics::init();

    let mut builder = if cfg!(debug_assertions) {
        Builder::from_env(Env::default().default_filter_or("debug"))
    } else {
        Builder::from_env(Env::default().default_filter_or("info"))
    };

    builder.format(|f, record| match record.level() {
        log::Level::Error => {
            eprintln!("{}", record.args());
            Ok(())
        }
        _ => {
            writeln!(f, "{}", record.args())
        }
    });

    builder.target(Target::Stderr).init();

    info!("pax-console version: {}", env!("CARGO_PKG_VERSION"));
}

/// The reset control is enabled after any finished upload; only a
/// successful one is followed by a reset.
fn upload_succeeded(view: &ViewModel) -> bool {
    matches!(&view.page, Page::System(page) if page.state == UploadState::Done)
}

fn config_loaded(view: &ViewModel) -> bool {
    matches!(&view.page, Page::Config(page) if page.loaded)
}

/// Parse `KEY=VALUE` where KEY is a configuration wire name.
fn parse_assignment(input: &str) -> Result<(ConfigKey, String), String> {
    let (key, value) = input
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got {input:?}"))?;
    let key = ConfigKey::from_wire_name(key.trim()).ok_or_else(|| {
        let known: Vec<&str> = pax_console_core::CONFIG_SCHEMA
            .iter()
            .map(|binding| binding.wire_name)
            .collect();
        format!("unknown key {key:?}, expected one of: {}", known.join(", "))
    })?;
    Ok((key, value.to_string()))
}
