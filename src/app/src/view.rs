//! View model handed to the shell.
//!
//! Only the page of the active view is materialized; the shell renders
//! exactly that page plus the header and log.

use serde::{Deserialize, Serialize};

use crate::model::Model;
use crate::types::*;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ViewModel {
    pub title: String,
    pub tagline: String,
    pub page: Page,
    pub log: Vec<LogEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Page {
    Home(HomePage),
    Config(ConfigPage),
    System(SystemPage),
}

impl Default for Page {
    fn default() -> Self {
        Self::Home(HomePage::default())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct HomePage {
    /// `exampleStatusData` in hex, empty while unknown
    pub status_hex: String,
    /// One button per user command; data comes from the command input
    pub commands: Vec<DeviceCommand>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConfigPage {
    pub version_label: String,
    pub fields: Vec<ConfigFieldView>,
    /// False until the device's configuration was read successfully
    pub loaded: bool,
    pub save_enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConfigFieldView {
    pub key: ConfigKey,
    pub element_id: String,
    pub label: String,
    pub value: String,
    pub secret: bool,
    pub revealed: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SystemPage {
    pub app_name: String,
    /// Present when the device reports a project link
    pub app_link: Option<String>,
    pub app_details: String,
    pub sha_line: String,
    pub hw_line: String,
    pub state: UploadState,
    pub controls: UploadControls,
    pub abort_enabled: bool,
    pub file_label: Option<String>,
    pub progress_label: Option<String>,
}

impl From<&Model> for ViewModel {
    fn from(model: &Model) -> Self {
        let page = match model.view {
            View::Home => Page::Home(HomePage {
                status_hex: model.live_status.example_status_hex(),
                commands: DeviceCommand::USER.to_vec(),
            }),
            View::Config => Page::Config(config_page(&model.config)),
            View::System => Page::System(system_page(&model.device_info, &model.upload)),
        };

        Self {
            title: model.device_info.title.clone(),
            tagline: model.device_info.tagline.clone(),
            page,
            log: model.log.entries().cloned().collect(),
        }
    }
}

fn config_page(config: &ConfigModel) -> ConfigPage {
    let fields = CONFIG_SCHEMA
        .iter()
        .map(|binding| ConfigFieldView {
            key: binding.key,
            element_id: binding.element_id.to_string(),
            label: binding.label.to_string(),
            value: config.form.value(binding.key).to_string(),
            secret: binding.secret,
            revealed: config.form.is_revealed(binding.key),
        })
        .collect();

    ConfigPage {
        version_label: config.version_label(),
        fields,
        loaded: config.is_loaded(),
        save_enabled: !config.is_saving,
    }
}

fn system_page(info: &DeviceInfo, upload: &UploadController) -> SystemPage {
    let progress_label = match upload.state {
        UploadState::Idle | UploadState::Selected => None,
        _ => Some(format!("{}%", upload.progress)),
    };

    SystemPage {
        app_name: info.app_name.clone(),
        app_link: (!info.link.is_empty()).then(|| info.link.clone()),
        app_details: format!(
            "{} compiled with ESP-IDF {} on {}",
            info.app_version, info.idf_version, info.compile_time
        ),
        sha_line: format!("SHA256 of the elf file is: {}", info.elf_sha256),
        hw_line: info.hw_info.clone(),
        state: upload.state.clone(),
        controls: upload.controls,
        abort_enabled: upload.is_uploading(),
        file_label: upload.file_label(),
        progress_label,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_active_page_is_built() {
        let mut model = Model::default();
        model.live_status.example_status_data = Some(4095);

        let vm = ViewModel::from(&model);
        assert_eq!(
            vm.page,
            Page::Home(HomePage {
                status_hex: "fff".to_string(),
                commands: vec![
                    DeviceCommand::Command1,
                    DeviceCommand::Command2,
                    DeviceCommand::Command3,
                ],
            })
        );

        model.view = View::Config;
        assert!(matches!(ViewModel::from(&model).page, Page::Config(_)));
    }

    #[test]
    fn system_page_formats_board_identity() {
        let model = Model {
            view: View::System,
            device_info: DeviceInfo {
                app_name: "pax".to_string(),
                app_version: "1.0.2".to_string(),
                link: "https://example.org/pax".to_string(),
                idf_version: "v5.1".to_string(),
                compile_time: "Jan 1 2024".to_string(),
                elf_sha256: "deadbeef".to_string(),
                hw_info: "ESP32-S3".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };

        let Page::System(page) = ViewModel::from(&model).page else {
            panic!("expected system page");
        };
        assert_eq!(page.app_link.as_deref(), Some("https://example.org/pax"));
        assert_eq!(page.app_details, "1.0.2 compiled with ESP-IDF v5.1 on Jan 1 2024");
        assert_eq!(page.sha_line, "SHA256 of the elf file is: deadbeef");
        assert_eq!(page.hw_line, "ESP32-S3");
        assert_eq!(page.progress_label, None);
        assert!(!page.abort_enabled);
    }

    #[test]
    fn config_page_masks_secrets_by_default() {
        let mut model = Model {
            view: View::Config,
            ..Default::default()
        };
        let Page::Config(page) = ViewModel::from(&model).page else {
            panic!("expected config page");
        };
        assert!(!page.loaded);

        model.config.load_from(r#"{"name":"dev","pass":"s3cret"}"#).unwrap();

        let Page::Config(page) = ViewModel::from(&model).page else {
            panic!("expected config page");
        };
        assert_eq!(page.version_label, "v3");
        assert_eq!(page.fields.len(), CONFIG_SCHEMA.len());

        let pass = page.fields.iter().find(|f| f.key == ConfigKey::Pass).unwrap();
        assert_eq!(pass.value, "s3cret");
        assert!(pass.secret && !pass.revealed);
        assert!(page.loaded);
        assert!(page.save_enabled);
    }
}
