use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

use super::{device::lenient_string, ParseError};

/// Configuration schema version this client fully understands.
///
/// Every configuration sent to the device is stamped with it, whatever the
/// device reported on load.
pub const CONFIG_SCHEMA_VERSION: u32 = 3;

/// Editable configuration fields, in form order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "camelCase")]
pub enum ConfigKey {
    Name,
    Pass,
    PrimarySsid,
    PrimaryPass,
    BackupSsid,
    BackupPass,
    IpAddress,
    IpMask,
    IpGateway,
    IpDns,
}

/// How a configuration field is named on the wire and bound into the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldBinding {
    pub key: ConfigKey,
    pub wire_name: &'static str,
    pub element_id: &'static str,
    pub label: &'static str,
    pub secret: bool,
    pub default: &'static str,
}

const fn field(
    key: ConfigKey,
    wire_name: &'static str,
    element_id: &'static str,
    label: &'static str,
    secret: bool,
) -> FieldBinding {
    FieldBinding {
        key,
        wire_name,
        element_id,
        label,
        secret,
        default: "",
    }
}

/// Static schema table used by the generic bind/unbind routines.
pub const CONFIG_SCHEMA: [FieldBinding; 10] = [
    field(ConfigKey::Name, "name", "pname", "Name", false),
    field(ConfigKey::Pass, "pass", "ppass", "Pass", true),
    field(ConfigKey::PrimarySsid, "primarySsid", "pap1s", "SSID", false),
    field(ConfigKey::PrimaryPass, "primaryPass", "pap1p", "Password", true),
    field(ConfigKey::BackupSsid, "backupSsid", "pap2s", "Backup SSID", false),
    field(ConfigKey::BackupPass, "backupPass", "pap2p", "Backup password", true),
    field(ConfigKey::IpAddress, "ipAddress", "pipAddr", "IP address", false),
    field(ConfigKey::IpMask, "ipMask", "pipMask", "Netmask", false),
    field(ConfigKey::IpGateway, "ipGateway", "pipGateway", "Gateway", false),
    field(ConfigKey::IpDns, "ipDns", "pipDNS", "DNS", false),
];

impl ConfigKey {
    pub fn binding(self) -> &'static FieldBinding {
        // CONFIG_SCHEMA is declared in enum order
        &CONFIG_SCHEMA[self as usize]
    }

    /// Look a key up by its wire name (`primarySsid`, ...).
    pub fn from_wire_name(name: &str) -> Option<Self> {
        CONFIG_SCHEMA
            .iter()
            .find(|b| b.wire_name == name)
            .map(|b| b.key)
    }
}

/// Wire names older firmware used, paired with their current name.
const LEGACY_WIRE_NAMES: [(&str, &str); 6] = [
    ("ap1s", "primarySsid"),
    ("ap1p", "primaryPass"),
    ("ap2s", "backupSsid"),
    ("ap2p", "backupPass"),
    ("ipAddr", "ipAddress"),
    ("ipDNS", "ipDns"),
];

/// Rename legacy keys in place; a current name already present wins.
fn upgrade_legacy_names(payload: &mut Value) {
    let Value::Object(map) = payload else {
        return;
    };
    for (legacy, current) in LEGACY_WIRE_NAMES {
        if let Some(value) = map.remove(legacy) {
            map.entry(current).or_insert(value);
        }
    }
}

/// Device configuration record in wire shape
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct Configuration {
    #[serde(rename = "version", deserialize_with = "lenient_version")]
    pub schema_version: u32,
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub pass: String,
    #[serde(deserialize_with = "lenient_string")]
    pub primary_ssid: String,
    #[serde(deserialize_with = "lenient_string")]
    pub primary_pass: String,
    #[serde(deserialize_with = "lenient_string")]
    pub backup_ssid: String,
    #[serde(deserialize_with = "lenient_string")]
    pub backup_pass: String,
    #[serde(deserialize_with = "lenient_string")]
    pub ip_address: String,
    #[serde(deserialize_with = "lenient_string")]
    pub ip_mask: String,
    #[serde(deserialize_with = "lenient_string")]
    pub ip_gateway: String,
    #[serde(deserialize_with = "lenient_string")]
    pub ip_dns: String,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            schema_version: CONFIG_SCHEMA_VERSION,
            name: String::new(),
            pass: String::new(),
            primary_ssid: String::new(),
            primary_pass: String::new(),
            backup_ssid: String::new(),
            backup_pass: String::new(),
            ip_address: String::new(),
            ip_mask: String::new(),
            ip_gateway: String::new(),
            ip_dns: String::new(),
        }
    }
}

impl Configuration {
    pub fn field(&self, key: ConfigKey) -> &str {
        match key {
            ConfigKey::Name => &self.name,
            ConfigKey::Pass => &self.pass,
            ConfigKey::PrimarySsid => &self.primary_ssid,
            ConfigKey::PrimaryPass => &self.primary_pass,
            ConfigKey::BackupSsid => &self.backup_ssid,
            ConfigKey::BackupPass => &self.backup_pass,
            ConfigKey::IpAddress => &self.ip_address,
            ConfigKey::IpMask => &self.ip_mask,
            ConfigKey::IpGateway => &self.ip_gateway,
            ConfigKey::IpDns => &self.ip_dns,
        }
    }

    pub fn field_mut(&mut self, key: ConfigKey) -> &mut String {
        match key {
            ConfigKey::Name => &mut self.name,
            ConfigKey::Pass => &mut self.pass,
            ConfigKey::PrimarySsid => &mut self.primary_ssid,
            ConfigKey::PrimaryPass => &mut self.primary_pass,
            ConfigKey::BackupSsid => &mut self.backup_ssid,
            ConfigKey::BackupPass => &mut self.backup_pass,
            ConfigKey::IpAddress => &mut self.ip_address,
            ConfigKey::IpMask => &mut self.ip_mask,
            ConfigKey::IpGateway => &mut self.ip_gateway,
            ConfigKey::IpDns => &mut self.ip_dns,
        }
    }
}

/// Form-side copy of the configuration being edited
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigForm {
    values: BTreeMap<ConfigKey, String>,
    revealed: BTreeSet<ConfigKey>,
}

impl ConfigForm {
    pub fn value(&self, key: ConfigKey) -> &str {
        self.values
            .get(&key)
            .map(String::as_str)
            .unwrap_or(key.binding().default)
    }

    pub fn set(&mut self, key: ConfigKey, value: impl Into<String>) {
        self.values.insert(key, value.into());
    }

    /// Flip clear-text display of a secret field. Returns false for fields
    /// that are never masked.
    pub fn toggle_reveal(&mut self, key: ConfigKey) -> bool {
        if !key.binding().secret {
            return false;
        }
        if !self.revealed.remove(&key) {
            self.revealed.insert(key);
        }
        true
    }

    pub fn is_revealed(&self, key: ConfigKey) -> bool {
        self.revealed.contains(&key)
    }
}

/// Versioned configuration plus its form binding
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigModel {
    pub record: Configuration,
    pub form: ConfigForm,
    /// Version tag of the last configuration the device sent.
    pub device_reported_version: Option<u32>,
    pub is_saving: bool,
}

impl ConfigModel {
    /// Replace the record from a device payload and rebind the form.
    ///
    /// The device's version tag is remembered but the in-memory record is
    /// restamped with [`CONFIG_SCHEMA_VERSION`].
    pub fn load_from(&mut self, json: &str) -> Result<(), ParseError> {
        let mut payload: Value = serde_json::from_str(json)?;
        upgrade_legacy_names(&mut payload);
        let mut fresh: Configuration = serde_json::from_value(payload)?;
        self.device_reported_version = Some(fresh.schema_version);
        fresh.schema_version = CONFIG_SCHEMA_VERSION;
        self.record = fresh;
        self.bind();
        Ok(())
    }

    /// Copy record values into the form.
    pub fn bind(&mut self) {
        for binding in &CONFIG_SCHEMA {
            self.form
                .set(binding.key, self.record.field(binding.key).to_string());
        }
    }

    /// Copy form values back into the record.
    pub fn unbind(&mut self) {
        for binding in &CONFIG_SCHEMA {
            let value = self.form.value(binding.key).to_string();
            *self.record.field_mut(binding.key) = value;
        }
    }

    /// Wire JSON of the current form state, stamped with the client version.
    pub fn export_for_save(&mut self) -> serde_json::Result<String> {
        self.unbind();
        self.record.schema_version = CONFIG_SCHEMA_VERSION;
        serde_json::to_string(&self.record)
    }

    /// Whether a configuration was ever read from the device.
    pub fn is_loaded(&self) -> bool {
        self.device_reported_version.is_some()
    }

    pub fn version_label(&self) -> String {
        format!("v{}", self.record.schema_version)
    }

    /// Version the device reported, if it differs from ours.
    pub fn version_drift(&self) -> Option<u32> {
        self.device_reported_version
            .filter(|v| *v != CONFIG_SCHEMA_VERSION)
    }
}

fn default_schema_version() -> u32 {
    CONFIG_SCHEMA_VERSION
}

fn lenient_version<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()).unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        Value::Null => default_schema_version(),
        _ => 0,
    })
}
