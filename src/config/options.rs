// src/config/options.rs
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use super::consts::*;
use crate::error::ConfigError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransportKind {
    /// Password-based plain FTP.
    Ftp,
    /// SFTP over SSH, password or key file.
    Sftp,
}

impl TransportKind {
    pub fn default_port(self) -> u16 {
        match self {
            TransportKind::Ftp => FTP_PORT,
            TransportKind::Sftp => SFTP_PORT,
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "ftp" => Some(TransportKind::Ftp),
            "sftp" | "ssh" => Some(TransportKind::Sftp),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchOptions {
    pub transport: TransportKind,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub key_path: Option<PathBuf>,   // SFTP public-key auth; password doubles as passphrase
    pub passive: bool,               // FTP only
    pub remote_path: String,
    pub identity_remote_path: Option<String>,
    pub data_ext: String,
}

impl FetchOptions {
    /// Host and user are the minimum to attempt a connection.
    pub fn is_configured(&self) -> bool {
        !self.host.is_empty() && !self.user.is_empty()
    }
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            transport: TransportKind::Ftp,
            host: s!(),
            port: FTP_PORT,
            user: s!(),
            password: s!(),
            key_path: None,
            passive: true,
            remote_path: s!(REMOTE_PATH),
            identity_remote_path: None,
            data_ext: s!(DATA_EXT),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreOptions {
    pub data_dir: PathBuf,
    pub identity_file: String,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(LOCAL_DATA_DIR),
            identity_file: s!(IDENTITY_FILE),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderOptions {
    pub title: String,
    pub count_label: String,
    pub max_rows: usize,
    pub out_path: PathBuf,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            title: s!(TITLE),
            count_label: s!(COUNT_LABEL),
            max_rows: MAX_ROWS,
            out_path: PathBuf::from(OUT_PATH),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScheduleOptions {
    pub interval: Duration,
}

impl Default for ScheduleOptions {
    fn default() -> Self {
        Self { interval: Duration::from_secs(REFRESH_SECONDS) }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServeOptions {
    pub port: u16,
    pub api_token: String,           // empty → upload endpoint disabled
}

impl Default for ServeOptions {
    fn default() -> Self {
        Self { port: HTTP_PORT, api_token: s!() }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AppOptions {
    pub fetch: FetchOptions,
    pub store: StoreOptions,
    pub render: RenderOptions,
    pub schedule: ScheduleOptions,
    pub serve: ServeOptions,
}

impl AppOptions {
    /// Process environment only.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// `KEY=value` file as the base layer, process environment on top.
    pub fn from_env_and_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        let kv = parse_kv(&text);
        let env = |k: &str| std::env::var(k).ok();
        let file = |k: &str| kv.get(k).cloned();
        Self::from_layers(&[&env, &file])
    }

    /// Build options from any key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Self::from_layers(&[&lookup])
    }

    /// Lookups in priority order. A key and all its aliases are resolved against one
    /// layer before the next layer is consulted, and a blank value falls through.
    pub fn from_layers(layers: &[&dyn Fn(&str) -> Option<String>]) -> Result<Self, ConfigError> {
        // exact value; passwords, tokens and labels keep their whitespace
        let raw = |keys: &[&str]| -> Option<(String, String)> {
            layers.iter().find_map(|lookup| {
                keys.iter().find_map(|k| {
                    lookup(k)
                        .filter(|v| !v.trim().is_empty())
                        .map(|v| (k.to_string(), v))
                })
            })
        };
        let get = |keys: &[&str]| raw(keys).map(|(k, v)| (k, v.trim().to_string()));

        let mut opts = AppOptions::default();

        // Fetch
        let f = &mut opts.fetch;
        if let Some((key, v)) = get(&["TRANSPORT"]) {
            f.transport = TransportKind::parse(&v).ok_or(ConfigError::Invalid { key, value: v })?;
        }
        f.port = f.transport.default_port();
        if let Some((_, v)) = get(&["FTP_HOST", "REMOTE_HOST"]) { f.host = v; }
        if let Some(kv) = get(&["FTP_PORT", "REMOTE_PORT"]) { f.port = parse_num(kv)?; }
        if let Some((_, v)) = get(&["FTP_USER", "REMOTE_USER"]) { f.user = v; }
        if let Some((_, v)) = raw(&["FTP_PASS", "REMOTE_PASS"]) { f.password = v; }
        if let Some((_, v)) = get(&["SFTP_KEY_PATH"]) { f.key_path = Some(PathBuf::from(v)); }
        if let Some(kv) = get(&["FTP_PASSIVE"]) { f.passive = parse_bool(kv)?; }
        if let Some((_, v)) = get(&["FTP_PATH", "REMOTE_PATH"]) { f.remote_path = v; }
        if let Some((_, v)) = get(&["IDENTITY_REMOTE_PATH"]) { f.identity_remote_path = Some(v); }
        if let Some((_, v)) = get(&["DATA_EXT"]) {
            f.data_ext = if v.starts_with('.') { v } else { join!(".", &v) };
        }

        // Store
        if let Some((_, v)) = get(&["LOCAL_DATA_DIR"]) { opts.store.data_dir = PathBuf::from(v); }
        if let Some((_, v)) = get(&["IDENTITY_FILE"]) { opts.store.identity_file = v; }

        // Render
        let r = &mut opts.render;
        if let Some((_, v)) = get(&["OUT_PATH"]) { r.out_path = PathBuf::from(v); }
        if let Some((_, v)) = raw(&["TITLE"]) { r.title = v; }
        if let Some((_, v)) = raw(&["COUNT_LABEL"]) { r.count_label = v; }
        if let Some(kv) = get(&["MAX_ROWS"]) { r.max_rows = parse_num(kv)?; }

        // Schedule
        if let Some(kv) = get(&["REFRESH_SECONDS"]) {
            let secs: u64 = parse_num(kv)?;
            opts.schedule.interval = Duration::from_secs(secs.max(1));
        }

        // Serve
        if let Some(kv) = get(&["PORT", "HTTP_PORT"]) { opts.serve.port = parse_num(kv)?; }
        if let Some((_, v)) = raw(&["API_TOKEN"]) { opts.serve.api_token = v; }

        Ok(opts)
    }
}

fn parse_num<T: FromStr>((key, value): (String, String)) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::Invalid { key, value })
}

fn parse_bool((key, value): (String, String)) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid { key, value }),
    }
}

/// `KEY=value` lines. `#` comments and blank lines are skipped; surrounding quotes are dropped.
pub fn parse_kv(text: &str) -> HashMap<String, String> {
    let mut out = HashMap::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') { continue; }
        let line = line.strip_prefix("export ").unwrap_or(line);
        if let Some(eq) = line.find('=') {
            let key = line[..eq].trim();
            let val = line[eq + 1..].trim();
            let val = val
                .strip_prefix('"').and_then(|v| v.strip_suffix('"'))
                .or_else(|| val.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
                .unwrap_or(val);
            if !key.is_empty() {
                out.insert(key.to_string(), val.to_string());
            }
        }
    }
    out
}
