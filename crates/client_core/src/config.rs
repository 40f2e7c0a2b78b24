use std::{fs, path::Path};

use anyhow::{bail, Context};
use serde::Deserialize;
use url::Url;

pub const SETTINGS_FILE: &str = "image_tales.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientSettings {
    pub backend_url: String,
    /// Requests wait indefinitely when unset.
    pub request_timeout_secs: Option<u64>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:8080".into(),
            request_timeout_secs: None,
        }
    }
}

impl ClientSettings {
    pub fn backend_url(&self) -> anyhow::Result<Url> {
        parse_backend_url(&self.backend_url)
    }
}

/// Defaults, then `image_tales.toml` in the working directory, then the
/// environment.
pub fn load_settings() -> ClientSettings {
    let mut settings = ClientSettings::default();
    apply_settings_file(&mut settings, Path::new(SETTINGS_FILE));
    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    settings
}

/// Keys accepted in `image_tales.toml`. The timeout may be written as an
/// integer or a quoted number.
#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    backend_url: Option<String>,
    request_timeout_secs: Option<TimeoutValue>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TimeoutValue {
    Secs(i64),
    Text(String),
}

impl TimeoutValue {
    fn secs(&self) -> Option<u64> {
        match self {
            Self::Secs(secs) => u64::try_from(*secs).ok().filter(|secs| *secs > 0),
            Self::Text(raw) => parse_timeout(raw),
        }
    }
}

pub fn apply_settings_file(settings: &mut ClientSettings, path: &Path) {
    let Ok(raw) = fs::read_to_string(path) else {
        return;
    };
    match toml::from_str::<SettingsFile>(&raw) {
        Ok(file_cfg) => {
            if let Some(v) = file_cfg.backend_url {
                settings.backend_url = v;
            }
            if let Some(v) = file_cfg.request_timeout_secs {
                settings.request_timeout_secs = v.secs();
            }
        }
        Err(err) => {
            tracing::warn!("ignoring malformed settings file '{}': {err}", path.display());
        }
    }
}

pub fn apply_env_overrides(
    settings: &mut ClientSettings,
    lookup: impl Fn(&str) -> Option<String>,
) {
    if let Some(v) = lookup("IMAGE_TALES_BACKEND_URL") {
        settings.backend_url = v;
    }
    if let Some(v) = lookup("APP__BACKEND_URL") {
        settings.backend_url = v;
    }
    if let Some(v) = lookup("APP__REQUEST_TIMEOUT_SECS") {
        settings.request_timeout_secs = parse_timeout(&v);
    }
}

fn parse_timeout(raw: &str) -> Option<u64> {
    raw.trim().parse::<u64>().ok().filter(|secs| *secs > 0)
}

pub fn parse_backend_url(raw: &str) -> anyhow::Result<Url> {
    let raw = raw.trim();
    let url = Url::parse(raw).with_context(|| format!("invalid backend url '{raw}'"))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("backend url '{raw}' must use http or https");
    }
    if url.host_str().is_none() {
        bail!("backend url '{raw}' has no host");
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use std::{
        env,
        time::{SystemTime, UNIX_EPOCH},
    };

    use super::*;

    #[test]
    fn defaults_to_local_backend_without_timeout() {
        let settings = ClientSettings::default();
        assert_eq!(
            settings.backend_url().expect("url").as_str(),
            "http://localhost:8080/"
        );
        assert_eq!(settings.request_timeout_secs, None);
    }

    #[test]
    fn env_overrides_win_in_order() {
        let mut settings = ClientSettings::default();
        apply_env_overrides(&mut settings, |key| match key {
            "IMAGE_TALES_BACKEND_URL" => Some("http://first:1".to_string()),
            "APP__BACKEND_URL" => Some("http://second:2".to_string()),
            "APP__REQUEST_TIMEOUT_SECS" => Some("30".to_string()),
            _ => None,
        });
        assert_eq!(settings.backend_url, "http://second:2");
        assert_eq!(settings.request_timeout_secs, Some(30));
    }

    #[test]
    fn zero_or_garbage_timeout_means_no_timeout() {
        assert_eq!(parse_timeout("0"), None);
        assert_eq!(parse_timeout("soon"), None);
        assert_eq!(parse_timeout(" 15 "), Some(15));
    }

    fn settings_from_file(contents: &str) -> ClientSettings {
        let suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        let path = env::temp_dir().join(format!("image_tales_settings_{suffix}.toml"));
        fs::write(&path, contents).expect("write");

        let mut settings = ClientSettings::default();
        apply_settings_file(&mut settings, &path);
        fs::remove_file(path).expect("cleanup");
        settings
    }

    #[test]
    fn reads_flat_settings_file() {
        let settings = settings_from_file(
            "backend_url = \"https://tales.example.com\"\nrequest_timeout_secs = \"90\"\n",
        );
        assert_eq!(settings.backend_url, "https://tales.example.com");
        assert_eq!(settings.request_timeout_secs, Some(90));
    }

    #[test]
    fn integer_timeout_keeps_backend_url() {
        let settings = settings_from_file(
            "backend_url = \"https://tales.example.com\"\nrequest_timeout_secs = 90\n",
        );
        assert_eq!(settings.backend_url, "https://tales.example.com");
        assert_eq!(settings.request_timeout_secs, Some(90));
    }

    #[test]
    fn negative_or_zero_integer_timeout_means_no_timeout() {
        assert_eq!(
            settings_from_file("request_timeout_secs = 0\n").request_timeout_secs,
            None
        );
        assert_eq!(
            settings_from_file("request_timeout_secs = -5\n").request_timeout_secs,
            None
        );
    }

    #[test]
    fn rejects_non_http_backend_urls() {
        assert!(parse_backend_url("ftp://example.com").is_err());
        assert!(parse_backend_url("not a url").is_err());
        assert!(parse_backend_url(" https://example.com/api ").is_ok());
    }
}
