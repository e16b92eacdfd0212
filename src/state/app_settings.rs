use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tourney_api::{Stage, StageFilter};

const DEFAULT_API_BASE: &str = "http://127.0.0.1:8080/api";
const DEFAULT_PAGE_SIZE: usize = 12;

/// Runtime configuration. Environment variables win over the settings file;
/// the file only carries what the operator last used.
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub api_base: String,
    pub api_key: String,
    pub tournament_id: String,
    pub stage: StageFilter,
    pub page_size: usize,
    pub log_level: Option<LevelFilter>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SettingsFile {
    page_size: Option<usize>,
    stage: Option<String>,
}

impl AppSettings {
    pub fn load() -> Self {
        // A local .env is the usual way to carry the key during development.
        dotenvy::dotenv().ok();

        let file = read_settings_file().unwrap_or_default();

        let stage = env_var("TMTUI_STAGE")
            .as_deref()
            .or(file.stage.as_deref())
            .map(parse_stage_token)
            .unwrap_or_default();

        Self {
            api_base: env_var("TMTUI_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.into()),
            api_key: env_var("TMTUI_API_KEY").unwrap_or_default(),
            tournament_id: env_var("TMTUI_TOURNAMENT").unwrap_or_default(),
            stage,
            page_size: file.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
            log_level: env_var("TMTUI_LOG").as_deref().and_then(parse_log_level),
        }
    }

    /// Persist the operator-facing bits so the next session opens where this
    /// one left off.
    pub fn save(&self, stage: StageFilter) -> Result<(), String> {
        let path = settings_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| format!("create dir failed: {e}"))?;
        }
        let file = SettingsFile {
            page_size: Some(self.page_size),
            stage: Some(stage_token(stage).to_owned()),
        };
        let payload = serde_json::to_string_pretty(&file)
            .map_err(|e| format!("serialize settings failed: {e}"))?;
        std::fs::write(&path, payload).map_err(|e| format!("write settings failed: {e}"))?;
        Ok(())
    }
}

fn read_settings_file() -> Option<SettingsFile> {
    let content = std::fs::read_to_string(settings_path()).ok()?;
    serde_json::from_str(&content).ok()
}

fn settings_path() -> PathBuf {
    if let Ok(config_dir) = std::env::var("XDG_CONFIG_HOME")
        && !config_dir.trim().is_empty()
    {
        return PathBuf::from(config_dir).join("tmtui").join("settings.json");
    }
    if let Ok(home) = std::env::var("HOME")
        && !home.trim().is_empty()
    {
        return PathBuf::from(home).join(".config").join("tmtui").join("settings.json");
    }
    PathBuf::from("tmtui-settings.json")
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_stage_token(token: &str) -> StageFilter {
    match token {
        "all" => StageFilter::All,
        other => Stage::from_query(other).map(StageFilter::Only).unwrap_or_default(),
    }
}

fn stage_token(filter: StageFilter) -> &'static str {
    match filter {
        StageFilter::All => "all",
        StageFilter::Only(stage) => stage.as_query(),
    }
}

fn parse_log_level(s: &str) -> Option<LevelFilter> {
    match s.to_ascii_lowercase().as_str() {
        "off" => Some(LevelFilter::Off),
        "error" => Some(LevelFilter::Error),
        "warn" => Some(LevelFilter::Warn),
        "info" => Some(LevelFilter::Info),
        "debug" => Some(LevelFilter::Debug),
        "trace" => Some(LevelFilter::Trace),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_tokens_round_trip() {
        assert_eq!(parse_stage_token("all"), StageFilter::All);
        assert_eq!(
            parse_stage_token("quarter_final"),
            StageFilter::Only(Stage::QuarterFinal)
        );
        assert_eq!(parse_stage_token("nonsense"), StageFilter::All);
        for filter in [StageFilter::All, StageFilter::Only(Stage::Final)] {
            assert_eq!(parse_stage_token(stage_token(filter)), filter);
        }
    }
}
