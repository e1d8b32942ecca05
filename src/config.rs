use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::time::Duration;

/// Путь по умолчанию к сокету триггера (персональный для пользователя)
static DEFAULT_SOCKET_PATH: Lazy<String> = Lazy::new(|| default_runtime_path("sock"));

/// Путь по умолчанию к файлу сохранённого состояния
static DEFAULT_STATE_PATH: Lazy<String> = Lazy::new(|| default_runtime_path("state"));

fn default_runtime_path(ext: &str) -> String {
    let user = std::env::var("USER").unwrap_or_else(|_| "unknown".to_string());
    format!("/tmp/.cyclefocus-{}.{}", user, ext)
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub cycle: CycleConfig,
    pub paths: PathsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub filter: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CycleConfig {
    /// Вид сущностей: "window" или "workspace"
    pub kind: String,
    /// Максимум записей истории, участвующих в цикле
    pub history_limit: usize,
    /// Задержка дебаунса перед фиксацией фокуса (0.0 = мгновенный toggle)
    pub update_delay_seconds: f64,
    /// Фильтр допустимых целей цикла
    pub filter_mode: String,
    /// Исключать плавающие окна (только для kind = "window")
    pub ignore_floating: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PathsConfig {
    pub socket: String,
    pub state_file: String,
}

/// Вид отслеживаемых сущностей
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Window,
    Workspace,
}

/// Режим фильтрации допустимых целей цикла (взаимоисключающие)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    All,
    /// "active-workspace" и "focused-workspace" ведут себя одинаково при
    /// фильтрации, но focused-workspace дополнительно включает раздельное
    /// отслеживание по рабочим столам
    ActiveWorkspace,
    FocusedWorkspace,
    VisibleWorkspaces,
    FocusedOutput,
}

/// Схема сегментации списков истории
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackingScope {
    Global,
    PerOutput,
    PerWorkspace,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
                filter: "cyclefocus_rust=info".to_string(),
            },
            cycle: CycleConfig {
                kind: "window".to_string(),
                history_limit: 16,
                update_delay_seconds: 2.0,
                filter_mode: "all".to_string(),
                ignore_floating: false,
            },
            paths: PathsConfig {
                socket: DEFAULT_SOCKET_PATH.clone(),
                state_file: DEFAULT_STATE_PATH.clone(),
            },
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();

        let figment = Figment::new()
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("CYCLE_"));

        let config: Config = figment
            .extract()
            .with_context(|| format!("Не удалось загрузить конфигурацию из {:?}", config_path))?;

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        // Валидация настроек логирования
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!("Неверный уровень логирования: {}", self.logging.level),
        }

        match self.logging.format.as_str() {
            "pretty" | "json" => {}
            _ => anyhow::bail!("Неверный формат логирования: {}", self.logging.format),
        }

        // Валидация настроек цикла
        if self.cycle.history_limit == 0 {
            anyhow::bail!("history_limit должно быть больше 0");
        }

        if self.cycle.update_delay_seconds < 0.0 {
            anyhow::bail!("update_delay_seconds не может быть отрицательным");
        }

        match self.cycle.kind.as_str() {
            "window" | "workspace" => {}
            _ => anyhow::bail!("Неверный вид сущностей: {}", self.cycle.kind),
        }

        match self.cycle.filter_mode.as_str() {
            "all" | "active-workspace" | "focused-workspace" | "visible-workspaces"
            | "focused-output" => {}
            _ => anyhow::bail!("Неверный режим фильтрации: {}", self.cycle.filter_mode),
        }

        // Вариант для рабочих столов поддерживает только подмножество режимов
        if self.entity_kind() == EntityKind::Workspace {
            match self.filter_mode() {
                FilterMode::All | FilterMode::FocusedOutput => {}
                _ => anyhow::bail!(
                    "Режим '{}' недоступен для kind = \"workspace\"",
                    self.cycle.filter_mode
                ),
            }

            if self.cycle.ignore_floating {
                anyhow::bail!("ignore_floating применим только к kind = \"window\"");
            }
        }

        if self.paths.socket.is_empty() || self.paths.state_file.is_empty() {
            anyhow::bail!("Пути socket и state_file не могут быть пустыми");
        }

        Ok(())
    }

    pub fn entity_kind(&self) -> EntityKind {
        match self.cycle.kind.as_str() {
            "workspace" => EntityKind::Workspace,
            _ => EntityKind::Window,
        }
    }

    pub fn filter_mode(&self) -> FilterMode {
        match self.cycle.filter_mode.as_str() {
            "active-workspace" => FilterMode::ActiveWorkspace,
            "focused-workspace" => FilterMode::FocusedWorkspace,
            "visible-workspaces" => FilterMode::VisibleWorkspaces,
            "focused-output" => FilterMode::FocusedOutput,
            _ => FilterMode::All,
        }
    }

    /// Схема сегментации выводится из режима фильтрации: focused-output ведёт
    /// независимые списки по output'ам, focused-workspace - по рабочим столам,
    /// остальные режимы используют один глобальный список.
    pub fn tracking_scope(&self) -> TrackingScope {
        match self.filter_mode() {
            FilterMode::FocusedOutput => TrackingScope::PerOutput,
            FilterMode::FocusedWorkspace => TrackingScope::PerWorkspace,
            _ => TrackingScope::Global,
        }
    }

    pub fn update_delay(&self) -> Duration {
        Duration::from_secs_f64(self.cycle.update_delay_seconds)
    }
}
