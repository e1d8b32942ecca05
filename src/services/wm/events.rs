use super::Node;
use crate::error::{CycleError, Result};
use serde_json::Value;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader, Lines};
use tokio::process::{Child, ChildStdout, Command};
use tracing::{info, warn};

/// Событие window manager, интересующее демон
#[derive(Debug)]
pub enum WmEvent {
    /// Фокус перешёл на окно (контейнер из события)
    WindowFocus(Node),
    /// Фокус перешёл на рабочий стол (узел current из события)
    WorkspaceFocus(Node),
    /// Жизненный цикл window manager ("restart" или "exit")
    Shutdown(String),
    /// Событие подписки, не требующее реакции
    Ignored,
}

/// Поток событий от swaymsg -t subscribe --monitor.
///
/// swaymsg печатает каждое событие отдельной JSON-строкой без указания типа,
/// поэтому тип восстанавливается по характерным полям: у событий окон есть
/// "container", у рабочих столов - "current", у shutdown - только "change".
pub struct EventStream {
    _child: Child,
    lines: Lines<BufReader<ChildStdout>>,
}

impl EventStream {
    pub fn subscribe() -> Result<Self> {
        let mut child = Command::new("swaymsg")
            .args([
                "-t",
                "subscribe",
                "--monitor",
                r#"["window", "workspace", "shutdown"]"#,
            ])
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                CycleError::Sway(format!("не удалось запустить swaymsg subscribe: {}", e))
            })?;

        let stdout = child.stdout.take().ok_or_else(|| {
            CycleError::Internal("swaymsg subscribe без stdout".to_string())
        })?;

        info!("Подписка на события window/workspace/shutdown установлена");

        Ok(Self {
            _child: child,
            lines: BufReader::new(stdout).lines(),
        })
    }

    /// Следующее событие подписки; закрытие потока фатально
    pub async fn next_event(&mut self) -> Result<WmEvent> {
        loop {
            let line = self.lines.next_line().await?.ok_or_else(|| {
                CycleError::Sway("поток событий window manager закрыт".to_string())
            })?;

            if line.trim().is_empty() {
                continue;
            }

            match parse_event(&line) {
                Ok(event) => return Ok(event),
                Err(e) => {
                    warn!("Не удалось разобрать событие, пропускаем: {}", e);
                }
            }
        }
    }
}

/// Разбор одной JSON-строки события подписки
pub fn parse_event(line: &str) -> Result<WmEvent> {
    let value: Value = serde_json::from_str(line)?;
    let change = value
        .get("change")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    if let Some(container) = value.get("container") {
        if change != "focus" {
            return Ok(WmEvent::Ignored);
        }
        let node: Node = serde_json::from_value(container.clone())?;
        return Ok(WmEvent::WindowFocus(node));
    }

    if let Some(current) = value.get("current") {
        if change != "focus" || current.is_null() {
            return Ok(WmEvent::Ignored);
        }
        let node: Node = serde_json::from_value(current.clone())?;
        return Ok(WmEvent::WorkspaceFocus(node));
    }

    if matches!(change.as_str(), "restart" | "exit") {
        return Ok(WmEvent::Shutdown(change));
    }

    Ok(WmEvent::Ignored)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_window_focus_event() {
        let line = r#"{"change": "focus", "container": {"id": 42, "type": "con", "name": "editor", "output": "DP-1", "floating": "auto_off"}}"#;
        match parse_event(line).unwrap() {
            WmEvent::WindowFocus(node) => {
                assert_eq!(node.id, 42);
                assert_eq!(node.output.as_deref(), Some("DP-1"));
                assert!(!node.is_floating());
            }
            other => panic!("ожидали WindowFocus, получили {:?}", other),
        }
    }

    #[test]
    fn test_parse_workspace_focus_event() {
        let line = r#"{"change": "focus", "old": null, "current": {"id": 7, "type": "workspace", "name": "3: web", "num": 3, "output": "HDMI-1"}}"#;
        match parse_event(line).unwrap() {
            WmEvent::WorkspaceFocus(node) => {
                assert_eq!(node.name.as_deref(), Some("3: web"));
                assert_eq!(node.num, Some(3));
            }
            other => panic!("ожидали WorkspaceFocus, получили {:?}", other),
        }
    }

    #[test]
    fn test_parse_shutdown_and_ignored_events() {
        assert!(matches!(
            parse_event(r#"{"change": "restart"}"#).unwrap(),
            WmEvent::Shutdown(change) if change == "restart"
        ));

        // Смена заголовка окна не интересна
        assert!(matches!(
            parse_event(r#"{"change": "title", "container": {"id": 1, "type": "con"}}"#).unwrap(),
            WmEvent::Ignored
        ));

        // workspace init не влияет на историю фокуса
        assert!(matches!(
            parse_event(r#"{"change": "init", "current": {"id": 9, "type": "workspace"}}"#)
                .unwrap(),
            WmEvent::Ignored
        ));
    }
}
