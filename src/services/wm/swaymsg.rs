use super::{Node, Output, SwayClient};
use crate::error::{CycleError, Result};
use crate::{cycle_error, debug_if_enabled};
use tokio::process::Command;

/// Клиент IPC через утилиту swaymsg.
///
/// Каждый запрос - отдельный короткоживущий процесс swaymsg с флагом --raw,
/// ответ разбирается как JSON. Любой сбой (swaymsg не найден, ненулевой код
/// возврата) трактуется как потеря соединения и фатален для демона.
pub struct SwaymsgClient;

impl SwaymsgClient {
    pub fn new() -> Self {
        Self
    }

    async fn ipc_query(&self, msg_type: &str) -> Result<String> {
        let output = Command::new("swaymsg")
            .args(["-t", msg_type, "--raw"])
            .output()
            .await
            .map_err(|e| CycleError::Sway(format!("не удалось запустить swaymsg: {}", e)))?;

        if !output.status.success() {
            return Err(cycle_error!(
                sway,
                "swaymsg -t {} завершился с ошибкой: {}",
                msg_type,
                String::from_utf8_lossy(&output.stderr).trim()
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait::async_trait]
impl SwayClient for SwaymsgClient {
    async fn get_tree(&self) -> Result<Node> {
        let raw = self.ipc_query("get_tree").await?;
        Ok(serde_json::from_str(&raw)?)
    }

    async fn get_outputs(&self) -> Result<Vec<Output>> {
        let raw = self.ipc_query("get_outputs").await?;
        Ok(serde_json::from_str(&raw)?)
    }

    async fn run_command(&self, command: &str) -> Result<()> {
        debug_if_enabled!("Выполняем команду: {}", command);

        let output = Command::new("swaymsg")
            .arg(command)
            .output()
            .await
            .map_err(|e| CycleError::Sway(format!("не удалось запустить swaymsg: {}", e)))?;

        if !output.status.success() {
            return Err(CycleError::Sway(format!(
                "команда '{}' завершилась с ошибкой: {}",
                command,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(())
    }
}
