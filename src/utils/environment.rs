use crate::error::{CycleError, Result};
use std::process::Command;
use tracing::{info, warn};

/// Предварительная проверка окружения перед запуском демона.
///
/// Демон полностью зависит от работающего sway/i3: если `swaymsg` недоступен,
/// нет смысла продолжать запуск. В dry-run режиме проверка пропускается.
pub fn check_environment(dry_run: bool) -> Result<()> {
    if dry_run {
        warn!("Dry-run режим - проверка окружения пропущена");
        return Ok(());
    }

    let output = Command::new("swaymsg")
        .args(["-t", "get_version"])
        .output()
        .map_err(|e| {
            CycleError::ServiceUnavailable(format!("swaymsg не найден в PATH: {}", e))
        })?;

    if !output.status.success() {
        return Err(CycleError::ServiceUnavailable(
            "swaymsg не смог подключиться к window manager (проверьте SWAYSOCK/I3SOCK)"
                .to_string(),
        ));
    }

    info!("Окружение проверено: swaymsg доступен");
    Ok(())
}
