use crate::debug_if_enabled;
use crate::error::Result;
use crate::services::switcher::CycleSwitcher;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tokio::signal::unix::{signal, SignalKind};
use tracing::{info, warn};

/// Фиксированное сообщение триггера от короткоживущего клиента
pub const SWITCH_MSG: &[u8] = b"switch";

/// Приёмник триггеров "выполнить один шаг цикла".
///
/// Два транспорта: SIGUSR1 и локальный Unix-сокет с фиксированным сообщением.
/// Оба обслуживаются одним select-циклом без spawn на соединение, поэтому
/// обработчики триггеров никогда не перемежаются - шаг цикла выполняется
/// строго последовательно.
pub struct TriggerListener {
    socket_path: PathBuf,
    switcher: Arc<CycleSwitcher>,
}

impl TriggerListener {
    pub fn new(socket_path: impl Into<PathBuf>, switcher: Arc<CycleSwitcher>) -> Self {
        Self {
            socket_path: socket_path.into(),
            switcher,
        }
    }

    pub async fn run(self) -> Result<()> {
        // Остаток сокета от предыдущего запуска мешает bind
        if self.socket_path.exists() {
            let _ = std::fs::remove_file(&self.socket_path);
        }

        let listener = UnixListener::bind(&self.socket_path)?;
        let mut sigusr1 = signal(SignalKind::user_defined1())?;

        info!(
            "Триггеры активны: SIGUSR1 и сокет {:?}",
            self.socket_path
        );

        loop {
            tokio::select! {
                _ = sigusr1.recv() => {
                    debug_if_enabled!("Получен SIGUSR1");
                    self.switcher.switch().await?;
                }
                accept = listener.accept() => {
                    match accept {
                        Ok((stream, _addr)) => {
                            if read_switch_message(stream).await {
                                self.switcher.switch().await?;
                            }
                        }
                        Err(e) => {
                            warn!("Ошибка accept на сокете триггера: {}", e);
                        }
                    }
                }
            }
        }
    }
}

/// Прочитать сообщение клиента; true, если это корректный запрос переключения
async fn read_switch_message(mut stream: UnixStream) -> bool {
    let mut buf = [0u8; 16];
    match stream.read(&mut buf).await {
        Ok(n) if &buf[..n] == SWITCH_MSG => true,
        Ok(n) => {
            warn!(
                "Неизвестное сообщение триггера: {:?}",
                String::from_utf8_lossy(&buf[..n])
            );
            false
        }
        Err(e) => {
            warn!("Ошибка чтения из сокета триггера: {}", e);
            false
        }
    }
}

/// Клиентская сторона: подключиться, отправить "switch", отключиться.
/// У клиента нет никакого собственного состояния.
pub async fn send_switch(socket_path: impl AsRef<Path>) -> Result<()> {
    let mut stream = UnixStream::connect(socket_path.as_ref()).await?;
    stream.write_all(SWITCH_MSG).await?;
    stream.shutdown().await?;
    Ok(())
}
