//! Связь с window manager: границы ответственности
//!
//! Этот модуль отвечает ТОЛЬКО за протокол общения со sway/i3: запросы
//! состояния дерева, подписку на события и отправку команд. Никакой логики
//! истории или фильтрации здесь нет - она целиком живёт в history/validity/
//! switcher. Потеря соединения с window manager фатальна для демона.

mod dry_run;
mod events;
mod swaymsg;
pub mod tree;

pub use events::{EventStream, WmEvent};
pub use tree::{Node, Output};

use crate::error::Result;
use std::sync::Arc;

/// Протокольный клиент window manager
#[async_trait::async_trait]
pub trait SwayClient: Send + Sync {
    /// Запросить полное дерево контейнеров
    async fn get_tree(&self) -> Result<Node>;

    /// Запросить список output'ов
    async fn get_outputs(&self) -> Result<Vec<Output>>;

    /// Выполнить команду window manager (focus/workspace)
    async fn run_command(&self, command: &str) -> Result<()>;
}

/// Фабрика клиента: реальный swaymsg или эмуляция для dry-run
pub fn create_sway_client(dry_run: bool) -> Arc<dyn SwayClient> {
    if dry_run {
        Arc::new(dry_run::DryRunClient::new())
    } else {
        Arc::new(swaymsg::SwaymsgClient::new())
    }
}
