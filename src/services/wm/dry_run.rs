use super::{Node, Output, SwayClient};
use crate::error::Result;
use tracing::info;

/// Эмуляция клиента window manager для dry-run режима.
///
/// Отдаёт фиксированное синтетическое дерево из четырёх окон на двух рабочих
/// столах и логирует команды вместо их выполнения.
pub struct DryRunClient;

impl DryRunClient {
    pub fn new() -> Self {
        Self
    }

    fn synthetic_tree() -> Node {
        let value = serde_json::json!({
            "id": 1,
            "type": "root",
            "nodes": [
                {
                    "id": 2, "type": "output", "name": "DRY-1",
                    "nodes": [
                        {
                            "id": 10, "type": "workspace", "name": "1", "num": 1,
                            "output": "DRY-1",
                            "nodes": [
                                {"id": 101, "type": "con", "name": "Terminal - dry_run", "focused": true},
                                {"id": 102, "type": "con", "name": "Browser - dry_run"}
                            ]
                        },
                        {
                            "id": 20, "type": "workspace", "name": "2", "num": 2,
                            "output": "DRY-1",
                            "nodes": [
                                {"id": 103, "type": "con", "name": "Editor - dry_run"},
                                {"id": 104, "type": "con", "name": "Game - dry_run"}
                            ]
                        }
                    ]
                }
            ]
        });
        // Статическое дерево известной формы, разбор не может не удаться
        serde_json::from_value(value).expect("синтетическое дерево dry-run")
    }
}

#[async_trait::async_trait]
impl SwayClient for DryRunClient {
    async fn get_tree(&self) -> Result<Node> {
        Ok(Self::synthetic_tree())
    }

    async fn get_outputs(&self) -> Result<Vec<Output>> {
        Ok(vec![Output {
            name: "DRY-1".to_string(),
            active: true,
            current_workspace: Some("1".to_string()),
        }])
    }

    async fn run_command(&self, command: &str) -> Result<()> {
        info!("[DRY RUN] Команда window manager: {}", command);
        Ok(())
    }
}
