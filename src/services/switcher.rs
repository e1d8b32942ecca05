use crate::config::{Config, EntityKind, FilterMode, TrackingScope};
use crate::debug_if_enabled;
use crate::error::Result;
use crate::events::EntityId;
use crate::services::history::{self, HistoryStore};
use crate::services::validity;
use crate::services::wm::SwayClient;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::info;

/// Переключатель цикла: один шаг "alt-tab" на каждый триггер.
///
/// Сканирует список истории текущего раздела от курсора ротации, попутно
/// выбрасывая устаревшие записи, и выдаёт не более одной команды фокуса.
/// Повторные триггеры без смены фокуса уходят всё глубже в историю и
/// заворачиваются к началу после min(len, history_limit) записей.
pub struct CycleSwitcher {
    kind: EntityKind,
    mode: FilterMode,
    scope: TrackingScope,
    store: Arc<Mutex<HistoryStore>>,
    client: Arc<dyn SwayClient>,
}

impl CycleSwitcher {
    pub fn new(
        config: &Config,
        store: Arc<Mutex<HistoryStore>>,
        client: Arc<dyn SwayClient>,
    ) -> Self {
        info!(
            "Инициализация CycleSwitcher (вид: {:?}, фильтр: {:?})",
            config.entity_kind(),
            config.filter_mode()
        );

        Self {
            kind: config.entity_kind(),
            mode: config.filter_mode(),
            scope: config.tracking_scope(),
            store,
            client,
        }
    }

    /// Выполнить один шаг цикла
    pub async fn switch(&self) -> Result<()> {
        debug_if_enabled!("Получен триггер переключения");

        let tree = self.client.get_tree().await?;
        let focused_ws = tree.find_focused_workspace();

        // Текущая сфокусированная сущность - её в цикле пропускаем
        let focused_id = match self.kind {
            EntityKind::Window => tree.find_focused().map(|node| EntityId::Window(node.id)),
            EntityKind::Workspace => focused_ws
                .and_then(|ws| ws.name.clone())
                .map(EntityId::Workspace),
        };

        let key = history::focused_scope_key(self.scope, focused_ws);

        // Outputs нужны только режиму visible-workspaces
        let outputs = if self.mode == FilterMode::VisibleWorkspaces {
            self.client.get_outputs().await?
        } else {
            Vec::new()
        };

        let valid = validity::valid_entities(self.kind, self.mode, &tree, focused_ws, &outputs);
        debug_if_enabled!("Допустимые цели ({}): {:?}", valid.len(), valid);

        // Вся работа со списком - под коротким локом, команда уходит после
        let command = {
            let mut store = self.store.lock();
            let limit = store.history_limit();
            let Some((list, cursor)) = store.scope_mut(&key) else {
                debug_if_enabled!("Для раздела '{}' нет истории - ничего не делаем", key);
                return Ok(());
            };

            let mut idx = *cursor;
            let mut target = None;

            while idx < list.len() {
                if !valid.contains(&list[idx]) {
                    // Устаревшая запись: удаляем на месте, индекс не двигаем -
                    // следующий элемент сдвинулся в освободившийся слот
                    debug_if_enabled!("Удаляем устаревшую запись {}", list[idx]);
                    list.remove(idx);
                    continue;
                }

                if Some(&list[idx]) == focused_id.as_ref() {
                    // Себя не переключаем
                    idx += 1;
                    *cursor = idx;
                    continue;
                }

                let bound = list.len().min(limit);
                *cursor = if *cursor < bound.saturating_sub(1) {
                    *cursor + 1
                } else {
                    0
                };
                target = Some(list[idx].clone());
                break;
            }

            match target {
                Some(entity) => {
                    info!("Переключаемся на {}", entity);
                    Some(focus_command(&entity))
                }
                None => {
                    // Скан исчерпан без цели: подчищаем устаревший префикс,
                    // до которого курсор не дошёл
                    list.retain(|id| valid.contains(id));
                    *cursor = (*cursor).min(list.len());
                    debug_if_enabled!("Подходящих целей нет - тихий no-op");
                    None
                }
            }
        };

        if let Some(command) = command {
            self.client.run_command(&command).await?;
        }

        Ok(())
    }
}

/// Команда window manager для активации сущности
fn focus_command(entity: &EntityId) -> String {
    match entity {
        EntityId::Window(id) => format!("[con_id={}] focus", id),
        EntityId::Workspace(name) => {
            format!("workspace \"{}\"", name.replace('"', "\\\""))
        }
    }
}
