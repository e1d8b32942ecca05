use crate::debug_if_enabled;
use crate::error::Result;
use crate::events::EntityId;
use crate::services::history::HistoryStore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

/// Версия схемы; поднимать при любом изменении структуры состояния
const STATE_VER: u32 = 1;

/// Персистентный снимок хранилища истории.
///
/// BTreeMap даёт отсортированные ключи, pretty-печать - читаемый файл.
/// Сохранение выполняется только при событии "restart" жизненного цикла
/// window manager; это механизм непрерывности между перезапусками, а не
/// гарантия сохранности при падении.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedState {
    ver: u32,
    history: BTreeMap<String, Vec<EntityId>>,
    cursors: BTreeMap<String, usize>,
}

/// Загрузить состояние из файла; любая проблема даёт пустое хранилище.
///
/// Отсутствующий, нечитаемый или повреждённый файл, как и несовпадение
/// версии схемы, молча трактуются как отсутствие истории - запуск демона
/// из-за этого не падает никогда.
pub fn load<P: AsRef<Path>>(path: P, history_limit: usize) -> HistoryStore {
    let path = path.as_ref();

    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            debug_if_enabled!("Файл состояния {:?} не прочитан: {}", path, e);
            return HistoryStore::new(history_limit);
        }
    };

    let state: PersistedState = match serde_json::from_str(&raw) {
        Ok(state) => state,
        Err(e) => {
            debug_if_enabled!("Файл состояния {:?} не разобран: {}", path, e);
            return HistoryStore::new(history_limit);
        }
    };

    if state.ver != STATE_VER {
        debug_if_enabled!(
            "Версия состояния {} не совпадает с текущей {}, начинаем с пустой истории",
            state.ver,
            STATE_VER
        );
        return HistoryStore::new(history_limit);
    }

    info!("История восстановлена из {:?} ({} разделов)", path, state.history.len());
    HistoryStore::restore(history_limit, state.history, state.cursors)
}

/// Сохранить состояние в файл
pub fn save<P: AsRef<Path>>(path: P, store: &HistoryStore) -> Result<()> {
    let (lists, cursors) = store.snapshot();
    let state = PersistedState {
        ver: STATE_VER,
        history: lists.clone(),
        cursors: cursors.clone(),
    };

    let json = serde_json::to_string_pretty(&state)?;
    std::fs::write(path.as_ref(), json)?;

    info!("История сохранена в {:?}", path.as_ref());
    Ok(())
}
