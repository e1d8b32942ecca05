use crate::config::TrackingScope;
use crate::events::{EntityId, FocusEvent};
use crate::services::wm::Node;
use crate::trace_if_enabled;
use std::collections::BTreeMap;

/// Ключ раздела при глобальном отслеживании (один список на всех)
pub const GLOBAL_KEY: &str = "_global_";

/// Запас сверх history_limit: курсор успевает пройти окно цикла до того, как
/// обрезка начнёт выбрасывать ещё не посещённые кандидаты
const HISTORY_SLACK: usize = 5;

/// Ключ раздела для события фокуса (путь фиксации через дебаунсер).
///
/// `focused_ws` - рабочий стол с фокусом на момент фиксации, запрошенный
/// вызывающей стороной только если схема сегментации его требует. Один и тот
/// же физический output/рабочий стол всегда даёт один и тот же ключ;
/// недостающий контекст деградирует к глобальному ключу.
pub fn event_scope_key(
    scope: TrackingScope,
    event: &FocusEvent,
    focused_ws: Option<&Node>,
) -> String {
    match scope {
        TrackingScope::Global => GLOBAL_KEY.to_string(),
        TrackingScope::PerOutput => event
            .output
            .clone()
            .or_else(|| focused_ws.and_then(|ws| ws.output.clone()))
            .unwrap_or_else(|| GLOBAL_KEY.to_string()),
        TrackingScope::PerWorkspace => workspace_key(focused_ws),
    }
}

/// Ключ раздела по текущему сфокусированному рабочему столу (путь переключения)
pub fn focused_scope_key(scope: TrackingScope, focused_ws: Option<&Node>) -> String {
    match scope {
        TrackingScope::Global => GLOBAL_KEY.to_string(),
        TrackingScope::PerOutput => focused_ws
            .and_then(|ws| ws.output.clone())
            .unwrap_or_else(|| GLOBAL_KEY.to_string()),
        TrackingScope::PerWorkspace => workspace_key(focused_ws),
    }
}

fn workspace_key(focused_ws: Option<&Node>) -> String {
    match focused_ws {
        Some(ws) => match (ws.num, &ws.name) {
            (Some(num), _) => num.to_string(),
            (None, Some(name)) => name.clone(),
            (None, None) => GLOBAL_KEY.to_string(),
        },
        None => GLOBAL_KEY.to_string(),
    }
}

/// Хранилище истории фокуса: упорядоченные списки недавних сущностей и курсор
/// ротации, раздельно по ключам сегментации.
///
/// Инварианты каждого списка: без дубликатов, самая свежая сущность в начале,
/// длина не превышает history_limit + 5. Любая фиксация нового фокуса
/// сбрасывает курсор раздела в 1 - позиция 0 занята только что
/// сфокусированной сущностью и целью цикла быть не может.
#[derive(Debug)]
pub struct HistoryStore {
    lists: BTreeMap<String, Vec<EntityId>>,
    cursors: BTreeMap<String, usize>,
    history_limit: usize,
}

impl HistoryStore {
    pub fn new(history_limit: usize) -> Self {
        Self {
            lists: BTreeMap::new(),
            cursors: BTreeMap::new(),
            history_limit,
        }
    }

    pub fn history_limit(&self) -> usize {
        self.history_limit
    }

    fn max_history(&self) -> usize {
        self.history_limit + HISTORY_SLACK
    }

    /// Зафиксировать фокус сущности в разделе `key`
    pub fn record(&mut self, key: &str, entity: EntityId) {
        let max_history = self.max_history();
        let list = self.lists.entry(key.to_string()).or_default();

        // Свежий фокус всегда обесценивает начатый цикл этого раздела
        self.cursors.insert(key.to_string(), 1);

        if let Some(pos) = list.iter().position(|id| *id == entity) {
            list.remove(pos);
        }
        list.insert(0, entity);

        if list.len() > max_history {
            list.truncate(max_history);
        }

        trace_if_enabled!("Список раздела '{}': {:?}", key, list);
    }

    /// Список и курсор раздела для алгоритма переключения
    pub fn scope_mut(&mut self, key: &str) -> Option<(&mut Vec<EntityId>, &mut usize)> {
        let list = self.lists.get_mut(key)?;
        let cursor = self
            .cursors
            .entry(key.to_string())
            .or_insert(1);
        Some((list, cursor))
    }

    #[allow(dead_code)]
    pub fn list(&self, key: &str) -> Option<&[EntityId]> {
        self.lists.get(key).map(Vec::as_slice)
    }

    #[allow(dead_code)]
    pub fn cursor(&self, key: &str) -> Option<usize> {
        self.cursors.get(key).copied()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    /// Снимок состояния для персистентности
    pub fn snapshot(&self) -> (&BTreeMap<String, Vec<EntityId>>, &BTreeMap<String, usize>) {
        (&self.lists, &self.cursors)
    }

    /// Восстановить состояние из персистентного снимка
    pub fn restore(
        history_limit: usize,
        lists: BTreeMap<String, Vec<EntityId>>,
        mut cursors: BTreeMap<String, usize>,
    ) -> Self {
        // Курсор без списка бесполезен, список без курсора получает курсор 1
        cursors.retain(|key, _| lists.contains_key(key));
        for key in lists.keys() {
            cursors.entry(key.clone()).or_insert(1);
        }

        Self {
            lists,
            cursors,
            history_limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EntityId::Window;
    use crate::events::FocusEvent;

    #[test]
    fn test_record_most_recent_first_without_duplicates() {
        let mut store = HistoryStore::new(16);

        for id in [1, 2, 3, 2, 1] {
            store.record(GLOBAL_KEY, Window(id));
        }

        // move-to-front, не накопление дубликатов
        assert_eq!(
            store.list(GLOBAL_KEY).unwrap(),
            &[Window(1), Window(2), Window(3)]
        );
    }

    #[test]
    fn test_record_resets_cursor_to_one() {
        let mut store = HistoryStore::new(16);
        store.record(GLOBAL_KEY, Window(1));
        assert_eq!(store.cursor(GLOBAL_KEY), Some(1));

        // Имитируем продвинутый цикл и проверяем сброс
        {
            let (_, cursor) = store.scope_mut(GLOBAL_KEY).unwrap();
            *cursor = 7;
        }
        store.record(GLOBAL_KEY, Window(2));
        assert_eq!(store.cursor(GLOBAL_KEY), Some(1));
    }

    #[test]
    fn test_record_trims_to_limit_plus_slack() {
        let mut store = HistoryStore::new(3);

        for id in 0..20 {
            store.record(GLOBAL_KEY, Window(id));
        }

        let list = store.list(GLOBAL_KEY).unwrap();
        assert_eq!(list.len(), 8); // limit 3 + запас 5
        assert_eq!(list[0], Window(19));
        assert_eq!(list[7], Window(12));
    }

    #[test]
    fn test_scenario_default_limit_keeps_four_entries() {
        // Сценарий: limit = 3, фокусы A, B, C, D => [D, C, B, A],
        // обрезка при max = 8 ещё не наступила
        let mut store = HistoryStore::new(3);
        for id in [1, 2, 3, 4] {
            store.record(GLOBAL_KEY, Window(id));
        }
        assert_eq!(
            store.list(GLOBAL_KEY).unwrap(),
            &[Window(4), Window(3), Window(2), Window(1)]
        );
    }

    #[test]
    fn test_scopes_are_independent() {
        let mut store = HistoryStore::new(16);
        store.record("DP-1", Window(1));
        store.record("HDMI-1", Window(2));

        assert_eq!(store.list("DP-1").unwrap(), &[Window(1)]);
        assert_eq!(store.list("HDMI-1").unwrap(), &[Window(2)]);
        assert!(store.list(GLOBAL_KEY).is_none());
    }

    #[test]
    fn test_restore_repairs_cursor_maps() {
        let mut lists = BTreeMap::new();
        lists.insert(GLOBAL_KEY.to_string(), vec![Window(1), Window(2)]);

        let mut cursors = BTreeMap::new();
        cursors.insert("призрак".to_string(), 3);

        let store = HistoryStore::restore(16, lists, cursors);
        assert_eq!(store.cursor(GLOBAL_KEY), Some(1));
        assert_eq!(store.cursor("призрак"), None);
    }

    #[test]
    fn test_event_scope_key_fallbacks() {
        let event = FocusEvent::new(Window(5)).with_output(Some("DP-1".to_string()));
        assert_eq!(
            event_scope_key(TrackingScope::Global, &event, None),
            GLOBAL_KEY
        );
        assert_eq!(
            event_scope_key(TrackingScope::PerOutput, &event, None),
            "DP-1"
        );

        // Без output в событии и без дерева - деградация к глобальному ключу
        let bare = FocusEvent::new(Window(5));
        assert_eq!(
            event_scope_key(TrackingScope::PerOutput, &bare, None),
            GLOBAL_KEY
        );
    }

    #[test]
    fn test_workspace_scope_key_prefers_number() {
        let ws: crate::services::wm::Node = serde_json::from_value(serde_json::json!({
            "id": 20, "type": "workspace", "name": "2: code", "num": 2, "output": "DP-1"
        }))
        .unwrap();

        let event = FocusEvent::new(Window(5));
        assert_eq!(
            event_scope_key(TrackingScope::PerWorkspace, &event, Some(&ws)),
            "2"
        );
        assert_eq!(
            focused_scope_key(TrackingScope::PerWorkspace, Some(&ws)),
            "2"
        );
        assert_eq!(
            focused_scope_key(TrackingScope::PerOutput, Some(&ws)),
            "DP-1"
        );
    }
}
