use crate::config::{Config, TrackingScope};
use crate::debug_if_enabled;
use crate::events::FocusEvent;
use crate::services::history::{self, HistoryStore};
use crate::services::wm::SwayClient;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration};
use tracing::{info, warn};

/// Дебаунсер фиксации фокуса.
///
/// Быстрые серии событий фокуса (промежуточные окна при переключении)
/// схлопываются в одну отложенную фиксацию: каждое новое событие отменяет ещё
/// не сработавшую задачу и планирует новую. В историю попадает только фокус,
/// "устоявшийся" в течение задержки. Нулевая задержка фиксирует синхронно -
/// чистый toggle между текущим и предыдущим фокусом.
pub struct FocusDebouncer {
    scope: TrackingScope,
    delay: Duration,
    ignore_floating: bool,
    store: Arc<Mutex<HistoryStore>>,
    client: Arc<dyn SwayClient>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl FocusDebouncer {
    pub fn new(
        config: &Config,
        store: Arc<Mutex<HistoryStore>>,
        client: Arc<dyn SwayClient>,
    ) -> Self {
        info!(
            "Инициализация FocusDebouncer (задержка: {:?}, сегментация: {:?})",
            config.update_delay(),
            config.tracking_scope()
        );

        Self {
            scope: config.tracking_scope(),
            delay: config.update_delay(),
            ignore_floating: config.cycle.ignore_floating,
            store,
            client,
            pending: Mutex::new(None),
        }
    }

    /// Обработать сырое событие фокуса
    pub async fn on_focus(&self, event: FocusEvent) {
        // Отфильтрованная сущность отбрасывается ДО отмены ожидающей фиксации:
        // она не должна уничтожать ещё актуальную фиксацию другой сущности
        if self.ignore_floating && event.floating {
            debug_if_enabled!("Плавающее окно не отслеживается: {}", event.entity);
            return;
        }

        if self.delay.is_zero() {
            self.cancel_pending();
            Self::commit(self.scope, Arc::clone(&self.store), Arc::clone(&self.client), event)
                .await;
            return;
        }

        debug_if_enabled!("Планируем фиксацию фокуса: {}", event);

        let scope = self.scope;
        let delay = self.delay;
        let store = Arc::clone(&self.store);
        let client = Arc::clone(&self.client);

        let task = tokio::spawn(async move {
            sleep(delay).await;
            Self::commit(scope, store, client, event).await;
        });

        // Последнее событие побеждает: предыдущая задача отменяется
        let previous = self.pending.lock().replace(task);
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    fn cancel_pending(&self) {
        if let Some(task) = self.pending.lock().take() {
            task.abort();
        }
    }

    /// Фиксация устоявшегося фокуса в хранилище истории.
    ///
    /// Ключ раздела вычисляется здесь, после задержки: при сегментации по
    /// рабочим столам важен рабочий стол на момент фиксации, а не на момент
    /// исходного события.
    async fn commit(
        scope: TrackingScope,
        store: Arc<Mutex<HistoryStore>>,
        client: Arc<dyn SwayClient>,
        event: FocusEvent,
    ) {
        let needs_tree = match scope {
            TrackingScope::Global => false,
            TrackingScope::PerWorkspace => true,
            TrackingScope::PerOutput => event.output.is_none(),
        };

        let tree = if needs_tree {
            match client.get_tree().await {
                Ok(tree) => Some(tree),
                Err(e) => {
                    warn!("Не удалось запросить дерево для ключа раздела: {}", e);
                    None
                }
            }
        } else {
            None
        };

        let focused_ws = tree.as_ref().and_then(|t| t.find_focused_workspace());
        let key = history::event_scope_key(scope, &event, focused_ws);

        debug_if_enabled!("Фиксируем {} в разделе '{}'", event.entity, key);
        store.lock().record(&key, event.entity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EntityId::Window;
    use crate::services::history::GLOBAL_KEY;
    use crate::services::wm::create_sway_client;

    fn debouncer_with_delay(delay_seconds: f64, ignore_floating: bool) -> FocusDebouncer {
        let mut config = Config::default();
        config.cycle.update_delay_seconds = delay_seconds;
        config.cycle.ignore_floating = ignore_floating;

        let store = Arc::new(Mutex::new(HistoryStore::new(16)));
        FocusDebouncer::new(&config, store, create_sway_client(true))
    }

    #[tokio::test]
    async fn test_zero_delay_records_synchronously() {
        let debouncer = debouncer_with_delay(0.0, false);

        debouncer.on_focus(FocusEvent::new(Window(1))).await;
        debouncer.on_focus(FocusEvent::new(Window(2))).await;

        let store = debouncer.store.lock();
        assert_eq!(store.list(GLOBAL_KEY).unwrap(), &[Window(2), Window(1)]);
    }

    #[tokio::test]
    async fn test_rapid_events_coalesce_to_latest() {
        let debouncer = debouncer_with_delay(0.05, false);

        // X и Y приходят с промежутком меньше задержки: X не фиксируется
        debouncer.on_focus(FocusEvent::new(Window(10))).await;
        sleep(Duration::from_millis(10)).await;
        debouncer.on_focus(FocusEvent::new(Window(20))).await;

        sleep(Duration::from_millis(120)).await;

        let store = debouncer.store.lock();
        assert_eq!(store.list(GLOBAL_KEY).unwrap(), &[Window(20)]);
    }

    #[tokio::test]
    async fn test_filtered_event_keeps_pending_commit() {
        let debouncer = debouncer_with_delay(0.05, true);

        debouncer.on_focus(FocusEvent::new(Window(1))).await;
        // Плавающее окно не записывается и не отменяет фиксацию окна 1
        debouncer
            .on_focus(FocusEvent::new(Window(2)).with_floating(true))
            .await;

        sleep(Duration::from_millis(120)).await;

        let store = debouncer.store.lock();
        assert_eq!(store.list(GLOBAL_KEY).unwrap(), &[Window(1)]);
    }
}
