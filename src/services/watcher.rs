use crate::config::{Config, EntityKind};
use crate::debug_if_enabled;
use crate::error::Result;
use crate::events::{EntityId, FocusEvent};
use crate::services::debouncer::FocusDebouncer;
use crate::services::history::HistoryStore;
use crate::services::persistence;
use crate::services::wm::{EventStream, WmEvent};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::time::{interval, Duration};
use tracing::{error, info};

/// Наблюдатель событий window manager
#[async_trait::async_trait]
pub trait FocusWatcherTrait {
    /// Запустить наблюдение (работает до потери соединения или shutdown)
    async fn run(self: Box<Self>) -> Result<()>;
}

/// Фабрика наблюдателя: реальная подписка или эмуляция для dry-run
pub fn create_focus_watcher(
    config: Arc<Config>,
    debouncer: Arc<FocusDebouncer>,
    store: Arc<Mutex<HistoryStore>>,
    dry_run: bool,
) -> Box<dyn FocusWatcherTrait + Send> {
    if dry_run {
        Box::new(DryRunWatcher::new(config, debouncer))
    } else {
        Box::new(RealFocusWatcher::new(config, debouncer, store))
    }
}

/// Наблюдатель реальных событий sway/i3.
///
/// События фокуса уходят в дебаунсер; событие "restart" жизненного цикла
/// сохраняет историю и завершает процесс, любой другой shutdown завершает
/// процесс без сохранения. Закрытие потока событий фатально.
pub struct RealFocusWatcher {
    config: Arc<Config>,
    debouncer: Arc<FocusDebouncer>,
    store: Arc<Mutex<HistoryStore>>,
}

impl RealFocusWatcher {
    pub fn new(
        config: Arc<Config>,
        debouncer: Arc<FocusDebouncer>,
        store: Arc<Mutex<HistoryStore>>,
    ) -> Self {
        Self {
            config,
            debouncer,
            store,
        }
    }

    async fn run(self) -> Result<()> {
        let kind = self.config.entity_kind();
        let mut stream = EventStream::subscribe()?;

        info!("FocusWatcher запущен (вид сущностей: {:?})", kind);

        loop {
            match stream.next_event().await? {
                WmEvent::WindowFocus(container) if kind == EntityKind::Window => {
                    debug_if_enabled!("Событие фокуса окна con_id={}", container.id);
                    let event = FocusEvent::new(EntityId::Window(container.id))
                        .with_output(container.output.clone())
                        .with_floating(container.is_floating());
                    self.debouncer.on_focus(event).await;
                }
                WmEvent::WorkspaceFocus(current) if kind == EntityKind::Workspace => {
                    let Some(name) = current.name.clone() else {
                        continue;
                    };
                    debug_if_enabled!("Событие фокуса рабочего стола \"{}\"", name);
                    let event = FocusEvent::new(EntityId::Workspace(name))
                        .with_output(current.output.clone());
                    self.debouncer.on_focus(event).await;
                }
                WmEvent::Shutdown(change) => {
                    self.handle_shutdown(&change);
                }
                _ => {}
            }
        }
    }

    /// Завершение по событию жизненного цикла window manager.
    ///
    /// Сохранение и выход - два отдельных шага: неудача записи попадает в лог
    /// вместо того, чтобы молча исчезнуть в гонке с завершением процесса.
    fn handle_shutdown(&self, change: &str) -> ! {
        info!("Window manager сообщил shutdown ({})", change);

        if change == "restart" {
            let store = self.store.lock();
            if let Err(e) = persistence::save(&self.config.paths.state_file, &store) {
                error!("Не удалось сохранить историю перед перезапуском: {}", e);
            }
        }

        std::process::exit(0);
    }
}

#[async_trait::async_trait]
impl FocusWatcherTrait for RealFocusWatcher {
    async fn run(self: Box<Self>) -> Result<()> {
        (*self).run().await
    }
}

/// Эмуляция наблюдателя для dry-run: по таймеру "фокусирует" окна
/// синтетического дерева по кругу.
pub struct DryRunWatcher {
    config: Arc<Config>,
    debouncer: Arc<FocusDebouncer>,
}

impl DryRunWatcher {
    pub fn new(config: Arc<Config>, debouncer: Arc<FocusDebouncer>) -> Self {
        Self { config, debouncer }
    }

    async fn run(self) -> Result<()> {
        info!("Dry-run режим - FocusWatcher работает в режиме эмуляции");

        let fake_entities: Vec<EntityId> = match self.config.entity_kind() {
            EntityKind::Window => vec![101, 102, 103, 104]
                .into_iter()
                .map(EntityId::Window)
                .collect(),
            EntityKind::Workspace => vec!["1", "2"]
                .into_iter()
                .map(EntityId::workspace)
                .collect(),
        };

        let mut index = 0;
        let mut interval = interval(Duration::from_secs(10));

        loop {
            interval.tick().await;

            let entity = fake_entities[index].clone();
            info!("Dry-run: эмулируем смену фокуса на {}", entity);
            self.debouncer
                .on_focus(FocusEvent::new(entity).with_output(Some("DRY-1".to_string())))
                .await;

            index = (index + 1) % fake_entities.len();
        }
    }
}

#[async_trait::async_trait]
impl FocusWatcherTrait for DryRunWatcher {
    async fn run(self: Box<Self>) -> Result<()> {
        (*self).run().await
    }
}
