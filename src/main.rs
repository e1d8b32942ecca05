use anyhow::Result;
use clap::Parser;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};

mod config;
mod error;
mod events;
mod services;
mod utils;

use config::Config;
use services::{
    create_focus_watcher, create_sway_client, persistence, trigger, CycleSwitcher,
    FocusDebouncer, TriggerListener,
};

#[derive(Parser, Debug)]
#[command(name = "cyclefocus-rust")]
#[command(about = "Циклическое переключение фокуса между недавними окнами/рабочими столами (alt-tab)")]
struct Args {
    /// Путь к файлу конфигурации
    #[arg(short, long, default_value = "cyclefocus.toml")]
    config: String,

    /// Отправить демону триггер переключения и выйти (режим клиента)
    #[arg(long)]
    switch: bool,

    /// Режим сухого запуска (без реальных действий)
    #[arg(long)]
    dry_run: bool,

    /// Уровень логирования
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Инициализация системы логирования
    init_tracing(&args.log_level)?;

    // Загрузка конфигурации
    let config = Arc::new(Config::load(&args.config)?);

    if args.switch {
        // Режим клиента: одно сообщение в сокет работающего демона
        trigger::send_switch(&config.paths.socket).await?;
        return Ok(());
    }

    info!("Запуск cyclefocus-rust v{}", env!("CARGO_PKG_VERSION"));
    info!("Конфигурация загружена из: {}", args.config);

    if args.dry_run {
        warn!("Режим сухого запуска - реальные действия отключены");
    }

    // Проверка доступности window manager
    utils::environment::check_environment(args.dry_run)?;

    // Восстановление истории с прошлого перезапуска (если есть)
    let store = Arc::new(Mutex::new(persistence::load(
        &config.paths.state_file,
        config.cycle.history_limit,
    )));

    // Инициализация компонентов (единый клиент WM передаётся всем сервисам)
    let client = create_sway_client(args.dry_run);
    let debouncer = Arc::new(FocusDebouncer::new(
        &config,
        Arc::clone(&store),
        Arc::clone(&client),
    ));
    let switcher = Arc::new(CycleSwitcher::new(
        &config,
        Arc::clone(&store),
        Arc::clone(&client),
    ));
    let watcher = create_focus_watcher(
        Arc::clone(&config),
        Arc::clone(&debouncer),
        Arc::clone(&store),
        args.dry_run,
    );
    let trigger_listener = TriggerListener::new(&config.paths.socket, Arc::clone(&switcher));

    info!("Все компоненты инициализированы");

    // Запуск сервисов параллельно
    let mut watcher_handle = tokio::spawn(async move { watcher.run().await });
    let mut trigger_handle = tokio::spawn(async move { trigger_listener.run().await });

    info!("Все сервисы запущены");

    // Потеря соединения с window manager фатальна: демон не лечится сам,
    // его перезапускает супервизор (сам window manager)
    let exit_code = tokio::select! {
        result = signal::ctrl_c() => {
            match result {
                Ok(()) => info!("Получен сигнал завершения (Ctrl+C)"),
                Err(e) => error!("Ошибка при ожидании сигнала завершения: {}", e),
            }
            0
        }
        result = &mut watcher_handle => {
            report_fatal("FocusWatcher", result);
            1
        }
        result = &mut trigger_handle => {
            report_fatal("TriggerListener", result);
            1
        }
    };

    info!("Завершение работы...");

    watcher_handle.abort();
    trigger_handle.abort();

    // Подчищаем сокет триггера
    let _ = std::fs::remove_file(&config.paths.socket);

    info!("cyclefocus-rust завершил работу");
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
    Ok(())
}

fn report_fatal(
    service: &str,
    result: std::result::Result<error::Result<()>, tokio::task::JoinError>,
) {
    match result {
        Ok(Err(e)) => error!("Фатальная ошибка в {}: {}", service, e),
        Ok(Ok(())) => error!("{} неожиданно завершился", service),
        Err(e) => error!("Задача {} аварийно прервана: {}", service, e),
    }
}

fn init_tracing(level: &str) -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().compact())
        .init();

    Ok(())
}
