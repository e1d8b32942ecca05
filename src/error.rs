use thiserror::Error;

#[derive(Error, Debug)]
pub enum CycleError {
    #[error("Ошибка конфигурации: {0}")]
    Config(#[from] anyhow::Error),

    #[error("Ошибка ввода-вывода: {0}")]
    Io(#[from] std::io::Error),

    #[error("Ошибка разбора JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Ошибка соединения с window manager: {0}")]
    Sway(String),

    #[error("Сервис недоступен: {0}")]
    ServiceUnavailable(String),

    #[error("Внутренняя ошибка: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, CycleError>;

// Удобные макросы для создания ошибок
#[macro_export]
macro_rules! cycle_error {
    (sway, $($arg:tt)*) => {
        $crate::error::CycleError::Sway(format!($($arg)*))
    };
    (service_unavailable, $($arg:tt)*) => {
        $crate::error::CycleError::ServiceUnavailable(format!($($arg)*))
    };
    (internal, $($arg:tt)*) => {
        $crate::error::CycleError::Internal(format!($($arg)*))
    };
}
