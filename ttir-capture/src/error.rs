use thiserror::Error;

pub type CaptureResult<T> = std::result::Result<T, CaptureError>;

#[derive(Debug, Error)]
pub enum CaptureError {
    /// ИК-приёмник не найден
    #[error("IR receiver not found: {0}")]
    DeviceNotFound(String),

    /// Подходящая альтернативная настройка интерфейса не найдена
    #[error("No alternate setting with endpoint {endpoint:#04x} (max packet {max_packet})")]
    EndpointNotFound { endpoint: u8, max_packet: u16 },

    /// Ошибка транспорта
    #[error("Transport error: {0}")]
    Transport(String),

    /// Не удалось поставить запрос приёма в очередь
    #[error("Failed to submit transfer for slot {slot}: {reason}")]
    Submit { slot: usize, reason: String },

    /// Реестр сессий заполнен
    #[error("Session registry full (capacity {capacity})")]
    RegistryFull { capacity: usize },

    /// Некорректная конфигурация
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Ошибка ввода/вывода (поток пула и пр.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
