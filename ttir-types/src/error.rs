use thiserror::Error;

/// Результат для операций над типами ttir.
pub type TtirResult<T> = std::result::Result<T, TtirError>;

/// Ошибки представления событий.
#[derive(Debug, Error)]
pub enum TtirError {
    /// Сырое 32-битное слово содержит биты вне формата
    #[error("Invalid raw event word: {0:#010x}")]
    InvalidRawEvent(u32),

    /// Длительность не помещается в 24-битное поле
    #[error("Duration out of range: {0} us")]
    DurationOutOfRange(u32),
}
