use crate::{Level, TtirError, TtirResult};

/// Бит импульса в 32-битном слове события (формат mode2).
pub const PULSE_BIT: u32 = 0x0100_0000;

/// Маска 24-битного поля длительности (мкс).
pub const DURATION_MASK: u32 = 0x00FF_FFFF;

/// Максимальная кодируемая длительность (мкс).
pub const MAX_DURATION_US: u32 = DURATION_MASK;

/// Временное событие: длительность серии + её уровень.
///
/// Единица обмена между конвейером захвата и потребителем. На проводе
/// кодируется одним 32-битным словом: 24 бита длительности в мкс,
/// бит 24 — признак импульса. Инвариант: длительность всегда
/// укладывается в 24-битное поле.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulseEvent {
    /// Длительность в микросекундах (<= [`MAX_DURATION_US`])
    pub duration_us: u32,
    /// Уровень серии
    pub level: Level,
}

impl PulseEvent {
    /// Размер одной записи потока событий, байт.
    pub const RECORD_SIZE: usize = 4;

    /// Создаёт событие, ограничивая длительность 24-битным полем.
    pub fn new(
        duration_us: u32,
        level: Level,
    ) -> Self {
        Self {
            duration_us: duration_us.min(MAX_DURATION_US),
            level,
        }
    }

    /// Строгий конструктор: отклоняет длительность вне поля.
    pub fn try_new(
        duration_us: u32,
        level: Level,
    ) -> TtirResult<Self> {
        if duration_us > MAX_DURATION_US {
            return Err(TtirError::DurationOutOfRange(duration_us));
        }
        Ok(Self { duration_us, level })
    }

    pub fn mark(duration_us: u32) -> Self {
        Self::new(duration_us, Level::Mark)
    }

    pub fn space(duration_us: u32) -> Self {
        Self::new(duration_us, Level::Space)
    }

    pub fn is_mark(&self) -> bool {
        self.level.is_mark()
    }

    /// Кодирует событие в 32-битное слово.
    pub fn to_raw(&self) -> u32 {
        let mut raw = self.duration_us & DURATION_MASK;
        if self.level.is_mark() {
            raw |= PULSE_BIT;
        }
        raw
    }

    /// Декодирует 32-битное слово; биты выше формата недопустимы.
    pub fn from_raw(raw: u32) -> TtirResult<Self> {
        if raw & !(PULSE_BIT | DURATION_MASK) != 0 {
            return Err(TtirError::InvalidRawEvent(raw));
        }
        Ok(Self {
            duration_us: raw & DURATION_MASK,
            level: Level::from_bool(raw & PULSE_BIT != 0),
        })
    }
}

impl std::fmt::Display for PulseEvent {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(f, "{} {}", self.level, self.duration_us)
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
