/// Бинарный уровень ИК-сигнала после фильтрации.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Level {
    /// Несущая отсутствует (пауза)
    Space = 0,
    /// Несущая присутствует (импульс)
    Mark = 1,
}

impl Level {
    pub fn from_bool(mark: bool) -> Self {
        if mark {
            Level::Mark
        } else {
            Level::Space
        }
    }

    pub fn is_mark(&self) -> bool {
        *self == Level::Mark
    }

    pub fn as_u8(&self) -> u8 {
        *self as u8
    }

    /// Противоположный уровень.
    pub fn flipped(&self) -> Self {
        match self {
            Level::Space => Level::Mark,
            Level::Mark => Level::Space,
        }
    }
}

impl Default for Level {
    fn default() -> Self {
        Level::Space
    }
}

impl std::fmt::Display for Level {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        // Словарь утилит формата mode2
        match self {
            Level::Space => write!(f, "space"),
            Level::Mark => write!(f, "pulse"),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
