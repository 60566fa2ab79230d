//! Потоковый кодировщик длин серий.
//!
//! Одна ячейка просмотра назад: текущий уровень и длина серии в
//! байт-выборках. Работает в контексте завершения передач, поэтому
//! ничего не буферизует и не аллоцирует.

use ttir_types::{Level, PulseEvent, MAX_DURATION_US, SAMPLE_QUANTUM_US};

use crate::filter_byte;

/// Предел счётчика серии (в байт-выборках).
///
/// Длительность серии обязана помещаться в 24-битное поле события;
/// при достижении предела серия закрывается событием полной длины и
/// счёт начинается заново.
pub const MAX_RUN_SAMPLES: u32 = MAX_DURATION_US / SAMPLE_QUANTUM_US;

/// Состояние серии: уровень и её длина в байт-выборках.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunState {
    pub level: Level,
    pub len: u32,
}

/// Кодировщик длин серий.
///
/// Мутируется только контекстом завершения (единственный писатель).
#[derive(Debug, Default)]
pub struct RunLengthEncoder {
    state: RunState,
}

impl RunLengthEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Сбрасывает состояние в (space, 0). Вызывается при открытии сессии.
    pub fn reset(&mut self) {
        self.state = RunState::default();
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Обрабатывает один отфильтрованный уровень.
    ///
    /// Тот же уровень удлиняет серию; при достижении
    /// [`MAX_RUN_SAMPLES`] серия закрывается событием полной длины и
    /// счёт продолжается с нуля. Смена уровня выдаёт событие
    /// завершившейся серии; байт, вызвавший смену, считается первой
    /// выборкой новой серии. Пустая серия (сразу после сброса) события
    /// не порождает.
    pub fn feed(
        &mut self,
        level: Level,
    ) -> Option<PulseEvent> {
        if level == self.state.level {
            self.state.len += 1;

            if self.state.len >= MAX_RUN_SAMPLES {
                let ev = PulseEvent::new(self.state.len * SAMPLE_QUANTUM_US, level);
                self.state.len = 0;
                return Some(ev);
            }

            None
        } else {
            let prev = self.state;
            self.state = RunState { level, len: 1 };

            if prev.len == 0 {
                // Переворот сразу после сброса — нечего выдавать
                return None;
            }

            Some(PulseEvent::new(prev.len * SAMPLE_QUANTUM_US, prev.level))
        }
    }

    /// Пропускает сырой байт через фильтр и кодировщик.
    #[inline]
    pub fn feed_raw(
        &mut self,
        raw: u8,
    ) -> Option<PulseEvent> {
        self.feed(filter_byte(raw))
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
