//! Кольцо событий между контекстом завершения и потребителем.
//!
//! Ограниченная SPSC-очередь: производитель (контекст завершения)
//! никогда не блокируется и молча теряет событие при переполнении,
//! потребитель может ждать данных. Поверх bounded-канала
//! crossbeam — массив + курсоры + уведомление ожидающего
//! потребителя на каждой успешной записи.

use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TryRecvError, TrySendError};
use ttir_types::PulseEvent;

/// Ёмкость кольца (событий).
pub const EVENT_RING_CAPACITY: usize = 256;

/// Результат неблокирующей записи.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// Событие помещено в кольцо
    Stored,
    /// Кольцо полно — событие потеряно, содержимое не тронуто
    Dropped,
}

/// Причина неудачного чтения.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopError {
    /// Кольцо пусто (или таймаут ожидания)
    Empty,
    /// Производитель завершился, данных больше не будет
    Closed,
}

/// Создаёт кольцо заданной ёмкости.
pub fn event_ring(capacity: usize) -> (EventProducer, EventConsumer) {
    let (tx, rx) = bounded::<PulseEvent>(capacity);
    (EventProducer { tx }, EventConsumer { rx })
}

/// Сторона производителя. Единственный писатель, не блокируется.
pub struct EventProducer {
    tx: Sender<PulseEvent>,
}

impl EventProducer {
    /// Пытается поместить событие; при полном кольце событие теряется.
    pub fn push(
        &self,
        event: PulseEvent,
    ) -> PushOutcome {
        match self.tx.try_send(event) {
            Ok(()) => PushOutcome::Stored,
            Err(TrySendError::Full(_)) | Err(TrySendError::Disconnected(_)) => PushOutcome::Dropped,
        }
    }
}

/// Сторона потребителя. Единственный читатель, может ждать.
pub struct EventConsumer {
    rx: Receiver<PulseEvent>,
}

impl EventConsumer {
    /// Блокируется до события. `None` — производитель завершился и
    /// кольцо выпито до дна.
    pub fn pop(&self) -> Option<PulseEvent> {
        self.rx.recv().ok()
    }

    /// Ждёт событие не дольше `timeout`.
    pub fn pop_timeout(
        &self,
        timeout: Duration,
    ) -> Result<PulseEvent, PopError> {
        self.rx.recv_timeout(timeout).map_err(|e| match e {
            RecvTimeoutError::Timeout => PopError::Empty,
            RecvTimeoutError::Disconnected => PopError::Closed,
        })
    }

    /// Неблокирующее чтение.
    pub fn try_pop(&self) -> Result<PulseEvent, PopError> {
        self.rx.try_recv().map_err(|e| match e {
            TryRecvError::Empty => PopError::Empty,
            TryRecvError::Disconnected => PopError::Closed,
        })
    }

    /// Кол-во событий, ожидающих чтения.
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
