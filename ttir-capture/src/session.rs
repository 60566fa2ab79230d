//! Жизненный цикл сессии захвата.
//!
//! Сессия проходит три состояния: подключена-закрыта (передачи идут,
//! данные выбрасываются), подключена-открыта (события текут в кольцо)
//! и отсоединена. Поток пула живёт от attach до detach; detach
//! дожидается его завершения, поэтому после возврата ни одно
//! завершение передачи уже не тронет память сессии.

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
    time::Duration,
};

use ttir_core::{event_ring, EventConsumer, PopError, EVENT_RING_CAPACITY};
use ttir_types::PulseEvent;

use crate::{
    CaptureConfig, CaptureMetrics, CaptureResult, IrTransport, TransferPool, TransportInfo,
};

/// Флаги, разделяемые сессией и потоком пула.
#[derive(Debug, Default)]
pub struct SessionShared {
    opened: AtomicBool,
    detached: AtomicBool,
}

impl SessionShared {
    pub fn is_opened(&self) -> bool {
        self.opened.load(Ordering::Acquire)
    }

    /// Возвращает предыдущее значение флага.
    pub(crate) fn set_opened(
        &self,
        opened: bool,
    ) -> bool {
        self.opened.swap(opened, Ordering::AcqRel)
    }

    pub fn is_detached(&self) -> bool {
        self.detached.load(Ordering::Acquire)
    }

    pub(crate) fn set_detached(&self) {
        self.detached.store(true, Ordering::Release);
    }
}

/// Наблюдаемое состояние сессии.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Подключена, поток данных выбрасывается
    AttachedIdle,
    /// Подключена, события текут в кольцо
    AttachedOpened,
    /// Отсоединена, поток пула завершён
    Detached,
}

/// Сессия захвата: владеет потоком пула и флагами жизненного цикла.
pub struct CaptureSession {
    shared: Arc<SessionShared>,
    metrics: Arc<CaptureMetrics>,
    info: TransportInfo,
    pool_thread: Option<thread::JoinHandle<()>>,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl CaptureSession {
    /// Подключает приёмник: ставит все запросы приёма и запускает
    /// поток пула. Сессия рождается закрытой.
    pub fn attach(
        config: &CaptureConfig,
        transport: Box<dyn IrTransport>,
    ) -> CaptureResult<(Self, EventReader)> {
        config.validate()?;

        let info = transport.info();
        let shared = Arc::new(SessionShared::default());
        let metrics = CaptureMetrics::new();
        let (producer, consumer) = event_ring(EVENT_RING_CAPACITY);

        let pool = TransferPool::new(
            transport,
            producer,
            metrics.clone(),
            shared.clone(),
            config.num_transfers,
        )?;

        let pool_thread = thread::Builder::new()
            .name("ttir-pool".to_string())
            .spawn(move || pool.run())?;

        log::info!(
            "Attached to {} ({} transfers in flight)",
            info.name,
            config.num_transfers
        );

        let session = Self {
            shared,
            metrics,
            info,
            pool_thread: Some(pool_thread),
        };

        Ok((session, EventReader { consumer }))
    }

    /// Открывает сессию: кодировщик начинает с чистого листа,
    /// события идут в кольцо. Повторное открытие — no-op.
    pub fn open(&self) {
        if !self.shared.set_opened(true) {
            log::info!("Session opened, capture started");
        }
    }

    /// Закрывает сессию: передачи продолжаются, данные выбрасываются.
    /// Повторное закрытие — no-op.
    pub fn close(&self) {
        if self.shared.set_opened(false) {
            log::info!("Session closed, receiver idle");
        }
    }

    pub fn state(&self) -> LifecycleState {
        if self.shared.is_detached() {
            LifecycleState::Detached
        } else if self.shared.is_opened() {
            LifecycleState::AttachedOpened
        } else {
            LifecycleState::AttachedIdle
        }
    }

    pub fn info(&self) -> &TransportInfo {
        &self.info
    }

    pub fn metrics(&self) -> Arc<CaptureMetrics> {
        self.metrics.clone()
    }

    /// Отсоединяет приёмник: отменяет запросы и дожидается потока
    /// пула. Идемпотентно; вызывается и из Drop.
    pub fn detach(&mut self) {
        self.shared.set_detached();

        if let Some(handle) = self.pool_thread.take() {
            if handle.join().is_err() {
                log::error!("Transfer pool thread panicked");
            }
            log::info!("Detached from {}", self.info.name);
        }
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        self.detach();
    }
}

/// Читающая сторона кольца событий.
pub struct EventReader {
    consumer: EventConsumer,
}

impl EventReader {
    /// Блокируется до события; `None` — сессия отсоединена и кольцо
    /// выпито до дна.
    pub fn read(&self) -> Option<PulseEvent> {
        self.consumer.pop()
    }

    /// Ждёт событие не дольше `timeout`.
    pub fn read_timeout(
        &self,
        timeout: Duration,
    ) -> Result<PulseEvent, PopError> {
        self.consumer.pop_timeout(timeout)
    }

    /// Неблокирующее чтение.
    pub fn try_read(&self) -> Result<PulseEvent, PopError> {
        self.consumer.try_pop()
    }

    /// Кол-во событий, ожидающих чтения.
    pub fn pending(&self) -> usize {
        self.consumer.len()
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
