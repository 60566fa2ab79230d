//! Пул запросов приёма — контекст завершения.
//!
//! Владеет фиксированным числом одновременных запросов против
//! изохронной конечной точки. Каждое завершение прогоняет 128 принятых
//! байт через фильтр и кодировщик серий, толкает события в кольцо и
//! немедленно переотправляет тот же запрос: изохронный поток без
//! стоящего запроса теряет выборки. Закрытая сессия выбрасывает данные,
//! а слот паркуется до следующего открытия.

use std::{
    sync::{atomic::Ordering, Arc},
    time::Duration,
};

use ttir_core::{EventProducer, PushOutcome, RunLengthEncoder};
use ttir_types::TRANSFER_LEN;

use crate::{
    CaptureMetrics, CaptureResult, Completion, IrTransport, SessionShared, TransferStatus,
};

/// Период опроса флагов сессии при пустой очереди завершений.
pub(crate) const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub struct TransferPool {
    transport: Box<dyn IrTransport>,
    encoder: RunLengthEncoder,
    producer: EventProducer,
    metrics: Arc<CaptureMetrics>,
    shared: Arc<SessionShared>,
    /// Слоты, выпавшие из оборота в закрытом состоянии
    parked: Vec<bool>,
    /// Слоты, выбывшие навсегда после ошибки переотправки
    dead: Vec<bool>,
    in_flight: usize,
}

impl TransferPool {
    /// Создаёт пул и ставит все запросы в очередь приёма.
    ///
    /// Ошибка постановки проваливает подключение целиком; уже
    /// поставленные запросы отменяются, транспорт освобождается.
    pub fn new(
        mut transport: Box<dyn IrTransport>,
        producer: EventProducer,
        metrics: Arc<CaptureMetrics>,
        shared: Arc<SessionShared>,
        num_transfers: usize,
    ) -> CaptureResult<Self> {
        for slot in 0..num_transfers {
            if let Err(e) = transport.submit(slot) {
                transport.cancel_all();
                return Err(e);
            }
        }

        Ok(Self {
            transport,
            encoder: RunLengthEncoder::new(),
            producer,
            metrics,
            shared,
            parked: vec![false; num_transfers],
            dead: vec![false; num_transfers],
            in_flight: num_transfers,
        })
    }

    /// Цикл контекста завершения. Крутится до отсоединения сессии,
    /// затем отменяет запросы и дожидается каждого.
    pub fn run(mut self) {
        let mut was_opened = false;

        while !self.shared.is_detached() {
            let opened = self.shared.is_opened();

            if opened && !was_opened {
                // Свежее открытие: серия начинается заново, спящие
                // слоты возвращаются в оборот
                self.encoder.reset();
                self.revive_parked();
            }
            was_opened = opened;

            let completion = match self.transport.wait(POLL_INTERVAL) {
                Some(c) => c,
                None => continue,
            };

            // Завершение без постановки — сломанный транспорт;
            // счётчик не должен провернуться через ноль
            self.in_flight = self.in_flight.saturating_sub(1);

            match completion.status {
                TransferStatus::Complete => self.handle_block(&completion),
                TransferStatus::Cancelled => {
                    self.parked[completion.slot] = true;
                }
                TransferStatus::Failed => {
                    log::warn!("Transfer slot {} failed, retiring it", completion.slot);
                    self.dead[completion.slot] = true;
                }
            }
        }

        self.quiesce();
    }

    /// Обрабатывает принятый блок и переотправляет запрос.
    fn handle_block(
        &mut self,
        completion: &Completion,
    ) {
        let m = &self.metrics;
        m.transfers_completed.fetch_add(1, Ordering::Relaxed);
        m.bytes_received
            .fetch_add(TRANSFER_LEN as u64, Ordering::Relaxed);

        // Закрытая сессия: данные выбрасываются, слот паркуется
        if !self.shared.is_opened() {
            m.idle_discards.fetch_add(1, Ordering::Relaxed);
            self.parked[completion.slot] = true;
            return;
        }

        for &raw in &completion.data {
            if let Some(ev) = self.encoder.feed_raw(raw) {
                match self.producer.push(ev) {
                    PushOutcome::Stored => {
                        m.events_emitted.fetch_add(1, Ordering::Relaxed);
                    }
                    PushOutcome::Dropped => {
                        m.events_dropped.fetch_add(1, Ordering::Relaxed);
                    }
                }
            }
        }

        // Переотправка — последняя операция обработчика
        self.resubmit(completion.slot);
    }

    fn resubmit(
        &mut self,
        slot: usize,
    ) {
        match self.transport.submit(slot) {
            Ok(()) => self.in_flight += 1,
            Err(e) => {
                // Слот выбывает до конца сессии; повторов нет
                log::warn!("Resubmit failed, slot {slot} is now idle: {e}");
                self.metrics.submit_errors.fetch_add(1, Ordering::Relaxed);
                self.dead[slot] = true;
            }
        }
    }

    /// Возвращает в оборот слоты, запаркованные в закрытом состоянии.
    fn revive_parked(&mut self) {
        for slot in 0..self.parked.len() {
            if self.parked[slot] && !self.dead[slot] {
                self.parked[slot] = false;
                self.resubmit(slot);
            }
        }
    }

    /// Отменяет все невыполненные запросы и дожидается каждого.
    /// После возврата ни одно завершение не может тронуть состояние
    /// сессии — память можно освобождать.
    fn quiesce(&mut self) {
        self.transport.cancel_all();

        while self.in_flight > 0 {
            match self.transport.wait(POLL_INTERVAL) {
                Some(_) => self.in_flight = self.in_flight.saturating_sub(1),
                None => {
                    log::warn!(
                        "{} transfers unaccounted for after cancel",
                        self.in_flight
                    );
                    break;
                }
            }
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
