use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Instant,
};

/// Метрики сессии, обновляемые lock-free из нескольких потоков.
#[derive(Debug, Default)]
pub struct CaptureMetrics {
    /// Успешно завершённые передачи
    pub transfers_completed: AtomicU64,
    /// Принятые сырые байты
    pub bytes_received: AtomicU64,
    /// События, дошедшие до кольца
    pub events_emitted: AtomicU64,
    /// События, потерянные на переполненном кольце
    pub events_dropped: AtomicU64,
    /// Передачи, выброшенные в закрытом состоянии
    pub idle_discards: AtomicU64,
    /// Ошибки постановки запроса в очередь
    pub submit_errors: AtomicU64,
}

/// Snapshot метрик для отображения / тестирования.
#[derive(Debug, Clone)]
pub struct MetricsSummary {
    pub duration_secs: f64,
    pub transfers_completed: u64,
    pub bytes_received: u64,
    pub events_emitted: u64,
    pub events_dropped: u64,
    pub idle_discards: u64,
    pub submit_errors: u64,
    pub event_rate_hz: f64,
    pub drop_rate_pct: f64,
}

impl CaptureMetrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Средний темп событий за сессию, шт/с.
    pub fn event_rate_hz(
        &self,
        start: &Instant,
    ) -> f64 {
        let secs = start.elapsed().as_secs_f64();

        if secs < 1e-9 {
            return 0.0;
        }

        self.events_emitted.load(Ordering::Relaxed) as f64 / secs
    }

    /// Процент потерянных событий (0.0-100.0).
    pub fn drop_rate_pct(&self) -> f64 {
        let emitted = self.events_emitted.load(Ordering::Relaxed);
        let dropped = self.events_dropped.load(Ordering::Relaxed);
        let total = emitted + dropped;

        if total == 0 {
            0.0
        } else {
            dropped as f64 / total as f64 * 100.0
        }
    }

    /// Итоговая сводка для вывода в конце сессии.
    pub fn summary(
        &self,
        start: &Instant,
    ) -> MetricsSummary {
        MetricsSummary {
            duration_secs: start.elapsed().as_secs_f64(),
            transfers_completed: self.transfers_completed.load(Ordering::Relaxed),
            bytes_received: self.bytes_received.load(Ordering::Relaxed),
            events_emitted: self.events_emitted.load(Ordering::Relaxed),
            events_dropped: self.events_dropped.load(Ordering::Relaxed),
            idle_discards: self.idle_discards.load(Ordering::Relaxed),
            submit_errors: self.submit_errors.load(Ordering::Relaxed),
            event_rate_hz: self.event_rate_hz(start),
            drop_rate_pct: self.drop_rate_pct(),
        }
    }
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        writeln!(f, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
        writeln!(f, "  Duration      : {:.1}s", self.duration_secs)?;
        writeln!(f, "  Transfers     : {}", self.transfers_completed)?;
        writeln!(
            f,
            "  Raw data      : {:.1} KB",
            self.bytes_received as f64 / 1e3
        )?;
        writeln!(f, "  Events        : {}", self.events_emitted)?;
        writeln!(
            f,
            "  Dropped       : {} ({:.2}%)",
            self.events_dropped, self.drop_rate_pct
        )?;
        writeln!(f, "  Idle discards : {}", self.idle_discards)?;
        writeln!(f, "  Submit errors : {}", self.submit_errors)?;
        writeln!(f, "  Event rate    : {:.1}/s", self.event_rate_hz)?;
        write!(f, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_initial_metrics_zero() {
        let metrics = CaptureMetrics::new();
        let start = Instant::now();
        let summary = metrics.summary(&start);

        assert_eq!(summary.transfers_completed, 0);
        assert_eq!(summary.bytes_received, 0);
        assert_eq!(summary.events_emitted, 0);
        assert_eq!(summary.events_dropped, 0);
        assert_eq!(summary.idle_discards, 0);
        assert_eq!(summary.submit_errors, 0);
        assert_eq!(summary.drop_rate_pct, 0.0);
    }

    #[test]
    fn test_drop_rate_calculation() {
        let metrics = CaptureMetrics::new();

        metrics.events_emitted.store(80, Ordering::Relaxed);
        metrics.events_dropped.store(20, Ordering::Relaxed);

        assert!((metrics.drop_rate_pct() - 20.0).abs() < 1e-6);
    }

    #[test]
    fn test_event_rate() {
        let metrics = CaptureMetrics::new();
        metrics.events_emitted.store(500, Ordering::Relaxed);

        let start = Instant::now() - Duration::from_secs(5);
        let summary = metrics.summary(&start);

        // 500 событий / 5 c = 100/с
        assert!((summary.event_rate_hz - 100.0).abs() < 1.0);
    }

    #[test]
    fn test_multithreaded_updates() {
        let metrics = CaptureMetrics::new();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let m = metrics.clone();
                std::thread::spawn(move || {
                    for _ in 0..1_000 {
                        m.transfers_completed.fetch_add(1, Ordering::Relaxed);
                        m.bytes_received.fetch_add(128, Ordering::Relaxed);
                        m.events_emitted.fetch_add(1, Ordering::Relaxed);
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(metrics.transfers_completed.load(Ordering::Relaxed), 4_000);
        assert_eq!(metrics.bytes_received.load(Ordering::Relaxed), 512_000);
        assert_eq!(metrics.events_emitted.load(Ordering::Relaxed), 4_000);
    }
}
