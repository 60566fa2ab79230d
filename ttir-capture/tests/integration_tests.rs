//! Интеграционные тесты: полный путь от транспорта до читателя.

use std::{sync::atomic::Ordering, thread, time::Duration};

use ttir_capture::{
    CaptureConfig, CaptureSession, EventReader, LifecycleState, SimTransport,
};
use ttir_core::PopError;
use ttir_types::SAMPLE_QUANTUM_US;

fn attach_sim() -> (CaptureSession, EventReader) {
    let config = CaptureConfig::default();
    let transport = Box::new(SimTransport::unpaced(config.num_transfers));
    CaptureSession::attach(&config, transport).unwrap()
}

#[test]
fn test_full_pipeline_sim_to_reader() {
    let (session, reader) = attach_sim();
    session.open();

    let mut events = Vec::new();
    while events.len() < 20 {
        match reader.read_timeout(Duration::from_secs(2)) {
            Ok(ev) => events.push(ev),
            Err(e) => panic!("событий не дождались: {e:?}"),
        }
    }

    // Длительности кратны кванту, уровни строго чередуются
    for ev in &events {
        assert!(ev.duration_us > 0);
        assert_eq!(ev.duration_us % SAMPLE_QUANTUM_US, 0);
    }
    for pair in events.windows(2) {
        assert_ne!(pair[0].level, pair[1].level);
    }

    let metrics = session.metrics();
    assert!(metrics.transfers_completed.load(Ordering::Relaxed) > 0);
    assert!(metrics.bytes_received.load(Ordering::Relaxed) >= 128);
}

#[test]
fn test_close_stops_flow_and_reopen_resumes() {
    let (session, reader) = attach_sim();

    session.open();
    assert!(reader.read_timeout(Duration::from_secs(2)).is_ok());

    session.close();
    assert_eq!(session.state(), LifecycleState::AttachedIdle);

    // Выпиваем хвост, который пул успел протолкнуть до закрытия
    while reader.read_timeout(Duration::from_millis(200)).is_ok() {}

    // В закрытом состоянии кольцо молчит, а передачи выбрасываются
    assert_eq!(
        reader.read_timeout(Duration::from_millis(300)),
        Err(PopError::Empty)
    );
    let metrics = session.metrics();
    assert!(metrics.idle_discards.load(Ordering::Relaxed) >= 1);

    // Повторное открытие оживляет поток
    session.open();
    assert!(
        reader.read_timeout(Duration::from_secs(2)).is_ok(),
        "после открытия ожидаем события"
    );
}

#[test]
fn test_detach_quiesces_and_ends_stream() {
    let (mut session, reader) = attach_sim();

    session.open();
    assert!(reader.read_timeout(Duration::from_secs(2)).is_ok());

    session.detach();
    assert_eq!(session.state(), LifecycleState::Detached);

    // Остаток кольца читается до дна, затем конец потока
    let mut drained = 0;
    while reader.read().is_some() {
        drained += 1;
        assert!(drained <= 256, "кольцо не может держать больше ёмкости");
    }
    assert_eq!(reader.try_read(), Err(PopError::Closed));

    // После detach ни одна передача не завершается
    let metrics = session.metrics();
    let before = metrics.transfers_completed.load(Ordering::Relaxed);
    thread::sleep(Duration::from_millis(50));
    assert_eq!(metrics.transfers_completed.load(Ordering::Relaxed), before);
}

#[test]
fn test_dropping_session_detaches() {
    let (session, reader) = attach_sim();

    session.open();
    assert!(reader.read_timeout(Duration::from_secs(2)).is_ok());

    drop(session);

    while reader.read().is_some() {}
    assert_eq!(reader.try_read(), Err(PopError::Closed));
}

#[test]
fn test_paced_sim_delivers_at_device_rate() {
    // Темп реального устройства: ~8 мс на передачу, событий немного
    let config = CaptureConfig::default();
    let transport = Box::new(SimTransport::new(config.num_transfers));
    let (session, reader) = CaptureSession::attach(&config, transport).unwrap();

    session.open();

    let ev = reader.read_timeout(Duration::from_secs(2));
    assert!(ev.is_ok(), "симулятор с темпом обязан отдать событие: {ev:?}");

    // При реальном темпе кольцо не переполняется
    thread::sleep(Duration::from_millis(100));
    assert_eq!(
        session.metrics().events_dropped.load(Ordering::Relaxed),
        0
    );
}
