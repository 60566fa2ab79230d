//! Сигнальный тракт захвата ИК-сигнала
//!
//! Чистая часть конвейера: сырой байт с 8-кратной передискретизацией →
//! бинарный уровень (фильтр) → серия с длительностью (кодировщик) →
//! ограниченное кольцо событий к потребителю.
//!
//! # Быстрый старт
//!
//! ```
//! use ttir_core::{event_ring, filter_byte, RunLengthEncoder, EVENT_RING_CAPACITY};
//!
//! let (producer, consumer) = event_ring(EVENT_RING_CAPACITY);
//! let mut encoder = RunLengthEncoder::new();
//!
//! for &raw in &[0xFFu8, 0xFF, 0xFF, 0x00] {
//!     if let Some(ev) = encoder.feed(filter_byte(raw)) {
//!         producer.push(ev);
//!     }
//! }
//!
//! let ev = consumer.try_pop().unwrap();
//! assert!(ev.is_mark());
//! ```

pub mod filter;
pub mod ring;
pub mod rle;

pub use filter::*;
pub use ring::*;
pub use rle::*;

/// Версия библиотеки.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
