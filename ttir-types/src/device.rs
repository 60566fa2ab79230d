//! Константы приёмника TechnoTrend USB IR и форма передач.
//!
//! Приёмник отдаёт сырой поток true/false выборок изохронными пакетами
//! по 16 байт. Один запрос приёма покрывает 8 пакетов подряд (128 байт),
//! каждый байт — 8 сырых бит одного логического периода выборки.

/// Vendor ID приёмника TechnoTrend.
pub const TT_VENDOR_ID: u16 = 0x0B48;

/// Product ID приёмника TechnoTrend.
pub const TT_PRODUCT_ID: u16 = 0x2003;

/// Адрес изохронной IN конечной точки.
pub const IR_ENDPOINT_ADDRESS: u8 = 0x82;

/// Ожидаемый максимальный размер пакета конечной точки (байт).
pub const IR_MAX_PACKET_SIZE: u16 = 16;

/// Размер буфера одного запроса приёма (байт).
pub const TRANSFER_LEN: usize = 128;

/// Суб-пакетов в одном запросе.
pub const PACKETS_PER_TRANSFER: usize = 8;

/// Период одной байт-выборки в микросекундах.
///
/// Сырой поток идёт с 8-кратной передискретизацией; после свёртки байта
/// в один уровень каждый байт соответствует ~62 мкс реального времени.
pub const SAMPLE_QUANTUM_US: u32 = 62;

/// Минимальное число одновременных запросов приёма.
pub const MIN_TRANSFERS: usize = 2;

/// Число запросов по умолчанию. Поднимайте до 4 при потерях потока.
pub const DEFAULT_TRANSFERS: usize = 2;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_shape() {
        // 8 суб-пакетов по 16 байт = 128 байт на запрос
        assert_eq!(PACKETS_PER_TRANSFER * IR_MAX_PACKET_SIZE as usize, TRANSFER_LEN);
    }

    #[test]
    fn test_transfer_defaults() {
        assert!(DEFAULT_TRANSFERS >= MIN_TRANSFERS);
    }
}
