//! Мажоритарный фильтр сырых выборок.
//!
//! Каждый байт потока содержит 8 сырых бит одного логического периода
//! выборки. Таблица сводит байт к одному уровню: mark, если установлено
//! не менее 4 бит из 8. Для RC-5 на полубит приходится ~14 таких
//! периодов, поэтому одиночные битовые помехи порог не пробивают,
//! а выборка остаётся O(1) без ветвлений.

use ttir_types::Level;

/// Порог мажоритарного фильтра (установленных бит из 8).
pub const MARK_THRESHOLD: u32 = 4;

/// Таблица классификации: все 256 байтовых паттернов → уровень.
pub const FILTER_TABLE: [Level; 256] = build_table();

const fn build_table() -> [Level; 256] {
    let mut table = [Level::Space; 256];
    let mut b = 0usize;

    while b < 256 {
        if (b as u8).count_ones() >= MARK_THRESHOLD {
            table[b] = Level::Mark;
        }
        b += 1;
    }

    table
}

/// Классифицирует один сырой байт.
#[inline]
pub fn filter_byte(raw: u8) -> Level {
    FILTER_TABLE[raw as usize]
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use rand::Rng;

    use super::*;

    #[test]
    fn test_table_matches_popcount_rule() {
        // Таблица обязана совпадать с правилом popcount(b) >= 4 на всех
        // 256 входах
        for b in 0u16..=255 {
            let expected = Level::from_bool((b as u8).count_ones() >= MARK_THRESHOLD);
            assert_eq!(
                filter_byte(b as u8),
                expected,
                "byte {b:#04x}: popcount={}",
                (b as u8).count_ones()
            );
        }
    }

    #[test]
    fn test_known_patterns() {
        assert_eq!(filter_byte(0x00), Level::Space);
        assert_eq!(filter_byte(0xFF), Level::Mark);
        // Ровно 4 бита — уже mark
        assert_eq!(filter_byte(0x0F), Level::Mark);
        assert_eq!(filter_byte(0xF0), Level::Mark);
        // 3 бита — ещё space
        assert_eq!(filter_byte(0x07), Level::Space);
        assert_eq!(filter_byte(0xE0), Level::Space);
    }

    #[test]
    fn test_single_bit_noise_tolerated() {
        let mut rng = rand::thread_rng();

        for _ in 0..1_000 {
            let bit = rng.gen_range(0..8);
            // Чистый mark с одним сброшенным битом остаётся mark
            assert_eq!(filter_byte(0xFFu8 & !(1 << bit)), Level::Mark);
            // Чистый space с одним установленным битом остаётся space
            assert_eq!(filter_byte(1u8 << bit), Level::Space);
        }
    }
}
