//! Идентификация приёмника и поиск конечной точки.
//!
//! Приёмник заявляет несколько альтернативных настроек интерфейса;
//! рабочая — та, где конечная точка 0x82 имеет максимальный размер
//! пакета 16 байт. Поиск идёт по плоской модели дескрипторов, чтобы
//! его можно было гонять без устройства; клей перечисления поверх
//! libusb живёт за feature `usb`.

use ttir_types::{IR_ENDPOINT_ADDRESS, IR_MAX_PACKET_SIZE, TT_PRODUCT_ID, TT_VENDOR_ID};

/// Конечная точка из дескриптора альтернативной настройки.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointDesc {
    pub address: u8,
    pub max_packet_size: u16,
}

/// Альтернативная настройка интерфейса.
#[derive(Debug, Clone)]
pub struct AltSetting {
    pub number: u8,
    pub endpoints: Vec<EndpointDesc>,
}

/// Результат поиска: номер настройки и индекс конечной точки в ней.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointMatch {
    pub alt_setting: u8,
    pub endpoint_index: usize,
}

/// Совпадает ли пара VID/PID с приёмником TechnoTrend.
pub fn matches_receiver(
    vendor_id: u16,
    product_id: u16,
) -> bool {
    vendor_id == TT_VENDOR_ID && product_id == TT_PRODUCT_ID
}

/// Ищет настройку с конечной точкой [`IR_ENDPOINT_ADDRESS`] и
/// максимальным размером пакета [`IR_MAX_PACKET_SIZE`].
pub fn find_alt_setting(settings: &[AltSetting]) -> Option<EndpointMatch> {
    for setting in settings {
        for (idx, ep) in setting.endpoints.iter().enumerate() {
            if ep.address == IR_ENDPOINT_ADDRESS && ep.max_packet_size == IR_MAX_PACKET_SIZE {
                return Some(EndpointMatch {
                    alt_setting: setting.number,
                    endpoint_index: idx,
                });
            }
        }
    }
    None
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    fn alt(
        number: u8,
        endpoints: Vec<EndpointDesc>,
    ) -> AltSetting {
        AltSetting { number, endpoints }
    }

    fn ep(
        address: u8,
        max_packet_size: u16,
    ) -> EndpointDesc {
        EndpointDesc {
            address,
            max_packet_size,
        }
    }

    #[test]
    fn test_matches_receiver_ids() {
        assert!(matches_receiver(0x0B48, 0x2003));
        assert!(!matches_receiver(0x0B48, 0x2004));
        assert!(!matches_receiver(0x16C0, 0x2003));
    }

    #[test]
    fn test_finds_setting_among_alternatives() {
        // Рабочая настройка не первая — как у реального устройства
        let settings = vec![
            alt(0, vec![ep(0x82, 0)]),
            alt(1, vec![ep(0x81, 16), ep(0x82, 16)]),
            alt(2, vec![ep(0x82, 64)]),
        ];

        let m = find_alt_setting(&settings).unwrap();
        assert_eq!(m.alt_setting, 1);
        assert_eq!(m.endpoint_index, 1);
    }

    #[test]
    fn test_wrong_packet_size_rejected() {
        // Адрес совпал, размер пакета нет — подключение обязано
        // провалиться, а не работать с неверной настройкой
        let settings = vec![alt(0, vec![ep(0x82, 64)])];
        assert_eq!(find_alt_setting(&settings), None);
    }

    #[test]
    fn test_no_endpoints_at_all() {
        assert_eq!(find_alt_setting(&[]), None);
        assert_eq!(find_alt_setting(&[alt(0, vec![])]), None);
    }
}
