use ttir_types::{DEFAULT_TRANSFERS, MIN_TRANSFERS};

use crate::{CaptureError, CaptureResult};

/// Тип приёмника (выбор при старте).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceKind {
    /// Встроенный симулятор (не требует железа).
    Simulated,
    /// TechnoTrend USB IR Receiver (требует feature `usb` + libusb).
    TtUsb,
}

/// Конфигурация сессии захвата. Задаётся только при старте.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Тип приёмника
    pub device: DeviceKind,
    /// Кол-во одновременных запросов приёма (минимум 2)
    pub num_transfers: usize,
    /// Ограничение по времени (None = до Ctrl+C)
    pub duration_secs: Option<u64>,
    /// Интервал вывода статистики (секунды)
    pub stats_interval_secs: u64,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl CaptureConfig {
    /// Проверяет конфигурацию перед подключением.
    pub fn validate(&self) -> CaptureResult<()> {
        if self.num_transfers < MIN_TRANSFERS {
            return Err(CaptureError::Config(format!(
                "num_transfers must be >= {MIN_TRANSFERS}, got {}",
                self.num_transfers
            )));
        }
        Ok(())
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            device: DeviceKind::Simulated,
            num_transfers: DEFAULT_TRANSFERS,
            duration_secs: None,
            stats_interval_secs: 5,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов для DeviceKind
////////////////////////////////////////////////////////////////////////////////

impl std::fmt::Display for DeviceKind {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            DeviceKind::Simulated => write!(f, "sim"),
            DeviceKind::TtUsb => write!(f, "ttusb"),
        }
    }
}

impl std::str::FromStr for DeviceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sim" | "simulated" => Ok(DeviceKind::Simulated),
            "ttusb" | "usb" | "technotrend" => Ok(DeviceKind::TtUsb),
            _ => Err(format!("Unknown device type: '{s}'. Use: sim, ttusb")),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
