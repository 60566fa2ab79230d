//! Реестр активных сессий.
//!
//! Каждому подключённому приёмнику выдаётся номер из фиксированного
//! набора слотов; номер освобождается при отсоединении и может быть
//! выдан заново.

use crate::{CaptureError, CaptureResult};

/// Номер сессии в реестре.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub u32);

impl std::fmt::Display for SessionId {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Реестр с фиксированным числом слотов.
#[derive(Debug)]
pub struct SessionRegistry {
    slots: Vec<Option<String>>,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl SessionRegistry {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity],
        }
    }

    /// Занимает первый свободный слот под сессию `name`.
    pub fn register(
        &mut self,
        name: &str,
    ) -> CaptureResult<SessionId> {
        for (idx, slot) in self.slots.iter_mut().enumerate() {
            if slot.is_none() {
                *slot = Some(name.to_string());
                return Ok(SessionId(idx as u32));
            }
        }

        Err(CaptureError::RegistryFull {
            capacity: self.slots.len(),
        })
    }

    /// Освобождает слот; `false`, если он и так был свободен.
    pub fn unregister(
        &mut self,
        id: SessionId,
    ) -> bool {
        match self.slots.get_mut(id.0 as usize) {
            Some(slot) if slot.is_some() => {
                *slot = None;
                true
            }
            _ => false,
        }
    }

    /// Имя сессии в слоте, если он занят.
    pub fn name(
        &self,
        id: SessionId,
    ) -> Option<&str> {
        self.slots
            .get(id.0 as usize)
            .and_then(|s| s.as_deref())
    }

    /// Кол-во занятых слотов.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_hands_out_lowest_free_slot() {
        let mut reg = SessionRegistry::new(4);

        let a = reg.register("ttusbir-0").unwrap();
        let b = reg.register("ttusbir-1").unwrap();
        assert_eq!(a, SessionId(0));
        assert_eq!(b, SessionId(1));
        assert_eq!(reg.name(a), Some("ttusbir-0"));

        // Освобождённый слот выдаётся заново
        assert!(reg.unregister(a));
        let c = reg.register("ttusbir-2").unwrap();
        assert_eq!(c, SessionId(0));
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn test_full_registry_rejects() {
        let mut reg = SessionRegistry::new(2);

        reg.register("a").unwrap();
        reg.register("b").unwrap();

        assert!(matches!(
            reg.register("c"),
            Err(CaptureError::RegistryFull { capacity: 2 })
        ));
    }

    #[test]
    fn test_unregister_free_slot_is_noop() {
        let mut reg = SessionRegistry::new(2);

        assert!(!reg.unregister(SessionId(0)));
        assert!(!reg.unregister(SessionId(9)));
        assert!(reg.is_empty());
    }
}
