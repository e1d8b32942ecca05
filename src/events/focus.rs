use serde::{Deserialize, Serialize};
use std::fmt;

/// Идентификатор сущности, по которой ведётся история фокуса.
///
/// Окна адресуются числовым con_id, рабочие столы - именем. Уникальность
/// гарантируется только внутри одного вида сущностей, демон никогда не
/// смешивает окна и рабочие столы в одном списке.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Window(i64),
    Workspace(String),
}

impl EntityId {
    pub fn workspace(name: impl Into<String>) -> Self {
        Self::Workspace(name.into())
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Window(id) => write!(f, "окно con_id={}", id),
            EntityId::Workspace(name) => write!(f, "рабочий стол \"{}\"", name),
        }
    }
}

/// Событие смены фокуса, полученное от window manager
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusEvent {
    pub entity: EntityId,
    /// Output, на котором произошло событие (если window manager его сообщил)
    pub output: Option<String>,
    /// Плавающее окно (для рабочих столов всегда false)
    pub floating: bool,
    pub timestamp: std::time::Instant,
}

impl FocusEvent {
    pub fn new(entity: EntityId) -> Self {
        Self {
            entity,
            output: None,
            floating: false,
            timestamp: std::time::Instant::now(),
        }
    }

    pub fn with_output(mut self, output: Option<String>) -> Self {
        self.output = output;
        self
    }

    pub fn with_floating(mut self, floating: bool) -> Self {
        self.floating = floating;
        self
    }
}

impl fmt::Display for FocusEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "фокус: {} ({}ms назад)",
            self.entity,
            self.timestamp.elapsed().as_millis()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_focus_event_builder() {
        let event = FocusEvent::new(EntityId::Window(42))
            .with_output(Some("DP-1".to_string()))
            .with_floating(true);

        assert_eq!(event.entity, EntityId::Window(42));
        assert_eq!(event.output.as_deref(), Some("DP-1"));
        assert!(event.floating);
    }

    #[test]
    fn test_entity_id_untagged_serde() {
        // Персистентный формат: окна - числа, рабочие столы - строки
        let win: EntityId = serde_json::from_str("93824").unwrap();
        assert_eq!(win, EntityId::Window(93824));

        let ws: EntityId = serde_json::from_str("\"3: web\"").unwrap();
        assert_eq!(ws, EntityId::workspace("3: web"));

        assert_eq!(serde_json::to_string(&EntityId::Window(7)).unwrap(), "7");
        assert_eq!(
            serde_json::to_string(&EntityId::workspace("mail")).unwrap(),
            "\"mail\""
        );
    }
}
