//! Error types for agent construction and delivery attempts.

use thiserror::Error;

/// A delivery precondition that did not hold.
///
/// These never abort a batch: the dispatcher turns them into
/// [`Outcome::Failed`](crate::models::Outcome::Failed) for the task that raised them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    #[error("insufficient energy: drone {id} has {energy}% battery (minimum {threshold}%), delivery cancelled")]
    InsufficientEnergy { id: String, energy: u8, threshold: u8 },

    #[error("unsafe condition: {weather} reported for boat {id}, delivery cancelled")]
    UnsafeCondition { id: String, weather: String },
}

/// Fleet configuration problems, reported before any dispatch begins.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FleetError {
    #[error("unknown agent kind '{0}' (expected ground, air or sea)")]
    UnknownAgentKind(String),

    #[error("agent {id}: energy {energy}% is outside 0-100")]
    InvalidEnergy { id: String, energy: u32 },

    #[error("agent {id}: {kind} agents require '{field}'")]
    MissingField {
        id: String,
        kind: &'static str,
        field: &'static str,
    },

    #[error("agent id '{0}' is declared more than once")]
    DuplicateAgent(String),

    #[error("task for {destination}: no agent with id '{agent}'")]
    UnknownAgent { destination: String, agent: String },

    #[error("invalid timing: {0}")]
    InvalidTiming(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delivery_error_messages() {
        let err = DeliveryError::InsufficientEnergy {
            id: "1234N".to_string(),
            energy: 15,
            threshold: 20,
        };
        let text = err.to_string();
        assert!(text.contains("insufficient energy"));
        assert!(text.contains("1234N"));
        assert!(text.contains("15%"));

        let err = DeliveryError::UnsafeCondition {
            id: "6TD4G".to_string(),
            weather: "Storm".to_string(),
        };
        assert!(err.to_string().contains("unsafe condition"));
    }

    #[test]
    fn test_fleet_error_messages() {
        assert_eq!(
            FleetError::UnknownAgentKind("rocket".to_string()).to_string(),
            "unknown agent kind 'rocket' (expected ground, air or sea)"
        );
        let err = FleetError::MissingField {
            id: "X".to_string(),
            kind: "air",
            field: "energy",
        };
        assert_eq!(err.to_string(), "agent X: air agents require 'energy'");
    }
}
