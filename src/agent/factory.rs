//! Building agents from configuration descriptors.

use super::transport::{Agent, AgentKind, TransitProfile};
use crate::error::FleetError;
use serde::{Deserialize, Serialize};

/// Agent descriptor as it appears in a fleet file.
///
/// Only the field relevant to `kind` is read; the others are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSpec {
    pub kind: String,
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
    /// Battery percentage (0-100).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather: Option<String>,
}

impl AgentSpec {
    pub fn ground(id: &str, capacity: u32) -> Self {
        Self {
            kind: AgentKind::Ground.to_string(),
            id: id.to_string(),
            capacity: Some(capacity),
            energy: None,
            weather: None,
        }
    }

    pub fn air(id: &str, energy: u32) -> Self {
        Self {
            kind: AgentKind::Air.to_string(),
            id: id.to_string(),
            capacity: None,
            energy: Some(energy),
            weather: None,
        }
    }

    pub fn sea(id: &str, weather: &str) -> Self {
        Self {
            kind: AgentKind::Sea.to_string(),
            id: id.to_string(),
            capacity: None,
            energy: None,
            weather: Some(weather.to_string()),
        }
    }

    /// Build the agent, taking its transit time from `profile`.
    pub fn build(&self, profile: &TransitProfile) -> Result<Agent, FleetError> {
        let kind: AgentKind = self.kind.parse()?;

        let agent = match kind {
            AgentKind::Ground => {
                let capacity = self.capacity.ok_or_else(|| self.missing("ground", "capacity"))?;
                Agent::ground(self.id.clone(), capacity)
            }
            AgentKind::Air => {
                let energy = self.energy.ok_or_else(|| self.missing("air", "energy"))?;
                let energy = u8::try_from(energy)
                    .ok()
                    .filter(|e| *e <= 100)
                    .ok_or_else(|| FleetError::InvalidEnergy {
                        id: self.id.clone(),
                        energy,
                    })?;
                Agent::air(self.id.clone(), energy)
            }
            AgentKind::Sea => {
                let weather = self
                    .weather
                    .clone()
                    .ok_or_else(|| self.missing("sea", "weather"))?;
                Agent::sea(self.id.clone(), weather)
            }
        };

        Ok(agent.with_transit(profile.for_kind(kind)))
    }

    fn missing(&self, kind: &'static str, field: &'static str) -> FleetError {
        FleetError::MissingField {
            id: self.id.clone(),
            kind,
            field,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::TransitTime;

    #[test]
    fn test_build_each_kind() {
        let profile = TransitProfile::instant();

        let truck = AgentSpec::ground("A8U5", 5).build(&profile).unwrap();
        assert_eq!(truck.kind(), AgentKind::Ground);
        assert_eq!(truck.transit(), TransitTime::INSTANT);

        let drone = AgentSpec::air("1234N", 15).build(&profile).unwrap();
        assert_eq!(drone.kind(), AgentKind::Air);
        assert_eq!(drone.id(), "1234N");

        let boat = AgentSpec::sea("6TD4G", "Clear").build(&profile).unwrap();
        assert_eq!(boat.kind(), AgentKind::Sea);
    }

    #[test]
    fn test_build_uses_profile_transit() {
        let profile = TransitProfile::default();
        let boat = AgentSpec::sea("B", "Clear").build(&profile).unwrap();
        assert_eq!(boat.transit(), profile.sea);
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let mut spec = AgentSpec::ground("X1", 3);
        spec.kind = "hovercraft".to_string();
        assert_eq!(
            spec.build(&TransitProfile::instant()),
            Err(FleetError::UnknownAgentKind("hovercraft".to_string()))
        );
    }

    #[test]
    fn test_missing_field_is_rejected() {
        let mut spec = AgentSpec::air("D2", 50);
        spec.energy = None;
        assert!(matches!(
            spec.build(&TransitProfile::instant()),
            Err(FleetError::MissingField { field: "energy", .. })
        ));
    }

    #[test]
    fn test_energy_out_of_range_is_rejected() {
        let spec = AgentSpec::air("D3", 101);
        assert_eq!(
            spec.build(&TransitProfile::instant()),
            Err(FleetError::InvalidEnergy {
                id: "D3".to_string(),
                energy: 101
            })
        );
    }
}
