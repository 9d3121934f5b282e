//! Transport agents and their delivery behavior.
//!
//! The set of transport kinds is closed, so agents are a plain enum rather
//! than trait objects. Each agent carries its own [`TransitTime`], which is
//! the only thing that makes a delivery attempt wait.

use crate::error::{DeliveryError, FleetError};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

/// Minimum battery percentage a drone needs to take off.
pub const MIN_AIR_ENERGY: u8 = 20;

/// Weather report that grounds every boat.
pub const ADVERSE_WEATHER: &str = "Storm";

/// Transport kind of an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentKind {
    Ground,
    Air,
    Sea,
}

impl AgentKind {
    /// Name of the vehicle used in human-readable messages.
    pub fn vehicle(&self) -> &'static str {
        match self {
            AgentKind::Ground => "Truck",
            AgentKind::Air => "Drone",
            AgentKind::Sea => "Boat",
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentKind::Ground => write!(f, "ground"),
            AgentKind::Air => write!(f, "air"),
            AgentKind::Sea => write!(f, "sea"),
        }
    }
}

impl FromStr for AgentKind {
    type Err = FleetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ground" | "truck" => Ok(AgentKind::Ground),
            "air" | "drone" => Ok(AgentKind::Air),
            "sea" | "boat" => Ok(AgentKind::Sea),
            _ => Err(FleetError::UnknownAgentKind(s.to_string())),
        }
    }
}

/// Simulated transit duration of a single delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitTime {
    /// Always the same duration.
    Fixed(Duration),
    /// A uniformly random duration in `min..=max`, drawn per attempt.
    Between { min: Duration, max: Duration },
}

impl TransitTime {
    /// No delay at all; useful for tests and dry fleets.
    pub const INSTANT: TransitTime = TransitTime::Fixed(Duration::ZERO);

    /// Pick the duration for one attempt.
    pub fn sample(&self) -> Duration {
        match *self {
            TransitTime::Fixed(d) => d,
            TransitTime::Between { min, max } if max <= min => min,
            TransitTime::Between { min, max } => {
                let lo = min.as_millis() as u64;
                let hi = max.as_millis() as u64;
                Duration::from_millis(rand::thread_rng().gen_range(lo..=hi))
            }
        }
    }

    /// Longest duration this transit time can produce.
    pub fn upper_bound(&self) -> Duration {
        match *self {
            TransitTime::Fixed(d) => d,
            TransitTime::Between { min, max } => min.max(max),
        }
    }
}

/// Transit times applied to newly built agents, one per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitProfile {
    pub ground: TransitTime,
    pub air: TransitTime,
    pub sea: TransitTime,
}

impl Default for TransitProfile {
    fn default() -> Self {
        Self {
            ground: TransitTime::Between {
                min: Duration::from_secs(3),
                max: Duration::from_secs(7),
            },
            air: TransitTime::Fixed(Duration::from_secs(1)),
            sea: TransitTime::Fixed(Duration::from_secs(5)),
        }
    }
}

impl TransitProfile {
    /// A profile where every delivery completes immediately.
    #[cfg(test)]
    pub fn instant() -> Self {
        Self {
            ground: TransitTime::INSTANT,
            air: TransitTime::INSTANT,
            sea: TransitTime::INSTANT,
        }
    }

    pub fn for_kind(&self, kind: AgentKind) -> TransitTime {
        match kind {
            AgentKind::Ground => self.ground,
            AgentKind::Air => self.air,
            AgentKind::Sea => self.sea,
        }
    }
}

/// Ground transport. Always delivers; capacity is informational only.
#[derive(Debug, Clone, PartialEq)]
pub struct GroundAgent {
    pub id: String,
    pub capacity: u32,
    pub transit: TransitTime,
}

/// Air transport. Refuses to fly below [`MIN_AIR_ENERGY`].
#[derive(Debug, Clone, PartialEq)]
pub struct AirAgent {
    pub id: String,
    /// Remaining battery, in percent.
    pub energy: u8,
    pub transit: TransitTime,
}

/// Sea transport. Stays in port while the weather is [`ADVERSE_WEATHER`].
#[derive(Debug, Clone, PartialEq)]
pub struct SeaAgent {
    pub id: String,
    pub weather: String,
    pub transit: TransitTime,
}

/// A delivery-capable unit of one of the supported transport kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum Agent {
    Ground(GroundAgent),
    Air(AirAgent),
    Sea(SeaAgent),
}

impl Agent {
    /// Create a ground agent with the default transit time.
    pub fn ground(id: impl Into<String>, capacity: u32) -> Self {
        Agent::Ground(GroundAgent {
            id: id.into(),
            capacity,
            transit: TransitProfile::default().ground,
        })
    }

    /// Create an air agent with the default transit time.
    ///
    /// Energy above 100% is clamped.
    pub fn air(id: impl Into<String>, energy: u8) -> Self {
        Agent::Air(AirAgent {
            id: id.into(),
            energy: energy.min(100),
            transit: TransitProfile::default().air,
        })
    }

    /// Create a sea agent with the default transit time.
    pub fn sea(id: impl Into<String>, weather: impl Into<String>) -> Self {
        Agent::Sea(SeaAgent {
            id: id.into(),
            weather: weather.into(),
            transit: TransitProfile::default().sea,
        })
    }

    /// Replace the simulated transit time.
    pub fn with_transit(mut self, transit: TransitTime) -> Self {
        match &mut self {
            Agent::Ground(a) => a.transit = transit,
            Agent::Air(a) => a.transit = transit,
            Agent::Sea(a) => a.transit = transit,
        }
        self
    }

    pub fn id(&self) -> &str {
        match self {
            Agent::Ground(a) => &a.id,
            Agent::Air(a) => &a.id,
            Agent::Sea(a) => &a.id,
        }
    }

    pub fn kind(&self) -> AgentKind {
        match self {
            Agent::Ground(_) => AgentKind::Ground,
            Agent::Air(_) => AgentKind::Air,
            Agent::Sea(_) => AgentKind::Sea,
        }
    }

    pub fn transit(&self) -> TransitTime {
        match self {
            Agent::Ground(a) => a.transit,
            Agent::Air(a) => a.transit,
            Agent::Sea(a) => a.transit,
        }
    }

    /// Describe the agent's readiness. Has no side effects.
    pub fn status(&self) -> String {
        match self {
            Agent::Ground(a) => format!(
                "Truck {} is operational with capacity {}",
                a.id, a.capacity
            ),
            Agent::Air(a) => format!("Drone {} is operational with {}% battery", a.id, a.energy),
            Agent::Sea(a) => format!("Boat {} is operational, weather: {}", a.id, a.weather),
        }
    }

    /// Check the conditions that must hold before the agent departs.
    pub fn preflight(&self) -> Result<(), DeliveryError> {
        match self {
            Agent::Ground(_) => Ok(()),
            Agent::Air(a) if a.energy < MIN_AIR_ENERGY => Err(DeliveryError::InsufficientEnergy {
                id: a.id.clone(),
                energy: a.energy,
                threshold: MIN_AIR_ENERGY,
            }),
            Agent::Air(_) => Ok(()),
            Agent::Sea(a) if a.weather.trim().eq_ignore_ascii_case(ADVERSE_WEATHER) => {
                Err(DeliveryError::UnsafeCondition {
                    id: a.id.clone(),
                    weather: a.weather.clone(),
                })
            }
            Agent::Sea(_) => Ok(()),
        }
    }

    /// Deliver a package to `destination`.
    ///
    /// Preconditions are checked first; when one fails the call returns
    /// immediately without simulating any transit.
    pub async fn attempt_delivery(&self, destination: &str) -> Result<String, DeliveryError> {
        self.preflight()?;

        let delay = self.transit().sample();
        debug!(
            "{} {} departing for {} ({} ms)",
            self.kind().vehicle(),
            self.id(),
            destination,
            delay.as_millis()
        );
        tokio::time::sleep(delay).await;

        Ok(self.delivery_message(destination))
    }

    fn delivery_message(&self, destination: &str) -> String {
        match self {
            Agent::Ground(a) => format!(
                "Truck {} with capacity {} delivered the package to {}",
                a.id, a.capacity, destination
            ),
            Agent::Air(a) => format!("Drone {} delivered the package to {}", a.id, destination),
            Agent::Sea(a) => format!("Boat {} delivered the package to {}", a.id, destination),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_kind_from_str() {
        assert_eq!("ground".parse::<AgentKind>().unwrap(), AgentKind::Ground);
        assert_eq!("Drone".parse::<AgentKind>().unwrap(), AgentKind::Air);
        assert_eq!(" SEA ".parse::<AgentKind>().unwrap(), AgentKind::Sea);
        assert_eq!(
            "rocket".parse::<AgentKind>(),
            Err(FleetError::UnknownAgentKind("rocket".to_string()))
        );
    }

    #[test]
    fn test_transit_sample_within_bounds() {
        let transit = TransitTime::Between {
            min: Duration::from_millis(10),
            max: Duration::from_millis(20),
        };
        for _ in 0..50 {
            let d = transit.sample();
            assert!(d >= Duration::from_millis(10) && d <= Duration::from_millis(20));
        }

        let inverted = TransitTime::Between {
            min: Duration::from_millis(30),
            max: Duration::from_millis(5),
        };
        assert_eq!(inverted.sample(), Duration::from_millis(30));
        assert_eq!(inverted.upper_bound(), Duration::from_millis(30));
    }

    #[test]
    fn test_air_energy_is_clamped() {
        match Agent::air("D1", 250) {
            Agent::Air(a) => assert_eq!(a.energy, 100),
            other => panic!("unexpected agent: {:?}", other),
        }
    }

    #[test]
    fn test_status_texts() {
        assert_eq!(
            Agent::ground("A8U5", 5).status(),
            "Truck A8U5 is operational with capacity 5"
        );
        assert_eq!(
            Agent::air("1234N", 15).status(),
            "Drone 1234N is operational with 15% battery"
        );
        assert!(Agent::sea("6TD4G", "Clear").status().contains("6TD4G"));
    }

    #[test]
    fn test_preflight_checks() {
        assert!(Agent::ground("G", 0).preflight().is_ok());
        assert!(Agent::air("A", MIN_AIR_ENERGY).preflight().is_ok());
        assert!(matches!(
            Agent::air("A", MIN_AIR_ENERGY - 1).preflight(),
            Err(DeliveryError::InsufficientEnergy { .. })
        ));
        assert!(matches!(
            Agent::sea("S", "storm").preflight(),
            Err(DeliveryError::UnsafeCondition { .. })
        ));
        assert!(Agent::sea("S", "Fog").preflight().is_ok());
    }

    #[tokio::test]
    async fn test_air_low_energy_fails_without_delay() {
        // A transit this long would hang the test if the precondition ran after it.
        let drone = Agent::air("1234N", 15).with_transit(TransitTime::Fixed(Duration::from_secs(3600)));
        let result = tokio::time::timeout(
            Duration::from_secs(1),
            drone.attempt_delivery("Los Angeles"),
        )
        .await
        .expect("precondition failure must not wait for transit");

        assert!(matches!(
            result,
            Err(DeliveryError::InsufficientEnergy { energy: 15, .. })
        ));
    }

    #[tokio::test]
    async fn test_air_full_energy_delivers() {
        let drone = Agent::air("1234N", 100).with_transit(TransitTime::INSTANT);
        let message = drone.attempt_delivery("Los Angeles").await.unwrap();
        assert!(message.contains("1234N"));
        assert!(message.contains("Los Angeles"));
    }

    #[tokio::test]
    async fn test_sea_storm_fails() {
        let boat = Agent::sea("6TD4G", "Storm").with_transit(TransitTime::INSTANT);
        let err = boat.attempt_delivery("Paris").await.unwrap_err();
        assert!(err.to_string().contains("unsafe condition"));
    }

    #[tokio::test]
    async fn test_sea_clear_delivers() {
        let boat = Agent::sea("6TD4G", "Clear").with_transit(TransitTime::INSTANT);
        let message = boat.attempt_delivery("Paris").await.unwrap();
        assert!(message.contains("6TD4G"));
        assert!(message.contains("Paris"));
    }

    #[tokio::test]
    async fn test_ground_always_delivers_regardless_of_capacity() {
        let truck = Agent::ground("A8U5", 0).with_transit(TransitTime::INSTANT);
        let message = truck.attempt_delivery("Marseille").await.unwrap();
        assert!(message.contains("A8U5"));
        assert!(message.contains("capacity 0"));
        assert!(message.contains("Marseille"));
    }

    #[tokio::test]
    async fn test_status_unaffected_by_delivery() {
        let agents = vec![
            Agent::ground("G1", 5),
            Agent::air("A1", 10),
            Agent::sea("S1", "Storm"),
        ];
        for agent in agents {
            let agent = agent.with_transit(TransitTime::INSTANT);
            let before = agent.status();
            let _ = agent.attempt_delivery("Lyon").await;
            assert_eq!(agent.status(), before);
            assert_eq!(agent.status(), agent.status());
        }
    }
}
