//! Deterministic itinerary provider.

use async_trait::async_trait;
use navmate_core::providers::{
    ItineraryOption, ItineraryProvider, LegOption, DEFAULT_RIDE_PROVIDER,
};
use navmate_core::trip::LegMode;
use navmate_core::types::Timestamp;

/// Returns the same three route options for every request: transit only,
/// ride only, and a mixed route that ends with a ride.
#[derive(Debug, Default, Clone)]
pub struct StubItineraryProvider;

fn leg(mode: LegMode, from: &str, to: &str, minutes: i32, distance_m: i64) -> LegOption {
    LegOption {
        mode,
        from: from.to_string(),
        to: to.to_string(),
        minutes,
        distance_m,
        provider: (mode == LegMode::Ride).then(|| DEFAULT_RIDE_PROVIDER.to_string()),
    }
}

#[async_trait]
impl ItineraryProvider for StubItineraryProvider {
    async fn estimate(
        &self,
        origin: &str,
        destination: &str,
        _depart_at: Option<Timestamp>,
    ) -> Vec<ItineraryOption> {
        vec![
            ItineraryOption {
                mode_mix: "WALK+TRANSIT".to_string(),
                total_minutes: 42,
                rough_cost_cents: 3_000,
                legs: vec![
                    leg(LegMode::Walk, origin, "Station A", 8, 600),
                    leg(LegMode::Transit, "Station A", "Station B", 30, 12_000),
                    leg(LegMode::Walk, "Station B", destination, 4, 300),
                ],
            },
            ItineraryOption {
                mode_mix: "RIDE".to_string(),
                total_minutes: 18,
                rough_cost_cents: 12_000,
                legs: vec![leg(LegMode::Ride, origin, destination, 18, 9_000)],
            },
            ItineraryOption {
                mode_mix: "WALK+TRANSIT+RIDE".to_string(),
                total_minutes: 28,
                rough_cost_cents: 9_000,
                legs: vec![
                    leg(LegMode::Walk, origin, "Stop C", 5, 400),
                    leg(LegMode::Transit, "Stop C", "Hub D", 15, 7_000),
                    leg(LegMode::Ride, "Hub D", destination, 8, 3_000),
                ],
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use navmate_core::trip::mode_mix;

    use super::*;

    #[tokio::test]
    async fn stub_returns_three_consistent_options() {
        let options = StubItineraryProvider.estimate("Home", "Office", None).await;
        assert_eq!(options.len(), 3);

        for option in &options {
            let minutes: i32 = option.legs.iter().map(|l| l.minutes).sum();
            assert_eq!(minutes, option.total_minutes, "{}", option.mode_mix);

            let modes: Vec<LegMode> = option.legs.iter().map(|l| l.mode).collect();
            assert_eq!(mode_mix(&modes), option.mode_mix);

            assert_eq!(option.legs.first().unwrap().from, "Home");
            assert_eq!(option.legs.last().unwrap().to, "Office");
        }
    }

    #[tokio::test]
    async fn only_ride_legs_carry_a_provider() {
        let options = StubItineraryProvider.estimate("A", "B", None).await;
        for leg in options.iter().flat_map(|o| &o.legs) {
            assert_eq!(leg.provider.is_some(), leg.mode == LegMode::Ride);
        }
    }
}
