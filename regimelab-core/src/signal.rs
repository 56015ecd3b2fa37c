//! Signal generation contract: the external, untrusted decision source.
//!
//! The core never looks inside a generator. It receives a `TradeDecision`
//! per bar, sanitizes it (the generator is untrusted input), normalizes the
//! confidence scale, and gates entry against the current regime threshold.

use serde::{Deserialize, Serialize};

use crate::domain::PriceBar;

/// Directional intent of a decision.
///
/// Deserialization goes through the raw action string and maps anything
/// outside {BUY, SELL, HOLD} to `Hold`, so a misbehaving generator feeding
/// the wire format degrades to inaction instead of failing the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(from = "String")]
pub enum SignalAction {
    Buy,
    Sell,
    Hold,
}

impl From<String> for SignalAction {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "BUY" => SignalAction::Buy,
            "SELL" => SignalAction::Sell,
            _ => SignalAction::Hold,
        }
    }
}

/// One decision from the external signal generator.
///
/// `confidence` is on the generator's native 0-100 scale; the simulator
/// normalizes it to [0, 1] before comparing against
/// `RegimeState::confidence_threshold`. `entry_price` is the generator's own
/// suggestion and is ignored by the simulator, which fills at the bar close
/// (optionally spread-adjusted).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeDecision {
    pub action: SignalAction,
    pub confidence: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub position_size: f64,
    pub entry_price: f64,
}

impl TradeDecision {
    /// A do-nothing decision.
    pub fn hold() -> Self {
        Self {
            action: SignalAction::Hold,
            confidence: 0.0,
            stop_loss: 0.0,
            take_profit: 0.0,
            position_size: 0.0,
            entry_price: 0.0,
        }
    }
}

/// Trait for external signal generators.
///
/// Implementations receive the bar window up to and including the decision
/// bar, plus the current account balance, and must only use data from that
/// window. The core treats the output as untrusted: out-of-range fields are
/// coerced to Hold, never a fatal error.
pub trait SignalGenerator: Send + Sync {
    /// Human-readable name (e.g., "momentum_cross").
    fn name(&self) -> &str;

    fn evaluate(&self, bars: &[PriceBar], account_balance: f64) -> TradeDecision;
}

/// Validate an untrusted decision, coercing anything out of contract to
/// Hold. Returns the usable decision and, when coerced, a warning line for
/// the run's warning list.
pub fn sanitize(decision: TradeDecision) -> (TradeDecision, Option<String>) {
    if !decision.confidence.is_finite()
        || decision.confidence < 0.0
        || decision.confidence > 100.0
    {
        let warning = format!(
            "signal confidence {} outside [0, 100]; treating as HOLD",
            decision.confidence
        );
        return (TradeDecision::hold(), Some(warning));
    }

    if decision.action != SignalAction::Hold {
        let levels_ok = decision.stop_loss.is_finite()
            && decision.stop_loss > 0.0
            && decision.take_profit.is_finite()
            && decision.take_profit > 0.0
            && decision.position_size.is_finite()
            && decision.position_size > 0.0;
        if !levels_ok {
            let warning = format!(
                "signal {:?} carried unusable stop/target/size \
                 (sl={}, tp={}, size={}); treating as HOLD",
                decision.action, decision.stop_loss, decision.take_profit, decision.position_size
            );
            return (TradeDecision::hold(), Some(warning));
        }
    }

    (decision, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buy_decision() -> TradeDecision {
        TradeDecision {
            action: SignalAction::Buy,
            confidence: 72.0,
            stop_loss: 98.0,
            take_profit: 104.0,
            position_size: 0.5,
            entry_price: 100.0,
        }
    }

    #[test]
    fn valid_decision_passes_through() {
        let (decision, warning) = sanitize(buy_decision());
        assert_eq!(decision, buy_decision());
        assert!(warning.is_none());
    }

    #[test]
    fn out_of_range_confidence_coerces_to_hold() {
        for confidence in [-1.0, 100.5, f64::NAN, f64::INFINITY] {
            let mut decision = buy_decision();
            decision.confidence = confidence;
            let (decision, warning) = sanitize(decision);
            assert_eq!(decision.action, SignalAction::Hold);
            assert!(warning.unwrap().contains("HOLD"));
        }
    }

    #[test]
    fn broken_levels_coerce_to_hold() {
        let mut decision = buy_decision();
        decision.stop_loss = f64::NAN;
        let (decision, warning) = sanitize(decision);
        assert_eq!(decision.action, SignalAction::Hold);
        assert!(warning.is_some());

        let mut decision = buy_decision();
        decision.position_size = 0.0;
        let (decision, _) = sanitize(decision);
        assert_eq!(decision.action, SignalAction::Hold);
    }

    #[test]
    fn hold_with_zero_levels_is_fine() {
        let (decision, warning) = sanitize(TradeDecision::hold());
        assert_eq!(decision.action, SignalAction::Hold);
        assert!(warning.is_none());
    }

    #[test]
    fn unknown_action_string_deserializes_to_hold() {
        let json = r#"{"action":"CLOSE_ALL","confidence":80.0,"stop_loss":98.0,
                       "take_profit":104.0,"position_size":1.0,"entry_price":100.0}"#;
        let decision: TradeDecision = serde_json::from_str(json).unwrap();
        assert_eq!(decision.action, SignalAction::Hold);
    }

    #[test]
    fn known_actions_deserialize() {
        let json = r#"{"action":"BUY","confidence":80.0,"stop_loss":98.0,
                       "take_profit":104.0,"position_size":1.0,"entry_price":100.0}"#;
        let decision: TradeDecision = serde_json::from_str(json).unwrap();
        assert_eq!(decision.action, SignalAction::Buy);
    }
}
