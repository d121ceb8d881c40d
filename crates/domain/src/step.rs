//! The four ordered steps composing an order placement.

use serde::{Deserialize, Serialize};

/// One of the four service calls composing an order placement.
///
/// Steps execute strictly in the order given by [`Step::ALL`]: payment must
/// settle before shipping is attempted, shipping before messaging, and
/// messaging before the employee notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Step {
    /// Charge the user for the order.
    Payment,

    /// Arrange shipment of the item.
    Shipping,

    /// Send the user a confirmation message.
    Messaging,

    /// Record the order with the employee handle.
    Employee,
}

impl Step {
    /// All steps in execution order.
    pub const ALL: [Step; 4] = [Step::Payment, Step::Shipping, Step::Messaging, Step::Employee];

    /// Returns the step following this one, or `None` after the last.
    pub fn next(&self) -> Option<Step> {
        match self {
            Step::Payment => Some(Step::Shipping),
            Step::Shipping => Some(Step::Messaging),
            Step::Messaging => Some(Step::Employee),
            Step::Employee => None,
        }
    }

    /// Steps from this one (inclusive) to the end, in execution order.
    pub fn remaining(&self) -> &'static [Step] {
        const STEPS: &[Step] = &Step::ALL;
        match self {
            Step::Payment => STEPS,
            Step::Shipping => &STEPS[1..],
            Step::Messaging => &STEPS[2..],
            Step::Employee => &STEPS[3..],
        }
    }

    /// Returns the step name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::Payment => "payment",
            Step::Shipping => "shipping",
            Step::Messaging => "messaging",
            Step::Employee => "employee",
        }
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Step {
    type Err = UnknownStep;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "payment" => Ok(Step::Payment),
            "shipping" => Ok(Step::Shipping),
            "messaging" => Ok(Step::Messaging),
            "employee" => Ok(Step::Employee),
            other => Err(UnknownStep(other.to_string())),
        }
    }
}

/// Error returned when parsing an unrecognized step name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStep(pub String);

impl std::fmt::Display for UnknownStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown step: {}", self.0)
    }
}

impl std::error::Error for UnknownStep {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_order() {
        assert_eq!(
            Step::ALL,
            [Step::Payment, Step::Shipping, Step::Messaging, Step::Employee]
        );
    }

    #[test]
    fn test_next_chain() {
        assert_eq!(Step::Payment.next(), Some(Step::Shipping));
        assert_eq!(Step::Shipping.next(), Some(Step::Messaging));
        assert_eq!(Step::Messaging.next(), Some(Step::Employee));
        assert_eq!(Step::Employee.next(), None);
    }

    #[test]
    fn test_remaining() {
        assert_eq!(Step::Payment.remaining(), &Step::ALL);
        assert_eq!(Step::Messaging.remaining(), &[Step::Messaging, Step::Employee]);
        assert_eq!(Step::Employee.remaining(), &[Step::Employee]);
    }

    #[test]
    fn test_display() {
        assert_eq!(Step::Payment.to_string(), "payment");
        assert_eq!(Step::Employee.to_string(), "employee");
    }

    #[test]
    fn test_serialization_roundtrip() {
        for step in Step::ALL {
            let json = serde_json::to_string(&step).unwrap();
            let deserialized: Step = serde_json::from_str(&json).unwrap();
            assert_eq!(step, deserialized);
        }
    }

    #[test]
    fn test_from_str_roundtrip() {
        for step in Step::ALL {
            assert_eq!(step.as_str().parse::<Step>().unwrap(), step);
        }
        assert!("warehouse".parse::<Step>().is_err());
    }
}
