//! Field-constraint validation for feature payloads
//!
//! Shape checking (does the JSON deserialize into the registered struct) and
//! constraint checking (do the fields respect OCPP limits) are separate
//! concerns: the first maps to `FormationViolation` on the wire, the second
//! to `PropertyConstraintViolation`. Payload types implement [`Validate`];
//! types without constraints use the default no-op impl.

/// A single field constraint a payload violated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub field: &'static str,
    pub constraint: String,
}

impl Violation {
    pub fn new(field: &'static str, constraint: impl Into<String>) -> Self {
        Self {
            field,
            constraint: constraint.into(),
        }
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.constraint)
    }
}

/// The opaque validator predicate consulted after a payload deserializes.
pub trait Validate {
    fn validate(&self) -> Result<(), Vec<Violation>> {
        Ok(())
    }
}

/// Collects violations and yields the final verdict.
#[derive(Debug, Default)]
pub struct Constraints {
    violations: Vec<Violation>,
}

impl Constraints {
    pub fn new() -> Self {
        Self::default()
    }

    /// OCPP "CiString" rule: at most `max` characters.
    pub fn ci_string(&mut self, field: &'static str, value: &str, max: usize) -> &mut Self {
        if value.chars().count() > max {
            self.violations
                .push(Violation::new(field, format!("exceeds {} characters", max)));
        }
        self
    }

    pub fn opt_ci_string(
        &mut self,
        field: &'static str,
        value: &Option<String>,
        max: usize,
    ) -> &mut Self {
        if let Some(v) = value {
            self.ci_string(field, v, max);
        }
        self
    }

    pub fn non_negative(&mut self, field: &'static str, value: i32) -> &mut Self {
        if value < 0 {
            self.violations
                .push(Violation::new(field, "must not be negative"));
        }
        self
    }

    pub fn positive(&mut self, field: &'static str, value: i32) -> &mut Self {
        if value <= 0 {
            self.violations
                .push(Violation::new(field, "must be greater than zero"));
        }
        self
    }

    pub fn non_empty(&mut self, field: &'static str, value: &str) -> &mut Self {
        if value.is_empty() {
            self.violations
                .push(Violation::new(field, "must not be empty"));
        }
        self
    }

    pub fn finish(&mut self) -> Result<(), Vec<Violation>> {
        if self.violations.is_empty() {
            Ok(())
        } else {
            Err(std::mem::take(&mut self.violations))
        }
    }
}

pub(crate) fn describe(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Sample {
        tag: String,
        connector_id: i32,
    }

    impl Validate for Sample {
        fn validate(&self) -> Result<(), Vec<Violation>> {
            Constraints::new()
                .ci_string("idTag", &self.tag, 20)
                .non_negative("connectorId", self.connector_id)
                .finish()
        }
    }

    #[test]
    fn passes_within_limits() {
        let s = Sample {
            tag: "ABC123".into(),
            connector_id: 1,
        };
        assert!(s.validate().is_ok());
    }

    #[test]
    fn collects_every_violation() {
        let s = Sample {
            tag: "X".repeat(21),
            connector_id: -1,
        };
        let violations = s.validate().unwrap_err();
        assert_eq!(violations.len(), 2);
        assert_eq!(violations[0].field, "idTag");
        assert_eq!(violations[1].field, "connectorId");
    }
}
