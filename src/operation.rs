//!
//! The result the operation finder produces: a [`MathTransform`] wrapped
//! with the metadata (name, accuracy, whether datums differ) a caller needs
//! to judge whether it's good enough to use.
//!

use crate::math_transform::{Concatenated, MathTransformRef};

/// ISO 19111's distinction between an exact, reversible coordinate
/// conversion (unit change, map projection, axis swap, ...) and a
/// coordinate transformation, which changes datum and is therefore only
/// ever approximate. A concatenation is classified `Transformation` as
/// soon as any one of its steps is, since the whole chain then inherits
/// that step's uncertainty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Conversion,
    Transformation,
}

impl OperationKind {
    fn combine(self, other: OperationKind) -> OperationKind {
        if self == OperationKind::Transformation || other == OperationKind::Transformation {
            OperationKind::Transformation
        } else {
            OperationKind::Conversion
        }
    }
}

/// A coordinate operation: the evaluable transform between two CRSs, plus
/// enough bookkeeping to explain itself. `accuracy_metres` is `None` for
/// conversions (exact, by definition) and for transformations whose method
/// does not carry a documented accuracy figure.
#[derive(Debug, Clone)]
pub struct CoordinateOperation {
    pub name: String,
    pub kind: OperationKind,
    pub source_name: String,
    pub target_name: String,
    pub math_transform: MathTransformRef,
    pub accuracy_metres: Option<f64>,
}

impl CoordinateOperation {
    pub fn new(
        name: impl Into<String>,
        kind: OperationKind,
        source_name: impl Into<String>,
        target_name: impl Into<String>,
        math_transform: MathTransformRef,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            source_name: source_name.into(),
            target_name: target_name.into(),
            math_transform,
            accuracy_metres: None,
        }
    }

    pub fn with_accuracy(mut self, accuracy_metres: f64) -> Self {
        self.accuracy_metres = Some(accuracy_metres);
        self
    }

    pub fn identity(dim: usize, crs_name: impl Into<String> + Clone) -> Self {
        Self::new(
            "Identity",
            OperationKind::Conversion,
            crs_name.clone(),
            crs_name,
            crate::math_transform::Identity::new(dim),
        )
    }

    /// Chain a sequence of operations end to end. The combined kind is the
    /// least exact of the steps'; the combined accuracy is the worst
    /// (largest) of any step that declares one, since errors along a chain
    /// do not cancel.
    pub fn concatenate(steps: Vec<CoordinateOperation>) -> CoordinateOperation {
        assert!(!steps.is_empty(), "cannot concatenate zero operations");
        if steps.len() == 1 {
            return steps.into_iter().next().unwrap();
        }
        let source_name = steps.first().unwrap().source_name.clone();
        let target_name = steps.last().unwrap().target_name.clone();
        let name = steps.iter().map(|s| s.name.as_str()).collect::<Vec<_>>().join(" -> ");
        let kind = steps
            .iter()
            .map(|s| s.kind)
            .reduce(OperationKind::combine)
            .unwrap_or(OperationKind::Conversion);
        let accuracy_metres = steps
            .iter()
            .filter_map(|s| s.accuracy_metres)
            .fold(None, |acc, a| Some(acc.map_or(a, |acc: f64| acc.max(a))));
        let math_transform = Concatenated::new(steps.into_iter().map(|s| s.math_transform).collect());
        CoordinateOperation {
            name,
            kind,
            source_name,
            target_name,
            math_transform,
            accuracy_metres,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math_transform::Identity;

    #[test]
    fn concatenation_is_a_transformation_if_any_step_is() {
        let a = CoordinateOperation::new("a", OperationKind::Conversion, "A", "B", Identity::new(2));
        let b = CoordinateOperation::new("b", OperationKind::Transformation, "B", "C", Identity::new(2)).with_accuracy(5.0);
        let combined = CoordinateOperation::concatenate(vec![a, b]);
        assert_eq!(combined.kind, OperationKind::Transformation);
        assert_eq!(combined.accuracy_metres, Some(5.0));
    }

    #[test]
    fn single_step_concatenation_is_returned_unchanged() {
        let a = CoordinateOperation::new("a", OperationKind::Conversion, "A", "B", Identity::new(2));
        let combined = CoordinateOperation::concatenate(vec![a]);
        assert_eq!(combined.name, "a");
    }
}
