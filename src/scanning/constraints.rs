//! Scan constraints: leaf comparisons and AND/OR/XOR combinators
//!
//! A constraint tree is always interpreted against exactly one scannable
//! type, carried by the enclosing [`ScanConstraints`] wrapper together
//! with the alignment stride and float tolerance for the scan.

use crate::core::types::{MemoryError, MemoryResult, MemoryValue, ValueType};
use serde::{Deserialize, Serialize};

/// Default tolerance for 32-bit float equality comparisons
pub const DEFAULT_F32_TOLERANCE: f64 = 1e-4;
/// Default tolerance for 64-bit float equality comparisons
pub const DEFAULT_F64_TOLERANCE: f64 = 1e-8;

/// The comparison a leaf constraint performs at each element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintKind {
    Unchanged,
    Changed,
    Increased,
    Decreased,
    IncreasedByX,
    DecreasedByX,
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
}

impl ConstraintKind {
    /// Checks if this comparison needs the element's previous value
    pub fn is_relative(&self) -> bool {
        matches!(
            self,
            ConstraintKind::Unchanged
                | ConstraintKind::Changed
                | ConstraintKind::Increased
                | ConstraintKind::Decreased
                | ConstraintKind::IncreasedByX
                | ConstraintKind::DecreasedByX
        )
    }

    /// Checks if this comparison needs an operand value
    pub fn requires_operand(&self) -> bool {
        matches!(
            self,
            ConstraintKind::IncreasedByX
                | ConstraintKind::DecreasedByX
                | ConstraintKind::Equal
                | ConstraintKind::NotEqual
                | ConstraintKind::GreaterThan
                | ConstraintKind::GreaterThanOrEqual
                | ConstraintKind::LessThan
                | ConstraintKind::LessThanOrEqual
        )
    }

    /// Checks if this comparison is meaningful for byte-array scans
    pub fn valid_for_byte_array(&self) -> bool {
        matches!(
            self,
            ConstraintKind::Unchanged
                | ConstraintKind::Changed
                | ConstraintKind::Equal
                | ConstraintKind::NotEqual
        )
    }
}

/// Boolean combinator joining two child constraints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintOperator {
    And,
    Or,
    Xor,
}

/// A leaf comparison with its optional operand
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanConstraint {
    pub kind: ConstraintKind,
    pub operand: Option<MemoryValue>,
}

impl ScanConstraint {
    /// Creates an operand-less leaf (relative comparisons)
    pub fn new(kind: ConstraintKind) -> Self {
        ScanConstraint {
            kind,
            operand: None,
        }
    }

    /// Creates a leaf with an operand value
    pub fn with_operand(kind: ConstraintKind, operand: MemoryValue) -> Self {
        ScanConstraint {
            kind,
            operand: Some(operand),
        }
    }
}

/// Two child constraints joined by AND, OR, or XOR
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationConstraint {
    pub operator: ConstraintOperator,
    pub left: Box<Constraint>,
    pub right: Box<Constraint>,
}

/// A constraint tree node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Constraint {
    Scan(ScanConstraint),
    Operation(OperationConstraint),
}

impl Constraint {
    /// Leaf without operand
    pub fn scan(kind: ConstraintKind) -> Self {
        Constraint::Scan(ScanConstraint::new(kind))
    }

    /// Leaf with operand
    pub fn scan_with(kind: ConstraintKind, operand: MemoryValue) -> Self {
        Constraint::Scan(ScanConstraint::with_operand(kind, operand))
    }

    /// AND combinator
    pub fn and(left: Constraint, right: Constraint) -> Self {
        Constraint::Operation(OperationConstraint {
            operator: ConstraintOperator::And,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    /// OR combinator
    pub fn or(left: Constraint, right: Constraint) -> Self {
        Constraint::Operation(OperationConstraint {
            operator: ConstraintOperator::Or,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    /// XOR combinator
    pub fn xor(left: Constraint, right: Constraint) -> Self {
        Constraint::Operation(OperationConstraint {
            operator: ConstraintOperator::Xor,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    /// Checks if any leaf in the tree needs previous values
    pub fn has_relative_constraint(&self) -> bool {
        match self {
            Constraint::Scan(leaf) => leaf.kind.is_relative(),
            Constraint::Operation(op) => {
                op.left.has_relative_constraint() || op.right.has_relative_constraint()
            }
        }
    }

    /// Validates the tree against the scan's value type
    fn validate(&self, value_type: ValueType) -> MemoryResult<()> {
        match self {
            Constraint::Scan(leaf) => validate_leaf(leaf, value_type),
            Constraint::Operation(op) => {
                op.left.validate(value_type)?;
                op.right.validate(value_type)
            }
        }
    }
}

fn validate_leaf(leaf: &ScanConstraint, value_type: ValueType) -> MemoryResult<()> {
    let is_bytes = value_type == ValueType::Bytes;

    if is_bytes && !leaf.kind.valid_for_byte_array() {
        return Err(MemoryError::InvalidConstraint(format!(
            "{:?} is not meaningful for byte-array scans",
            leaf.kind
        )));
    }

    // Byte-array comparisons always need a pattern operand: Equal/NotEqual
    // use its bytes and mask, Changed/Unchanged use its length and mask to
    // size the compared window.
    let operand_required = leaf.kind.requires_operand() || is_bytes;

    match &leaf.operand {
        None if operand_required => Err(MemoryError::InvalidConstraint(format!(
            "{:?} requires an operand for {:?}",
            leaf.kind, value_type
        ))),
        Some(_) if !operand_required => Err(MemoryError::InvalidConstraint(format!(
            "{:?} does not take an operand",
            leaf.kind
        ))),
        Some(operand) if !operand.matches_type(value_type) => {
            Err(MemoryError::InvalidConstraint(format!(
                "operand {:?} does not match scan type {:?}",
                operand.value_type(),
                value_type
            )))
        }
        Some(operand) => {
            if is_bytes && operand.size() == 0 {
                return Err(MemoryError::InvalidConstraint(
                    "byte-array operand must not be empty".to_string(),
                ));
            }
            Ok(())
        }
        None => Ok(()),
    }
}

/// Alignment stride between successive scanned elements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryAlignment {
    One,
    Two,
    Four,
    Eight,
}

impl MemoryAlignment {
    /// The stride in bytes
    pub const fn as_usize(&self) -> usize {
        match self {
            MemoryAlignment::One => 1,
            MemoryAlignment::Two => 2,
            MemoryAlignment::Four => 4,
            MemoryAlignment::Eight => 8,
        }
    }

    /// The natural alignment for a value type: its size, clamped to 8
    pub fn for_type(value_type: ValueType) -> Self {
        match value_type.default_alignment() {
            1 => MemoryAlignment::One,
            2 => MemoryAlignment::Two,
            4 => MemoryAlignment::Four,
            _ => MemoryAlignment::Eight,
        }
    }
}

/// A validated constraint tree plus the scan parameters it applies under
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanConstraints {
    value_type: ValueType,
    alignment: MemoryAlignment,
    floating_point_tolerance: f64,
    root: Constraint,
}

impl ScanConstraints {
    /// Wraps a constraint tree with type-appropriate defaults
    pub fn new(value_type: ValueType, root: Constraint) -> Self {
        let floating_point_tolerance = match value_type.to_little_endian() {
            ValueType::F32 => DEFAULT_F32_TOLERANCE,
            ValueType::F64 => DEFAULT_F64_TOLERANCE,
            _ => 0.0,
        };
        ScanConstraints {
            value_type,
            alignment: MemoryAlignment::for_type(value_type),
            floating_point_tolerance,
            root,
        }
    }

    /// Overrides the alignment stride
    pub fn with_alignment(mut self, alignment: MemoryAlignment) -> Self {
        self.alignment = alignment;
        self
    }

    /// Overrides the float equality tolerance
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.floating_point_tolerance = tolerance;
        self
    }

    /// The scannable type this tree applies to
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// The alignment stride
    pub fn alignment(&self) -> MemoryAlignment {
        self.alignment
    }

    /// The float equality tolerance
    pub fn floating_point_tolerance(&self) -> f64 {
        self.floating_point_tolerance
    }

    /// The root of the constraint tree
    pub fn root(&self) -> &Constraint {
        &self.root
    }

    /// Checks if any leaf needs previous values
    pub fn is_relative(&self) -> bool {
        self.root.has_relative_constraint()
    }

    /// Decoded element size in bytes
    ///
    /// For fixed-size primitives this is the type's size; for byte arrays
    /// it is the (validated, uniform) operand pattern length.
    pub fn element_size(&self) -> MemoryResult<usize> {
        match self.value_type.size() {
            Some(size) => Ok(size),
            None => first_operand_size(&self.root).ok_or_else(|| {
                MemoryError::InvalidConstraint(
                    "byte-array scan has no pattern operand".to_string(),
                )
            }),
        }
    }

    /// Validates the tree, operands, and alignment combination
    pub fn validate(&self) -> MemoryResult<()> {
        self.root.validate(self.value_type)?;

        if self.value_type == ValueType::Bytes {
            // All pattern operands must agree on length so one window size
            // covers the whole tree.
            let size = self.element_size()?;
            if !operand_sizes_match(&self.root, size) {
                return Err(MemoryError::InvalidConstraint(
                    "byte-array operands must all have the same length".to_string(),
                ));
            }
        }

        if self.floating_point_tolerance < 0.0 {
            return Err(MemoryError::InvalidConstraint(
                "floating point tolerance must be non-negative".to_string(),
            ));
        }

        Ok(())
    }
}

fn first_operand_size(constraint: &Constraint) -> Option<usize> {
    match constraint {
        Constraint::Scan(leaf) => leaf.operand.as_ref().map(MemoryValue::size),
        Constraint::Operation(op) => {
            first_operand_size(&op.left).or_else(|| first_operand_size(&op.right))
        }
    }
}

fn operand_sizes_match(constraint: &Constraint, size: usize) -> bool {
    match constraint {
        Constraint::Scan(leaf) => leaf
            .operand
            .as_ref()
            .map(|operand| operand.size() == size)
            .unwrap_or(true),
        Constraint::Operation(op) => {
            operand_sizes_match(&op.left, size) && operand_sizes_match(&op.right, size)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::BytePattern;

    #[test]
    fn test_kind_classification() {
        assert!(ConstraintKind::Changed.is_relative());
        assert!(ConstraintKind::IncreasedByX.is_relative());
        assert!(!ConstraintKind::Equal.is_relative());

        assert!(ConstraintKind::Equal.requires_operand());
        assert!(ConstraintKind::IncreasedByX.requires_operand());
        assert!(!ConstraintKind::Changed.requires_operand());

        assert!(ConstraintKind::Equal.valid_for_byte_array());
        assert!(!ConstraintKind::GreaterThan.valid_for_byte_array());
    }

    #[test]
    fn test_valid_absolute_constraint() {
        let constraints = ScanConstraints::new(
            ValueType::U32,
            Constraint::scan_with(ConstraintKind::Equal, MemoryValue::U32(42)),
        );
        assert!(constraints.validate().is_ok());
        assert!(!constraints.is_relative());
        assert_eq!(constraints.element_size().unwrap(), 4);
        assert_eq!(constraints.alignment().as_usize(), 4);
    }

    #[test]
    fn test_missing_operand_rejected() {
        let constraints =
            ScanConstraints::new(ValueType::U32, Constraint::scan(ConstraintKind::Equal));
        assert!(constraints.validate().is_err());
    }

    #[test]
    fn test_unexpected_operand_rejected() {
        let constraints = ScanConstraints::new(
            ValueType::U32,
            Constraint::scan_with(ConstraintKind::Changed, MemoryValue::U32(1)),
        );
        assert!(constraints.validate().is_err());
    }

    #[test]
    fn test_operand_type_mismatch_rejected() {
        let constraints = ScanConstraints::new(
            ValueType::U32,
            Constraint::scan_with(ConstraintKind::Equal, MemoryValue::I32(42)),
        );
        assert!(constraints.validate().is_err());
    }

    #[test]
    fn test_big_endian_operand_uses_little_endian_value() {
        let constraints = ScanConstraints::new(
            ValueType::U32Be,
            Constraint::scan_with(ConstraintKind::Equal, MemoryValue::U32(42)),
        );
        assert!(constraints.validate().is_ok());
    }

    #[test]
    fn test_relative_tree_detection() {
        let tree = Constraint::and(
            Constraint::scan_with(ConstraintKind::GreaterThan, MemoryValue::U32(5)),
            Constraint::scan(ConstraintKind::Changed),
        );
        let constraints = ScanConstraints::new(ValueType::U32, tree);
        assert!(constraints.validate().is_ok());
        assert!(constraints.is_relative());
    }

    #[test]
    fn test_byte_array_kind_restrictions() {
        let pattern = MemoryValue::Bytes(BytePattern::from_hex_string("DE AD ?? EF").unwrap());

        let valid = ScanConstraints::new(
            ValueType::Bytes,
            Constraint::scan_with(ConstraintKind::Equal, pattern.clone()),
        );
        assert!(valid.validate().is_ok());
        assert_eq!(valid.element_size().unwrap(), 4);
        assert_eq!(valid.alignment().as_usize(), 1);

        let invalid = ScanConstraints::new(
            ValueType::Bytes,
            Constraint::scan_with(ConstraintKind::GreaterThan, pattern),
        );
        assert!(invalid.validate().is_err());
    }

    #[test]
    fn test_byte_array_changed_needs_length_carrier() {
        let constraints =
            ScanConstraints::new(ValueType::Bytes, Constraint::scan(ConstraintKind::Changed));
        assert!(constraints.validate().is_err());

        let sized = ScanConstraints::new(
            ValueType::Bytes,
            Constraint::scan_with(
                ConstraintKind::Changed,
                MemoryValue::Bytes(BytePattern::from_hex_string("?? ?? ?? ??").unwrap()),
            ),
        );
        assert!(sized.validate().is_ok());
        assert_eq!(sized.element_size().unwrap(), 4);
    }

    #[test]
    fn test_byte_array_operand_lengths_must_agree() {
        let tree = Constraint::or(
            Constraint::scan_with(
                ConstraintKind::Equal,
                MemoryValue::Bytes(BytePattern::from_hex_string("DE AD").unwrap()),
            ),
            Constraint::scan_with(
                ConstraintKind::Equal,
                MemoryValue::Bytes(BytePattern::from_hex_string("DE AD BE").unwrap()),
            ),
        );
        let constraints = ScanConstraints::new(ValueType::Bytes, tree);
        assert!(constraints.validate().is_err());
    }

    #[test]
    fn test_tolerance_defaults() {
        let f32_scan = ScanConstraints::new(
            ValueType::F32,
            Constraint::scan_with(ConstraintKind::Equal, MemoryValue::F32(1.0)),
        );
        assert_eq!(f32_scan.floating_point_tolerance(), DEFAULT_F32_TOLERANCE);

        let f64_scan = ScanConstraints::new(
            ValueType::F64Be,
            Constraint::scan_with(ConstraintKind::Equal, MemoryValue::F64(1.0)),
        );
        assert_eq!(f64_scan.floating_point_tolerance(), DEFAULT_F64_TOLERANCE);

        let int_scan = ScanConstraints::new(
            ValueType::U32,
            Constraint::scan_with(ConstraintKind::Equal, MemoryValue::U32(1)),
        );
        assert_eq!(int_scan.floating_point_tolerance(), 0.0);
    }

    #[test]
    fn test_serde_round_trip() {
        let tree = Constraint::xor(
            Constraint::scan_with(ConstraintKind::LessThan, MemoryValue::I16(-3)),
            Constraint::scan(ConstraintKind::Increased),
        );
        let constraints = ScanConstraints::new(ValueType::I16, tree);
        let json = serde_json::to_string(&constraints).unwrap();
        let back: ScanConstraints = serde_json::from_str(&json).unwrap();
        assert_eq!(constraints, back);
    }
}
