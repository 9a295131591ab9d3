//! Scalar constraint compilation: one boolean per element
//!
//! The compiled closure receives the current and previous buffers sliced
//! from the element's first byte to the end of the group buffer. Closures
//! for absolute constraints never touch the previous slice, so callers may
//! pass an empty slice when no previous values exist (the dispatcher has
//! already rejected relative scans in that case).

use super::pattern::CompiledPattern;
use crate::core::types::{MemoryError, MemoryResult, MemoryValue, ValueType};
use crate::scanning::constraints::{
    Constraint, ConstraintKind, ConstraintOperator, ScanConstraint, ScanConstraints,
};
use crate::scanning::primitives::{dispatch_primitive, ScannablePrimitive};

/// Compiled scalar comparer: `(current, previous) -> matched`
pub type ScalarComparer = Box<dyn Fn(&[u8], &[u8]) -> bool + Send + Sync>;

/// Compiles a constraint tree into a single scalar closure
pub fn compile_scalar(constraints: &ScanConstraints) -> MemoryResult<ScalarComparer> {
    compile_node(
        constraints.root(),
        constraints.value_type(),
        constraints.floating_point_tolerance(),
    )
}

fn compile_node(
    node: &Constraint,
    value_type: ValueType,
    tolerance: f64,
) -> MemoryResult<ScalarComparer> {
    match node {
        Constraint::Scan(leaf) => compile_leaf(leaf, value_type, tolerance),
        Constraint::Operation(op) => {
            let left = compile_node(&op.left, value_type, tolerance)?;
            let right = compile_node(&op.right, value_type, tolerance)?;
            Ok(match op.operator {
                // && and || short-circuit the right comparand per element.
                ConstraintOperator::And => {
                    Box::new(move |current, previous| {
                        left(current, previous) && right(current, previous)
                    })
                }
                ConstraintOperator::Or => {
                    Box::new(move |current, previous| {
                        left(current, previous) || right(current, previous)
                    })
                }
                // XOR always evaluates both sides.
                ConstraintOperator::Xor => {
                    Box::new(move |current, previous| {
                        left(current, previous) ^ right(current, previous)
                    })
                }
            })
        }
    }
}

fn compile_leaf(
    leaf: &ScanConstraint,
    value_type: ValueType,
    tolerance: f64,
) -> MemoryResult<ScalarComparer> {
    dispatch_primitive!(value_type, T, big_endian => {
        compile_primitive_leaf::<T>(leaf, big_endian, tolerance)
    }, _ => compile_byte_array_leaf(leaf))
}

fn operand_as<T: ScannablePrimitive>(leaf: &ScanConstraint) -> MemoryResult<T> {
    leaf.operand
        .as_ref()
        .and_then(T::from_operand)
        .ok_or_else(|| {
            MemoryError::UnsupportedConstraint(format!(
                "{:?} is missing a usable operand",
                leaf.kind
            ))
        })
}

fn compile_primitive_leaf<T: ScannablePrimitive>(
    leaf: &ScanConstraint,
    big_endian: bool,
    tolerance: f64,
) -> MemoryResult<ScalarComparer> {
    // Byte-order variants differ only in which read function is captured.
    let read: fn(&[u8]) -> T = if big_endian { T::read_be } else { T::read_le };

    Ok(match leaf.kind {
        ConstraintKind::Equal => {
            let target: T = operand_as(leaf)?;
            Box::new(move |current, _| read(current).values_equal(target, tolerance))
        }
        ConstraintKind::NotEqual => {
            let target: T = operand_as(leaf)?;
            Box::new(move |current, _| !read(current).values_equal(target, tolerance))
        }
        ConstraintKind::GreaterThan => {
            let target: T = operand_as(leaf)?;
            Box::new(move |current, _| read(current) > target)
        }
        ConstraintKind::GreaterThanOrEqual => {
            let target: T = operand_as(leaf)?;
            Box::new(move |current, _| read(current) >= target)
        }
        ConstraintKind::LessThan => {
            let target: T = operand_as(leaf)?;
            Box::new(move |current, _| read(current) < target)
        }
        ConstraintKind::LessThanOrEqual => {
            let target: T = operand_as(leaf)?;
            Box::new(move |current, _| read(current) <= target)
        }
        ConstraintKind::Unchanged => {
            Box::new(move |current, previous| {
                read(current).values_equal(read(previous), tolerance)
            })
        }
        ConstraintKind::Changed => {
            Box::new(move |current, previous| {
                !read(current).values_equal(read(previous), tolerance)
            })
        }
        ConstraintKind::Increased => {
            Box::new(move |current, previous| read(current) > read(previous))
        }
        ConstraintKind::Decreased => {
            Box::new(move |current, previous| read(current) < read(previous))
        }
        ConstraintKind::IncreasedByX => {
            let delta: T = operand_as(leaf)?;
            Box::new(move |current, previous| {
                read(current).values_equal(read(previous).offset_by(delta), tolerance)
            })
        }
        ConstraintKind::DecreasedByX => {
            let delta: T = operand_as(leaf)?;
            Box::new(move |current, previous| {
                read(current).values_equal(read(previous).offset_back(delta), tolerance)
            })
        }
    })
}

fn compile_byte_array_leaf(leaf: &ScanConstraint) -> MemoryResult<ScalarComparer> {
    let pattern = match &leaf.operand {
        Some(MemoryValue::Bytes(pattern)) => CompiledPattern::compile(pattern),
        _ => {
            return Err(MemoryError::UnsupportedConstraint(format!(
                "byte-array {:?} requires a pattern operand",
                leaf.kind
            )))
        }
    };

    Ok(match leaf.kind {
        ConstraintKind::Equal => {
            Box::new(move |current, _| pattern.matches_equal(current))
        }
        ConstraintKind::NotEqual => {
            Box::new(move |current, _| pattern.matches_not_equal(current))
        }
        ConstraintKind::Unchanged => {
            Box::new(move |current, previous| pattern.window_unchanged(current, previous))
        }
        ConstraintKind::Changed => {
            Box::new(move |current, previous| !pattern.window_unchanged(current, previous))
        }
        other => {
            return Err(MemoryError::UnsupportedConstraint(format!(
                "{:?} cannot be compiled for byte arrays",
                other
            )))
        }
    })
}
