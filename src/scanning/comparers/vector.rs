//! Vector constraint compilation: one 16-lane mask per chunk
//!
//! The compiled closure compares every element lane of a 16-byte window in
//! one invocation and returns a [`BoolMask16`] with the matching elements'
//! bytes set. Combinators short-circuit at vector granularity: an all-false
//! left mask skips the right side of an AND entirely, an all-true left mask
//! skips the right side of an OR.

use crate::core::types::{MemoryError, MemoryResult, ValueType};
use crate::core::VECTOR_WIDTH;
use crate::scanning::constraints::{
    Constraint, ConstraintKind, ConstraintOperator, ScanConstraint, ScanConstraints,
};
use crate::scanning::mask::BoolMask16;
use crate::scanning::primitives::{dispatch_primitive, ScannablePrimitive};

/// Compiled vector comparer: `(current_window, previous_window) -> lane mask`
pub type VectorComparer =
    Box<dyn Fn(&[u8; VECTOR_WIDTH], &[u8; VECTOR_WIDTH]) -> BoolMask16 + Send + Sync>;

/// Compiles a constraint tree into a single vector closure
///
/// `stride` is the byte distance between consecutive lanes; it must be at
/// least the element size and divide the vector width. Fast and staggered
/// strategies compare at the element size, sparse strategies at the
/// (larger) alignment.
pub fn compile_vector(
    constraints: &ScanConstraints,
    stride: usize,
) -> MemoryResult<VectorComparer> {
    let element_size = constraints.element_size()?;
    if stride < element_size || stride == 0 || VECTOR_WIDTH % stride != 0 {
        return Err(MemoryError::UnsupportedConstraint(format!(
            "lane stride {} is invalid for {}-byte elements",
            stride, element_size
        )));
    }
    compile_node(
        constraints.root(),
        constraints.value_type(),
        constraints.floating_point_tolerance(),
        stride,
    )
}

fn compile_node(
    node: &Constraint,
    value_type: ValueType,
    tolerance: f64,
    stride: usize,
) -> MemoryResult<VectorComparer> {
    match node {
        Constraint::Scan(leaf) => compile_leaf(leaf, value_type, tolerance, stride),
        Constraint::Operation(op) => {
            let left = compile_node(&op.left, value_type, tolerance, stride)?;
            let right = compile_node(&op.right, value_type, tolerance, stride)?;
            Ok(match op.operator {
                ConstraintOperator::And => Box::new(move |current, previous| {
                    let left_mask = left(current, previous);
                    if left_mask.all_false() {
                        return left_mask;
                    }
                    left_mask & right(current, previous)
                }),
                ConstraintOperator::Or => Box::new(move |current, previous| {
                    let left_mask = left(current, previous);
                    if left_mask.all_true() {
                        return left_mask;
                    }
                    left_mask | right(current, previous)
                }),
                // XOR evaluates both sides unconditionally.
                ConstraintOperator::Xor => Box::new(move |current, previous| {
                    left(current, previous) ^ right(current, previous)
                }),
            })
        }
    }
}

fn compile_leaf(
    leaf: &ScanConstraint,
    value_type: ValueType,
    tolerance: f64,
    stride: usize,
) -> MemoryResult<VectorComparer> {
    dispatch_primitive!(value_type, T, big_endian => {
        compile_primitive_leaf::<T>(leaf, big_endian, tolerance, stride)
    }, _ => Err(MemoryError::UnsupportedConstraint(
        "byte arrays have no vector comparer; use the byte-pattern scanner".to_string(),
    )))
}

/// Evaluates `test` at each lane start, marking the element's bytes on success
#[inline]
fn compare_lanes(
    stride: usize,
    element_size: usize,
    mut test: impl FnMut(usize) -> bool,
) -> BoolMask16 {
    let mut mask = BoolMask16::NONE;
    let mut offset = 0;
    while offset + element_size <= VECTOR_WIDTH {
        if test(offset) {
            mask.set_block(offset, element_size);
        }
        offset += stride;
    }
    mask
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
    stride: usize,
) -> MemoryResult<VectorComparer> {
    let read: fn(&[u8]) -> T = if big_endian { T::read_be } else { T::read_le };
    let size = T::SIZE;

    Ok(match leaf.kind {
        ConstraintKind::Equal => {
            let target: T = operand_as(leaf)?;
            Box::new(move |current, _| {
                compare_lanes(stride, size, |offset| {
                    read(&current[offset..]).values_equal(target, tolerance)
                })
            })
        }
        ConstraintKind::NotEqual => {
            let target: T = operand_as(leaf)?;
            Box::new(move |current, _| {
                compare_lanes(stride, size, |offset| {
                    !read(&current[offset..]).values_equal(target, tolerance)
                })
            })
        }
        ConstraintKind::GreaterThan => {
            let target: T = operand_as(leaf)?;
            Box::new(move |current, _| {
                compare_lanes(stride, size, |offset| read(&current[offset..]) > target)
            })
        }
        ConstraintKind::GreaterThanOrEqual => {
            let target: T = operand_as(leaf)?;
            Box::new(move |current, _| {
                compare_lanes(stride, size, |offset| read(&current[offset..]) >= target)
            })
        }
        ConstraintKind::LessThan => {
            let target: T = operand_as(leaf)?;
            Box::new(move |current, _| {
                compare_lanes(stride, size, |offset| read(&current[offset..]) < target)
            })
        }
        ConstraintKind::LessThanOrEqual => {
            let target: T = operand_as(leaf)?;
            Box::new(move |current, _| {
                compare_lanes(stride, size, |offset| read(&current[offset..]) <= target)
            })
        }
        ConstraintKind::Unchanged => Box::new(move |current, previous| {
            compare_lanes(stride, size, |offset| {
                read(&current[offset..]).values_equal(read(&previous[offset..]), tolerance)
            })
        }),
        ConstraintKind::Changed => Box::new(move |current, previous| {
            compare_lanes(stride, size, |offset| {
                !read(&current[offset..]).values_equal(read(&previous[offset..]), tolerance)
            })
        }),
        ConstraintKind::Increased => Box::new(move |current, previous| {
            compare_lanes(stride, size, |offset| {
                read(&current[offset..]) > read(&previous[offset..])
            })
        }),
        ConstraintKind::Decreased => Box::new(move |current, previous| {
            compare_lanes(stride, size, |offset| {
                read(&current[offset..]) < read(&previous[offset..])
            })
        }),
        ConstraintKind::IncreasedByX => {
            let delta: T = operand_as(leaf)?;
            Box::new(move |current, previous| {
                compare_lanes(stride, size, |offset| {
                    read(&current[offset..])
                        .values_equal(read(&previous[offset..]).offset_by(delta), tolerance)
                })
            })
        }
        ConstraintKind::DecreasedByX => {
            let delta: T = operand_as(leaf)?;
            Box::new(move |current, previous| {
                compare_lanes(stride, size, |offset| {
                    read(&current[offset..])
                        .values_equal(read(&previous[offset..]).offset_back(delta), tolerance)
                })
            })
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::MemoryValue;

    const ZERO: [u8; VECTOR_WIDTH] = [0u8; VECTOR_WIDTH];

    fn compile(constraints: &ScanConstraints, stride: usize) -> VectorComparer {
        constraints.validate().unwrap();
        compile_vector(constraints, stride).unwrap()
    }

    #[test]
    fn test_equal_marks_matching_lanes() {
        let comparer = compile(
            &ScanConstraints::new(
                ValueType::U16,
                Constraint::scan_with(ConstraintKind::Equal, MemoryValue::U16(10)),
            ),
            2,
        );
        // Lanes: 10, 20, 10, 20, 10, 20, 10, 20.
        let mut window = [0u8; VECTOR_WIDTH];
        for lane in 0..8 {
            let value: u16 = if lane % 2 == 0 { 10 } else { 20 };
            window[lane * 2..lane * 2 + 2].copy_from_slice(&value.to_le_bytes());
        }
        let mask = comparer(&window, &ZERO);
        for lane in 0..8 {
            let expected = lane % 2 == 0;
            assert_eq!(mask.byte(lane * 2), expected, "lane {}", lane);
            assert_eq!(mask.byte(lane * 2 + 1), expected, "lane {} high byte", lane);
        }
    }

    #[test]
    fn test_all_true_and_all_false() {
        let comparer = compile(
            &ScanConstraints::new(
                ValueType::U32,
                Constraint::scan_with(ConstraintKind::Equal, MemoryValue::U32(0)),
            ),
            4,
        );
        assert!(comparer(&ZERO, &ZERO).all_true());

        let ones = [0xFFu8; VECTOR_WIDTH];
        assert!(comparer(&ones, &ZERO).all_false());
    }

    #[test]
    fn test_sparse_stride_marks_element_bytes_only() {
        // 1-byte elements at 4-byte lane stride.
        let comparer = compile(
            &ScanConstraints::new(
                ValueType::U8,
                Constraint::scan_with(ConstraintKind::Equal, MemoryValue::U8(7)),
            ),
            4,
        );
        let mut window = [0u8; VECTOR_WIDTH];
        window[0] = 7;
        window[8] = 7;
        // A 7 at a non-lane byte is not consulted.
        window[5] = 7;
        let mask = comparer(&window, &ZERO);
        assert!(mask.byte(0));
        assert!(!mask.byte(4));
        assert!(mask.byte(8));
        assert!(!mask.byte(12));
        assert!(!mask.byte(5));
    }

    #[test]
    fn test_relative_vector_compare() {
        let comparer = compile(
            &ScanConstraints::new(ValueType::U32, Constraint::scan(ConstraintKind::Increased)),
            4,
        );
        let mut current = [0u8; VECTOR_WIDTH];
        let mut previous = [0u8; VECTOR_WIDTH];
        for lane in 0..4 {
            let prev = 100u32;
            let cur = if lane % 2 == 0 { 150u32 } else { 50u32 };
            current[lane * 4..lane * 4 + 4].copy_from_slice(&cur.to_le_bytes());
            previous[lane * 4..lane * 4 + 4].copy_from_slice(&prev.to_le_bytes());
        }
        let mask = comparer(&current, &previous);
        assert!(mask.byte(0));
        assert!(!mask.byte(4));
        assert!(mask.byte(8));
        assert!(!mask.byte(12));
    }

    #[test]
    fn test_operation_short_circuit_semantics() {
        // (Equal 0) AND (Equal 0) over an all-zero window is all-true.
        let both = ScanConstraints::new(
            ValueType::U32,
            Constraint::and(
                Constraint::scan_with(ConstraintKind::Equal, MemoryValue::U32(0)),
                Constraint::scan_with(ConstraintKind::NotEqual, MemoryValue::U32(1)),
            ),
        );
        let comparer = compile(&both, 4);
        assert!(comparer(&ZERO, &ZERO).all_true());

        // XOR of two identical predicates is always all-false.
        let never = ScanConstraints::new(
            ValueType::U32,
            Constraint::xor(
                Constraint::scan_with(ConstraintKind::Equal, MemoryValue::U32(0)),
                Constraint::scan_with(ConstraintKind::Equal, MemoryValue::U32(0)),
            ),
        );
        let comparer = compile(&never, 4);
        assert!(comparer(&ZERO, &ZERO).all_false());
    }

    #[test]
    fn test_invalid_stride_rejected() {
        let constraints = ScanConstraints::new(
            ValueType::U32,
            Constraint::scan_with(ConstraintKind::Equal, MemoryValue::U32(0)),
        );
        assert!(compile_vector(&constraints, 2).is_err());
        assert!(compile_vector(&constraints, 5).is_err());
    }

    #[test]
    fn test_bytes_has_no_vector_form() {
        use crate::core::types::BytePattern;
        let constraints = ScanConstraints::new(
            ValueType::Bytes,
            Constraint::scan_with(
                ConstraintKind::Equal,
                MemoryValue::Bytes(BytePattern::from_hex_string("DE AD").unwrap()),
            ),
        );
        assert!(compile_vector(&constraints, 1).is_err());
    }
}
