//! Conformance checks: replay identical inputs through two implementations of
//! the same contract and compare every output field at every index.
//!
//! Two outputs agree when both are NaN, or when they differ by at most
//! `tolerance * max(1, |reference|)`.

use crate::access::ValueAccess;
use crate::indicator::{FlatOutput, StreamingIndicator};
use thiserror::Error;

/// First point where two output series disagree.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("index {index}, field '{field}': streaming {streaming} vs reference {reference}")]
pub struct Divergence {
    pub index: usize,
    pub field: &'static str,
    pub streaming: f64,
    pub reference: f64,
}

fn agrees(a: f64, b: f64, tolerance: f64) -> bool {
    if a.is_nan() || b.is_nan() {
        return a.is_nan() && b.is_nan();
    }
    (a - b).abs() <= tolerance * b.abs().max(1.0)
}

/// Compare two output series field by field.
pub fn first_divergence<T: FlatOutput>(
    streaming: &[T],
    reference: &[T],
    tolerance: f64,
) -> Option<Divergence> {
    for (index, (s, r)) in streaming.iter().zip(reference).enumerate() {
        for ((field, a), (_, b)) in s.fields().into_iter().zip(r.fields()) {
            if !agrees(a, b, tolerance) {
                return Some(Divergence {
                    index,
                    field,
                    streaming: a,
                    reference: b,
                });
            }
        }
    }
    None
}

/// Clear `indicator`, replay `records` bar by bar, and assert every output
/// matches `reference` within `tolerance`.
///
/// # Panics
/// On length mismatch, indicator error, or divergence.
pub fn assert_conformance<I, B>(indicator: &mut I, records: &[B], reference: &[I::Output], tolerance: f64)
where
    I: StreamingIndicator,
    B: ValueAccess,
{
    assert_eq!(
        records.len(),
        reference.len(),
        "{}: reference length differs from input length",
        indicator.name()
    );
    indicator.clear();
    let mut streaming = Vec::with_capacity(records.len());
    for (i, record) in records.iter().enumerate() {
        match indicator.on_bar(record) {
            Ok(out) => streaming.push(out),
            Err(e) => panic!("{}: on_bar failed at index {i}: {e}", indicator.name()),
        }
    }
    if let Some(d) = first_divergence(&streaming, reference, tolerance) {
        panic!("{} diverges from reference at {d}", indicator.name());
    }
}

/// Assert that sequential `on_bar` calls and one `on_bar_batch` call over
/// `records` produce bit-identical outputs and the same readiness at every
/// index. Both instances come from `make`.
///
/// # Panics
/// On indicator error or any difference.
pub fn assert_batch_equivalence<I, B, F>(make: F, records: &[B])
where
    I: StreamingIndicator,
    B: ValueAccess,
    F: Fn() -> I,
{
    let mut sequential = make();
    let mut batched = make();
    let mut outputs = vec![I::Output::warming(); records.len()];
    if let Err(e) = batched.on_bar_batch(records, Some(&mut outputs[..])) {
        panic!("{}: on_bar_batch failed: {e}", batched.name());
    }

    for (i, record) in records.iter().enumerate() {
        let out = match sequential.on_bar(record) {
            Ok(out) => out,
            Err(e) => panic!("{}: on_bar failed at index {i}: {e}", sequential.name()),
        };
        let ready_in_batch = i + 1 >= batched.lookback();
        assert_eq!(
            sequential.is_ready(),
            ready_in_batch,
            "{}: readiness differs at index {i}",
            sequential.name()
        );
        for ((field, a), (_, b)) in out.fields().into_iter().zip(outputs[i].fields()) {
            assert!(
                a.to_bits() == b.to_bits() || (a.is_nan() && b.is_nan()),
                "{}: field '{field}' differs at index {i}: {a} vs {b}",
                sequential.name()
            );
        }
    }
    assert_eq!(sequential.bars_seen(), batched.bars_seen());
    assert_eq!(sequential.is_ready(), batched.is_ready());
}
