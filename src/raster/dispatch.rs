//! Fork-join execution of row bands.
//!
//! The backing array is split into disjoint mutable row ranges up front,
//! so workers never share a byte. Every band runs to completion even when
//! another panics; failures are collected and reported together once all
//! bands are done.

use std::any::Any;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};

use rayon::prelude::*;
use thiserror::Error;

/// Why one band of a dispatch failed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SliceFailure {
    pub slice: usize,
    pub message: String,
}

impl fmt::Display for SliceFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "slice {} panicked: {}", self.slice, self.message)
    }
}

/// All band failures of one dispatch. `primary` is the failure with the
/// lowest slice index; the rest are kept in `suppressed`, in slice order.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("shader dispatch failed: {primary} ({} more suppressed)", .suppressed.len())]
pub struct DispatchError {
    pub primary: SliceFailure,
    pub suppressed: Vec<SliceFailure>,
}

impl DispatchError {
    /// Build from unordered failures; `None` if there were none.
    pub fn from_failures(mut failures: Vec<SliceFailure>) -> Option<Self> {
        if failures.is_empty() {
            return None;
        }
        failures.sort_by_key(|failure| failure.slice);
        let primary = failures.remove(0);
        Some(Self {
            primary,
            suppressed: failures,
        })
    }

    /// Every failure, primary first.
    pub fn failures(&self) -> impl Iterator<Item = &SliceFailure> {
        std::iter::once(&self.primary).chain(self.suppressed.iter())
    }
}

/// Rows `[min_y, max_y)` of the backing array, owned by one worker.
pub(crate) struct Band<'a> {
    pub slice: usize,
    pub min_y: i32,
    pub max_y: i32,
    /// Byte offset of `bytes` in the backing array.
    pub start: usize,
    pub bytes: &'a mut [u8],
}

/// Carve `pixels` into one band per non-empty row range. `ranges` must be
/// sorted and non-overlapping, as produced by the slicing helpers.
pub(crate) fn split_bands<'a>(pixels: &'a mut [u8], stride: usize, ranges: &[(i32, i32)]) -> Vec<Band<'a>> {
    let mut bands = Vec::with_capacity(ranges.len());
    let mut rest = pixels;
    let mut consumed = 0usize;
    for (slice, &(min_y, max_y)) in ranges.iter().enumerate() {
        if max_y <= min_y {
            continue;
        }
        let start = min_y as usize * stride;
        let end = max_y as usize * stride;
        debug_assert!(start >= consumed, "row ranges overlap");
        let (_, tail) = std::mem::take(&mut rest).split_at_mut(start - consumed);
        let (bytes, tail) = tail.split_at_mut(end - start);
        rest = tail;
        consumed = end;
        bands.push(Band {
            slice,
            min_y,
            max_y,
            start,
            bytes,
        });
    }
    bands
}

/// Run `work` on every band in parallel and block until all are done.
pub(crate) fn run_bands<F>(bands: Vec<Band<'_>>, work: F) -> Result<(), DispatchError>
where
    F: Fn(Band<'_>) + Sync,
{
    let failures: Vec<SliceFailure> = bands
        .into_par_iter()
        .filter_map(|band| {
            let slice = band.slice;
            catch_unwind(AssertUnwindSafe(|| work(band)))
                .err()
                .map(|payload| SliceFailure {
                    slice,
                    message: panic_message(payload.as_ref()),
                })
        })
        .collect();

    match DispatchError::from_failures(failures) {
        None => Ok(()),
        Some(error) => {
            log::warn!("{error}");
            Err(error)
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
