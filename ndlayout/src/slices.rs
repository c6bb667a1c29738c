/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

use std::fmt;

use itertools::izip;
use serde::Deserialize;
use serde::Serialize;

use crate::extent::Extents;
use crate::mapping::LayoutError;

/// A per-dimension slicing instruction.
///
/// Slicing an `n`-dimensional view takes one `DimSlice` per source
/// dimension. Each specifier either keeps the dimension whole, keeps a
/// sub-range of it, or collapses it to a scalar:
///
/// - [`Full`](DimSlice::Full) keeps the dimension unchanged.
/// - [`Index(i)`](DimSlice::Index) collapses the dimension; it
///   contributes no destination dimension.
/// - [`Range { start, end }`](DimSlice::Range) keeps the dimension
///   with new size `end - start` (half-open, step 1; stepped ranges
///   are not expressible).
///
/// Specifiers convert from native Rust ranges, so slicing reads the
/// way indexing does:
///
/// ```
/// use ndlayout::DimSlice;
/// use ndlayout::slices;
///
/// let specs = slices![.., 3, 1..4];
/// assert_eq!(
///     specs,
///     vec![
///         DimSlice::Full,
///         DimSlice::Index(3),
///         DimSlice::Range { start: 1, end: 4 },
///     ]
/// );
/// ```
#[derive(Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize, Debug)]
pub enum DimSlice {
    /// Keep the whole dimension.
    Full,
    /// Collapse the dimension to the element at this index.
    Index(usize),
    /// Keep the half-open sub-range `start..end`.
    Range { start: usize, end: usize },
}

impl DimSlice {
    /// The first source index selected by this specifier: 0 for
    /// `Full`, the scalar for `Index`, the start bound for `Range`.
    ///
    /// Evaluating the source mapping at the first index of every
    /// specifier yields the linear offset of the sliced view's origin.
    pub fn first_index(&self) -> usize {
        match self {
            DimSlice::Full => 0,
            DimSlice::Index(index) => *index,
            DimSlice::Range { start, .. } => *start,
        }
    }

    /// Whether this specifier contributes a destination dimension.
    /// Only `Index` collapses its dimension away.
    pub fn keeps_dimension(&self) -> bool {
        !matches!(self, DimSlice::Index(_))
    }
}

impl From<usize> for DimSlice {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl From<std::ops::RangeFull> for DimSlice {
    fn from(_: std::ops::RangeFull) -> Self {
        Self::Full
    }
}

impl From<std::ops::Range<usize>> for DimSlice {
    fn from(r: std::ops::Range<usize>) -> Self {
        Self::Range {
            start: r.start,
            end: r.end,
        }
    }
}

impl From<std::ops::RangeInclusive<usize>> for DimSlice {
    fn from(r: std::ops::RangeInclusive<usize>) -> Self {
        Self::Range {
            start: *r.start(),
            end: *r.end() + 1,
        }
    }
}

impl From<std::ops::RangeTo<usize>> for DimSlice {
    fn from(r: std::ops::RangeTo<usize>) -> Self {
        Self::Range {
            start: 0,
            end: r.end,
        }
    }
}

impl fmt::Display for DimSlice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DimSlice::Full => write!(f, ".."),
            DimSlice::Index(index) => write!(f, "{}", index),
            DimSlice::Range { start, end } => write!(f, "{}..{}", start, end),
        }
    }
}

/// Construct a `Vec<DimSlice>` from anything convertible into
/// specifiers: `..` for a full dimension, an integer for a scalar
/// collapse, a native range for a sub-range.
///
/// ```
/// use ndlayout::slices;
///
/// let specs = slices![.., 2, 0..3];
/// assert_eq!(specs.len(), 3);
/// ```
#[macro_export]
macro_rules! slices {
    ( $( $spec:expr ),* $(,)? ) => {
        vec![ $( $crate::DimSlice::from($spec) ),* ]
    };
}

/// Compute the destination extents produced by applying `specs` to
/// `src`, validating the specifiers against the source extents.
///
/// This is the single validation gate for slicing: one specifier per
/// source dimension, every `Index` within its dimension's size, every
/// `Range` well-ordered and within bounds. Downstream mapping
/// derivation assumes inputs that passed here.
///
/// The result has one dimension per non-`Index` specifier, in
/// surviving order: the source size for `Full`, `end - start` for
/// `Range`. Zero-length ranges are legal and produce a zero-size
/// dimension.
///
/// # Errors
///
/// - [`LayoutError::InvalidDims`] if `specs.len() != src.rank()`
/// - [`LayoutError::IndexOutOfRange`] for an `Index` not below the
///   dimension size
/// - [`LayoutError::InvertedRange`] for a `Range` with `end < start`
/// - [`LayoutError::RangeOutOfRange`] for a `Range` with
///   `end > size`
pub fn sliced_extents(src: &Extents, specs: &[DimSlice]) -> Result<Extents, LayoutError> {
    if specs.len() != src.rank() {
        return Err(LayoutError::InvalidDims {
            expected: src.rank(),
            got: specs.len(),
        });
    }

    let mut sizes = Vec::with_capacity(specs.iter().filter(|s| s.keeps_dimension()).count());
    for (dim, spec, &size) in izip!(0.., specs, src.sizes()) {
        match *spec {
            DimSlice::Full => sizes.push(size),
            DimSlice::Index(index) => {
                if index >= size {
                    return Err(LayoutError::IndexOutOfRange { index, dim, size });
                }
            }
            DimSlice::Range { start, end } => {
                if end < start {
                    return Err(LayoutError::InvertedRange { start, end });
                }
                if end > size {
                    return Err(LayoutError::RangeOutOfRange {
                        start,
                        end,
                        dim,
                        size,
                    });
                }
                sizes.push(end - start);
            }
        }
    }

    Ok(Extents::new(sizes))
}
