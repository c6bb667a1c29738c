/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

use serde::Deserialize;
use serde::Serialize;

use crate::extent::Extents;

/// The type of error for layout and slicing operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum LayoutError {
    #[error("invalid dims: expected {expected}, got {got}")]
    InvalidDims { expected: usize, got: usize },

    #[error("index {index} out of range for dimension {dim} of size {size}")]
    IndexOutOfRange {
        index: usize,
        dim: usize,
        size: usize,
    },

    #[error("range {start}..{end} out of range for dimension {dim} of size {size}")]
    RangeOutOfRange {
        start: usize,
        end: usize,
        dim: usize,
        size: usize,
    },

    #[error("inverted range: {start}..{end}")]
    InvertedRange { start: usize, end: usize },

    #[error("stride count {strides} does not match extent count {extents}")]
    StrideCountMismatch { strides: usize, extents: usize },

    #[error("buffer of {len} elements too small for span {span}")]
    BufferTooSmall { len: usize, span: usize },
}

mod sealed {
    // Private trait. Only types in this crate can implement it.
    pub trait Sealed {}
}

/// A memory layout mapping multidimensional coordinates (in `ℕⁿ`) to
/// linear offsets (`ℕ¹`).
///
/// Every mapping is a linear map determined by its per-dimension
/// strides:
///
/// ```text
/// offset_of(x) = dot(strides, x) = ∑ᵢ strideᵢ × xᵢ
/// ```
///
/// where `x` is a coordinate within [`extents`](LayoutMap::extents).
/// The mapping itself carries no base offset; callers that track an
/// origin within a buffer (see [`crate::submap::MappingOffset`] and
/// [`crate::view::ArrayView`]) compose one by addition.
///
/// Implementors differ only in how strides are obtained: contiguous
/// kinds derive them from the extents, while [`StridedMapping`] stores
/// them explicitly.
pub trait LayoutMap: sealed::Sealed {
    /// The shape of the mapping's domain.
    fn extents(&self) -> &Extents;

    /// The stride of dimension `dim`: the linear distance between
    /// consecutive elements along that dimension.
    ///
    /// # Panics
    ///
    /// Panics if `dim >= self.rank()`.
    fn stride(&self, dim: usize) -> usize;

    /// The number of dimensions in the domain of the map.
    fn rank(&self) -> usize {
        self.extents().rank()
    }

    /// All strides, in dimension order.
    fn strides(&self) -> Vec<usize> {
        (0..self.rank()).map(|d| self.stride(d)).collect()
    }

    /// Maps a multidimensional coordinate to a linear offset.
    ///
    /// Only the arity of `coord` is checked here; per-coordinate
    /// bounds are the responsibility of the caller (views check them,
    /// the slicing core validates specifiers up front).
    fn offset_of(&self, coord: &[usize]) -> Result<usize, LayoutError> {
        if coord.len() != self.rank() {
            return Err(LayoutError::InvalidDims {
                expected: self.rank(),
                got: coord.len(),
            });
        }

        // Dot product ∑ᵢ (strideᵢ × coordᵢ)
        Ok(coord
            .iter()
            .enumerate()
            .map(|(d, &i)| i * self.stride(d))
            .sum())
    }

    /// The number of buffer elements this mapping can address: one
    /// past the largest offset it produces, or zero if the extents
    /// span no elements.
    fn required_span(&self) -> usize {
        if self.extents().is_empty() {
            return 0;
        }
        1 + self
            .extents()
            .sizes()
            .iter()
            .enumerate()
            .map(|(d, &size)| (size - 1) * self.stride(d))
            .sum::<usize>()
    }
}

/// A contiguous row-major layout: the last dimension varies fastest.
///
/// Strides are implicit in the extents: `stride(rank-1) = 1` and
/// `stride(d) = extent(d+1) × stride(d+1)`.
#[derive(Clone, Eq, PartialEq, Hash, Serialize, Deserialize, Debug)]
pub struct RowMajorMapping {
    extents: Extents,
}

impl RowMajorMapping {
    /// Create a row-major mapping over the given extents.
    pub fn new(extents: impl Into<Extents>) -> Self {
        Self {
            extents: extents.into(),
        }
    }
}

impl sealed::Sealed for RowMajorMapping {}

impl LayoutMap for RowMajorMapping {
    fn extents(&self) -> &Extents {
        &self.extents
    }

    fn stride(&self, dim: usize) -> usize {
        assert!(dim < self.extents.rank(), "dimension {} out of range", dim);
        self.extents.sizes()[dim + 1..].iter().product()
    }
}

/// A contiguous column-major layout: the first dimension varies
/// fastest.
///
/// Strides are implicit in the extents: `stride(0) = 1` and
/// `stride(d) = extent(d-1) × stride(d-1)`.
#[derive(Clone, Eq, PartialEq, Hash, Serialize, Deserialize, Debug)]
pub struct ColumnMajorMapping {
    extents: Extents,
}

impl ColumnMajorMapping {
    /// Create a column-major mapping over the given extents.
    pub fn new(extents: impl Into<Extents>) -> Self {
        Self {
            extents: extents.into(),
        }
    }
}

impl sealed::Sealed for ColumnMajorMapping {}

impl LayoutMap for ColumnMajorMapping {
    fn extents(&self) -> &Extents {
        &self.extents
    }

    fn stride(&self, dim: usize) -> usize {
        assert!(dim < self.extents.rank(), "dimension {} out of range", dim);
        self.extents.sizes()[..dim].iter().product()
    }
}

/// A fully general layout with explicitly stored per-dimension
/// strides and no contiguity guarantee.
///
/// This is the kind every sliced mapping degrades to when the result
/// is no longer expressible as a contiguous layout.
#[derive(Clone, Eq, PartialEq, Hash, Serialize, Deserialize, Debug)]
pub struct StridedMapping {
    extents: Extents,
    strides: Vec<usize>,
}

impl StridedMapping {
    /// Create a strided mapping from extents and explicit strides.
    /// There must be exactly one stride per dimension.
    pub fn new(
        extents: impl Into<Extents>,
        strides: Vec<usize>,
    ) -> Result<Self, LayoutError> {
        let extents = extents.into();
        if strides.len() != extents.rank() {
            return Err(LayoutError::StrideCountMismatch {
                strides: strides.len(),
                extents: extents.rank(),
            });
        }
        Ok(Self { extents, strides })
    }
}

impl sealed::Sealed for StridedMapping {}

impl LayoutMap for StridedMapping {
    fn extents(&self) -> &Extents {
        &self.extents
    }

    fn stride(&self, dim: usize) -> usize {
        self.strides[dim]
    }

    fn strides(&self) -> Vec<usize> {
        self.strides.clone()
    }
}

/// A layout mapping of any supported kind.
///
/// Slicing a contiguous mapping produces either the same contiguous
/// kind or a strided mapping, a decision made per call. Rust has no
/// type-level conditional to select between the two result types, so
/// derivation returns this tagged union and downstream code matches on
/// the tag rather than relying on type identity.
#[derive(Clone, Eq, PartialEq, Hash, Serialize, Deserialize, Debug)]
pub enum Mapping {
    RowMajor(RowMajorMapping),
    ColumnMajor(ColumnMajorMapping),
    Strided(StridedMapping),
}

impl Mapping {
    /// A row-major mapping over the given extents.
    pub fn row_major(extents: impl Into<Extents>) -> Self {
        Self::RowMajor(RowMajorMapping::new(extents))
    }

    /// A column-major mapping over the given extents.
    pub fn column_major(extents: impl Into<Extents>) -> Self {
        Self::ColumnMajor(ColumnMajorMapping::new(extents))
    }

    /// A strided mapping over the given extents and strides.
    pub fn strided(
        extents: impl Into<Extents>,
        strides: Vec<usize>,
    ) -> Result<Self, LayoutError> {
        Ok(Self::Strided(StridedMapping::new(extents, strides)?))
    }
}

impl From<RowMajorMapping> for Mapping {
    fn from(mapping: RowMajorMapping) -> Self {
        Self::RowMajor(mapping)
    }
}

impl From<ColumnMajorMapping> for Mapping {
    fn from(mapping: ColumnMajorMapping) -> Self {
        Self::ColumnMajor(mapping)
    }
}

impl From<StridedMapping> for Mapping {
    fn from(mapping: StridedMapping) -> Self {
        Self::Strided(mapping)
    }
}

impl sealed::Sealed for Mapping {}

impl LayoutMap for Mapping {
    fn extents(&self) -> &Extents {
        match self {
            Mapping::RowMajor(m) => m.extents(),
            Mapping::ColumnMajor(m) => m.extents(),
            Mapping::Strided(m) => m.extents(),
        }
    }

    fn stride(&self, dim: usize) -> usize {
        match self {
            Mapping::RowMajor(m) => m.stride(dim),
            Mapping::ColumnMajor(m) => m.stride(dim),
            Mapping::Strided(m) => m.stride(dim),
        }
    }

    fn strides(&self) -> Vec<usize> {
        match self {
            Mapping::RowMajor(m) => m.strides(),
            Mapping::ColumnMajor(m) => m.strides(),
            Mapping::Strided(m) => m.strides(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_major_strides() {
        let m = RowMajorMapping::new([3, 4, 5]);
        assert_eq!(m.rank(), 3);
        assert_eq!(m.strides(), vec![20, 5, 1]);
        assert_eq!(m.offset_of(&[1, 2, 3]).unwrap(), 20 + 10 + 3);
        assert_eq!(m.required_span(), 60);
    }

    #[test]
    fn test_column_major_strides() {
        let m = ColumnMajorMapping::new([3, 4, 5]);
        assert_eq!(m.strides(), vec![1, 3, 12]);
        assert_eq!(m.offset_of(&[1, 2, 3]).unwrap(), 1 + 6 + 36);
        assert_eq!(m.required_span(), 60);
    }

    #[test]
    fn test_strided() {
        let m = StridedMapping::new([2, 3], vec![10, 2]).unwrap();
        assert_eq!(m.strides(), vec![10, 2]);
        assert_eq!(m.offset_of(&[1, 2]).unwrap(), 14);
        // Largest offset is (1, 2) -> 14; span is one past it.
        assert_eq!(m.required_span(), 15);
    }

    #[test]
    fn test_strided_count_mismatch() {
        let err = StridedMapping::new([2, 3], vec![3]).unwrap_err();
        assert!(matches!(
            err,
            LayoutError::StrideCountMismatch {
                strides: 1,
                extents: 2
            }
        ));
    }

    #[test]
    fn test_rank_zero() {
        let m = RowMajorMapping::new([]);
        assert_eq!(m.rank(), 0);
        assert_eq!(m.offset_of(&[]).unwrap(), 0);
        assert_eq!(m.required_span(), 1);
    }

    #[test]
    fn test_offset_of_arity() {
        let m = RowMajorMapping::new([2, 2]);
        assert!(matches!(
            m.offset_of(&[1]),
            Err(LayoutError::InvalidDims {
                expected: 2,
                got: 1
            })
        ));
    }

    #[test]
    fn test_contiguous_agreement() {
        // Row-major and column-major agree with an explicitly strided
        // rendering of themselves, coordinate by coordinate.
        let row = RowMajorMapping::new([2, 3, 4]);
        let col = ColumnMajorMapping::new([2, 3, 4]);
        let row_strided = StridedMapping::new([2, 3, 4], row.strides()).unwrap();
        let col_strided = StridedMapping::new([2, 3, 4], col.strides()).unwrap();
        for coord in row.extents().indices() {
            assert_eq!(
                row.offset_of(&coord).unwrap(),
                row_strided.offset_of(&coord).unwrap()
            );
            assert_eq!(
                col.offset_of(&coord).unwrap(),
                col_strided.offset_of(&coord).unwrap()
            );
        }
    }

    #[test]
    fn test_empty_extents_span() {
        let m = RowMajorMapping::new([2, 0]);
        assert_eq!(m.required_span(), 0);
    }
}
