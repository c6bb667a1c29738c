/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Derivation of sliced layout mappings.
//!
//! Given a source [`LayoutMap`] and one [`DimSlice`] per source
//! dimension, derivation produces the mapping of the sliced view
//! together with the linear offset of its origin within the source:
//!
//! ```text
//! (source mapping, specifiers) -> { destination mapping, offset }
//! ```
//!
//! The destination aliases the same buffer as the source. Its rank is
//! the number of non-`Index` specifiers; its extents are those
//! computed by [`sliced_extents`]; its offset is the source mapping
//! evaluated at the first index of each specifier.
//!
//! The interesting decision is the destination's layout kind. A sliced
//! contiguous mapping usually stops being contiguous: narrowing any
//! dimension that varies faster than the slowest surviving one leaves
//! gaps between consecutive destination elements, and only a
//! [`StridedMapping`] can express those. Derivation therefore
//! classifies each specifier list first (see `preserves_layout`) and
//! either rebuilds the same contiguous kind from the destination
//! extents alone, or gathers the surviving source strides into a
//! strided mapping. Slicing a strided source always yields a strided
//! result.
//!
//! Everything here is a pure function of its inputs: identical inputs
//! produce identical results, and the derived mapping never aliases
//! the source mapping's storage.

use serde::Deserialize;
use serde::Serialize;

use crate::extent::Extents;
use crate::mapping::ColumnMajorMapping;
use crate::mapping::LayoutError;
use crate::mapping::LayoutMap;
use crate::mapping::Mapping;
use crate::mapping::RowMajorMapping;
use crate::mapping::StridedMapping;
use crate::slices::DimSlice;
use crate::slices::sliced_extents;

/// The result of slicing a layout mapping: the destination mapping
/// and the linear offset of its origin within the source buffer.
///
/// The offset is *incremental*, relative to the source mapping's own
/// coordinate origin. A caller that already tracks a base offset for
/// the source view composes by addition; [`crate::view::ArrayView`]
/// does exactly that.
#[derive(Clone, Eq, PartialEq, Hash, Serialize, Deserialize, Debug)]
pub struct MappingOffset {
    /// The derived mapping of the sliced view.
    pub mapping: Mapping,
    /// Linear position of the sliced view's origin in the source.
    pub offset: usize,
}

/// The ordered list of source dimensions that survive slicing, i.e.
/// whose specifier is not `Index`. The destination's dimension `d`
/// originates from source dimension `inverse_map(specs)[d]`.
fn inverse_map(specs: &[DimSlice]) -> Vec<usize> {
    specs
        .iter()
        .enumerate()
        .filter(|(_, spec)| spec.keeps_dimension())
        .map(|(dim, _)| dim)
        .collect()
}

/// Gather the destination strides by reading the source stride at
/// each surviving dimension, in surviving order.
///
/// Strides are always read from the source mapping, never recomputed
/// from extents: the source may itself be a derived strided mapping
/// whose strides follow no closed-form rule.
fn project_strides<M: LayoutMap>(src: &M, inverse: &[usize]) -> Vec<usize> {
    inverse.iter().map(|&dim| src.stride(dim)).collect()
}

/// Evaluate the source mapping at the first index selected by each
/// specifier. This is the linear offset of the sliced view's origin.
fn origin_offset<M: LayoutMap>(src: &M, specs: &[DimSlice]) -> Result<usize, LayoutError> {
    let origin: Vec<usize> = specs.iter().map(DimSlice::first_index).collect();
    src.offset_of(&origin)
}

/// Decide whether a sliced contiguous mapping is still representable
/// in the same contiguous kind.
///
/// `specs` must be ordered from slowest-varying to fastest-varying
/// dimension of the source layout: pass specifiers in reverse
/// dimension order for a column-major source and in forward order for
/// a row-major source. The two rules are mirror images, so a single
/// scan serves both.
///
/// With `m` surviving dimensions, the layout is preserved iff
/// `m == 0`, or counting from the fastest-varying end:
///
/// - the `m - 1` fastest-varying dimensions are `Full`,
/// - the next (the slowest-varying survivor) is `Full` or `Range`,
/// - all remaining, slower-varying dimensions are collapsed by
///   `Index`.
///
/// Narrowing any dimension faster than the slowest survivor leaves
/// gaps; an `Index` collapse of a dimension faster than some survivor
/// shifts a non-unit stride onto the destination's fastest dimension.
/// Both break the contiguous stride relationship. The classifier
/// inspects only specifier kinds, not extent values, so a slicing
/// that happens to be contiguous for particular sizes (e.g. through a
/// size-1 dimension) still degrades to a strided result; that result
/// is equivalent, just stored less compactly.
fn preserves_layout<'a, I>(fastest_last: I, dst_rank: usize) -> bool
where
    I: DoubleEndedIterator<Item = &'a DimSlice>,
{
    if dst_rank == 0 {
        return true;
    }
    fastest_last.rev().enumerate().all(|(pos, spec)| {
        if pos < dst_rank - 1 {
            matches!(spec, DimSlice::Full)
        } else if pos == dst_rank - 1 {
            matches!(spec, DimSlice::Full | DimSlice::Range { .. })
        } else {
            // Slower than every survivor; the rank count forces this
            // to be an Index collapse, so nothing further to require.
            true
        }
    })
}

impl RowMajorMapping {
    /// Derive the mapping of the view obtained by applying `specs`,
    /// one per dimension.
    ///
    /// The result is row-major again when only the slowest-varying
    /// (lowest-indexed) surviving dimension is narrowed and all
    /// collapsed dimensions precede the survivors; otherwise it
    /// degrades to a [`StridedMapping`] carrying this mapping's
    /// surviving strides.
    ///
    /// # Errors
    ///
    /// Fails only on specifier validation, see [`sliced_extents`].
    pub fn submap(&self, specs: &[DimSlice]) -> Result<MappingOffset, LayoutError> {
        let dst = sliced_extents(self.extents(), specs)?;
        let offset = origin_offset(self, specs)?;
        // Row-major: the highest-indexed dimension varies fastest.
        let mapping = if preserves_layout(specs.iter(), dst.rank()) {
            Mapping::RowMajor(RowMajorMapping::new(dst))
        } else {
            strided_submap(self, specs, dst)
        };
        Ok(MappingOffset { mapping, offset })
    }
}

impl ColumnMajorMapping {
    /// Derive the mapping of the view obtained by applying `specs`,
    /// one per dimension.
    ///
    /// The result is column-major again when only the slowest-varying
    /// (highest-indexed) surviving dimension is narrowed and all
    /// collapsed dimensions follow the survivors; otherwise it
    /// degrades to a [`StridedMapping`] carrying this mapping's
    /// surviving strides.
    ///
    /// # Errors
    ///
    /// Fails only on specifier validation, see [`sliced_extents`].
    pub fn submap(&self, specs: &[DimSlice]) -> Result<MappingOffset, LayoutError> {
        let dst = sliced_extents(self.extents(), specs)?;
        let offset = origin_offset(self, specs)?;
        // Column-major: the lowest-indexed dimension varies fastest.
        let mapping = if preserves_layout(specs.iter().rev(), dst.rank()) {
            Mapping::ColumnMajor(ColumnMajorMapping::new(dst))
        } else {
            strided_submap(self, specs, dst)
        };
        Ok(MappingOffset { mapping, offset })
    }
}

impl StridedMapping {
    /// Derive the mapping of the view obtained by applying `specs`,
    /// one per dimension. A strided source has no contiguity to
    /// preserve; the result is always strided.
    ///
    /// # Errors
    ///
    /// Fails only on specifier validation, see [`sliced_extents`].
    pub fn submap(&self, specs: &[DimSlice]) -> Result<MappingOffset, LayoutError> {
        let dst = sliced_extents(self.extents(), specs)?;
        let offset = origin_offset(self, specs)?;
        Ok(MappingOffset {
            mapping: strided_submap(self, specs, dst),
            offset,
        })
    }
}

impl Mapping {
    /// Derive the mapping of the view obtained by applying `specs`,
    /// one per dimension. Dispatches on the source kind; see the
    /// per-kind `submap` methods.
    pub fn submap(&self, specs: &[DimSlice]) -> Result<MappingOffset, LayoutError> {
        match self {
            Mapping::RowMajor(m) => m.submap(specs),
            Mapping::ColumnMajor(m) => m.submap(specs),
            Mapping::Strided(m) => m.submap(specs),
        }
    }
}

/// Build the strided destination: gather surviving source strides via
/// the inverse map and pair them with the destination extents.
fn strided_submap<M: LayoutMap>(src: &M, specs: &[DimSlice], dst: Extents) -> Mapping {
    let strides = project_strides(src, &inverse_map(specs));
    Mapping::Strided(
        StridedMapping::new(dst, strides).expect("one projected stride per surviving dimension"),
    )
}
