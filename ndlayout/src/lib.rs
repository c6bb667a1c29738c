/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Strided-layout slicing for multidimensional array views.
//!
//! This crate derives the layout mapping of a sliced view: given a
//! mapping over an extent list (row-major, column-major, or fully
//! strided) and one slice specifier per dimension (keep all, collapse
//! to a scalar, or keep a sub-range), it computes the mapping and
//! origin offset of the resulting view over the same buffer. Sliced
//! contiguous layouts stay contiguous whenever the specifier pattern
//! allows it, and degrade to explicitly strided mappings otherwise.
//!
//! See [`Mapping::submap`] for the derivation entry point and
//! [`ArrayView`] for a buffer-attached consumer of it.

/// Extent lists and multi-index iteration.
pub mod extent;

/// Layout mapping kinds and the [`LayoutMap`] trait.
pub mod mapping;

/// Per-dimension slice specifiers and the extents combinator.
pub mod slices;

/// Derivation of sliced layout mappings.
pub mod submap;

/// Read-only views binding a mapping and offset to a buffer.
pub mod view;

pub use extent::Extents;
pub use extent::Indices;
pub use mapping::ColumnMajorMapping;
pub use mapping::LayoutError;
pub use mapping::LayoutMap;
pub use mapping::Mapping;
pub use mapping::RowMajorMapping;
pub use mapping::StridedMapping;
pub use slices::DimSlice;
pub use slices::sliced_extents;
pub use submap::MappingOffset;
pub use view::ArrayView;
pub use view::ElementIterator;

/// Property-based generators for randomized test input.
#[cfg(test)]
pub mod strategy;
