/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Property-based generators for extents, slice specifiers, and
//! layout mappings.
//!
//! These strategies are used in `proptest`-based tests to construct
//! randomized slicing inputs: a mapping of any kind paired with a
//! specifier list that is valid for its extents.
//!
//! This module is only included in test builds (`#[cfg(test)]`).

use proptest::prelude::*;

use crate::extent::Extents;
use crate::mapping::LayoutMap;
use crate::mapping::Mapping;
use crate::mapping::RowMajorMapping;
use crate::mapping::StridedMapping;
use crate::slices::DimSlice;

/// Generates a random [`Extents`] with up to `max_rank` dimensions,
/// each of size 1 to `max_len` (inclusive).
pub fn gen_extents(max_rank: usize, max_len: usize) -> impl Strategy<Value = Extents> {
    prop::collection::vec(1..=max_len, 0..=max_rank).prop_map(Extents::new)
}

/// Generates a specifier valid for a dimension of the given size:
/// full span, an in-bounds scalar collapse, or an in-bounds
/// well-ordered sub-range (possibly empty).
pub fn gen_spec(size: usize) -> impl Strategy<Value = DimSlice> {
    prop_oneof![
        Just(DimSlice::Full),
        (0..size).prop_map(DimSlice::Index),
        (0..size).prop_flat_map(move |start| {
            (start..=size).prop_map(move |end| DimSlice::Range { start, end })
        }),
    ]
}

/// Generates a specifier vector valid for the given extents, one
/// specifier per dimension.
pub fn gen_specs(extents: &Extents) -> impl Strategy<Value = Vec<DimSlice>> {
    let empty: BoxedStrategy<Vec<DimSlice>> = Just(Vec::new()).boxed();
    extents.sizes().iter().fold(empty, |acc, &size| {
        (acc, gen_spec(size))
            .prop_map(|(mut specs, spec)| {
                specs.push(spec);
                specs
            })
            .boxed()
    })
}

/// Generates a [`Mapping`] of any kind over random extents.
///
/// Strided mappings are built from row-major strides inflated by a
/// random per-dimension factor, so they exhibit the gaps a sliced
/// layout would have while remaining non-overlapping.
pub fn gen_mapping(max_rank: usize, max_len: usize) -> impl Strategy<Value = Mapping> {
    gen_extents(max_rank, max_len).prop_flat_map(|extents| {
        let rank = extents.rank();
        let row = Mapping::row_major(extents.clone());
        let col = Mapping::column_major(extents.clone());
        let strided = prop::collection::vec(1..4usize, rank).prop_map(move |factors| {
            let base = RowMajorMapping::new(extents.clone());
            let strides = base
                .strides()
                .into_iter()
                .zip(factors)
                .map(|(stride, factor)| stride * factor)
                .collect();
            Mapping::Strided(
                StridedMapping::new(base.extents().clone(), strides)
                    .expect("one stride per dimension"),
            )
        });
        prop_oneof![Just(row), Just(col), strided]
    })
}

/// Generates a mapping together with a specifier vector valid for
/// its extents.
pub fn gen_mapping_and_specs(
    max_rank: usize,
    max_len: usize,
) -> impl Strategy<Value = (Mapping, Vec<DimSlice>)> {
    gen_mapping(max_rank, max_len)
        .prop_flat_map(|mapping| {
            let specs = gen_specs(mapping.extents());
            (Just(mapping), specs)
        })
}
