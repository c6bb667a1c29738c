/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

use serde::Deserialize;
use serde::Serialize;

/// An ordered list of per-dimension sizes describing the logical shape
/// of a multidimensional view.
///
/// `Extents` carries no layout information: it says how many elements
/// each dimension holds, not where they live. Layout (strides and
/// linearization) is the concern of [`crate::mapping`].
///
/// Extents are immutable once constructed. A rank-0 extent list is the
/// shape of a single scalar: it spans exactly one element
/// (`count() == 1`, the empty product).
#[derive(Clone, Default, Eq, PartialEq, Hash, Serialize, Deserialize, Debug)]
pub struct Extents(Vec<usize>);

impl Extents {
    /// Create a new extent list from the provided sizes.
    pub fn new(sizes: impl Into<Vec<usize>>) -> Self {
        Self(sizes.into())
    }

    /// The number of dimensions.
    pub fn rank(&self) -> usize {
        self.0.len()
    }

    /// The size of dimension `dim`.
    ///
    /// # Panics
    ///
    /// Panics if `dim >= self.rank()`.
    pub fn size(&self, dim: usize) -> usize {
        self.0[dim]
    }

    /// The sizes of all dimensions, in dimension order.
    pub fn sizes(&self) -> &[usize] {
        &self.0
    }

    /// The total number of elements spanned by these extents.
    pub fn count(&self) -> usize {
        self.0.iter().product()
    }

    /// Whether the extents span no elements at all, i.e. some
    /// dimension has size zero.
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Iterator over every multi-index within these extents, in
    /// row-major order (last dimension varies fastest).
    pub fn indices(&self) -> Indices {
        Indices {
            dims: self.0.clone(),
            index: 0,
        }
    }

    /// Deconstruct into the underlying size vector.
    pub fn into_inner(self) -> Vec<usize> {
        self.0
    }
}

impl From<Vec<usize>> for Extents {
    fn from(sizes: Vec<usize>) -> Self {
        Self(sizes)
    }
}

impl From<&[usize]> for Extents {
    fn from(sizes: &[usize]) -> Self {
        Self(sizes.to_vec())
    }
}

impl<const N: usize> From<[usize; N]> for Extents {
    fn from(sizes: [usize; N]) -> Self {
        Self(sizes.to_vec())
    }
}

impl std::fmt::Display for Extents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

/// Iterates over all multi-indices in an n-dimensional space.
///
/// Yields each point in row-major order for the shape defined by
/// `dims`, where each coordinate lies in `[0..dims[i])`.
///
/// # Example
/// ```
/// use ndlayout::Extents;
/// let coords: Vec<_> = Extents::new(vec![2, 3]).indices().collect();
/// assert_eq!(coords, vec![
///     vec![0, 0], vec![0, 1], vec![0, 2],
///     vec![1, 0], vec![1, 1], vec![1, 2],
/// ]);
/// ```
pub struct Indices {
    dims: Vec<usize>,
    index: usize,
}

impl Iterator for Indices {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.dims.iter().product::<usize>() {
            return None;
        }

        let mut result: Vec<usize> = vec![0; self.dims.len()];
        let mut rest = self.index;
        for (i, dim) in self.dims.iter().enumerate().rev() {
            result[i] = rest % dim;
            rest /= dim;
        }
        self.index += 1;
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic() {
        let e = Extents::new(vec![3, 4, 5]);
        assert_eq!(e.rank(), 3);
        assert_eq!(e.sizes(), &[3, 4, 5]);
        assert_eq!(e.size(1), 4);
        assert_eq!(e.count(), 60);
        assert!(!e.is_empty());
    }

    #[test]
    fn test_rank_zero() {
        let e = Extents::new(vec![]);
        assert_eq!(e.rank(), 0);
        assert_eq!(e.count(), 1);
        assert!(!e.is_empty());
        assert_eq!(e.indices().collect::<Vec<_>>(), vec![Vec::<usize>::new()]);
    }

    #[test]
    fn test_zero_size_dimension() {
        let e = Extents::new(vec![2, 0, 3]);
        assert_eq!(e.count(), 0);
        assert!(e.is_empty());
        assert_eq!(e.indices().next(), None);
    }

    #[test]
    fn test_indices_row_major() {
        let e = Extents::new(vec![2, 2, 2]);
        let coords: Vec<Vec<usize>> = e.indices().collect();
        assert_eq!(
            coords,
            vec![
                vec![0, 0, 0],
                vec![0, 0, 1],
                vec![0, 1, 0],
                vec![0, 1, 1],
                vec![1, 0, 0],
                vec![1, 0, 1],
                vec![1, 1, 0],
                vec![1, 1, 1],
            ]
        );
    }
}
