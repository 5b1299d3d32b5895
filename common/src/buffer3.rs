//! Dense 3D buffer stored slice-major (z, then y, then x).

use std::ops::{Deref, Index, IndexMut};
use std::slice;

#[derive(Debug, Clone, PartialEq)]
pub struct Buffer3<T> {
    voxels: Vec<T>,
    width: usize,
    height: usize,
    depth: usize,
}

impl<T> Buffer3<T> {
    pub fn new(width: usize, height: usize, depth: usize, voxels: Vec<T>) -> Self {
        assert_eq!(
            voxels.len(),
            width * height * depth,
            "voxels length must equal width * height * depth"
        );
        Self {
            voxels,
            width,
            height,
            depth,
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize, z: usize) -> &T {
        debug_assert!(x < self.width && y < self.height && z < self.depth);
        &self.voxels[self.index(x, y, z)]
    }

    #[inline]
    pub fn get_mut(&mut self, x: usize, y: usize, z: usize) -> &mut T {
        debug_assert!(x < self.width && y < self.height && z < self.depth);
        let idx = self.index(x, y, z);
        &mut self.voxels[idx]
    }

    /// Bounds-checked access with signed coordinates.
    #[inline]
    pub fn checked_get(&self, x: i64, y: i64, z: i64) -> Option<&T> {
        if self.contains(x, y, z) {
            Some(self.get(x as usize, y as usize, z as usize))
        } else {
            None
        }
    }

    #[inline]
    pub fn contains(&self, x: i64, y: i64, z: i64) -> bool {
        x >= 0
            && y >= 0
            && z >= 0
            && (x as usize) < self.width
            && (y as usize) < self.height
            && (z as usize) < self.depth
    }

    #[inline]
    pub fn index(&self, x: usize, y: usize, z: usize) -> usize {
        (z * self.height + y) * self.width + x
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.voxels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.voxels.is_empty()
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Shape as `[depth, height, width]`.
    #[inline]
    pub fn shape(&self) -> [usize; 3] {
        [self.depth, self.height, self.width]
    }

    /// One XY plane, row-major.
    #[inline]
    pub fn slice(&self, z: usize) -> &[T] {
        let plane = self.width * self.height;
        &self.voxels[z * plane..(z + 1) * plane]
    }

    #[inline]
    pub fn voxels(&self) -> &[T] {
        &self.voxels
    }

    #[inline]
    pub fn into_vec(self) -> Vec<T> {
        self.voxels
    }

    #[inline]
    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.voxels.iter()
    }
}

impl<T: Default + Clone> Buffer3<T> {
    pub fn new_default(width: usize, height: usize, depth: usize) -> Self {
        Self::new_filled(width, height, depth, T::default())
    }
}

impl<T: Clone> Buffer3<T> {
    pub fn new_filled(width: usize, height: usize, depth: usize, value: T) -> Self {
        Self {
            voxels: vec![value; width * height * depth],
            width,
            height,
            depth,
        }
    }
}

impl<T> Index<(usize, usize, usize)> for Buffer3<T> {
    type Output = T;

    #[inline]
    fn index(&self, (x, y, z): (usize, usize, usize)) -> &Self::Output {
        &self.voxels[(z * self.height + y) * self.width + x]
    }
}

impl<T> IndexMut<(usize, usize, usize)> for Buffer3<T> {
    #[inline]
    fn index_mut(&mut self, (x, y, z): (usize, usize, usize)) -> &mut Self::Output {
        &mut self.voxels[(z * self.height + y) * self.width + x]
    }
}

impl<T> Deref for Buffer3<T> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.voxels
    }
}

impl<'a, T> IntoIterator for &'a Buffer3<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.voxels.iter()
    }
}
