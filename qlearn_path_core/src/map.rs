use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

use crate::{Coord, LocationKey};

/// Represents errors that can occur within the grid operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("Coordinates ({row}, {col}) are out of bounds for grid size ({rows}, {cols})")]
    OutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },
    #[error("Inconsistent width at row {row}: expected {expected}, found {found}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("Grid has no cells")]
    Empty,
}

/// Converts a possibly out-of-range coordinate into a location key.
///
/// Coordinates wrap toroidally, so row `-1` is the last row and row `rows` is
/// the first. Returns the key together with the normalised coordinate.
///
/// # Panics
///
/// Panics if `rows` or `cols` is zero.
pub fn to_key(row: isize, col: isize, rows: usize, cols: usize) -> (LocationKey, Coord) {
    let row = row.rem_euclid(rows as isize) as usize;
    let col = col.rem_euclid(cols as isize) as usize;
    (LocationKey(row * cols + col), Coord { row, col })
}

/// Converts a location key back into its coordinate.
pub fn to_coords(key: LocationKey, cols: usize) -> Coord {
    Coord {
        row: key.0 / cols,
        col: key.0 % cols,
    }
}

/// Dimensions of a grid plus the key/coordinate mapping for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridCodec {
    rows: usize,
    cols: usize,
}

impl GridCodec {
    /// Returns `None` if either dimension is zero or the cell count overflows.
    pub fn new(rows: usize, cols: usize) -> Option<Self> {
        if rows == 0 || cols == 0 {
            return None;
        }
        rows.checked_mul(cols)?;
        Some(GridCodec { rows, cols })
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn cell_count(&self) -> usize {
        self.rows * self.cols
    }

    /// Key for a (possibly out-of-range) coordinate, wrapped onto the grid.
    #[inline]
    pub fn key(&self, row: isize, col: isize) -> LocationKey {
        to_key(row, col, self.rows, self.cols).0
    }

    #[inline]
    pub fn key_of(&self, coord: Coord) -> LocationKey {
        self.key(coord.row as isize, coord.col as isize)
    }

    #[inline]
    pub fn coords(&self, key: LocationKey) -> Coord {
        to_coords(key, self.cols)
    }

    pub fn contains(&self, coord: Coord) -> bool {
        coord.row < self.rows && coord.col < self.cols
    }

    /// The four wrapped neighbours of `key`: up, down, left, right.
    ///
    /// On grids thinner than three cells some of these coincide with each
    /// other or with `key` itself.
    pub fn neighbours(&self, key: LocationKey) -> [LocationKey; 4] {
        let Coord { row, col } = self.coords(key);
        let (row, col) = (row as isize, col as isize);
        [
            self.key(row - 1, col),
            self.key(row + 1, col),
            self.key(row, col - 1),
            self.key(row, col + 1),
        ]
    }
}

/// A generic 2D grid structure.
///
/// Stores elements of type `T` in a flat vector using row-major order, so the
/// flat index of a cell is its [`LocationKey`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid<T> {
    rows: usize,
    cols: usize,
    cells: Vec<T>,
}

impl<T> Grid<T> {
    /// Creates a new grid with the specified dimensions, filled with default values.
    ///
    /// # Panics
    ///
    /// Panics if `rows * cols` overflows `usize`.
    pub fn new(rows: usize, cols: usize) -> Self
    where
        T: Default + Clone,
    {
        let size = rows.checked_mul(cols).expect("Grid size overflow");
        Grid {
            rows,
            cols,
            cells: vec![T::default(); size],
        }
    }

    /// Creates a new grid with the specified dimensions, filled by a generator function.
    ///
    /// The generator function `f` takes `(row, col)` coordinates and is called
    /// in row-major order.
    ///
    /// # Panics
    ///
    /// Panics if `rows * cols` overflows `usize`.
    pub fn from_generator<F>(rows: usize, cols: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> T,
    {
        let size = rows.checked_mul(cols).expect("Grid size overflow");
        let mut cells = Vec::with_capacity(size);
        for row in 0..rows {
            for col in 0..cols {
                cells.push(f(row, col));
            }
        }
        Grid { rows, cols, cells }
    }

    /// Builds a grid from nested rows, which must all have the same width.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self, GridError> {
        let height = rows.len();
        let width = rows.first().map(Vec::len).ok_or(GridError::Empty)?;
        if width == 0 {
            return Err(GridError::Empty);
        }
        let mut cells = Vec::with_capacity(height * width);
        for (row, values) in rows.into_iter().enumerate() {
            if values.len() != width {
                return Err(GridError::Ragged {
                    row,
                    expected: width,
                    found: values.len(),
                });
            }
            cells.extend(values);
        }
        Ok(Grid {
            rows: height,
            cols: width,
            cells,
        })
    }

    /// Returns the number of rows.
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Returns the number of columns.
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Converts (row, col) coordinates to a flat vector index.
    ///
    /// Returns `None` if the coordinates are out of bounds.
    #[inline]
    pub fn coords_to_index(&self, row: usize, col: usize) -> Option<usize> {
        if self.is_valid(row, col) {
            Some(row * self.cols + col)
        } else {
            None
        }
    }

    /// Checks if the given coordinates are within the grid boundaries.
    #[inline]
    pub fn is_valid(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols
    }

    /// Gets an immutable reference to the cell at the given coordinates.
    ///
    /// Returns `None` if the coordinates are out of bounds.
    pub fn get(&self, row: usize, col: usize) -> Option<&T> {
        let index = self.coords_to_index(row, col)?;
        self.cells.get(index)
    }

    /// Sets the value of the cell at the given coordinates.
    ///
    /// Returns `Ok(())` on success, or `Err(GridError::OutOfBounds)` if the
    /// coordinates are invalid.
    pub fn set(&mut self, row: usize, col: usize, value: T) -> Result<(), GridError> {
        let index = self
            .coords_to_index(row, col)
            .ok_or(GridError::OutOfBounds {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            })?;
        self.cells[index] = value;
        Ok(())
    }

    /// Returns an iterator over the cells of the grid in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.cells.iter()
    }

    /// Returns an iterator that yields `(key, &T)` for each cell.
    pub fn enumerate(&self) -> impl Iterator<Item = (LocationKey, &T)> {
        self.cells
            .iter()
            .enumerate()
            .map(|(index, cell)| (LocationKey(index), cell))
    }

    /// Returns one row as a slice.
    ///
    /// # Panics
    ///
    /// Panics if `row` is out of bounds.
    pub fn row(&self, row: usize) -> &[T] {
        let start = row * self.cols;
        &self.cells[start..start + self.cols]
    }

    /// Returns a slice containing all cells in the grid.
    pub fn as_slice(&self) -> &[T] {
        &self.cells
    }

    /// Returns a new grid with `f` applied to every cell.
    pub fn map<U, F>(&self, f: F) -> Grid<U>
    where
        F: FnMut(&T) -> U,
    {
        Grid {
            rows: self.rows,
            cols: self.cols,
            cells: self.cells.iter().map(f).collect(),
        }
    }
}

/// Indexing using Coord for access.
impl<T> Index<Coord> for Grid<T> {
    type Output = T;

    #[inline]
    fn index(&self, index: Coord) -> &Self::Output {
        match self.coords_to_index(index.row, index.col) {
            Some(idx) => &self.cells[idx],
            None => panic!(
                "Grid index ({}, {}) out of bounds for grid size ({}, {})",
                index.row, index.col, self.rows, self.cols
            ),
        }
    }
}

/// Indexing using Coord for mutable access.
impl<T> IndexMut<Coord> for Grid<T> {
    #[inline]
    fn index_mut(&mut self, index: Coord) -> &mut Self::Output {
        let (rows, cols) = (self.rows, self.cols);
        match self.coords_to_index(index.row, index.col) {
            Some(idx) => &mut self.cells[idx],
            None => panic!(
                "Grid index ({}, {}) out of bounds for grid size ({}, {})",
                index.row, index.col, rows, cols
            ),
        }
    }
}

/// Indexing by flat location key.
impl<T> Index<LocationKey> for Grid<T> {
    type Output = T;

    #[inline]
    fn index(&self, key: LocationKey) -> &Self::Output {
        &self.cells[key.0]
    }
}

impl<T> IndexMut<LocationKey> for Grid<T> {
    #[inline]
    fn index_mut(&mut self, key: LocationKey) -> &mut Self::Output {
        &mut self.cells[key.0]
    }
}
