//! Square single-channel grids of activations.

/// A `breadth x breadth` grid of values stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Plane {
    breadth: usize,
    cells: Vec<f64>,
}

impl Plane {
    /// A zero-filled plane.
    pub fn zeros(breadth: usize) -> Self {
        Plane {
            breadth,
            cells: vec![0.0; breadth * breadth],
        }
    }

    pub fn breadth(&self) -> usize {
        self.breadth
    }

    /// Returns the value at `(row, column)`, or `None` outside the plane.
    pub fn get(&self, row: usize, column: usize) -> Option<f64> {
        if row < self.breadth && column < self.breadth {
            Some(self.cells[row * self.breadth + column])
        } else {
            None
        }
    }

    /// Row `row` as a slice.
    #[inline]
    pub fn row(&self, row: usize) -> &[f64] {
        let start = row * self.breadth;
        &self.cells[start..start + self.breadth]
    }

    #[inline]
    pub(crate) fn set(&mut self, row: usize, column: usize, value: f64) {
        self.cells[row * self.breadth + column] = value;
    }

    pub fn cells(&self) -> &[f64] {
        &self.cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_get() {
        let mut plane = Plane::zeros(3);
        plane.set(1, 2, 4.5);
        assert_eq!(plane.get(1, 2), Some(4.5));
        assert_eq!(plane.get(2, 1), Some(0.0));
        assert_eq!(plane.get(3, 0), None);
        assert_eq!(plane.row(1), &[0.0, 0.0, 4.5]);
    }
}
