//! Auto-dimensioned numeric/text arrays (spec.md §3 "arrays", §9
//! "Auto-creating arrays", "`Dim a(N)` gives N+1 elements").

use basic_ast::Value;

/// `Dim a(10)` gives element count `upper+1` per axis (spec.md §9); a bare
/// first access to an undimensioned array auto-creates it with upper bound
/// `10` on every referenced axis (spec.md §9 "Auto-creating arrays").
pub const AUTO_DIM_UPPER: u32 = 10;

/// A single numeric or text array, stored flat in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayVar {
    /// Upper bound per axis; element count on that axis is `bound+1`.
    pub dims: Vec<u32>,
    pub elements: Vec<Value>,
    is_text: bool,
}

impl ArrayVar {
    pub fn new(dims: Vec<u32>, name: &str) -> Self {
        let is_text = name.ends_with('$');
        let count = dims.iter().map(|d| *d as usize + 1).product::<usize>().max(1);
        let fill = if is_text { Value::empty_text() } else { Value::zero() };
        ArrayVar {
            dims,
            elements: vec![fill; count],
            is_text,
        }
    }

    /// Row-major flat offset for `indices`, or `None` if any axis is out of
    /// `[0, upper]` or the arity doesn't match (spec.md §3 array bounds
    /// invariant, code 9 `SubscriptOutOfRange`).
    pub fn offset(&self, indices: &[i64]) -> Option<usize> {
        if indices.len() != self.dims.len() {
            return None;
        }
        let mut offset = 0usize;
        for (i, &idx) in indices.iter().enumerate() {
            let upper = self.dims[i] as i64;
            if idx < 0 || idx > upper {
                return None;
            }
            let axis_len = upper as usize + 1;
            offset = offset * axis_len + idx as usize;
        }
        Some(offset)
    }

    pub fn get(&self, indices: &[i64]) -> Option<&Value> {
        self.offset(indices).and_then(|o| self.elements.get(o))
    }

    pub fn set(&mut self, indices: &[i64], value: Value) -> Option<()> {
        let o = self.offset(indices)?;
        self.elements[o] = value;
        Some(())
    }

    /// `Redim Preserve`: rebuild with new dims, copying over every element
    /// whose index vector is valid in both the old and new shape.
    pub fn redim_preserve(&self, new_dims: Vec<u32>, name: &str) -> ArrayVar {
        let mut out = ArrayVar::new(new_dims, name);
        copy_overlap(self, &mut out);
        out
    }
}

fn copy_overlap(old: &ArrayVar, new: &mut ArrayVar) {
    if old.dims.len() != new.dims.len() {
        return;
    }
    let axis_lens: Vec<usize> = old.dims.iter().map(|d| *d as usize + 1).collect();
    let mut idx = vec![0i64; old.dims.len()];
    'outer: loop {
        if let (Some(o), Some(n)) = (old.offset(&idx), new.offset(&idx)) {
            new.elements[n] = old.elements[o].clone();
        }
        for axis in (0..idx.len()).rev() {
            idx[axis] += 1;
            if (idx[axis] as usize) < axis_lens[axis] {
                continue 'outer;
            }
            idx[axis] = 0;
            if axis == 0 {
                break 'outer;
            }
        }
        if idx.iter().all(|&v| v == 0) {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dim_a_10_gives_eleven_elements() {
        let a = ArrayVar::new(vec![10], "A");
        assert_eq!(a.elements.len(), 11);
    }

    #[test]
    fn out_of_range_index_is_none() {
        let a = ArrayVar::new(vec![10], "A");
        assert!(a.get(&[11]).is_none());
        assert!(a.get(&[-1]).is_none());
        assert!(a.get(&[0]).is_some());
    }

    #[test]
    fn redim_preserve_keeps_overlapping_cells() {
        let mut a = ArrayVar::new(vec![3], "A");
        a.set(&[0], Value::Number(1.0)).unwrap();
        a.set(&[3], Value::Number(4.0)).unwrap();
        let b = a.redim_preserve(vec![5], "A");
        assert_eq!(b.get(&[0]), Some(&Value::Number(1.0)));
        assert_eq!(b.get(&[3]), Some(&Value::Number(4.0)));
        assert_eq!(b.get(&[5]), Some(&Value::Number(0.0)));
    }

    #[test]
    fn two_d_row_major_offset() {
        let a = ArrayVar::new(vec![2, 3], "A");
        // dims (2,3) => axis lens (3,4) => 12 elements.
        assert_eq!(a.elements.len(), 12);
        assert_eq!(a.offset(&[1, 2]), Some(1 * 4 + 2));
    }
}
