//! Shared math utilities.

/// Index of the largest value. Ties go to the lowest index; NaNs never win.
///
/// Returns `None` for an empty slice or one holding only NaNs.
pub fn argmax(values: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &v) in values.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}
