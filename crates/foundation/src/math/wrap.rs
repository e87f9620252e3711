/// Wrap `i` into `[lower, upper)` with a true (non-negative) modulo.
///
/// Unlike `%`, negative inputs wrap from the top of the range. Panics if
/// `upper <= lower`.
pub fn wrap_index(i: i64, lower: i64, upper: i64) -> i64 {
    assert!(upper > lower, "empty wrap range [{lower}, {upper})");
    (i - lower).rem_euclid(upper - lower) + lower
}
