//! Persisted refinement metadata attached to every refinable scalar.

/// Bounds and selection flag for one refinable property.
///
/// `minimum`/`maximum` bound the value explored by the refiner; they are
/// always kept inside the property's own declared range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RefinementInfo {
    pub minimum: f64,
    pub maximum: f64,
    pub refine: bool,
}

impl RefinementInfo {
    pub fn new(minimum: f64, maximum: f64, refine: bool) -> Self {
        let (minimum, maximum) =
            if minimum <= maximum { (minimum, maximum) } else { (maximum, minimum) };
        RefinementInfo { minimum, maximum, refine }
    }

    /// Clamp `value` into `[minimum, maximum]`.
    pub fn clamp(&self, value: f64) -> f64 {
        value.max(self.minimum).min(self.maximum)
    }

    /// Width of the refinement range.
    pub fn span(&self) -> f64 {
        self.maximum - self.minimum
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_orders_bounds_and_clamp_respects_them() {
        let info = RefinementInfo::new(2.0, -1.0, true);
        assert_eq!((info.minimum, info.maximum), (-1.0, 2.0));
        assert_eq!(info.clamp(5.0), 2.0);
        assert_eq!(info.clamp(-3.0), -1.0);
        assert_eq!(info.clamp(0.5), 0.5);
        assert_eq!(info.span(), 3.0);
    }
}
