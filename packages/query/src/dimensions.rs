use crate::property::Orientation;

/// Orientation of a box: `landscape` when wider than tall, `portrait` when
/// taller than wide, `square` otherwise.
pub fn compute_orientation(width: f64, height: f64) -> Orientation {
    if width > height {
        Orientation::Landscape
    } else if width < height {
        Orientation::Portrait
    } else {
        Orientation::Square
    }
}

/// Width over height. An empty box has a ratio of 1 rather than NaN; any
/// other zero height divides normally and yields infinity.
pub fn compute_ratio(width: f64, height: f64) -> f64 {
    if width == 0.0 && height == 0.0 {
        1.0
    } else {
        width / height
    }
}
