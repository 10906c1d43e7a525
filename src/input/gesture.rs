#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    Tap,
    SwipeLeft,
}

/// Classifies a press/release pair. Only leftward travel of at least
/// `threshold` columns on the pressed row counts as a swipe.
pub fn classify(start_column: u16, end_column: u16, threshold: u16) -> Gesture {
    let threshold = threshold.max(1);
    if start_column.saturating_sub(end_column) >= threshold {
        Gesture::SwipeLeft
    } else {
        Gesture::Tap
    }
}
