mod weiler_atherton;

pub use weiler_atherton::{ClipType, Envelopment, IntersectionType, WeilerAthertonClipper};
