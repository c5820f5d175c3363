use crate::adapter::{FileShape, Granularity, SourceAdapter};

/// The regulator publishes company-level totals only.
pub struct Ofwat;

impl SourceAdapter for Ofwat {
    fn name(&self) -> &'static str {
        "Ofwat"
    }

    fn granularity(&self) -> Granularity {
        Granularity::AggregatedOnly
    }

    fn shapes(&self) -> &'static [FileShape] {
        &[]
    }
}
