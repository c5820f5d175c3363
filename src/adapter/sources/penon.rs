use crate::adapter::{FileShape, ShapeContext, SourceAdapter};
use crate::process::LegendTable;
use crate::record::{IncidentType, Location};
use crate::sheet::Workbook;
use anyhow::Result;

pub struct PenonWater;

const SHAPES: &[FileShape] = &[
    FileShape::incidents("EIR25077.xlsx", read_eir25077),
    FileShape::incidents("EIR24187.xlsx", read_eir24187),
];

impl SourceAdapter for PenonWater {
    fn name(&self) -> &'static str {
        "Penon Water"
    }

    fn shapes(&self) -> &'static [FileShape] {
        SHAPES
    }
}

/// Cause codes used by EIR25077; the release ships no legend sheet.
const CAUSE_CODES: &[(&str, &str)] = &[
    ("BLPR", "Blockage paper rag"),
    ("BLFT", "Blockage fat"),
    ("BLST", "Blockage silt"),
    ("BLDB", "Blockage non sewage debris"),
    ("BLRT", "Blockage roots"),
    ("CLBU", "Collapse/burst"),
    ("PACB", "Partial collapse"),
    ("PTCB", "Partial collapse"),
    ("EQFL", "Equipment failure"),
    ("HYOL", "Hydraulic overload"),
    ("HOPS", "Hydraulically overloaded pumping station"),
    ("SEWC", "Sewer condition"),
    ("TPDM", "Third party damage"),
    ("PSBL", "Pump station blockage"),
    ("PSBR", "Pump station breakdown"),
];

const EIR25077_SHEETS: [&str; 2] = [
    "External Sewer Floodings2010-23",
    "Internal Sewer Floodings2010-23",
];

fn read_eir25077(book: &Workbook, ctx: &mut ShapeContext<'_>) -> Result<()> {
    let legend = LegendTable::from_pairs(CAUSE_CODES);
    for name in EIR25077_SHEETS {
        let sheet = book.sheet(name)?;
        // headers carry stray padding in this release
        let [date, cause, postcode] =
            sheet.require_trimmed(["Raised Date", "Flooding Cause", "Post Code"])?;
        for row in sheet.records() {
            let incident_date = ctx.date(row.cell(date));
            let incident_type = IncidentType::text(legend.resolve_cell(row.cell(cause)));
            ctx.emit(
                incident_date,
                Some(incident_type),
                Location::default().postcode(row.text(postcode)),
            );
        }
    }
    Ok(())
}

fn read_eir24187(book: &Workbook, ctx: &mut ShapeContext<'_>) -> Result<()> {
    let sheet = book.sheet("Data")?;
    let [date, cause, postcode, town] =
        sheet.require(["Date Raised", "Feedback Cause", "Postcode", "Town/City"])?;
    for row in sheet.records() {
        let incident_date = ctx.date(row.cell(date));
        let location = Location::default()
            .postcode(row.text(postcode))
            .town(row.text(town));
        ctx.emit(incident_date, row.text(cause).map(IncidentType::Text), location);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Report;
    use crate::sheet::Cell;
    use crate::store::RecordAccumulator;

    #[test]
    fn eir25077_reads_both_sheets_with_padded_headers() -> Result<()> {
        let headers = &["Raised Date ", " Flooding Cause", "Post Code"];
        let book = Workbook::new("EIR25077.xlsx")
            .with_sheet(
                EIR25077_SHEETS[0],
                headers,
                vec![vec!["2012-04-01".into(), "BLFT".into(), "EX1".into()]],
            )
            .with_sheet(
                EIR25077_SHEETS[1],
                headers,
                vec![vec!["2013-04-01".into(), "ZZZZ".into(), "PL1".into()]],
            );
        let mut acc = RecordAccumulator::new("Penon Water");
        let mut report = Report::new("Penon Water");
        read_eir25077(&book, &mut ShapeContext::new(&book.file, &mut acc, &mut report))?;

        let types: Vec<_> = acc
            .records()
            .iter()
            .map(|r| r.incident_type().unwrap().label())
            .collect();
        assert_eq!(types, vec!["Blockage fat", "Unknown"]);
        Ok(())
    }

    #[test]
    fn eir24187_keeps_missing_cause_absent() -> Result<()> {
        let book = Workbook::new("EIR24187.xlsx").with_sheet(
            "Data",
            &["Date Raised", "Feedback Cause", "Postcode", "Town/City"],
            vec![vec!["2021-06".into(), Cell::Empty, "TR1".into(), "Truro".into()]],
        );
        let mut acc = RecordAccumulator::new("Penon Water");
        let mut report = Report::new("Penon Water");
        read_eir24187(&book, &mut ShapeContext::new(&book.file, &mut acc, &mut report))?;

        let r = &acc.records()[0];
        assert_eq!(r.incident_type(), None);
        assert_eq!(r.location().town.as_deref(), Some("Truro"));
        Ok(())
    }
}
