use crate::adapter::{FileShape, ShapeContext, SourceAdapter};
use crate::process::utils::join_all;
use crate::record::{IncidentType, Location};
use crate::sheet::Workbook;
use anyhow::Result;

pub struct WessexWater;

const SHAPES: &[FileShape] = &[
    FileShape::incidents("Flooding incidents EIR2025-046.xlsx", read_eir2025_046),
    FileShape::incidents(
        "Sewer Flooding Incident Data 2023 EIR2024 079.xlsx",
        read_eir2024_079,
    ),
    FileShape::incidents(
        "21-23 data/2021 2023 Flooding incidents EIR2024 131.xlsx",
        read_eir2024_131,
    ),
];

impl SourceAdapter for WessexWater {
    fn name(&self) -> &'static str {
        "Wessex Water Services Ltd"
    }

    fn shapes(&self) -> &'static [FileShape] {
        SHAPES
    }
}

fn read_eir2025_046(book: &Workbook, ctx: &mut ShapeContext<'_>) -> Result<()> {
    read_incident_sheet(book, ctx, "Sewer Water Incident Data")
}

fn read_eir2024_079(book: &Workbook, ctx: &mut ShapeContext<'_>) -> Result<()> {
    read_incident_sheet(book, ctx, "Sewer flooding incident data 23")
}

fn read_eir2024_131(book: &Workbook, ctx: &mut ShapeContext<'_>) -> Result<()> {
    read_incident_sheet(book, ctx, "Sewer Water Incident Data")
}

/// Every Wessex release shares one column layout.
fn read_incident_sheet(book: &Workbook, ctx: &mut ShapeContext<'_>, name: &str) -> Result<()> {
    let sheet = book.sheet(name)?;
    let [date, job, fault, postcode] =
        sheet.require(["Date Reported", "Job Type", "High Level Fault", "Postcode"])?;
    for row in sheet.records() {
        let incident_date = ctx.date(row.cell(date));
        let incident_type = join_all(&[row.text(job), row.text(fault)]).map(IncidentType::Text);
        ctx.emit(
            incident_date,
            incident_type,
            Location::default().postcode(row.text(postcode)),
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Report;
    use crate::sheet::Cell;
    use crate::store::RecordAccumulator;
    use chrono::NaiveDateTime;

    #[test]
    fn reads_native_datetimes_and_joins_job_with_fault() -> Result<()> {
        let reported = NaiveDateTime::parse_from_str("2023-11-04 09:30:00", "%Y-%m-%d %H:%M:%S")?;
        let book = Workbook::new("Sewer Flooding Incident Data 2023 EIR2024 079.xlsx").with_sheet(
            "Sewer flooding incident data 23",
            &["Date Reported", "Job Type", "High Level Fault", "Postcode"],
            vec![
                vec![reported.into(), "Sewer Flooding Internal".into(), "Blockage".into(), "BA1".into()],
                vec![Cell::Empty, "Sewer Flooding External".into(), Cell::Empty, "BS1".into()],
            ],
        );
        let mut acc = RecordAccumulator::new("Wessex Water Services Ltd");
        let mut report = Report::new("Wessex Water Services Ltd");
        read_eir2024_079(&book, &mut ShapeContext::new(&book.file, &mut acc, &mut report))?;

        let rows = acc.records();
        assert_eq!(rows[0].incident_date(), Some(reported.date()));
        assert_eq!(
            rows[0].incident_type(),
            Some(&IncidentType::text("Sewer Flooding Internal - Blockage"))
        );
        assert_eq!(rows[1].incident_date(), None);
        assert_eq!(rows[1].incident_type(), None);
        assert!(report.warnings().is_empty());
        Ok(())
    }

    #[test]
    fn wrong_sheet_name_fails() {
        let book = Workbook::new("Flooding incidents EIR2025-046.xlsx").with_sheet(
            "Sewer flooding incident data 23",
            &["Date Reported", "Job Type", "High Level Fault", "Postcode"],
            vec![],
        );
        let mut acc = RecordAccumulator::new("Wessex Water Services Ltd");
        let mut report = Report::new("Wessex Water Services Ltd");
        assert!(
            read_eir2025_046(&book, &mut ShapeContext::new(&book.file, &mut acc, &mut report))
                .is_err()
        );
        assert!(acc.is_empty());
    }
}
