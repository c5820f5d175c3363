use crate::adapter::{FileShape, ShapeContext, SourceAdapter};
use crate::process::utils::join_all;
use crate::record::{IncidentType, Location};
use crate::sheet::Workbook;
use anyhow::Result;

pub struct UnitedUtilities;

const SHAPES: &[FileShape] = &[
    FileShape::incidents("EIR 2023 Flooding.xlsx", read_flooding_2023),
    FileShape::incidents("EIR-380 - Flooding Incidents Data.xlsb", read_eir380),
    FileShape::incidents("2nd request/EIR 260 Flooding Incidents Data.xlsx", read_eir260),
];

impl SourceAdapter for UnitedUtilities {
    fn name(&self) -> &'static str {
        "United Utilities"
    }

    fn dir_name(&self) -> &'static str {
        "United utilities"
    }

    fn shapes(&self) -> &'static [FileShape] {
        SHAPES
    }
}

fn read_flooding_2023(book: &Workbook, ctx: &mut ShapeContext<'_>) -> Result<()> {
    let sheet = book.sheet("Flooding_2023")?;
    // the cause header really has two spaces
    let [date, category, cause, postcode] =
        sheet.require(["INCIDENT DATE", "CATEGORY", "INCIDENT  CAUSE", "POSTCODE"])?;
    for row in sheet.records() {
        let incident_date = ctx.date(row.cell(date));
        let incident_type = join_all(&[row.text(category), row.text(cause)]).map(IncidentType::Text);
        ctx.emit(
            incident_date,
            incident_type,
            Location::default().postcode(row.text(postcode)),
        );
    }
    Ok(())
}

/// Binary workbook; dates are stored as serial day numbers.
fn read_eir380(book: &Workbook, ctx: &mut ShapeContext<'_>) -> Result<()> {
    for name in ["Internal", "External"] {
        let sheet = book.sheet(name)?;
        let [date, ftype, floc, cause, postcode] = sheet.require([
            "Incident Date",
            "Flooding Type",
            "Flooding Location",
            "Flooding Cause",
            "Impacted Customer Postcode",
        ])?;
        for row in sheet.records() {
            let incident_date = ctx.serial_date(row.cell(date));
            let incident_type = join_all(&[row.text(ftype), row.text(floc), row.text(cause)])
                .map(IncidentType::Text);
            ctx.emit(
                incident_date,
                incident_type,
                Location::default().postcode(row.text(postcode)),
            );
        }
    }
    Ok(())
}

fn read_eir260(book: &Workbook, ctx: &mut ShapeContext<'_>) -> Result<()> {
    for name in ["FY21", "FY22", "FY23"] {
        let sheet = book.sheet(name)?;
        let [date, kind, cause, postcode] =
            sheet.require(["Date", "Incident Type", "Cause", "Part Postcode"])?;
        for row in sheet.records() {
            let incident_date = ctx.date(row.cell(date));
            let incident_type = join_all(&[row.text(kind), row.text(cause)]).map(IncidentType::Text);
            ctx.emit(
                incident_date,
                incident_type,
                Location::default().postcode(row.text(postcode)),
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::DatePrecision;
    use crate::report::Report;
    use crate::sheet::Cell;
    use crate::store::RecordAccumulator;
    use chrono::NaiveDate;

    #[test]
    fn flooding_2023_uses_the_double_spaced_header() -> Result<()> {
        let book = Workbook::new("EIR 2023 Flooding.xlsx").with_sheet(
            "Flooding_2023",
            &["INCIDENT DATE", "CATEGORY", "INCIDENT  CAUSE", "POSTCODE"],
            vec![vec!["2023-02-01".into(), "Internal".into(), "Hydraulic".into(), "M1".into()]],
        );
        let mut acc = RecordAccumulator::new("United Utilities");
        let mut report = Report::new("United Utilities");
        read_flooding_2023(&book, &mut ShapeContext::new(&book.file, &mut acc, &mut report))?;
        assert_eq!(
            acc.records()[0].incident_type(),
            Some(&IncidentType::text("Internal - Hydraulic"))
        );
        Ok(())
    }

    #[test]
    fn eir380_converts_serial_dates() -> Result<()> {
        let headers = &[
            "Incident Date",
            "Flooding Type",
            "Flooding Location",
            "Flooding Cause",
            "Impacted Customer Postcode",
        ];
        let book = Workbook::new("EIR-380 - Flooding Incidents Data.xlsb")
            .with_sheet(
                "Internal",
                headers,
                vec![vec![44197.0.into(), "Sewer".into(), "Internal".into(), "Blockage".into(), "WA1".into()]],
            )
            .with_sheet(
                "External",
                headers,
                vec![vec![44198i64.into(), "Sewer".into(), Cell::Empty, "Blockage".into(), "PR1".into()]],
            );
        let mut acc = RecordAccumulator::new("United Utilities");
        let mut report = Report::new("United Utilities");
        read_eir380(&book, &mut ShapeContext::new(&book.file, &mut acc, &mut report))?;

        let rows = acc.records();
        // sheets are read Internal then External
        assert_eq!(rows[0].incident_date(), NaiveDate::from_ymd_opt(2021, 1, 1));
        assert_eq!(rows[0].date_precision(), Some(DatePrecision::FullDate));
        assert_eq!(
            rows[0].incident_type(),
            Some(&IncidentType::text("Sewer - Internal - Blockage"))
        );
        assert_eq!(rows[1].incident_date(), NaiveDate::from_ymd_opt(2021, 1, 2));
        assert_eq!(rows[1].incident_type(), None);
        Ok(())
    }

    #[test]
    fn eir260_reads_each_financial_year() -> Result<()> {
        let headers = &["Date", "Incident Type", "Cause", "Part Postcode"];
        let mut book = Workbook::new("EIR 260 Flooding Incidents Data.xlsx");
        for fy in ["FY21", "FY22", "FY23"] {
            book = book.with_sheet(
                fy,
                headers,
                vec![vec!["2022-01".into(), "External".into(), "Roots".into(), "CA1".into()]],
            );
        }
        let mut acc = RecordAccumulator::new("United Utilities");
        let mut report = Report::new("United Utilities");
        read_eir260(&book, &mut ShapeContext::new(&book.file, &mut acc, &mut report))?;
        assert_eq!(acc.len(), 3);
        assert_eq!(acc.records()[2].date_precision(), Some(DatePrecision::YearMonth));
        Ok(())
    }
}
