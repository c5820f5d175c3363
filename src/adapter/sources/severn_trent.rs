use crate::adapter::{FileShape, ShapeContext, SourceAdapter};
use crate::record::{IncidentType, Location};
use crate::sheet::Workbook;
use anyhow::Result;

pub struct SevernTrent;

const SHAPES: &[FileShape] = &[
    FileShape::incidents("EIR 793 datafile.xlsx", read_eir793),
    FileShape::incidents("EIR674 Flooding Data 2021 2023.xlsx", read_eir674),
    FileShape::incidents("EIR641 2023 Flooding report data.xlsx", read_eir641),
];

impl SourceAdapter for SevernTrent {
    fn name(&self) -> &'static str {
        "Severn Trent"
    }

    fn shapes(&self) -> &'static [FileShape] {
        SHAPES
    }
}

/// One sheet per year, named by the year.
fn read_eir793(book: &Workbook, ctx: &mut ShapeContext<'_>) -> Result<()> {
    for year in 2010..=2020 {
        let sheet = book.sheet(&year.to_string())?;
        let [date, cause, postcode] =
            sheet.require(["Incident Date", "Incident Cause", "Post Code"])?;
        for row in sheet.records() {
            let incident_date = ctx.date(row.cell(date));
            ctx.emit(
                incident_date,
                row.text(cause).map(IncidentType::Text),
                Location::default().postcode(row.text(postcode)),
            );
        }
    }
    Ok(())
}

fn read_eir674(book: &Workbook, ctx: &mut ShapeContext<'_>) -> Result<()> {
    for year in 2021..=2023 {
        let sheet = book.sheet(&year.to_string())?;
        let [date, cause, town] = sheet.require(["Incident Date", "Incident Cause", "Location"])?;
        for row in sheet.records() {
            let incident_date = ctx.date(row.cell(date));
            ctx.emit(
                incident_date,
                row.text(cause).map(IncidentType::Text),
                Location::default().town(row.text(town)),
            );
        }
    }
    Ok(())
}

/// This release carries no incident dates.
fn read_eir641(book: &Workbook, ctx: &mut ShapeContext<'_>) -> Result<()> {
    let sheet = book.sheet("Sheet1")?;
    let [kind, postcode] = sheet.require(["Type", "Post Code"])?;
    for row in sheet.records() {
        ctx.emit(
            None,
            row.text(kind).map(IncidentType::Text),
            Location::default().postcode(row.text(postcode)),
        );
    }
    Ok(())
}
