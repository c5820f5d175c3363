use crate::adapter::{FileShape, ShapeContext, SourceAdapter};
use crate::process::utils::join_all;
use crate::record::{IncidentType, Location};
use crate::sheet::{Cell, Workbook};
use anyhow::Result;

pub struct NorthumbrianWater;

const SHAPES: &[FileShape] = &[
    FileShape::incidents(
        "EIR22807 Sewer flooding incident data 2010 to 2023.xlsx",
        read_sewer_flooding,
    ),
    FileShape::aggregated("EIR22807 Clean water flooding, incidents by area.xlsx"),
    FileShape::aggregated("EIR22727 Sewer flooding incident data 2021 2022 2023.xlsx"),
    FileShape::aggregated("EIR22727 Clean water flooding incident data 2021 2022 2023.xlsx"),
];

impl SourceAdapter for NorthumbrianWater {
    fn name(&self) -> &'static str {
        "Northumbrian Water"
    }

    fn shapes(&self) -> &'static [FileShape] {
        SHAPES
    }
}

/// Footnote rows carry no date, or a `*`-prefixed note in the date column.
fn is_note(date: &Cell) -> bool {
    match date {
        Cell::Text(s) => s.trim_start().starts_with('*'),
        other => other.is_missing(),
    }
}

fn read_sewer_flooding(book: &Workbook, ctx: &mut ShapeContext<'_>) -> Result<()> {
    let sheet = book.sheet("Sheet1")?;
    let [date, location, cause, postcode] =
        sheet.require(["DATE", "LOCATION", "Cause", "Postcode"])?;

    for row in sheet.records() {
        if is_note(row.cell(date)) {
            continue;
        }
        let incident_date = ctx.date(row.cell(date));
        let incident_type =
            join_all(&[row.text(location), row.text(cause)]).map(IncidentType::Text);
        ctx.emit(
            incident_date,
            incident_type,
            Location::default().postcode(row.text(postcode)),
        );
    }
    Ok(())
}
