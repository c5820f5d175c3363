use crate::adapter::{FileShape, ShapeContext, SourceAdapter};
use crate::process::utils::join_all;
use crate::record::{IncidentType, Location};
use crate::sheet::{Sheet, Workbook};
use anyhow::Result;

pub struct YorkshireWater;

const SHAPES: &[FileShape] = &[
    FileShape::incidents("EIR 937.xlsx", read_eir937),
    FileShape::incidents("EIR 996.xlsx", read_eir996),
];

impl SourceAdapter for YorkshireWater {
    fn name(&self) -> &'static str {
        "Yorkshire Water"
    }

    fn shapes(&self) -> &'static [FileShape] {
        SHAPES
    }
}

fn read_eir937(book: &Workbook, ctx: &mut ShapeContext<'_>) -> Result<()> {
    let sheet = book.sheet("Sheet1")?;
    let cols = sheet.require([
        "Inc date",
        "Flooding source",
        "Int/Ext",
        "Curtilage/Non-Curtilage",
        "Postcode Prefix",
        "Town",
    ])?;
    read_rows(sheet, ctx, cols);
    Ok(())
}

/// Same content as EIR 937 under recapitalised headers, plus `RTU` rows.
fn read_eir996(book: &Workbook, ctx: &mut ShapeContext<'_>) -> Result<()> {
    let sheet = book.sheet("EIR 966 Final")?;
    let cols = sheet.require([
        "Inc Date",
        "Flooding Source",
        "Int/Ext/RTU",
        "Curtilage/Non Curtilage",
        "Postcode Prefix",
        "Town",
    ])?;
    read_rows(sheet, ctx, cols);
    Ok(())
}

fn read_rows(sheet: &Sheet, ctx: &mut ShapeContext<'_>, cols: [usize; 6]) {
    let [date, source, int_ext, curtilage, postcode, town] = cols;
    for row in sheet.records() {
        let incident_date = ctx.date(row.cell(date));
        let incident_type = join_all(&[row.text(source), row.text(int_ext), row.text(curtilage)])
            .map(IncidentType::Text);
        let location = Location::default()
            .postcode(row.text(postcode))
            .town(row.text(town));
        ctx.emit(incident_date, incident_type, location);
    }
}
