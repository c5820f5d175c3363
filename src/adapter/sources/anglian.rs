use crate::adapter::{FileShape, ShapeContext, SourceAdapter};
use crate::process::utils::prefixed;
use crate::process::{LegendTable, LEGEND_COLUMN};
use crate::record::{IncidentType, Location};
use crate::sheet::Workbook;
use anyhow::Result;

pub struct AnglianWater;

const SHAPES: &[FileShape] = &[
    FileShape::incidents("Flooding data 2010 to 2020.xlsx", read_2010_2020),
    FileShape::incidents("2023 data.xlsx", read_2023),
    FileShape::incidents("2nd request data (1).xlsx", read_second_request),
];

impl SourceAdapter for AnglianWater {
    fn name(&self) -> &'static str {
        "Anglian Water"
    }

    fn shapes(&self) -> &'static [FileShape] {
        SHAPES
    }
}

fn read_2010_2020(book: &Workbook, ctx: &mut ShapeContext<'_>) -> Result<()> {
    read_coded(book, ctx, "Data Request")
}

fn read_second_request(book: &Workbook, ctx: &mut ShapeContext<'_>) -> Result<()> {
    read_coded(book, ctx, "Data")
}

/// Releases whose cause column holds legend codes.
fn read_coded(book: &Workbook, ctx: &mut ShapeContext<'_>, data_sheet: &str) -> Result<()> {
    let legend = LegendTable::from_sheet(book.sheet("Legend")?, LEGEND_COLUMN)?;
    let sheet = book.sheet(data_sheet)?;
    let [date, cause, ftype, fsub, city, district] = sheet.require([
        "Incident date",
        "Cause code",
        "Flooding type",
        "Flooding sub type",
        "City",
        "District",
    ])?;

    for row in sheet.records() {
        let incident_date = ctx.date(row.cell(date));
        let incident_type = IncidentType::fields([
            ("cause", Some(legend.resolve_cell(row.cell(cause)))),
            ("flooding_type", prefixed("Type", row.text(ftype))),
            ("flooding_sub_type", prefixed("Sub-type", row.text(fsub))),
        ]);
        let location = Location::default()
            .town(row.text(city))
            .district(row.text(district));
        ctx.emit(incident_date, incident_type, location);
    }
    Ok(())
}

fn read_2023(book: &Workbook, ctx: &mut ShapeContext<'_>) -> Result<()> {
    let sheet = book.sheet("Sheet1")?;
    let [date, category, fsub, postcode, city, district] = sheet.require([
        "Incident date",
        "Category",
        "Flooding Sub Type",
        "First Half Post Code",
        "City",
        "District",
    ])?;

    for row in sheet.records() {
        let incident_date = ctx.date(row.cell(date));
        let incident_type = IncidentType::fields([
            ("category", row.text(category)),
            ("flooding_sub_type", row.text(fsub)),
        ]);
        let location = Location::default()
            .postcode(row.text(postcode))
            .town(row.text(city))
            .district(row.text(district));
        ctx.emit(incident_date, incident_type, location);
    }
    Ok(())
}
