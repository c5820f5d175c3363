use crate::adapter::{FileShape, ShapeContext, SourceAdapter};
use crate::process::utils::{join_all, prefixed};
use crate::process::{LegendTable, LEGEND_COLUMN, UNKNOWN};
use crate::record::{IncidentType, Location};
use crate::sheet::Workbook;
use anyhow::Result;

/// Southern Water, including the Southwest Water releases filed with it.
pub struct SouthernWater;

const SHAPES: &[FileShape] = &[
    FileShape::incidents("2023 Sewer Incidents.xlsx", read_sewer_incidents_2023),
    FileShape::incidents("Southwest Water/EIR24187.xlsx", read_southwest_2023),
    FileShape::incidents(
        "Southwest Water/2nd request/1405 Flooding data.xlsx",
        read_southwest_historical,
    ),
];

impl SourceAdapter for SouthernWater {
    fn name(&self) -> &'static str {
        "Southern Water"
    }

    fn shapes(&self) -> &'static [FileShape] {
        SHAPES
    }
}

fn or_unknown(cause: Option<String>) -> Option<IncidentType> {
    Some(IncidentType::Text(cause.unwrap_or_else(|| UNKNOWN.to_string())))
}

fn read_sewer_incidents_2023(book: &Workbook, ctx: &mut ShapeContext<'_>) -> Result<()> {
    for name in ["Sewer Incidents 2023", "suspicious (louis)"] {
        let sheet = book.sheet(name)?;
        let [date, cause, postcode, town, county] = sheet.require([
            "Incident_Date",
            "Cause",
            "Post Code Short",
            "posttown",
            "county",
        ])?;
        for row in sheet.records() {
            let incident_date = ctx.compact_date(row.cell(date));
            let location = Location::default()
                .postcode(row.text(postcode))
                .town(row.text(town))
                .county(row.text(county));
            ctx.emit(incident_date, or_unknown(row.text(cause)), location);
        }
    }
    Ok(())
}

fn read_southwest_2023(book: &Workbook, ctx: &mut ShapeContext<'_>) -> Result<()> {
    let sheet = book.sheet("Data")?;
    let [date, cause, postcode, town] =
        sheet.require(["Date Raised", "Feedback Cause", "Postcode", "Town/City"])?;
    for row in sheet.records() {
        let incident_date = ctx.date(row.cell(date));
        let location = Location::default()
            .postcode(row.text(postcode))
            .town(row.text(town));
        ctx.emit(incident_date, or_unknown(row.text(cause)), location);
    }
    Ok(())
}

fn read_southwest_historical(book: &Workbook, ctx: &mut ShapeContext<'_>) -> Result<()> {
    let legend = LegendTable::from_sheet(book.sheet("Legend")?, LEGEND_COLUMN)?;
    let sheet = book.sheet("Data")?;
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
        let incident_type = join_all(&[
            Some(legend.resolve_cell(row.cell(cause))),
            prefixed("Type", row.text(ftype)),
            prefixed("Sub-type", row.text(fsub)),
        ])
        .map(IncidentType::Text);
        let location = Location::default()
            .town(row.text(city))
            .district(row.text(district));
        ctx.emit(incident_date, incident_type, location);
    }
    Ok(())
}
