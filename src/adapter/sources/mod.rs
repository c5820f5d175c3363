//! One module per publishing organisation.

mod anglian;
mod northumbrian;
mod ofwat;
mod penon;
mod severn_trent;
mod southern;
mod united_utilities;
mod wessex;
mod yorkshire;

pub use anglian::AnglianWater;
pub use northumbrian::NorthumbrianWater;
pub use ofwat::Ofwat;
pub use penon::PenonWater;
pub use severn_trent::SevernTrent;
pub use southern::SouthernWater;
pub use united_utilities::UnitedUtilities;
pub use wessex::WessexWater;
pub use yorkshire::YorkshireWater;

use super::SourceAdapter;

pub fn builtin() -> Vec<Box<dyn SourceAdapter>> {
    vec![
        Box::new(AnglianWater),
        Box::new(NorthumbrianWater),
        Box::new(Ofwat),
        Box::new(PenonWater),
        Box::new(SevernTrent),
        Box::new(SouthernWater),
        Box::new(UnitedUtilities),
        Box::new(WessexWater),
        Box::new(YorkshireWater),
    ]
}
