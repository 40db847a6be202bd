//! Vehicle types written to the SUMO "additional" file.
//! See <https://sumo.dlr.de/docs/Definition_of_Vehicles,_Vehicle_Types,_and_Routes.html#available_vtype_attributes>

use anyhow::Result;
use std::path::Path;

use crate::network::{EmissionClass, VehicleClass};
use crate::xml::{write_file, XmlDocument};

/// A named bundle of vehicle attributes
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleType {
    pub id: String,
    pub vehicle_class: VehicleClass,
    pub emission_class: EmissionClass,
    /// m/s^2
    pub accel: f64,
    /// m/s^2
    pub decel: f64,
    /// m/s
    pub max_speed: f64,
    /// Expected multiplier for lane speed limits
    pub speed_factor: f64,
    /// Deviation of `speed_factor`
    pub speed_dev: f64,
}

impl VehicleType {
    pub fn new(
        id: impl Into<String>,
        vehicle_class: VehicleClass,
        emission_class: EmissionClass,
    ) -> Self {
        Self {
            id: id.into(),
            vehicle_class,
            emission_class,
            accel: 2.6,
            decel: 4.5,
            max_speed: 55.55,
            speed_factor: 1.0,
            speed_dev: 0.1,
        }
    }

    /// Builds a vehicle type from the integer codes used in experiment spaces
    pub fn from_codes(id: impl Into<String>, vehicle_class: u32, emission_class: u32) -> Result<Self> {
        Ok(Self::new(
            id,
            VehicleClass::from_code(vehicle_class)?,
            EmissionClass::from_code(emission_class)?,
        ))
    }

    pub fn with_accel(mut self, accel: f64) -> Self {
        self.accel = accel;
        self
    }

    pub fn with_decel(mut self, decel: f64) -> Self {
        self.decel = decel;
        self
    }

    pub fn with_max_speed(mut self, max_speed: f64) -> Self {
        self.max_speed = max_speed;
        self
    }

    pub fn with_speed_factor(mut self, speed_factor: f64) -> Self {
        self.speed_factor = speed_factor;
        self
    }

    pub fn with_speed_dev(mut self, speed_dev: f64) -> Self {
        self.speed_dev = speed_dev;
        self
    }

    fn attributes(&self) -> [(&'static str, String); 8] {
        [
            ("id", self.id.clone()),
            ("vClass", self.vehicle_class.tag().to_string()),
            ("emissionClass", self.emission_class.tag().to_string()),
            ("accel", self.accel.to_string()),
            ("decel", self.decel.to_string()),
            ("maxSpeed", self.max_speed.to_string()),
            ("speedFactor", self.speed_factor.to_string()),
            ("speedDev", self.speed_dev.to_string()),
        ]
    }
}

/// Renders an `<additional>` document with one `<vType>` per vehicle type
pub fn additional_xml(vehicle_types: &[VehicleType]) -> Result<String> {
    let mut doc = XmlDocument::new()?;
    doc.open("additional", &[])?;
    for vehicle_type in vehicle_types {
        doc.empty("vType", &vehicle_type.attributes())?;
    }
    doc.close("additional")?;
    doc.finish()
}

pub fn write_additional(path: &Path, vehicle_types: &[VehicleType]) -> Result<()> {
    write_file(path, &additional_xml(vehicle_types)?)
}
