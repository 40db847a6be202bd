//! Closed vocabularies shared with the SUMO toolchain
//!
//! Parameters arrive as small integer codes (that is how the experiment
//! space addresses them), while the XML files need the tag SUMO expects.

use anyhow::{bail, Result};

/// Declares a closed enumeration addressed by integer code.
macro_rules! coded_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $label:literal {
            $($variant:ident = ($code:literal, $tag:literal)),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Looks up a variant by its integer code
            pub fn from_code(code: u32) -> Result<Self> {
                match code {
                    $($code => Ok($name::$variant),)+
                    _ => bail!("Specified {} {} is not supported", $label, code),
                }
            }

            pub fn code(self) -> u32 {
                match self {
                    $($name::$variant => $code),+
                }
            }

            /// The attribute value SUMO understands
            pub fn tag(self) -> &'static str {
                match self {
                    $($name::$variant => $tag),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.tag())
            }
        }
    };
}

coded_enum! {
    /// How traffic is regulated at a junction.
    /// See <https://sumo.dlr.de/docs/Networks/PlainXML.html#node_descriptions>
    JunctionType, "junctionType" {
        Priority = (1, "priority"),
        TrafficLight = (2, "traffic_light"),
        TrafficLightUnregulated = (3, "traffic_light_unregulated"),
        TrafficLightRightOnRed = (4, "traffic_light_right_on_red"),
        RightBeforeLeft = (5, "right_before_left"),
        Unregulated = (6, "unregulated"),
        PriorityStop = (7, "priority_stop"),
        AllwayStop = (8, "allway_stop"),
    }
}

coded_enum! {
    /// Traffic light control algorithm
    TrafficLightType, "tlType" {
        Static = (1, "static"),
        Actuated = (2, "actuated"),
        DelayBased = (3, "delay_based"),
    }
}

coded_enum! {
    /// Phase layout of a generated traffic light plan
    TrafficLightLayout, "tlLayout" {
        Opposites = (1, "opposites"),
        Incoming = (2, "incoming"),
        AlternateOneWay = (3, "alternateOneWay"),
    }
}

coded_enum! {
    /// Edge types declared in `edge_types.typ.xml`
    EdgeType, "edgeType" {
        NormalRoad = (1, "normal_road"),
        NormalRoad2Lanes = (2, "normal_road_2lanes"),
        NormalRoad3Lanes = (3, "normal_road_3lanes"),
        NormalRoad4Lanes = (4, "normal_road_4lanes"),
    }
}

coded_enum! {
    /// Abstract vehicle class.
    /// See <https://sumo.dlr.de/docs/Definition_of_Vehicles,_Vehicle_Types,_and_Routes.html#abstract_vehicle_class>
    VehicleClass, "vehicleClass" {
        Passenger = (1, "passenger"),
        Pedestrian = (2, "pedestrian"),
        Emergency = (3, "emergency"),
        Authority = (4, "authority"),
        Bicycle = (5, "bicycle"),
        Truck = (6, "truck"),
    }
}

coded_enum! {
    /// See <https://sumo.dlr.de/docs/Models/Emissions.html>
    EmissionClass, "emissionClass" {
        Zero = (1, "Zero"),
        Energy = (2, "Energy"),
        PcGEu4 = (3, "HBEFA3/PC_G_EU4"),
    }
}

impl EdgeType {
    /// Lane count declared for this type in the types file
    pub fn num_lanes(self) -> u32 {
        match self {
            EdgeType::NormalRoad => 1,
            EdgeType::NormalRoad2Lanes => 2,
            EdgeType::NormalRoad3Lanes => 3,
            EdgeType::NormalRoad4Lanes => 4,
        }
    }
}
