//! Aggregates harvested from the simulator's XML reports

use anyhow::{bail, Context, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Emission values summed over every per-vehicle sample of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EmissionTotals {
    #[serde(rename = "CO")]
    pub co: f64,
    #[serde(rename = "CO2")]
    pub co2: f64,
    #[serde(rename = "HC")]
    pub hc: f64,
    #[serde(rename = "NOx")]
    pub nox: f64,
    #[serde(rename = "PMx")]
    pub pmx: f64,
    pub fuel: f64,
    pub noise: f64,
    pub num_emissions_samples: u64,
}

/// Averages reported in `<vehicleTripStatistics>`
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripStatistics {
    pub depart_delay: f64,
    pub depart_delay_waiting: f64,
    pub duration: f64,
    pub route_length: f64,
    pub speed: f64,
    pub time_loss: f64,
    pub waiting_time: f64,
}

/// Everything one simulation run reports, as a flat record
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    #[serde(flatten)]
    pub emissions: EmissionTotals,
    #[serde(flatten)]
    pub statistics: TripStatistics,
}

impl SimulationResult {
    /// Flat name → value mapping, keyed like the report attributes
    pub fn to_map(&self) -> Result<BTreeMap<String, f64>> {
        let value = serde_json::to_value(self)?;
        let object = value
            .as_object()
            .context("Simulation result did not serialize to an object")?;
        object
            .iter()
            .map(|(key, value)| -> Result<(String, f64)> {
                let number = value
                    .as_f64()
                    .with_context(|| format!("{} is not numeric", key))?;
                Ok((key.clone(), number))
            })
            .collect()
    }
}

/// Calls `visit` with the attributes of every element named `name`
fn for_each_element(
    path: &Path,
    name: &str,
    mut visit: impl FnMut(&HashMap<String, String>) -> Result<()>,
) -> Result<()> {
    let mut reader =
        Reader::from_file(path).with_context(|| format!("Couldn't open {}", path.display()))?;
    reader.trim_text(true);

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.name().as_ref() == name.as_bytes() => {
                visit(&attributes(&e)?)?;
            }
            Ok(Event::Eof) => break,
            Err(e) => bail!(
                "XML error in {} at position {}: {}",
                path.display(),
                reader.buffer_position(),
                e
            ),
            _ => {}
        }
        buf.clear();
    }
    Ok(())
}

fn attributes(element: &BytesStart) -> Result<HashMap<String, String>> {
    let mut map = HashMap::new();
    for attribute in element.attributes() {
        let attribute = attribute?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let value = attribute.unescape_value()?.into_owned();
        map.insert(key, value);
    }
    Ok(map)
}

fn number(attributes: &HashMap<String, String>, element: &str, key: &str) -> Result<f64> {
    let raw = attributes
        .get(key)
        .with_context(|| format!("<{}> is missing the {} attribute", element, key))?;
    raw.parse::<f64>()
        .with_context(|| format!("<{}> has non-numeric {}=\"{}\"", element, key, raw))
}

/// Sums the per-vehicle samples of an `--emission-output` file
pub fn parse_emissions(path: &Path) -> Result<EmissionTotals> {
    let mut totals = EmissionTotals::default();
    for_each_element(path, "vehicle", |sample| {
        totals.co += number(sample, "vehicle", "CO")?;
        totals.co2 += number(sample, "vehicle", "CO2")?;
        totals.hc += number(sample, "vehicle", "HC")?;
        totals.nox += number(sample, "vehicle", "NOx")?;
        totals.pmx += number(sample, "vehicle", "PMx")?;
        totals.fuel += number(sample, "vehicle", "fuel")?;
        totals.noise += number(sample, "vehicle", "noise")?;
        totals.num_emissions_samples += 1;
        Ok(())
    })?;
    Ok(totals)
}

/// Reads the single `<vehicleTripStatistics>` element of a
/// `--statistics-output` file
pub fn parse_statistics(path: &Path) -> Result<TripStatistics> {
    const ELEMENT: &str = "vehicleTripStatistics";

    let mut found = None;
    for_each_element(path, ELEMENT, |stat| {
        if found.is_none() {
            found = Some(TripStatistics {
                depart_delay: number(stat, ELEMENT, "departDelay")?,
                depart_delay_waiting: number(stat, ELEMENT, "departDelayWaiting")?,
                duration: number(stat, ELEMENT, "duration")?,
                route_length: number(stat, ELEMENT, "routeLength")?,
                speed: number(stat, ELEMENT, "speed")?,
                time_loss: number(stat, ELEMENT, "timeLoss")?,
                waiting_time: number(stat, ELEMENT, "waitingTime")?,
            });
        }
        Ok(())
    })?;

    found.with_context(|| format!("No <{}> element in {}", ELEMENT, path.display()))
}

/// Parses both reports of a finished run
pub fn parse_results(emissions: &Path, statistics: &Path) -> Result<SimulationResult> {
    Ok(SimulationResult {
        emissions: parse_emissions(emissions)?,
        statistics: parse_statistics(statistics)?,
    })
}
