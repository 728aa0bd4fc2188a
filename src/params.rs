use std::convert::TryFrom;

use crate::error::Error;

/// Print parameters reported by the host.
///
/// Values are kept as the host hands them over and are only checked
/// against their header widths when a header is built, see
/// [`Encoder::header`](crate::Encoder::header).
///
/// # Example
///
/// ```
/// use xgcode::PrintParams;
///
/// let params = PrintParams::new(5400, 3.25)
///     .shell_count(2)
///     .print_speed(60)
///     .bed_temperature(60)
///     .extruder_temperature(210);
///
/// assert_eq!(params.filament_length_mm().unwrap(), 3250);
/// assert_eq!(params.resolved_extruder2_temperature().unwrap(), 210);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PrintParams {
    print_time: u64,
    filament_lengths: Vec<f64>,
    shell_count: u32,
    print_speed: u32,
    bed_temperature: i32,
    extruder1_temperature: i32,
    extruder2_temperature: Option<i32>,
}

impl PrintParams {
    /// Start with the estimated print time in seconds and the filament
    /// length in metres. Everything else defaults to zero and a single
    /// extruder.
    pub fn new(print_time: u64, filament_length: f64) -> PrintParams {
        PrintParams {
            print_time,
            filament_lengths: vec![filament_length],
            shell_count: 0,
            print_speed: 0,
            bed_temperature: 0,
            extruder1_temperature: 0,
            extruder2_temperature: None,
        }
    }

    /// Replace the filament length with per-extruder lengths in metres.
    /// They are summed into one header value.
    pub fn filament_lengths(self, lengths: &[f64]) -> Self {
        PrintParams {
            filament_lengths: lengths.to_vec(),
            ..self
        }
    }

    pub fn shell_count(self, shell_count: u32) -> Self {
        PrintParams {
            shell_count,
            ..self
        }
    }

    pub fn print_speed(self, print_speed: u32) -> Self {
        PrintParams {
            print_speed,
            ..self
        }
    }

    pub fn bed_temperature(self, bed_temperature: i32) -> Self {
        PrintParams {
            bed_temperature,
            ..self
        }
    }

    /// Temperature of the first extruder.
    pub fn extruder_temperature(self, temperature: i32) -> Self {
        PrintParams {
            extruder1_temperature: temperature,
            ..self
        }
    }

    /// Temperature of the second extruder. Without it the header repeats
    /// the first extruder's temperature.
    pub fn extruder2_temperature(self, temperature: i32) -> Self {
        PrintParams {
            extruder2_temperature: Some(temperature),
            ..self
        }
    }

    /// Set extruder temperatures from a list of active extruders.
    ///
    /// The first entry drives extruder 1 and the second, if any, extruder 2.
    /// Further entries are ignored since the header has no slot for them.
    /// An empty list leaves the temperatures unchanged.
    pub fn extruder_temperatures(self, temperatures: &[i32]) -> Self {
        match temperatures {
            [] => self,
            [first] => PrintParams {
                extruder1_temperature: *first,
                extruder2_temperature: None,
                ..self
            },
            [first, second, ..] => PrintParams {
                extruder1_temperature: *first,
                extruder2_temperature: Some(*second),
                ..self
            },
        }
    }

    pub fn print_time_secs(&self) -> Result<u32, Error> {
        u32::try_from(self.print_time)
            .map_err(|_| Error::invalid_parameter("print_time", self.print_time))
    }

    /// Total filament length in whole millimetres, rounded down.
    pub fn filament_length_mm(&self) -> Result<u32, Error> {
        for length in &self.filament_lengths {
            if !length.is_finite() || *length < 0.0 {
                return Err(Error::invalid_parameter("filament_length", length));
            }
        }

        let meters: f64 = self.filament_lengths.iter().sum();
        let millimeters = (meters * 1000.0).floor();
        if millimeters > f64::from(u32::MAX) {
            return Err(Error::invalid_parameter("filament_length", meters));
        }

        Ok(millimeters as u32)
    }

    pub fn shell_count_u16(&self) -> Result<u16, Error> {
        narrow("shell_count", self.shell_count)
    }

    pub fn print_speed_u16(&self) -> Result<u16, Error> {
        narrow("print_speed", self.print_speed)
    }

    pub fn bed_temperature_u16(&self) -> Result<u16, Error> {
        narrow("bed_temperature", self.bed_temperature)
    }

    pub fn extruder1_temperature_u16(&self) -> Result<u16, Error> {
        narrow("extruder1_temperature", self.extruder1_temperature)
    }

    /// Second extruder temperature, falling back to the first extruder.
    pub fn resolved_extruder2_temperature(&self) -> Result<u16, Error> {
        match self.extruder2_temperature {
            Some(temperature) => narrow("extruder2_temperature", temperature),
            None => self.extruder1_temperature_u16(),
        }
    }
}

fn narrow<T>(name: &'static str, value: T) -> Result<u16, Error>
where
    T: Copy + ToString,
    u16: TryFrom<T>,
{
    u16::try_from(value).map_err(|_| Error::invalid_parameter(name, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filament_is_truncated_to_millimeters() {
        assert_eq!(PrintParams::new(0, 1.2345).filament_length_mm().unwrap(), 1234);
        assert_eq!(PrintParams::new(0, 0.5).filament_length_mm().unwrap(), 500);
        assert_eq!(PrintParams::new(0, 0.0).filament_length_mm().unwrap(), 0);
        assert_eq!(PrintParams::new(0, 0.0009).filament_length_mm().unwrap(), 0);
    }

    #[test]
    fn filament_lengths_are_summed() {
        let params = PrintParams::new(0, 0.0).filament_lengths(&[1.5, 0.25]);
        assert_eq!(params.filament_length_mm().unwrap(), 1750);

        let params = PrintParams::new(0, 7.0).filament_lengths(&[]);
        assert_eq!(params.filament_length_mm().unwrap(), 0);
    }

    #[test]
    fn rejects_unusable_filament_lengths() {
        for length in [-0.1, f64::NAN, f64::INFINITY, 5_000_000.0].iter() {
            match PrintParams::new(0, *length).filament_length_mm() {
                Err(Error::InvalidParameter { name, .. }) => assert_eq!(name, "filament_length"),
                other => panic!("unexpected result for {}: {:?}", length, other),
            }
        }
    }

    #[test]
    fn second_extruder_mirrors_first_when_absent() {
        let params = PrintParams::new(0, 0.0).extruder_temperature(205);
        assert_eq!(params.resolved_extruder2_temperature().unwrap(), 205);

        let params = params.extruder2_temperature(190);
        assert_eq!(params.resolved_extruder2_temperature().unwrap(), 190);
    }

    #[test]
    fn extruder_list_sets_both_slots() {
        let params = PrintParams::new(0, 0.0).extruder_temperatures(&[200, 220, 240]);
        assert_eq!(params.extruder1_temperature_u16().unwrap(), 200);
        assert_eq!(params.resolved_extruder2_temperature().unwrap(), 220);

        let params = params.extruder_temperatures(&[230]);
        assert_eq!(params.extruder1_temperature_u16().unwrap(), 230);
        assert_eq!(params.resolved_extruder2_temperature().unwrap(), 230);

        let params = params.extruder_temperatures(&[]);
        assert_eq!(params.extruder1_temperature_u16().unwrap(), 230);
    }

    #[test]
    fn out_of_range_scalars_are_rejected() {
        let params = PrintParams::new(u64::from(u32::MAX) + 1, 0.0)
            .shell_count(70_000)
            .print_speed(65_536)
            .bed_temperature(-1)
            .extruder_temperature(65_536);

        assert!(params.print_time_secs().is_err());
        assert!(params.shell_count_u16().is_err());
        assert!(params.print_speed_u16().is_err());
        assert!(params.bed_temperature_u16().is_err());
        assert!(params.extruder1_temperature_u16().is_err());
        assert!(params.resolved_extruder2_temperature().is_err());
    }

    #[test]
    fn invalid_parameter_names_the_field() {
        let err = PrintParams::new(0, 0.0)
            .bed_temperature(-5)
            .bed_temperature_u16()
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid print parameter bed_temperature: -5");
    }
}
