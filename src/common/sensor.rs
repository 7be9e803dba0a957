use rand::Rng;
use uuid::Uuid;

/// Readings carry the payload version in the identifier so consumers can
/// tell which schema generation produced them.
pub const ID_VERSION_SUFFIX: &str = "-v1";

#[derive(Clone, Debug, PartialEq)]
pub struct SensorReading {
    pub id: String,
    pub acceleration: f32,
    pub velocity: f32,
    pub temperature: f32,
}

impl SensorReading {
    /// A reading with a fresh identifier and randomized measurements.
    /// Acceleration is in [0, 10), velocity in [0, 100) and temperature
    /// in [0, 50).
    pub fn random() -> SensorReading {
        let mut rng = rand::thread_rng();

        SensorReading {
            id: format!("{}{}", Uuid::new_v4(), ID_VERSION_SUFFIX),
            acceleration: rng.gen::<f32>() * 10.0,
            velocity: rng.gen::<f32>() * 100.0,
            temperature: rng.gen::<f32>() * 50.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_measurements_stay_in_range() {
        for _ in 0..1000 {
            let reading = SensorReading::random();

            assert!(reading.acceleration >= 0.0 && reading.acceleration < 10.0);
            assert!(reading.velocity >= 0.0 && reading.velocity < 100.0);
            assert!(reading.temperature >= 0.0 && reading.temperature < 50.0);
        }
    }

    #[test]
    fn identifier_is_a_version_suffixed_uuid() {
        let reading = SensorReading::random();

        let prefix = reading
            .id
            .strip_suffix(ID_VERSION_SUFFIX)
            .expect("identifier should end with the version suffix");

        assert!(Uuid::parse_str(prefix).is_ok());
    }

    #[test]
    fn identifiers_are_unique_between_readings() {
        assert_ne!(SensorReading::random().id, SensorReading::random().id);
    }
}
