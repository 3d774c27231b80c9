//! Single-shot device location lookups, always bounded by a timeout.

use std::fmt;
use std::process::Command;
use std::str::FromStr;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use crate::config::Config;
use crate::errors::LocationError;

/// Latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, LocationError> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);
        if valid {
            Ok(Self {
                latitude,
                longitude,
            })
        } else {
            Err(LocationError::Failed(format!(
                "coordinates out of range: {latitude}, {longitude}"
            )))
        }
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5}, {:.5}", self.latitude, self.longitude)
    }
}

impl FromStr for Coordinates {
    type Err = LocationError;

    /// Accepts `lat,lng` with optional whitespace around either part.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid =
            || LocationError::Failed(format!("expected `lat, lng`, got `{}`", raw.trim()));
        let (lat, lng) = raw.split_once(',').ok_or_else(invalid)?;
        let latitude = lat.trim().parse::<f64>().map_err(|_| invalid())?;
        let longitude = lng.trim().parse::<f64>().map_err(|_| invalid())?;
        Coordinates::new(latitude, longitude)
    }
}

/// Source of the device position.
pub trait LocationProvider: Send + Sync {
    fn locate(&self) -> Result<Coordinates, LocationError>;
}

/// Always answers with the same position.
pub struct FixedLocation(pub Coordinates);

impl LocationProvider for FixedLocation {
    fn locate(&self) -> Result<Coordinates, LocationError> {
        Ok(self.0)
    }
}

/// Used when nothing is configured.
pub struct NoLocation;

impl LocationProvider for NoLocation {
    fn locate(&self) -> Result<Coordinates, LocationError> {
        Err(LocationError::Unavailable)
    }
}

/// Runs an external command and parses `lat,lng` from the first line of its
/// standard output.
pub struct CommandLocation {
    program: String,
    args: Vec<String>,
}

impl CommandLocation {
    pub fn parse(command_line: &str) -> Result<Self, LocationError> {
        let mut parts = shell_words::split(command_line)
            .map_err(|err| LocationError::Failed(format!("invalid location command: {err}")))?
            .into_iter();
        let program = parts.next().ok_or(LocationError::Unavailable)?;
        Ok(Self {
            program,
            args: parts.collect(),
        })
    }
}

impl LocationProvider for CommandLocation {
    fn locate(&self) -> Result<Coordinates, LocationError> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .output()
            .map_err(|err| LocationError::Failed(format!("{}: {err}", self.program)))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(LocationError::Denied(stderr.trim().to_string()));
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        stdout.lines().next().unwrap_or_default().parse()
    }
}

/// Picks the provider described by the configuration: an explicit command
/// wins over a fixed position.
pub fn provider_from_config(config: &Config) -> Arc<dyn LocationProvider> {
    if let Some(command) = config.location_command.as_deref() {
        match CommandLocation::parse(command) {
            Ok(provider) => return Arc::new(provider),
            Err(err) => tracing::warn!(error = %err, "ignoring location_command"),
        }
    }
    if let Some(fixed) = config.default_location.as_deref() {
        match fixed.parse::<Coordinates>() {
            Ok(coords) => return Arc::new(FixedLocation(coords)),
            Err(err) => tracing::warn!(error = %err, "ignoring default_location"),
        }
    }
    Arc::new(NoLocation)
}

/// Queries `provider` on a worker thread and waits at most `timeout`. A
/// provider that outlives the timeout is abandoned; its late answer is
/// discarded.
pub fn request_location(
    provider: Arc<dyn LocationProvider>,
    timeout: Duration,
) -> Result<Coordinates, LocationError> {
    let (sender, receiver) = mpsc::channel();
    thread::Builder::new()
        .name("quicklog-locate".into())
        .spawn(move || {
            // The receiver is gone after a timeout.
            let _ = sender.send(provider.locate());
        })
        .map_err(|err| LocationError::Failed(err.to_string()))?;

    match receiver.recv_timeout(timeout) {
        Ok(result) => {
            if let Err(err) = &result {
                tracing::warn!(error = %err, "location request failed");
            }
            result
        }
        Err(mpsc::RecvTimeoutError::Timeout) => {
            tracing::warn!(?timeout, "location request timed out");
            Err(LocationError::TimedOut(timeout))
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => {
            Err(LocationError::Failed("location worker stopped unexpectedly".into()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct SlowLocation(Duration);

    impl LocationProvider for SlowLocation {
        fn locate(&self) -> Result<Coordinates, LocationError> {
            thread::sleep(self.0);
            Coordinates::new(0.0, 0.0)
        }
    }

    #[test]
    fn coordinates_format_with_five_decimals() {
        let coords = Coordinates::new(-6.2, 106.816666).unwrap();
        assert_eq!(coords.to_string(), "-6.20000, 106.81667");
    }

    #[test]
    fn coordinates_parse_and_validate_ranges() {
        let parsed: Coordinates = " -6.2 ,106.8 ".parse().unwrap();
        assert_eq!(parsed, Coordinates::new(-6.2, 106.8).unwrap());
        assert!("91, 0".parse::<Coordinates>().is_err());
        assert!("0, 181".parse::<Coordinates>().is_err());
        assert!("somewhere".parse::<Coordinates>().is_err());
        assert!("NaN, 1".parse::<Coordinates>().is_err());
    }

    #[test]
    fn fixed_provider_answers_within_timeout() {
        let coords = Coordinates::new(1.0, 2.0).unwrap();
        let result = request_location(Arc::new(FixedLocation(coords)), Duration::from_secs(1));
        assert_eq!(result, Ok(coords));
    }

    #[test]
    fn missing_provider_reports_unavailable() {
        let result = request_location(Arc::new(NoLocation), Duration::from_secs(1));
        assert_eq!(result, Err(LocationError::Unavailable));
    }

    #[test]
    fn slow_provider_times_out() {
        let timeout = Duration::from_millis(50);
        let result = request_location(Arc::new(SlowLocation(Duration::from_secs(2))), timeout);
        assert_eq!(result, Err(LocationError::TimedOut(timeout)));
    }

    #[test]
    fn config_selects_provider() {
        let mut config = Config::default();
        let provider = provider_from_config(&config);
        assert_eq!(provider.locate(), Err(LocationError::Unavailable));

        config.default_location = Some("-6.2, 106.8".into());
        let provider = provider_from_config(&config);
        assert_eq!(provider.locate().map(|c| c.to_string()).as_deref(), Ok("-6.20000, 106.80000"));
    }

    #[test]
    fn command_line_is_split_shell_style() {
        let provider = CommandLocation::parse("echo '1.5, 2.5'").unwrap();
        assert_eq!(provider.program, "echo");
        assert_eq!(provider.args, vec!["1.5, 2.5".to_string()]);
        assert!(CommandLocation::parse("").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn command_provider_reads_stdout() {
        let provider = CommandLocation::parse("echo '1.5, 2.5'").unwrap();
        assert_eq!(provider.locate(), Coordinates::new(1.5, 2.5));
    }
}
