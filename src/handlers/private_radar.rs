//! Input handler downloading flight paths from a Private Radar server
use super::{ArgCheck, InputHandler};
use crate::config::{Config, PrivateRadarConfig};
use crate::services::{Flight, PrivateRadar};
use crate::track::{Track, TrackSegment};
use crate::Error;
use log::debug;
use std::path::PathBuf;

/// Converts a Private Radar flight into a single-segment track
pub struct PrivateRadarHandler {
    conf: Option<PathBuf>,
    url: Option<String>,
    auth: Option<String>,
    list: bool,
    nb_flights: usize,
    flight_id: Option<i64>,
    config: Config,
    api: Option<PrivateRadar>,
    flight: Option<Flight>,
}

impl PrivateRadarHandler {
    pub fn new(
        conf: Option<PathBuf>,
        url: Option<String>,
        auth: Option<String>,
        list: bool,
        nb_flights: usize,
        flight_id: Option<i64>,
        config: Config,
    ) -> Self {
        PrivateRadarHandler {
            conf,
            url,
            auth,
            list,
            nb_flights,
            flight_id,
            config,
            api: None,
            flight: None,
        }
    }

    /// Resolve the server URL and token, arguments overriding configuration
    fn resolve_credentials(&self) -> Result<(String, String), Error> {
        let file_config: Option<PrivateRadarConfig> = match &self.conf {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::Validation(format!(
                        "configuration file not found: {}",
                        path.display()
                    )));
                }
                debug!("Reading configuration file: {:?}", path);
                Config::load_from_path(path)?.private_radar().cloned()
            }
            None => self.config.private_radar().cloned(),
        };

        let url = self
            .url
            .clone()
            .or_else(|| {
                file_config
                    .as_ref()
                    .and_then(|c| c.base_url().map(str::to_string))
            })
            .ok_or_else(|| {
                Error::Validation("missing Private Radar URL configuration".to_string())
            })?;
        let token = self
            .auth
            .clone()
            .or_else(|| {
                file_config
                    .as_ref()
                    .and_then(|c| c.auth_token().map(str::to_string))
            })
            .ok_or_else(|| {
                Error::Validation("missing Private Radar authentication configuration".to_string())
            })?;

        Ok((url, token))
    }
}

impl InputHandler for PrivateRadarHandler {
    fn id(&self) -> &'static str {
        "private-radar"
    }

    fn description(&self) -> &'static str {
        "Load flights from a Private Radar server"
    }

    fn check_arguments(&mut self) -> Result<ArgCheck, Error> {
        let (url, token) = self.resolve_credentials()?;
        debug!("Using Private Radar URL: {}", url);
        let api = PrivateRadar::new(url, token);

        if self.list {
            // list flights and exit
            for flight in api.list_flights(self.nb_flights, None)? {
                print_flight(&flight);
            }
            return Ok(ArgCheck::EarlyExit(0));
        }

        let flight_id = self
            .flight_id
            .ok_or_else(|| Error::Validation("a flight identifier is required".to_string()))?;
        let flight = api.get_flight(flight_id)?;
        println!("Loaded flight:");
        print_flight(&flight);

        self.api = Some(api);
        self.flight = Some(flight);
        Ok(ArgCheck::Proceed)
    }

    fn default_output_path(&self) -> Option<PathBuf> {
        self.flight.as_ref().map(|flight| {
            PathBuf::from(format!(
                "{}-{}-{}.gpx",
                flight.start.format("%Y-%m-%d"),
                flight.from_icao,
                flight.to_icao
            ))
        })
    }

    fn build_track(&self) -> Result<Track, Error> {
        let api = self
            .api
            .as_ref()
            .ok_or_else(|| Error::Validation("Private Radar API not set up".to_string()))?;
        let flight = self
            .flight
            .as_ref()
            .ok_or_else(|| Error::Validation("no flight loaded".to_string()))?;

        // the server supplies per-point timestamps, no interpolation needed
        let points = api.flight_path(flight.id)?;
        Ok(Track {
            segments: vec![TrackSegment { points }],
        })
    }
}

/// Print a one-block summary of a flight
fn print_flight(flight: &Flight) {
    let sep = if flight.starred { "===" } else { "---" };
    let star = if flight.starred { " (*)" } else { "" };

    println!("{} Flight #{}{} {}", sep, flight.id, star, sep);
    println!("* From.: {}", flight.from_icao);
    println!("* To...: {}", flight.to_icao);
    println!("* Crew.: {}", flight.crew.join(", "));
    println!("* Type.: {}", flight.flight_type);
    println!("* Start: {}", flight.start.format("%Y-%m-%d %H:%M:%S"));
    println!("* End..: {}", flight.end.format("%Y-%m-%d %H:%M:%S"));
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn handler_with(
        url: Option<String>,
        auth: Option<String>,
        config: Config,
    ) -> PrivateRadarHandler {
        PrivateRadarHandler::new(None, url, auth, false, 50, Some(1), config)
    }

    #[test]
    fn test_missing_url_is_a_validation_error() {
        let handler = handler_with(None, Some("token".to_string()), Config::default());
        match handler.resolve_credentials() {
            Err(Error::Validation(msg)) => assert!(msg.contains("URL")),
            other => panic!("expected a validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_token_is_a_validation_error() {
        let handler = handler_with(
            Some("https://radar.example.test".to_string()),
            None,
            Config::default(),
        );
        match handler.resolve_credentials() {
            Err(Error::Validation(msg)) => assert!(msg.contains("authentication")),
            other => panic!("expected a validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_arguments_override_configuration() {
        let mut source = std::io::Cursor::new(
            "private_radar:\n  base_url: https://file.example.test\n  auth_token: file-token\n",
        );
        let config = Config::load(&mut source).unwrap();

        let handler = handler_with(Some("https://flag.example.test".to_string()), None, config);
        let (url, token) = handler.resolve_credentials().unwrap();
        assert_eq!(url, "https://flag.example.test");
        assert_eq!(token, "file-token");
    }

    #[test]
    fn test_missing_explicit_conf_file() {
        let handler = PrivateRadarHandler::new(
            Some(PathBuf::from("missing-config.yml")),
            None,
            None,
            false,
            50,
            Some(1),
            Config::default(),
        );
        match handler.resolve_credentials() {
            Err(Error::Validation(msg)) => assert!(msg.contains("configuration file not found")),
            other => panic!("expected a validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_default_output_path_needs_a_flight() {
        let mut handler = handler_with(None, None, Config::default());
        assert!(handler.default_output_path().is_none());

        handler.flight = Some(Flight {
            id: 1234,
            registration: "F-ABCD".to_string(),
            from_icao: "LFLY".to_string(),
            to_icao: "LFPO".to_string(),
            flight_type: "instr".to_string(),
            start: Utc.ymd(2022, 5, 14).and_hms(9, 12, 0),
            end: Utc.ymd(2022, 5, 14).and_hms(10, 5, 30),
            crew: vec!["Ada Lovelace".to_string()],
            starred: false,
        });
        assert_eq!(
            handler.default_output_path(),
            Some(PathBuf::from("2022-05-14-LFLY-LFPO.gpx"))
        );
    }
}
