//! Access flight data stored on a Private Radar server
use crate::track::TrackPoint;
use crate::{parse_iso_time, Error};
use chrono::{DateTime, TimeZone, Utc};
use log::{debug, error};
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::{Deserialize, Serialize};

/// Flight kinds requested from the listing endpoint
const FLIGHT_TYPES: &str =
    "solo,solo_sup,solo_only,instr,mcc,exam,tourist,discovery,check,ferry,trip,rental,tow,aoc";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FlightFilter {
    #[serde(rename = "type")]
    filter_type: u8,
    page: u32,
    unit: u32,
    nb_flights: usize,
    flight_types: &'static str,
    aircraft: u32,
    crew: u32,
    show_route: bool,
    show_total_time: bool,
    show_block_time: bool,
    show_airtime: bool,
    show_crew: bool,
    show_map: bool,
    hide_taxi: bool,
    flight_ids: String,
    nb_units: usize,
    date: u32,
    date_from: u32,
    date_to: u32,
}

#[derive(Debug, Serialize)]
struct FlightListRequest {
    filter6: FlightFilter,
}

#[derive(Debug, Serialize)]
struct FlightPathRequest {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct CrewMemberRecord {
    firstname: String,
    lastname: String,
}

#[derive(Debug, Deserialize)]
struct FlightRecord {
    id: i64,
    registration: String,
    #[serde(rename = "from")]
    from_icao: String,
    #[serde(rename = "to")]
    to_icao: String,
    flight_type: String,
    dt_start: String,
    dt_terminated: String,
    crew: Vec<CrewMemberRecord>,
    #[serde(default)]
    starred: bool,
}

#[derive(Debug, Deserialize)]
struct FlightListResponse {
    status: String,
    error: Option<String>,
    #[serde(default)]
    flight_list: Vec<FlightRecord>,
}

#[derive(Debug, Deserialize)]
struct PathNode {
    lon: f64,
    lat: f64,
    alt_m: f64,
    /// milliseconds since the epoch
    time: i64,
}

#[derive(Debug, Deserialize)]
struct FlightPathResponse {
    status: String,
    #[serde(default)]
    flight_profile: Vec<PathNode>,
}

/// Description of a Private Radar flight
#[derive(Clone, Debug)]
pub struct Flight {
    /// Private Radar ID of the flight
    pub id: i64,
    /// Airplane registration number
    pub registration: String,
    /// ICAO code of the departure airport
    pub from_icao: String,
    /// ICAO code of the arrival airport
    pub to_icao: String,
    /// Kind of flight: solo, instr, ...
    pub flight_type: String,
    /// Engine start time
    pub start: DateTime<Utc>,
    /// Engine shut down time
    pub end: DateTime<Utc>,
    /// Names of the crew members
    pub crew: Vec<String>,
    /// Starred flight
    pub starred: bool,
}

impl Flight {
    /// Build a flight from its JSON description
    fn parse(record: FlightRecord) -> Result<Self, Error> {
        let start = parse_iso_time(&record.dt_start)?;
        let end = parse_iso_time(&record.dt_terminated)?;
        let crew = record
            .crew
            .iter()
            .map(|member| format!("{} {}", member.firstname, member.lastname))
            .collect();

        Ok(Flight {
            id: record.id,
            registration: record.registration,
            from_icao: record.from_icao,
            to_icao: record.to_icao,
            flight_type: record.flight_type,
            start,
            end,
            crew,
            starred: record.starred,
        })
    }
}

/// Defines the connection parameters of a Private Radar server
pub struct PrivateRadar {
    base_url: String,
    auth_token: String,
    client: Client,
}

impl PrivateRadar {
    /// Create a client for the given server and authentication token
    pub fn new(base_url: String, auth_token: String) -> Self {
        PrivateRadar {
            base_url,
            auth_token,
            client: Client::new(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    /// List flights known to the server, most recent first.
    ///
    /// With a `flight_id`, the listing is restricted to that exact flight.
    pub fn list_flights(
        &self,
        nb_flights: usize,
        flight_id: Option<i64>,
    ) -> Result<Vec<Flight>, Error> {
        let (filter_type, flight_ids) = match flight_id {
            Some(id) => (5, id.to_string()),
            None => (1, String::new()),
        };
        let request = FlightListRequest {
            filter6: FlightFilter {
                filter_type,
                page: 1,
                unit: 0,
                nb_flights,
                flight_types: FLIGHT_TYPES,
                aircraft: 0,
                crew: 0,
                show_route: true,
                show_total_time: true,
                show_block_time: true,
                show_airtime: true,
                show_crew: true,
                show_map: true,
                hide_taxi: true,
                flight_ids,
                nb_units: nb_flights,
                date: 0,
                date_from: 0,
                date_to: 0,
            },
        };

        debug!("Requesting up to {} flights", nb_flights);
        let response = self
            .client
            .post(&self.endpoint("prwsw/flight/getFlightsFilter6"))
            .header(AUTHORIZATION, self.auth_token.as_str())
            .header(ACCEPT, "application/json, text/plain, */*")
            .json(&request)
            .send()?
            .error_for_status()
            .map_err(|err| {
                error!("Error getting the list of flights: {}", err);
                err
            })?;

        let payload: FlightListResponse = response.json()?;
        if payload.status != "success" {
            let reason = payload.error.unwrap_or_else(|| "n/a".to_string());
            error!("Error retrieving flights: {}", reason);
            return Err(Error::Api(format!("error retrieving flights: {}", reason)));
        }

        payload.flight_list.into_iter().map(Flight::parse).collect()
    }

    /// Return the description of the given flight.
    ///
    /// Non-negative identifiers select that exact flight; negative ones count
    /// back from the most recent flight (-1 is the latest).
    pub fn get_flight(&self, flight_id: i64) -> Result<Flight, Error> {
        if flight_id >= 0 {
            self.list_flights(100, Some(flight_id))?
                .into_iter()
                .next()
                .ok_or_else(|| Error::Api(format!("no flight found with id {}", flight_id)))
        } else {
            let nb_flights = flight_id.unsigned_abs() as usize;
            self.list_flights(nb_flights, None)?
                .into_iter()
                .nth(nb_flights - 1)
                .ok_or_else(|| {
                    Error::Api(format!("no flight found at position {}", nb_flights))
                })
        }
    }

    /// Retrieve the recorded path of the given flight
    pub fn flight_path(&self, flight_id: i64) -> Result<Vec<TrackPoint>, Error> {
        let response = self
            .client
            .post(&self.endpoint("prwsw/flight/get_path"))
            .header(AUTHORIZATION, self.auth_token.as_str())
            .header(ACCEPT, "application/json, text/plain, */*")
            .json(&FlightPathRequest { id: flight_id })
            .send()?
            .error_for_status()
            .map_err(|err| {
                error!("Error getting path for flight {}: {}", flight_id, err);
                err
            })?;

        let payload: FlightPathResponse = response.json()?;
        if payload.status != "success" {
            error!("Error getting flight {}", flight_id);
            return Err(Error::Api(format!(
                "server-side error getting flight {}",
                flight_id
            )));
        }

        payload.flight_profile.iter().map(path_point).collect()
    }
}

/// Convert a flight profile node into a timestamped track point
fn path_point(node: &PathNode) -> Result<TrackPoint, Error> {
    let time = Utc
        .timestamp_millis_opt(node.time)
        .single()
        .ok_or_else(|| Error::Format(format!("invalid flight path timestamp: {}", node.time)))?;

    let mut point = TrackPoint::new(node.lon, node.lat, node.alt_m);
    point.set_time(time);
    Ok(point)
}
