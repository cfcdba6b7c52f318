//! Defines the general error type for the crate and various conversions into it
use std::convert;
use std::fmt;

/// General error type for the crate
#[derive(Debug)]
pub enum Error {
    /// Malformed or unsupported KML content (bad namespace, altitude mode or token)
    Format(String),
    /// The document is not well-formed XML
    Xml(quick_xml::Error),
    /// No placemark carries the requested layer name
    LayerNotFound(String),
    /// Invalid combination of externally supplied options
    Validation(String),
    /// The Private Radar server reported a failure
    Api(String),
    /// Transport-level failure of a Private Radar call
    Request(reqwest::Error),
    Gpx(gpx::errors::GpxError),
    Io(std::io::Error),
    TimeParse(chrono::ParseError),
    Config(serde_yaml::Error),
}

impl convert::From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Error {
        Error::Xml(err)
    }
}

impl convert::From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Error {
        Error::Request(err)
    }
}

impl convert::From<gpx::errors::GpxError> for Error {
    fn from(err: gpx::errors::GpxError) -> Error {
        Error::Gpx(err)
    }
}

impl convert::From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

impl convert::From<chrono::ParseError> for Error {
    fn from(err: chrono::ParseError) -> Error {
        Error::TimeParse(err)
    }
}

impl convert::From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Error {
        Error::Config(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Format(msg) => write!(f, "{}", msg),
            Error::Xml(e) => write!(f, "invalid XML document: {}", e),
            Error::LayerNotFound(layer) => {
                write!(f, "no placemark layer named '{}' in the document", layer)
            }
            Error::Validation(msg) => write!(f, "{}", msg),
            Error::Api(msg) => write!(f, "Private Radar error: {}", msg),
            Error::Request(e) => write!(f, "{}", e),
            Error::Gpx(e) => write!(f, "could not write GPX output: {}", e),
            Error::Io(e) => write!(f, "{}", e),
            Error::TimeParse(e) => write!(f, "invalid timestamp: {}", e),
            Error::Config(e) => write!(f, "invalid configuration file: {}", e),
        }
    }
}

impl std::error::Error for Error {}
