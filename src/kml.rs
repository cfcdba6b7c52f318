//! Extract track coordinates from KML placemark layers
use crate::track::TrackPoint;
use crate::Error;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::fs::read_to_string;
use std::path::Path;

/// The only KML namespace this extractor understands
pub const KML_NAMESPACE: &str = "http://www.opengis.net/kml/2.2";

/// Relevant pieces of a single placemark, in document order
#[derive(Debug, Default)]
struct Placemark {
    name: Option<String>,
    altitude_mode: Option<String>,
    coordinates: Option<String>,
}

/// A parsed KML document, reduced to its placemark layers
#[derive(Debug)]
pub struct KmlDocument {
    placemarks: Vec<Placemark>,
}

impl KmlDocument {
    /// Read and parse a KML file
    pub fn load(path: &Path) -> Result<Self, Error> {
        let document = read_to_string(path)?;
        Self::parse(&document)
    }

    /// Parse a KML document, checking the root namespace
    pub fn parse(document: &str) -> Result<Self, Error> {
        let mut reader = Reader::from_str(document);
        reader.trim_text(true);

        let mut buf = Vec::new();
        let mut stack: Vec<String> = Vec::new();
        let mut placemarks = Vec::new();
        let mut current: Option<Placemark> = None;
        let mut root_checked = false;

        loop {
            match reader.read_event(&mut buf)? {
                Event::Start(ref element) => {
                    if !root_checked {
                        check_root_namespace(element, &reader)?;
                        root_checked = true;
                    }
                    let name = local_name(element.name());
                    if name == b"Placemark" && current.is_none() {
                        current = Some(Placemark::default());
                    }
                    stack.push(String::from_utf8_lossy(name).into_owned());
                }
                Event::Empty(ref element) => {
                    if !root_checked {
                        check_root_namespace(element, &reader)?;
                        root_checked = true;
                    }
                }
                Event::End(_) => {
                    let closed = stack.pop();
                    if closed.as_deref() == Some("Placemark")
                        && !stack.iter().any(|name| name == "Placemark")
                    {
                        if let Some(placemark) = current.take() {
                            placemarks.push(placemark);
                        }
                    }
                }
                Event::Text(ref text) => {
                    if let Some(placemark) = current.as_mut() {
                        store_text(placemark, &stack, text.unescape_and_decode(&reader)?);
                    }
                }
                Event::CData(ref text) => {
                    if let Some(placemark) = current.as_mut() {
                        store_text(placemark, &stack, text.unescape_and_decode(&reader)?);
                    }
                }
                Event::Eof => break,
                _ => (),
            }
            buf.clear();
        }

        if !root_checked {
            return Err(Error::Format(
                "not a supported KML variant: no root element found".to_string(),
            ));
        }
        Ok(KmlDocument { placemarks })
    }

    /// Extract the point sequence of the named placemark layer.
    ///
    /// The first placemark (document order) whose name matches exactly is
    /// used. Its altitude mode must be `absolute` and its coordinates must be
    /// a non-empty, whitespace-separated list of `lon,lat,alt` triples; a
    /// single malformed token aborts the whole extraction.
    pub fn track_points(&self, layer_name: &str) -> Result<Vec<TrackPoint>, Error> {
        let placemark = self
            .placemarks
            .iter()
            .find(|p| p.name.as_deref() == Some(layer_name))
            .ok_or_else(|| Error::LayerNotFound(layer_name.to_string()))?;

        // relative and clamped modes have different altitude semantics that
        // this extractor does not attempt to normalize
        match placemark.altitude_mode.as_deref() {
            Some("absolute") => (),
            Some(mode) => {
                return Err(Error::Format(format!("unsupported altitude mode: {}", mode)))
            }
            None => {
                return Err(Error::Format("unsupported altitude mode: none".to_string()))
            }
        }

        let coordinates = placemark.coordinates.as_deref().ok_or_else(|| {
            Error::Format(format!("no coordinates found in layer {}", layer_name))
        })?;

        let mut points = Vec::new();
        for token in coordinates.split_whitespace() {
            points.push(parse_coordinate(token)?);
        }
        if points.is_empty() {
            return Err(Error::Format(format!(
                "no coordinates found in layer {}",
                layer_name
            )));
        }
        Ok(points)
    }
}

/// Parse one `lon,lat,alt` token from a coordinates node
fn parse_coordinate(token: &str) -> Result<TrackPoint, Error> {
    let fields: Vec<&str> = token.split(',').collect();
    if fields.len() != 3 {
        return Err(Error::Format(format!("not a lon,lat,alt token: {}", token)));
    }

    let mut values = [0.0f64; 3];
    for (value, field) in values.iter_mut().zip(&fields) {
        *value = field
            .parse()
            .map_err(|_| Error::Format(format!("not a lon,lat,alt token: {}", token)))?;
    }
    Ok(TrackPoint::new(values[0], values[1], values[2]))
}

/// Check that the root element declares the KML 2.2 namespace
fn check_root_namespace(element: &BytesStart, reader: &Reader<&[u8]>) -> Result<(), Error> {
    // the namespace is declared by xmlns, or xmlns:<prefix> when the root
    // tag itself carries a prefix
    let expected_key: Vec<u8> = match prefix(element.name()) {
        Some(prefix) => [b"xmlns:", prefix].concat(),
        None => b"xmlns".to_vec(),
    };

    for attribute in element.attributes() {
        let attribute = attribute.map_err(quick_xml::Error::from)?;
        if attribute.key == expected_key.as_slice() {
            let value = attribute.unescape_and_decode_value(reader)?;
            if value == KML_NAMESPACE {
                return Ok(());
            }
            return Err(Error::Format(format!(
                "not a supported KML variant: namespace {}",
                value
            )));
        }
    }
    Err(Error::Format(
        "not a supported KML variant: missing KML namespace".to_string(),
    ))
}

/// Tag name with any namespace prefix removed
fn local_name(name: &[u8]) -> &[u8] {
    match name.iter().rposition(|&byte| byte == b':') {
        Some(position) => &name[position + 1..],
        None => name,
    }
}

/// Namespace prefix of a tag name, if any
fn prefix(name: &[u8]) -> Option<&[u8]> {
    name.iter()
        .rposition(|&byte| byte == b':')
        .map(|position| &name[..position])
}

/// Store a text node on the placemark when the element path is relevant
fn store_text(placemark: &mut Placemark, stack: &[String], text: String) {
    if path_ends_with(stack, &["Placemark", "name"]) {
        placemark.name = Some(text);
    } else if path_ends_with(stack, &["Placemark", "LineString", "altitudeMode"]) {
        placemark.altitude_mode = Some(text);
    } else if path_ends_with(stack, &["Placemark", "LineString", "coordinates"]) {
        // text nodes may arrive in pieces, keep appending
        match placemark.coordinates.as_mut() {
            Some(existing) => {
                existing.push(' ');
                existing.push_str(&text);
            }
            None => placemark.coordinates = Some(text),
        }
    }
}

fn path_ends_with(stack: &[String], suffix: &[&str]) -> bool {
    stack.len() >= suffix.len()
        && stack[stack.len() - suffix.len()..]
            .iter()
            .zip(suffix)
            .all(|(name, expected)| name == expected)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FLIGHT_DOC: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<kml xmlns="http://www.opengis.net/kml/2.2">
  <Document>
    <Placemark>
      <name>Ground level</name>
      <LineString>
        <altitudeMode>clampToGround</altitudeMode>
        <coordinates>0.0,0.0,0.0</coordinates>
      </LineString>
    </Placemark>
    <Placemark>
      <name>Altitude</name>
      <LineString>
        <altitudeMode>absolute</altitudeMode>
        <coordinates>1.0,2.0,3.0 4.0,5.0,6.0</coordinates>
      </LineString>
    </Placemark>
  </Document>
</kml>"#;

    fn doc_with_layer(altitude_mode: &str, coordinates: &str) -> String {
        format!(
            r#"<kml xmlns="http://www.opengis.net/kml/2.2">
  <Placemark>
    <name>Altitude</name>
    <LineString>
      {}
      <coordinates>{}</coordinates>
    </LineString>
  </Placemark>
</kml>"#,
            altitude_mode, coordinates
        )
    }

    #[test]
    fn test_extracts_points_in_token_order() {
        let document = KmlDocument::parse(FLIGHT_DOC).unwrap();
        let points = document.track_points("Altitude").unwrap();

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].longitude(), 1.0);
        assert_eq!(points[0].latitude(), 2.0);
        assert_eq!(points[0].altitude(), 3.0);
        assert_eq!(points[1].longitude(), 4.0);
        assert_eq!(points[1].latitude(), 5.0);
        assert_eq!(points[1].altitude(), 6.0);
        assert!(points.iter().all(|p| p.time().is_none()));
    }

    #[test]
    fn test_mixed_whitespace_separators() {
        let text = "1.0,2.0,3.0\n\t4.0,5.0,6.0   7.0,8.0,9.0\n";
        let document =
            KmlDocument::parse(&doc_with_layer("<altitudeMode>absolute</altitudeMode>", text))
                .unwrap();
        let points = document.track_points("Altitude").unwrap();

        assert_eq!(points.len(), 3);
        let longitudes: Vec<f64> = points.iter().map(|p| p.longitude()).collect();
        assert_eq!(longitudes, vec![1.0, 4.0, 7.0]);
    }

    #[test]
    fn test_rejects_wrong_namespace() {
        let document = r#"<kml xmlns="http://earth.google.com/kml/2.0">
  <Placemark><name>Altitude</name></Placemark>
</kml>"#;
        match KmlDocument::parse(document) {
            Err(Error::Format(msg)) => assert!(msg.contains("not a supported KML variant")),
            other => panic!("expected a format error, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_missing_namespace() {
        match KmlDocument::parse("<kml><Placemark/></kml>") {
            Err(Error::Format(msg)) => assert!(msg.contains("not a supported KML variant")),
            other => panic!("expected a format error, got {:?}", other),
        }
    }

    #[test]
    fn test_accepts_prefixed_namespace() {
        let document = r#"<k:kml xmlns:k="http://www.opengis.net/kml/2.2">
  <k:Placemark>
    <k:name>Altitude</k:name>
    <k:LineString>
      <k:altitudeMode>absolute</k:altitudeMode>
      <k:coordinates>1.5,2.5,3.5</k:coordinates>
    </k:LineString>
  </k:Placemark>
</k:kml>"#;
        let document = KmlDocument::parse(document).unwrap();
        let points = document.track_points("Altitude").unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].altitude(), 3.5);
    }

    #[test]
    fn test_layer_not_found() {
        let document = KmlDocument::parse(FLIGHT_DOC).unwrap();
        match document.track_points("Speed") {
            Err(Error::LayerNotFound(layer)) => assert_eq!(layer, "Speed"),
            other => panic!("expected a layer error, got {:?}", other),
        }
    }

    #[test]
    fn test_first_matching_placemark_wins() {
        // the clamped "Ground level" layer is skipped, but a clamped layer
        // selected by name is rejected
        let document = KmlDocument::parse(FLIGHT_DOC).unwrap();
        match document.track_points("Ground level") {
            Err(Error::Format(msg)) => {
                assert!(msg.contains("unsupported altitude mode: clampToGround"))
            }
            other => panic!("expected a format error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_altitude_mode() {
        let document = KmlDocument::parse(&doc_with_layer("", "1.0,2.0,3.0")).unwrap();
        match document.track_points("Altitude") {
            Err(Error::Format(msg)) => {
                assert_eq!(msg, "unsupported altitude mode: none")
            }
            other => panic!("expected a format error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_coordinates() {
        let document = KmlDocument::parse(&doc_with_layer(
            "<altitudeMode>absolute</altitudeMode>",
            "  \n  ",
        ))
        .unwrap();
        match document.track_points("Altitude") {
            Err(Error::Format(msg)) => assert!(msg.contains("no coordinates")),
            other => panic!("expected a format error, got {:?}", other),
        }
    }

    #[test]
    fn test_token_with_two_fields() {
        let document = KmlDocument::parse(&doc_with_layer(
            "<altitudeMode>absolute</altitudeMode>",
            "1.0,2.0,3.0 4.0,5.0",
        ))
        .unwrap();
        match document.track_points("Altitude") {
            Err(Error::Format(msg)) => assert!(msg.ends_with("4.0,5.0")),
            other => panic!("expected a format error, got {:?}", other),
        }
    }

    #[test]
    fn test_token_with_four_fields() {
        let document = KmlDocument::parse(&doc_with_layer(
            "<altitudeMode>absolute</altitudeMode>",
            "1.0,2.0,3.0,4.0",
        ))
        .unwrap();
        match document.track_points("Altitude") {
            Err(Error::Format(msg)) => assert!(msg.ends_with("1.0,2.0,3.0,4.0")),
            other => panic!("expected a format error, got {:?}", other),
        }
    }

    #[test]
    fn test_token_with_non_numeric_field() {
        let document = KmlDocument::parse(&doc_with_layer(
            "<altitudeMode>absolute</altitudeMode>",
            "1.0,two,3.0",
        ))
        .unwrap();
        match document.track_points("Altitude") {
            Err(Error::Format(msg)) => assert!(msg.ends_with("1.0,two,3.0")),
            other => panic!("expected a format error, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_xml() {
        match KmlDocument::parse("<kml xmlns=\"http://www.opengis.net/kml/2.2\"><Placemark>") {
            // an unclosed element surfaces as either an XML error or an
            // incomplete document depending on the parser
            Err(Error::Xml(_)) | Err(Error::Format(_)) | Ok(_) => (),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
