#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Static map render requests.
//!
//! [`build`] turns a query point and its ranked hydrants into a
//! [`MapRenderRequest`]: a plain description of what to draw, with each
//! hydrant labelled by a one-character marker symbol. Encoding that request
//! as a Yandex Static API URL is [`MapRenderRequest::to_url`]; actually
//! fetching the image is the job of a [`renderer::MapRenderer`].
//!
//! Marker symbols run `1`-`9` then `A`-`Z`, so at most [`MAX_MARKERS`]
//! hydrants can be told apart on one map. Anything beyond that is dropped
//! from the map and counted in [`MapRenderRequest::truncated`]; the text
//! answer still lists every hydrant.

pub mod renderer;

use std::fmt::Write as _;

use hydrant_map_hydrant_models::{Coordinate, RankedHydrant};
use serde::Serialize;

/// Number of distinct marker symbols (9 digits + 26 letters).
pub const MAX_MARKERS: usize = 9 + 26;

/// Returns the marker symbol for a 1-based ranking position.
///
/// Positions 1-9 map to `'1'..='9'`, positions 10-35 to `'A'..='Z'`.
#[must_use]
pub fn marker_symbol(position: usize) -> Option<char> {
    match position {
        1..=9 => char::from_digit(u32::try_from(position).ok()?, 10),
        10..=MAX_MARKERS => {
            let offset = u8::try_from(position - 10).ok()?;
            Some(char::from(b'A' + offset))
        }
        _ => None,
    }
}

/// A hydrant pin on the map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    /// Pin location.
    pub coordinate: Coordinate,
    /// Glyph drawn inside the pin.
    pub symbol: char,
}

/// Everything needed to render one answer map.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapRenderRequest {
    /// The geocoded query point, drawn with a distinct pin.
    pub center: Coordinate,
    /// Hydrant pins in ranking order.
    pub markers: Vec<Marker>,
    /// How many ranked hydrants did not fit on the map.
    pub truncated: usize,
}

/// Builds the render request for `center` and its ranked hydrants.
#[must_use]
pub fn build(center: Coordinate, ranked: &[RankedHydrant<'_>]) -> MapRenderRequest {
    let markers: Vec<Marker> = ranked
        .iter()
        .enumerate()
        .map_while(|(i, r)| {
            marker_symbol(i + 1).map(|symbol| Marker {
                coordinate: r.record.coordinate,
                symbol,
            })
        })
        .collect();

    MapRenderRequest {
        center,
        truncated: ranked.len() - markers.len(),
        markers,
    }
}

/// Visual parameters of the Yandex Static API map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticMapStyle {
    /// Static API endpoint.
    pub base_url: String,
    /// Map layer (`map`, `sat`, `skl`).
    pub layer: String,
    /// Image width in pixels (Yandex caps this at 650).
    pub width: u32,
    /// Image height in pixels (Yandex caps this at 450).
    pub height: u32,
    /// Pin style prefix for hydrants; the marker symbol is appended.
    pub hydrant_pin: String,
    /// Pin style for the query point.
    pub center_pin: String,
}

impl Default for StaticMapStyle {
    fn default() -> Self {
        Self {
            base_url: "https://static-maps.yandex.ru/1.x/".to_string(),
            layer: "map".to_string(),
            width: 650,
            height: 450,
            hydrant_pin: "pm2blm".to_string(),
            center_pin: "pm2rdl".to_string(),
        }
    }
}

impl MapRenderRequest {
    /// Encodes the request as a Yandex Static API URL.
    ///
    /// Hydrant pins are `lng,lat,{hydrant_pin}{symbol}` joined by `~`, and
    /// the center pin is appended last so it is drawn on top.
    #[must_use]
    pub fn to_url(&self, style: &StaticMapStyle, api_key: Option<&str>) -> String {
        let mut points: Vec<String> = self
            .markers
            .iter()
            .map(|m| pin(&m.coordinate, &format!("{}{}", style.hydrant_pin, m.symbol)))
            .collect();
        points.push(pin(&self.center, &style.center_pin));

        let mut url = format!(
            "{base}?l={layer}&pt={points}&size={w},{h}",
            base = style.base_url,
            layer = style.layer,
            points = points.join("~"),
            w = style.width,
            h = style.height,
        );

        if let Some(key) = api_key.filter(|k| !k.is_empty()) {
            let _ = write!(url, "&apikey={key}");
        }

        url
    }
}

fn pin(coordinate: &Coordinate, style: &str) -> String {
    format!("{},{},{style}", coordinate.longitude(), coordinate.latitude())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hydrant_map_hydrant_models::{Attributes, HydrantRecord};

    fn records(n: usize) -> Vec<HydrantRecord> {
        (0..n)
            .map(|i| {
                #[allow(clippy::cast_precision_loss)]
                let offset = i as f64 * 0.0001;
                HydrantRecord {
                    id: i.to_string(),
                    coordinate: Coordinate::new(52.96 + offset, 36.06).unwrap(),
                    label: format!("Гидрант {}", i + 1),
                    attributes: Attributes::new(),
                }
            })
            .collect()
    }

    fn ranked(records: &[HydrantRecord]) -> Vec<RankedHydrant<'_>> {
        records
            .iter()
            .map(|record| RankedHydrant {
                record,
                planar_distance: 0.0,
                geodesic_meters: 0,
            })
            .collect()
    }

    #[test]
    fn digits_then_letters() {
        assert_eq!(marker_symbol(1), Some('1'));
        assert_eq!(marker_symbol(9), Some('9'));
        assert_eq!(marker_symbol(10), Some('A'));
        assert_eq!(marker_symbol(11), Some('B'));
        assert_eq!(marker_symbol(35), Some('Z'));
        assert_eq!(marker_symbol(0), None);
        assert_eq!(marker_symbol(36), None);
    }

    #[test]
    fn assigns_symbols_in_rank_order() {
        let records = records(12);
        let request = build(Coordinate::new(52.965, 36.063).unwrap(), &ranked(&records));

        let symbols: String = request.markers.iter().map(|m| m.symbol).collect();
        assert_eq!(symbols, "123456789ABC");
        assert_eq!(request.truncated, 0);
    }

    #[test]
    fn truncates_beyond_alphabet() {
        let records = records(40);
        let request = build(Coordinate::new(52.965, 36.063).unwrap(), &ranked(&records));

        assert_eq!(request.markers.len(), MAX_MARKERS);
        assert_eq!(request.truncated, 5);
        assert_eq!(request.markers.last().map(|m| m.symbol), Some('Z'));
    }

    #[test]
    fn empty_ranking_has_only_center() {
        let request = build(Coordinate::new(52.965, 36.063).unwrap(), &[]);
        assert!(request.markers.is_empty());

        let url = request.to_url(&StaticMapStyle::default(), None);
        assert_eq!(
            url,
            "https://static-maps.yandex.ru/1.x/?l=map&pt=36.063,52.965,pm2rdl&size=650,450"
        );
    }

    #[test]
    fn encodes_yandex_url() {
        let records = vec![
            HydrantRecord {
                id: "1".to_string(),
                coordinate: Coordinate::new(52.964_795, 36.061_997).unwrap(),
                label: "Гидрант 1".to_string(),
                attributes: Attributes::new(),
            },
            HydrantRecord {
                id: "2".to_string(),
                coordinate: Coordinate::new(52.96553, 36.065_635).unwrap(),
                label: "Гидрант 2".to_string(),
                attributes: Attributes::new(),
            },
        ];
        let request = build(Coordinate::new(52.965, 36.063).unwrap(), &ranked(&records));

        let url = request.to_url(&StaticMapStyle::default(), Some("KEY"));

        assert_eq!(
            url,
            "https://static-maps.yandex.ru/1.x/?l=map\
             &pt=36.061997,52.964795,pm2blm1~36.065635,52.96553,pm2blm2~36.063,52.965,pm2rdl\
             &size=650,450&apikey=KEY"
        );
    }
}
