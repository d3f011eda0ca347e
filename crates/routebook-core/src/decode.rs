//! Decoder for bikerouter.de share links.
//!
//! The planner keeps its whole state in the URL fragment as `&`-separated
//! `key=value` pairs:
//!
//! ```text
//! #map=13/53.64/10.00/standard,gravel-overlay&lonlats=9.97,53.68|9.98,53.68&pois=10.01,53.69,Cafe&profile=gravel
//! ```
//!
//! Missing or garbled parameters fall back to empty values. The one exception
//! is `lonlats`: a token that is not a `lon,lat` float pair fails the whole
//! decode, since it means the link uses an encoding this decoder does not know.

use std::collections::HashMap;

use crate::error::{RouteError, Result};
use crate::route::{Poi, RouteData, Waypoint};

const MAP_PARAM: &str = "map";
const LONLATS_PARAM: &str = "lonlats";
const POIS_PARAM: &str = "pois";
const PROFILE_PARAM: &str = "profile";

/// Index of the layer list inside `map=zoom/lat/lon/layers`.
const MAP_LAYER_SEGMENT: usize = 3;

pub fn decode(url: &str) -> Result<RouteData> {
    let params = fragment_params(fragment(url));

    let layers = params
        .get(MAP_PARAM)
        .map(|value| parse_layers(value))
        .unwrap_or_default();
    let waypoints = match params.get(LONLATS_PARAM) {
        Some(value) => parse_waypoints(value)?,
        None => Vec::new(),
    };
    let pois = params
        .get(POIS_PARAM)
        .map(|value| parse_pois(value))
        .unwrap_or_default();
    let profile = params.get(PROFILE_PARAM).cloned().unwrap_or_default();

    tracing::debug!(
        layers = layers.len(),
        waypoints = waypoints.len(),
        pois = pois.len(),
        profile = %profile,
        "decoded route url"
    );

    Ok(RouteData {
        layers,
        waypoints,
        profile,
        pois,
    })
}

fn fragment(url: &str) -> &str {
    url.split_once('#').map_or("", |(_, fragment)| fragment)
}

/// Later duplicates of a key replace earlier ones.
fn fragment_params(fragment: &str) -> HashMap<&str, String> {
    fragment
        .split('&')
        .filter_map(|chunk| chunk.split_once('='))
        .map(|(key, value)| (key, percent_decode(value)))
        .collect()
}

/// `%XX` escapes only; `+` stays literal and invalid UTF-8 is replaced.
fn percent_decode(raw: &str) -> String {
    String::from_utf8_lossy(&urlencoding::decode_binary(raw.as_bytes())).into_owned()
}

fn parse_layers(map: &str) -> Vec<String> {
    map.split('/')
        .nth(MAP_LAYER_SEGMENT)
        .map(|segment| segment.split(',').map(ToString::to_string).collect())
        .unwrap_or_default()
}

fn parse_waypoints(lonlats: &str) -> Result<Vec<Waypoint>> {
    lonlats
        .split('|')
        .filter(|token| !token.is_empty())
        .map(parse_waypoint)
        .collect()
}

fn parse_waypoint(token: &str) -> Result<Waypoint> {
    let invalid = || RouteError::Decode(format!("invalid lonlats token: {token:?}"));
    let (lon, lat) = token.split_once(',').ok_or_else(invalid)?;
    if lat.contains(',') {
        return Err(invalid());
    }
    let lon = parse_coordinate(lon).ok_or_else(invalid)?;
    let lat = parse_coordinate(lat).ok_or_else(invalid)?;
    Ok(Waypoint::new(lon, lat))
}

fn parse_pois(pois: &str) -> Vec<Poi> {
    pois.split('|').filter_map(parse_poi).collect()
}

/// `lon,lat,description`; the description may itself contain commas.
fn parse_poi(token: &str) -> Option<Poi> {
    let mut fields = token.splitn(3, ',');
    let lon = fields.next()?;
    let lat = fields.next()?;
    let description = fields.next()?;
    let lon = parse_coordinate(lon)?;
    let lat = parse_coordinate(lat)?;
    Some(Poi::new(lon, lat, percent_decode(description)))
}

/// Accepts `_` digit separators, but only between two digits.
fn parse_coordinate(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if !raw.contains('_') {
        return raw.parse::<f64>().ok();
    }
    let bytes = raw.as_bytes();
    let separated = bytes.iter().enumerate().all(|(i, &b)| {
        b != b'_'
            || (i > 0
                && bytes[i - 1].is_ascii_digit()
                && bytes.get(i + 1).is_some_and(u8::is_ascii_digit))
    });
    if !separated {
        return None;
    }
    raw.replace('_', "").parse::<f64>().ok()
}
