//! Geographic view of a snapshot: markers, centre, basemap tiles and the
//! connecting route overlay, rendered as a standalone Leaflet page.
//!
//! The route joins geolocated records in `(region, name)` order. It is a
//! visual connector only and carries no network topology.

use crate::types::{SubstationRecord, MISSING_LABEL};
use crate::view_state::TileMode;
use serde::{Deserialize, Serialize};

const LEAFLET_VERSION: &str = "1.9.4";

const ESRI_IMAGERY_URL: &str =
    "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}";
const ESRI_ATTRIBUTION: &str = "Tiles &copy; Esri &mdash; Source: Esri, i-cubed, USDA, USGS, AEX, GeoEye, Getmapping, Aerogrid, IGN, IGP, UPR-EGP, and the GIS User Community";
const CARTO_DARK_URL: &str = "https://{s}.basemaps.cartocdn.com/dark_all/{z}/{x}/{y}{r}.png";
const OSM_URL: &str = "https://tile.openstreetmap.org/{z}/{x}/{y}.png";

/// Map options that do not depend on the data.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MapSettings {
    pub zoom: u8,
    /// `[latitude, longitude]` used when nothing is geolocated.
    pub fallback_center: [f64; 2],
}

impl Default for MapSettings {
    fn default() -> Self {
        Self { zoom: 5, fallback_center: [0.0, 0.0] }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(into = "[f64; 2]")]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl From<GeoPoint> for [f64; 2] {
    fn from(p: GeoPoint) -> Self {
        [p.lat, p.lon]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TileSource {
    pub name: &'static str,
    pub url_template: &'static str,
    pub attribution: Option<&'static str>,
}

impl TileSource {
    pub fn for_mode(mode: TileMode) -> Self {
        match mode {
            TileMode::Satellite => TileSource {
                name: "Esri World Imagery",
                url_template: ESRI_IMAGERY_URL,
                attribution: Some(ESRI_ATTRIBUTION),
            },
            TileMode::Dark => TileSource {
                name: "CartoDB dark_matter",
                url_template: CARTO_DARK_URL,
                attribution: None,
            },
            TileMode::Light => TileSource {
                name: "OpenStreetMap",
                url_template: OSM_URL,
                attribution: None,
            },
        }
    }
}

/// Marker popup fields. Blank values read as the placeholder, never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PopupPayload {
    pub name: String,
    pub region: String,
    pub ownership: String,
    pub fiscal_year: String,
}

impl PopupPayload {
    fn from_record(r: &SubstationRecord) -> Self {
        Self {
            name: label(&r.name),
            region: label(&r.region),
            ownership: label(&r.ownership),
            fiscal_year: r.fiscal_year.to_string(),
        }
    }

    pub fn to_html(&self) -> String {
        format!(
            "<b>{}</b><br><table style=\"width:100%\">\
             <tr><td>Region:</td><td>{}</td></tr>\
             <tr><td>Ownership:</td><td>{}</td></tr>\
             <tr><td>Year:</td><td>{}</td></tr></table>",
            escape_html(&self.name),
            escape_html(&self.region),
            escape_html(&self.ownership),
            escape_html(&self.fiscal_year),
        )
    }
}

fn label(s: &str) -> String {
    let s = s.trim();
    if s.is_empty() {
        MISSING_LABEL.to_string()
    } else {
        s.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub position: GeoPoint,
    pub popup: PopupPayload,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RouteSegment {
    pub from: GeoPoint,
    pub to: GeoPoint,
}

/// Everything needed to draw the map; [`MapView::to_html`] renders it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    pub center: GeoPoint,
    pub zoom: u8,
    pub tiles: TileSource,
    pub markers: Vec<Marker>,
    pub route: Vec<RouteSegment>,
}

/// Records with both coordinates present and finite, in snapshot order.
pub fn geo_eligible(records: &[SubstationRecord]) -> Vec<(&SubstationRecord, GeoPoint)> {
    records
        .iter()
        .filter_map(|r| r.coordinates().map(|(lat, lon)| (r, GeoPoint { lat, lon })))
        .collect()
}

pub fn build_map(records: &[SubstationRecord], mode: TileMode, settings: &MapSettings) -> MapView {
    let geo = geo_eligible(records);

    let center = if geo.is_empty() {
        let [lat, lon] = settings.fallback_center;
        GeoPoint { lat, lon }
    } else {
        let n = geo.len() as f64;
        GeoPoint {
            lat: geo.iter().map(|(_, p)| p.lat).sum::<f64>() / n,
            lon: geo.iter().map(|(_, p)| p.lon).sum::<f64>() / n,
        }
    };

    let markers = geo
        .iter()
        .map(|(r, p)| Marker { position: *p, popup: PopupPayload::from_record(r) })
        .collect();

    MapView {
        center,
        zoom: settings.zoom,
        tiles: TileSource::for_mode(mode),
        markers,
        route: route_segments(&geo),
    }
}

/// Sorts by `(region, name)` and joins neighbours: N points, N-1 segments.
fn route_segments(geo: &[(&SubstationRecord, GeoPoint)]) -> Vec<RouteSegment> {
    let mut ordered: Vec<&(&SubstationRecord, GeoPoint)> = geo.iter().collect();
    ordered.sort_by(|(a, _), (b, _)| a.region.cmp(&b.region).then_with(|| a.name.cmp(&b.name)));
    ordered
        .windows(2)
        .map(|pair| RouteSegment { from: pair[0].1, to: pair[1].1 })
        .collect()
}

#[derive(Serialize)]
struct ScriptMarker {
    position: GeoPoint,
    popup: String,
}

#[derive(Serialize)]
struct ScriptData<'a> {
    center: GeoPoint,
    zoom: u8,
    tiles_url: &'a str,
    attribution: &'a str,
    markers: Vec<ScriptMarker>,
    route: &'a [RouteSegment],
}

impl MapView {
    /// Self-contained HTML page; the presentation layer treats it as opaque.
    pub fn to_html(&self) -> String {
        let data = ScriptData {
            center: self.center,
            zoom: self.zoom,
            tiles_url: self.tiles.url_template,
            attribution: self.tiles.attribution.unwrap_or(""),
            markers: self
                .markers
                .iter()
                .map(|m| ScriptMarker { position: m.position, popup: m.popup.to_html() })
                .collect(),
            route: &self.route,
        };
        // Serializing plain numbers and strings cannot fail.
        let json = serde_json::to_string(&data).unwrap_or_else(|_| "{}".to_string());
        let json = json.replace("</", "<\\/");

        format!(
            r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8" />
<meta name="viewport" content="width=device-width, initial-scale=1.0" />
<link rel="stylesheet" href="https://unpkg.com/leaflet@{v}/dist/leaflet.css" />
<script src="https://unpkg.com/leaflet@{v}/dist/leaflet.js"></script>
<style>html, body, #map {{ height: 100%; width: 100%; margin: 0; padding: 0; }}</style>
</head>
<body>
<div id="map"></div>
<script>
const data = {json};
const map = L.map('map').setView(data.center, data.zoom);
L.tileLayer(data.tiles_url, {{ attribution: data.attribution, maxZoom: 19 }}).addTo(map);
data.markers.forEach(function (m) {{ L.marker(m.position).bindPopup(m.popup).addTo(map); }});
data.route.forEach(function (s) {{
  L.polyline([s.from, s.to], {{ color: 'red', weight: 2, opacity: 0.7 }}).addTo(map);
}});
</script>
</body>
</html>
"#,
            v = LEAFLET_VERSION,
            json = json,
        )
    }
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
