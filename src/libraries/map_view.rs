use geo::{BoundingRect, HaversineLength, LineString, MultiPoint, Point};
use serde::Serialize;

use crate::models::{DecimalCoordinate, LineWarning, NamedLocation};

/// Zoom used for the single-photo map
pub const PHOTO_ZOOM: u8 = 13;

/// Zoom used for the location list before bounds are fitted
pub const WORLD_ZOOM: u8 = 2;

const MARKER_COLOR: &str = "red";

const LEAFLET_VERSION: &str = "1.9.4";

#[derive(Debug, Clone, Serialize)]
pub struct Marker {
    pub position: DecimalCoordinate,
    pub tooltip: String,
    pub color: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Polyline {
    pub points: Vec<DecimalCoordinate>,
    pub color: String,
}

/// Everything the browser needs to draw one map
#[derive(Debug, Clone, Serialize)]
pub struct MapView {
    pub center: DecimalCoordinate,
    pub zoom: u8,
    pub markers: Vec<Marker>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub polyline: Option<Polyline>,
    /// South-west and north-east corners to fit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds: Option<[DecimalCoordinate; 2]>,
    pub width: u32,
    pub height: u32,
    /// Shown as a list above the map
    #[serde(skip)]
    pub warnings: Vec<String>,
}

impl MapView {
    pub fn new(center: DecimalCoordinate, zoom: u8) -> Self {
        Self {
            center,
            zoom,
            markers: Vec::new(),
            polyline: None,
            bounds: None,
            width: 700,
            height: 500,
            warnings: Vec::new(),
        }
    }

    /// Map of the photo position with a single marker
    pub fn for_photo(position: DecimalCoordinate) -> Self {
        let mut view = Self::new(position, PHOTO_ZOOM);
        view.add_marker(position, "GPS position");
        view
    }

    /// Map of a location list: one marker per place, a route through them
    /// when there are at least two, and bounds covering all of them.
    pub fn for_locations(locations: &[NamedLocation]) -> Self {
        let positions: Vec<DecimalCoordinate> = locations.iter().map(|l| l.position).collect();
        let bounds = bounding_box(&positions);
        let center = bounds
            .map(|[sw, ne]| {
                DecimalCoordinate::new(
                    (sw.latitude + ne.latitude) / 2.0,
                    (sw.longitude + ne.longitude) / 2.0,
                )
            })
            .unwrap_or(DecimalCoordinate::new(0.0, 0.0));

        let mut view = Self::new(center, WORLD_ZOOM);
        for location in locations {
            view.add_marker(location.position, &location.name);
        }
        if positions.len() >= 2 {
            view.polyline = Some(Polyline {
                points: positions,
                color: MARKER_COLOR.to_string(),
            });
        }
        view.bounds = bounds;
        view
    }

    pub fn add_marker(&mut self, position: DecimalCoordinate, tooltip: &str) {
        self.markers.push(Marker {
            position,
            tooltip: tooltip.to_string(),
            color: MARKER_COLOR.to_string(),
        });
    }

    /// Report lines of a location list that could not be plotted
    pub fn add_line_warnings(&mut self, warnings: &[LineWarning]) {
        self.warnings.extend(
            warnings
                .iter()
                .map(|w| format!("Line {} ({}): {}", w.line_number, w.line, w.message)),
        );
    }

    /// Standalone Leaflet page drawing this view
    pub fn render_html(&self, title: &str) -> String {
        // serde_json output is valid JS; only `</` could close the script tag early
        let view_json = serde_json::to_string(self)
            .unwrap_or_else(|_| "{}".to_string())
            .replace("</", "<\\/");

        let warnings = if self.warnings.is_empty() {
            String::new()
        } else {
            let items: String = self
                .warnings
                .iter()
                .map(|w| format!("    <li>{}</li>\n", escape_html(w)))
                .collect();
            format!("  <ul class=\"warnings\">\n{}  </ul>\n", items)
        };

        format!(
            r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8"/>
  <title>{title}</title>
  <link rel="stylesheet" href="https://unpkg.com/leaflet@{version}/dist/leaflet.css"/>
  <script src="https://unpkg.com/leaflet@{version}/dist/leaflet.js"></script>
</head>
<body>
{warnings}  <div id="map" style="width: {width}px; height: {height}px;"></div>
  <script>
    const view = {view_json};
    const map = L.map("map").setView([view.center.latitude, view.center.longitude], view.zoom);
    L.tileLayer("https://{{s}}.tile.openstreetmap.org/{{z}}/{{x}}/{{y}}.png", {{
      attribution: "&copy; OpenStreetMap contributors"
    }}).addTo(map);
    for (const marker of view.markers) {{
      L.circleMarker([marker.position.latitude, marker.position.longitude], {{ color: marker.color }})
        .bindTooltip(marker.tooltip)
        .addTo(map);
    }}
    if (view.polyline) {{
      L.polyline(view.polyline.points.map(p => [p.latitude, p.longitude]), {{ color: view.polyline.color }}).addTo(map);
    }}
    if (view.bounds) {{
      map.fitBounds(view.bounds.map(p => [p.latitude, p.longitude]));
    }}
  </script>
</body>
</html>
"#,
            title = escape_html(title),
            version = LEAFLET_VERSION,
            width = self.width,
            height = self.height,
            view_json = view_json,
            warnings = warnings,
        )
    }
}

/// South-west and north-east corners of a set of positions
pub fn bounding_box(positions: &[DecimalCoordinate]) -> Option<[DecimalCoordinate; 2]> {
    let points: MultiPoint<f64> = positions
        .iter()
        .map(|p| Point::new(p.longitude, p.latitude))
        .collect::<Vec<_>>()
        .into();

    points.bounding_rect().map(|rect| {
        [
            DecimalCoordinate::new(rect.min().y, rect.min().x),
            DecimalCoordinate::new(rect.max().y, rect.max().x),
        ]
    })
}

/// Length of the route through `positions`, in kilometres
pub fn route_length_km(positions: &[DecimalCoordinate]) -> f64 {
    if positions.len() < 2 {
        return 0.0;
    }

    let line: LineString<f64> = positions
        .iter()
        .map(|p| (p.longitude, p.latitude))
        .collect::<Vec<_>>()
        .into();

    line.haversine_length() / 1000.0
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
