use axum::http::StatusCode;
use serde::Deserialize;
use tracing::warn;

use crate::config::LocationApiConfig;
use crate::error::BackendError;
use crate::models::City;

#[derive(Debug, Deserialize)]
struct Geo {
    lat: Option<f64>,
    lng: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct LocationHit {
    id: Option<String>,
    naam: Option<String>,
    name: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    #[serde(rename = "_geo")]
    geo: Option<Geo>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: Option<Vec<LocationHit>>,
}

/// City lookup against the location search service. Queries shorter than two
/// characters return nothing without a round trip.
pub async fn search_cities(
    config: &LocationApiConfig,
    q: &str,
    limit: usize,
) -> Result<Vec<City>, BackendError> {
    let q = q.trim();
    if q.chars().count() < 2 {
        return Ok(Vec::new());
    }

    let limit = limit.clamp(1, 20);
    let url = format!("{}/search", config.base_url.trim_end_matches('/'));
    let client = reqwest::Client::new();

    let mut req = client
        .get(&url)
        .query(&[("q", q), ("limit", &limit.to_string())])
        .header("Host", config.host_header.as_str());

    if let Some(key) = &config.api_key {
        req = req.header("x-api-key", key);
    }

    let resp = req.send().await.map_err(|e| {
        warn!("📍 Location search upstream unreachable: {}", e);
        BackendError::Transport(e)
    })?;

    if !resp.status().is_success() {
        warn!("📍 Location search upstream non-OK: {}", resp.status());
        let status =
            StatusCode::from_u16(resp.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
        return Err(BackendError::Status { status, body: None });
    }

    let parsed: SearchResponse = resp.json().await.map_err(|e| {
        warn!("📍 Location search upstream JSON parse failed: {}", e);
        BackendError::Transport(e)
    })?;

    Ok(cities_from_hits(parsed.hits.unwrap_or_default()))
}

fn cities_from_hits(hits: Vec<LocationHit>) -> Vec<City> {
    hits.into_iter()
        .filter_map(|hit| {
            let geo_lat = hit.geo.as_ref().and_then(|g| g.lat);
            let geo_lng = hit.geo.as_ref().and_then(|g| g.lng);
            let latitude = geo_lat.or(hit.lat).or(hit.latitude)?;
            let longitude = geo_lng.or(hit.lon).or(hit.longitude)?;
            let name = hit.naam.or(hit.name).filter(|n| !n.trim().is_empty())?;

            Some(City {
                id: hit.id.unwrap_or_else(|| name.to_lowercase()),
                name,
                latitude,
                longitude,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hits_prefer_geo_block_and_skip_nameless_or_coordless() {
        let raw = serde_json::json!({
            "hits": [
                { "id": "paris", "name": "Paris", "lat": 1.0, "lon": 1.0,
                  "_geo": { "lat": 48.8566, "lng": 2.3522 } },
                { "id": "ghost", "name": "Ghost town" },
                { "naam": "Utrecht", "latitude": 52.09, "longitude": 5.12 },
                { "id": "blank", "name": "  ", "lat": 0.0, "lon": 0.0 }
            ]
        });
        let parsed: SearchResponse = serde_json::from_value(raw).unwrap();
        let cities = cities_from_hits(parsed.hits.unwrap());

        assert_eq!(cities.len(), 2);
        assert_eq!(cities[0].latitude, 48.8566);
        assert_eq!(cities[1].id, "utrecht");
    }

    #[tokio::test]
    async fn short_queries_skip_the_upstream() {
        let config = LocationApiConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            ..Default::default()
        };
        assert!(search_cities(&config, " p ", 5).await.unwrap().is_empty());
    }
}
