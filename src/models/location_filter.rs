use serde::{Deserialize, Serialize};

/// Search radius steps offered to the user, in km, ascending.
pub const RADIUS_STEPS_KM: [u32; 6] = [5, 10, 25, 50, 100, 200];
pub const DEFAULT_RADIUS_KM: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl City {
    pub fn center(&self) -> GeoPoint {
        GeoPoint {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationFilter {
    pub city: Option<City>,
    pub radius_km: u32,
}

impl Default for LocationFilter {
    fn default() -> Self {
        Self {
            city: None,
            radius_km: DEFAULT_RADIUS_KM,
        }
    }
}

pub fn is_radius_step(radius_km: u32) -> bool {
    RADIUS_STEPS_KM.contains(&radius_km)
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LocationFilterRow {
    pub city_id: Option<String>,
    pub city_name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub radius_km: i64,
}

impl From<LocationFilterRow> for LocationFilter {
    fn from(row: LocationFilterRow) -> Self {
        let city = match (row.city_id, row.city_name, row.latitude, row.longitude) {
            (Some(id), Some(name), Some(latitude), Some(longitude)) => Some(City {
                id,
                name,
                latitude,
                longitude,
            }),
            _ => None,
        };
        let radius_km = u32::try_from(row.radius_km)
            .ok()
            .filter(|r| is_radius_step(*r))
            .unwrap_or(DEFAULT_RADIUS_KM);
        LocationFilter { city, radius_km }
    }
}
