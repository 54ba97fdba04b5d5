//! Synthetic repair-shop recommendations.
//!
//! Shops are drawn from an RNG seeded by the location, so the same place
//! always yields the same shops.

use axum::{
    Extension, Json,
    extract::Query,
    response::IntoResponse,
};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use serde::Deserialize;

use smartcycle_types::api::RepairShop;
use smartcycle_types::models::Claims;

use crate::error::ApiError;

pub const SERVICES: [&str; 4] = ["Screen Fix", "Battery Replace", "Hardware Repair", "Water Damage"];

const CITY_COORDS: [(&str, f64, f64); 6] = [
    ("Mumbai", 19.0760, 72.8777),
    ("Delhi", 28.7041, 77.1025),
    ("Bengaluru", 12.9716, 77.5946),
    ("Chennai", 13.0827, 80.2707),
    ("Kolkata", 22.5726, 88.3639),
    ("Hyderabad", 17.3850, 78.4867),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShopSort {
    #[default]
    Distance,
    Rating,
    Cost,
}

#[derive(Debug, Deserialize)]
pub struct ShopQuery {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub city: Option<String>,
    pub service: Option<String>,
    pub q: Option<String>,
    #[serde(default)]
    pub sort: ShopSort,
}

pub fn city_coords(city: &str) -> Option<(f64, f64)> {
    CITY_COORDS
        .iter()
        .find(|(name, _, _)| name.eq_ignore_ascii_case(city))
        .map(|&(_, lat, lon)| (lat, lon))
}

fn location_seed(lat: f64, lon: f64) -> u64 {
    ((lat * 1000.0 + lon * 1000.0) as i64).rem_euclid(1 << 32) as u64
}

/// Three to six shops near (lat, lon), nearest first.
pub fn nearby_shops(lat: f64, lon: f64) -> Vec<RepairShop> {
    let mut rng = StdRng::seed_from_u64(location_seed(lat, lon));
    let count = rng.random_range(3..7);

    let mut shops: Vec<RepairShop> = (0..count)
        .map(|i| {
            let distance_km = rng.random_range(0.5..5.0);
            let rating = rng.random_range(4.0..5.0);
            let reviews = rng.random_range(20..200);
            let eta_days = rng.random_range(1..5);
            let repair_cost_estimate = rng.random_range(30.0..150.0);
            let service_count = rng.random_range(1..3);
            let services = SERVICES
                .choose_multiple(&mut rng, service_count)
                .map(|s| s.to_string())
                .collect();

            RepairShop {
                id: i,
                name: format!("Repair Shop #{}", i + 1),
                distance_km,
                rating,
                reviews,
                eta_days,
                repair_cost_estimate,
                services,
            }
        })
        .collect();

    shops.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    shops
}

pub fn filter_and_sort(
    mut shops: Vec<RepairShop>,
    service: Option<&str>,
    name_query: Option<&str>,
    sort: ShopSort,
) -> Vec<RepairShop> {
    if let Some(service) = service {
        shops.retain(|s| s.services.iter().any(|offered| offered == service));
    }

    if let Some(q) = name_query.map(str::trim).filter(|q| !q.is_empty()) {
        let q = q.to_lowercase();
        shops.retain(|s| s.name.to_lowercase().contains(&q));
    }

    match sort {
        ShopSort::Distance => shops.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km)),
        ShopSort::Rating => shops.sort_by(|a, b| b.rating.total_cmp(&a.rating)),
        ShopSort::Cost => shops.sort_by(|a, b| a.repair_cost_estimate.total_cmp(&b.repair_cost_estimate)),
    }
    shops
}

/// GET /repair-shops
pub async fn recommend(
    Query(query): Query<ShopQuery>,
    Extension(_claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let (lat, lon) = match (&query.city, query.lat, query.lon) {
        (Some(city), _, _) => city_coords(city)
            .ok_or_else(|| ApiError::BadRequest(format!("unknown city: {}", city)))?,
        (None, Some(lat), Some(lon)) => (lat, lon),
        (None, None, None) => (0.0, 0.0),
        _ => return Err(ApiError::BadRequest("lat and lon must be given together".into())),
    };

    let shops = filter_and_sort(
        nearby_shops(lat, lon),
        query.service.as_deref(),
        query.q.as_deref(),
        query.sort,
    );
    Ok(Json(shops))
}
