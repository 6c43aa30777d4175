use super::{GeocodeCompletion, GeocodeError, GeocodingService, Placemark};
use crate::core::config::ServiceConfig;
use crate::core::geo::LatLng;
use crate::prelude::HashMap;
use crate::request::{Completion, RequestHandle};
use crate::runtime::{self, AsyncHandle};
use crate::Result;
use crossbeam_channel::Sender;
use serde::Deserialize;

/// Body returned by Nominatim's `/reverse?format=jsonv2`
#[derive(Debug, Deserialize)]
struct ReverseResponse {
    error: Option<String>,
    display_name: Option<String>,
    address: Option<NominatimAddress>,
}

#[derive(Debug, Default, Deserialize)]
struct NominatimAddress {
    house_number: Option<String>,
    road: Option<String>,
    pedestrian: Option<String>,
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    hamlet: Option<String>,
    postcode: Option<String>,
    country: Option<String>,
}

/// Parse a reverse-geocoding body into placemarks.
///
/// Nominatim answers "nothing here" (open sea, unmapped areas) with a 200 and
/// an `error` field; that is an empty result rather than a failure.
pub fn parse_reverse_response(body: &str) -> std::result::Result<Vec<Placemark>, GeocodeError> {
    let response: ReverseResponse = serde_json::from_str(body)?;

    if let Some(message) = response.error {
        if message.eq_ignore_ascii_case("unable to geocode") {
            return Ok(Vec::new());
        }
        return Err(GeocodeError::Service {
            status: 200,
            message,
        });
    }

    let address = response.address.unwrap_or_default();
    if address.road.is_none() && address.pedestrian.is_none() && response.display_name.is_none() {
        return Ok(Vec::new());
    }

    Ok(vec![Placemark {
        house_number: address.house_number,
        road: address.road.or(address.pedestrian),
        locality: address
            .city
            .or(address.town)
            .or(address.village)
            .or(address.hamlet),
        postcode: address.postcode,
        country: address.country,
        display_name: response.display_name,
    }])
}

/// Reverse geocoder backed by an OpenStreetMap Nominatim server
///
/// Every lookup runs as its own task on the async runtime and reports back
/// through the completion channel handed to [`NominatimGeocoder::new`].
pub struct NominatimGeocoder {
    client: reqwest::Client,
    config: ServiceConfig,
    completions: Sender<GeocodeCompletion>,
    in_flight: HashMap<RequestHandle, Box<dyn AsyncHandle>>,
}

impl NominatimGeocoder {
    pub fn new(config: ServiceConfig, completions: Sender<GeocodeCompletion>) -> Result<Self> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            client,
            config,
            completions,
            in_flight: HashMap::default(),
        })
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Number of lookups whose tasks have not finished yet
    pub fn in_flight(&self) -> usize {
        self.in_flight
            .values()
            .filter(|handle| !handle.is_finished())
            .count()
    }

    async fn reverse(
        client: reqwest::Client,
        base_url: String,
        coordinate: LatLng,
    ) -> std::result::Result<Vec<Placemark>, GeocodeError> {
        let url = format!("{}/reverse", base_url.trim_end_matches('/'));
        let response = client
            .get(&url)
            .query(&[
                ("format", "jsonv2".to_string()),
                ("addressdetails", "1".to_string()),
                ("lat", coordinate.lat.to_string()),
                ("lon", coordinate.lng.to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(GeocodeError::Service {
                status: status.as_u16(),
                message: body,
            });
        }

        parse_reverse_response(&body)
    }
}

impl GeocodingService for NominatimGeocoder {
    fn lookup(&mut self, coordinate: LatLng) -> RequestHandle {
        self.in_flight.retain(|_, task| !task.is_finished());

        let handle = RequestHandle::next();
        let client = self.client.clone();
        let base_url = self.config.base_url.clone();
        let completions = self.completions.clone();

        let spawned = runtime::spawn(async move {
            let result = Self::reverse(client, base_url, coordinate).await;
            // Receiver gone means the screen was torn down
            let _ = completions.send(Completion::new(handle, result));
        });

        match spawned {
            Ok(task) => {
                log::debug!("geocode lookup {} for {}", handle, coordinate);
                self.in_flight.insert(handle, task);
            }
            Err(err) => {
                log::warn!("could not start geocode lookup {}: {}", handle, err);
                let _ = self.completions.send(Completion::new(
                    handle,
                    Err(GeocodeError::RuntimeUnavailable),
                ));
            }
        }

        handle
    }

    fn cancel(&mut self, handle: RequestHandle) {
        if let Some(task) = self.in_flight.remove(&handle) {
            log::debug!("aborting geocode lookup {}", handle);
            task.cancel();
        }
    }
}
