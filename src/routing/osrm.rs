use super::{Route, RouteCompletion, RoutingError, RoutingService, TransportType};
use crate::core::config::ServiceConfig;
use crate::core::geo::LatLng;
use crate::prelude::HashMap;
use crate::request::{Completion, RequestHandle};
use crate::runtime::{self, AsyncHandle};
use crate::Result;
use crossbeam_channel::Sender;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct RouteResponse {
    code: String,
    message: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    distance: f64,
    duration: f64,
    geometry: OsrmGeometry,
}

#[derive(Debug, Deserialize)]
struct OsrmGeometry {
    /// GeoJSON order: [lng, lat]
    coordinates: Vec<[f64; 2]>,
}

fn profile(transport: TransportType) -> &'static str {
    match transport {
        TransportType::Walking => "foot",
        TransportType::Driving => "driving",
    }
}

/// Parse an OSRM `/route` body. `NoRoute` is an empty result, not an error.
pub fn parse_route_response(
    body: &str,
    transport: TransportType,
) -> std::result::Result<Vec<Route>, RoutingError> {
    let response: RouteResponse = serde_json::from_str(body)?;

    match response.code.as_str() {
        "Ok" => {}
        "NoRoute" => return Ok(Vec::new()),
        code => {
            return Err(RoutingError::Service {
                status: 200,
                message: response.message.unwrap_or_else(|| code.to_string()),
            })
        }
    }

    response
        .routes
        .into_iter()
        .map(|route| -> std::result::Result<Route, RoutingError> {
            let expected_travel_time = Duration::try_from_secs_f64(route.duration.max(0.0))
                .map_err(|err| {
                    RoutingError::Parse(format!("duration {}: {}", route.duration, err))
                })?;
            Ok(Route {
                coordinates: route
                    .geometry
                    .coordinates
                    .iter()
                    .map(|[lng, lat]| LatLng::new(*lat, *lng))
                    .collect(),
                distance_meters: route.distance,
                expected_travel_time,
                transport,
            })
        })
        .collect()
}

/// Interpret a finished `/route` exchange. OSRM reports `NoRoute` with a 400
/// and a JSON body, so an error status only fails when the body doesn't parse.
pub fn route_result(
    status: u16,
    body: String,
    transport: TransportType,
) -> std::result::Result<Vec<Route>, RoutingError> {
    if (200..300).contains(&status) {
        return parse_route_response(&body, transport);
    }

    match parse_route_response(&body, transport) {
        Ok(routes) => Ok(routes),
        Err(_) => Err(RoutingError::Service {
            status,
            message: body,
        }),
    }
}

/// Directions backed by an OSRM server
pub struct OsrmRouter {
    client: reqwest::Client,
    config: ServiceConfig,
    completions: Sender<RouteCompletion>,
    in_flight: HashMap<RequestHandle, Box<dyn AsyncHandle>>,
}

impl OsrmRouter {
    pub fn new(config: ServiceConfig, completions: Sender<RouteCompletion>) -> Result<Self> {
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

    /// URL for a route between two points
    pub fn route_url(
        &self,
        origin: LatLng,
        destination: LatLng,
        transport: TransportType,
    ) -> String {
        format!(
            "{}/route/v1/{}/{},{};{},{}?overview=full&geometries=geojson",
            self.config.base_url.trim_end_matches('/'),
            profile(transport),
            origin.lng,
            origin.lat,
            destination.lng,
            destination.lat
        )
    }

    async fn fetch(
        client: reqwest::Client,
        url: String,
        transport: TransportType,
    ) -> std::result::Result<Vec<Route>, RoutingError> {
        let response = client.get(&url).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        route_result(status, body, transport)
    }
}

impl RoutingService for OsrmRouter {
    fn request(
        &mut self,
        origin: LatLng,
        destination: LatLng,
        transport: TransportType,
    ) -> RequestHandle {
        self.in_flight.retain(|_, task| !task.is_finished());

        let handle = RequestHandle::next();
        let url = self.route_url(origin, destination, transport);
        let client = self.client.clone();
        let completions = self.completions.clone();

        let spawned = runtime::spawn(async move {
            let result = Self::fetch(client, url, transport).await;
            let _ = completions.send(Completion::new(handle, result));
        });

        match spawned {
            Ok(task) => {
                self.in_flight.insert(handle, task);
            }
            Err(err) => {
                log::warn!("could not start directions request {}: {}", handle, err);
                let _ = self.completions.send(Completion::new(
                    handle,
                    Err(RoutingError::RuntimeUnavailable),
                ));
            }
        }

        handle
    }

    fn cancel(&mut self, handle: RequestHandle) {
        if let Some(task) = self.in_flight.remove(&handle) {
            task.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::completion_channel;

    #[test]
    fn test_parse_route() {
        let body = r#"{
            "code": "Ok",
            "routes": [{
                "distance": 1520.4,
                "duration": 1094.5,
                "geometry": {
                    "type": "LineString",
                    "coordinates": [[13.388, 52.517], [13.397, 52.529]]
                }
            }]
        }"#;

        let routes = parse_route_response(body, TransportType::Walking).unwrap();
        assert_eq!(routes.len(), 1);
        let route = &routes[0];
        assert_eq!(route.coordinates[0], LatLng::new(52.517, 13.388));
        assert_eq!(route.distance_meters, 1520.4);
        assert_eq!(route.expected_travel_time.as_secs(), 1094);
        assert_eq!(route.transport, TransportType::Walking);
    }

    #[test]
    fn test_parse_no_route_and_errors() {
        let routes = parse_route_response(
            r#"{ "code": "NoRoute", "message": "Impossible route" }"#,
            TransportType::Driving,
        )
        .unwrap();
        assert!(routes.is_empty());

        let err = parse_route_response(
            r#"{ "code": "InvalidQuery", "message": "bad" }"#,
            TransportType::Driving,
        )
        .unwrap_err();
        assert_eq!(
            err,
            RoutingError::Service {
                status: 200,
                message: "bad".into()
            }
        );

        assert!(matches!(
            parse_route_response("nope", TransportType::Driving),
            Err(RoutingError::Parse(_))
        ));
    }

    #[test]
    fn test_parse_rejects_out_of_range_duration() {
        let body = r#"{
            "code": "Ok",
            "routes": [{
                "distance": 1.0,
                "duration": 1e300,
                "geometry": { "coordinates": [] }
            }]
        }"#;

        assert!(matches!(
            parse_route_response(body, TransportType::Driving),
            Err(RoutingError::Parse(_))
        ));
    }

    #[test]
    fn test_route_result_status_handling() {
        let routes = route_result(
            400,
            r#"{ "code": "NoRoute", "message": "Impossible route" }"#.into(),
            TransportType::Walking,
        )
        .unwrap();
        assert!(routes.is_empty());

        let err = route_result(502, "Bad Gateway".into(), TransportType::Walking).unwrap_err();
        assert_eq!(
            err,
            RoutingError::Service {
                status: 502,
                message: "Bad Gateway".into()
            }
        );

        let err = route_result(
            200,
            r#"{ "code": "InvalidUrl", "message": "bad" }"#.into(),
            TransportType::Walking,
        )
        .unwrap_err();
        assert!(matches!(err, RoutingError::Service { status: 200, .. }));
    }

    #[test]
    fn test_route_url_uses_lng_lat_order_and_profile() {
        let (tx, _rx) = completion_channel();
        let router = OsrmRouter::new(
            ServiceConfig {
                base_url: "http://localhost:5000/".into(),
                ..ServiceConfig::osrm()
            },
            tx,
        )
        .unwrap();

        let url = router.route_url(
            LatLng::new(52.5, 13.4),
            LatLng::new(52.6, 13.5),
            TransportType::Walking,
        );
        assert_eq!(
            url,
            "http://localhost:5000/route/v1/foot/13.4,52.5;13.5,52.6\
             ?overview=full&geometries=geojson"
        );
    }

    #[test]
    fn test_request_without_runtime_reports_failure() {
        let (tx, rx) = completion_channel();
        let mut router = OsrmRouter::new(ServiceConfig::osrm(), tx).unwrap();
        let handle = router.request(
            LatLng::new(0.0, 0.0),
            LatLng::new(0.0, 1.0),
            TransportType::Driving,
        );

        let completion = rx.try_recv().unwrap();
        assert_eq!(completion.handle, handle);
        assert_eq!(completion.result, Err(RoutingError::RuntimeUnavailable));
    }
}
