//! Every operation against the live mock service.
//!
//! # Design
//! Starts the mock service on a random port, then drives each client
//! operation over real HTTP through a ureq-backed `RpcChannel`. Validates
//! that request building and response parsing agree with what the service
//! actually sends, including its collapsed element shapes and faults.

use chrono::NaiveDate;
use rentpricing_core::{
    ClientConfig, FieldValue, Mapping, Model, RentClient, RpcChannel, RpcResult, ServerError, ServiceFault,
    UnitRateRequest,
};
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Deserialize)]
struct FaultBody {
    fault: ServiceFault,
}

/// Posts each call as `{"action", "params"}` to `/rpc`.
///
/// Disables ureq's automatic status-code-as-error behavior so a fault body
/// (status 500) is read as data rather than `Err`.
struct HttpChannel {
    url: String,
    agent: ureq::Agent,
}

impl HttpChannel {
    fn new(base: &str) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self {
            url: format!("{base}/rpc"),
            agent,
        }
    }
}

impl RpcChannel for HttpChannel {
    fn invoke(&self, action: &str, params: &Mapping) -> RpcResult {
        let body = json!({"action": action, "params": params}).to_string();
        let mut response = self
            .agent
            .post(&self.url)
            .content_type("application/json")
            .send(body.as_bytes())
            .expect("HTTP transport error");

        let status = response.status().as_u16();
        let text = response.body_mut().read_to_string().unwrap_or_default();
        if status == 500 {
            let body: FaultBody = serde_json::from_str(&text).expect("fault body");
            return Err(body.fault);
        }
        assert_eq!(status, 200, "unexpected status: {text}");
        Ok(serde_json::from_str::<Value>(&text).expect("response body"))
    }
}

fn start_mock_service() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener, "acme").await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn every_operation_round_trip() {
    let channel = HttpChannel::new(&start_mock_service());
    let client = RentClient::new(ClientConfig::new("acme"));

    // Properties: a sequence of two, one with an unparseable year.
    let properties = client
        .parse_get_properties(client.build_get_properties().invoke(&channel))
        .unwrap();
    assert_eq!(properties.len(), 2);
    assert_eq!(properties[0].property_type().unwrap().as_str(), "garden_style");
    assert_eq!(properties[0].year_built(), Some(1999));
    assert!(properties[1].year_built().is_none());
    assert!(properties[1].record().value("year_built").is_fallback());

    let property = client
        .parse_get_property(client.build_get_property("42").invoke(&channel))
        .unwrap();
    assert_eq!(property.name(), Some("Maple Court"));
    assert_eq!(property.unit_count(), Some(3));

    let parameters = client
        .parse_get_property_parameters(client.build_get_property_parameters("42").invoke(&channel))
        .unwrap();
    assert_eq!(parameters.external_property_id(), Some("42"));
    assert_eq!(parameters.post_date(), Some(date(2014, 1, 2)));
    assert_eq!(parameters.min_new_lease_term(), Some(6));
    assert_eq!(parameters.max_new_lease_term(), Some(15));
    assert!(parameters.min_renewal_lease_term().is_none());

    // Floor plans.
    let plans = client
        .parse_get_floor_plans(client.build_get_floor_plans("42").invoke(&channel))
        .unwrap();
    assert_eq!(plans.len(), 2);
    assert_eq!(plans[1].bathrooms(), Some(1.5));

    let plan = client
        .parse_get_floor_plan(client.build_get_floor_plan("42", "A1").invoke(&channel))
        .unwrap();
    assert_eq!(plan.square_feet(), Some(700));
    assert_eq!(plan.external_property_id(), Some("42"));

    // Units.
    let units = client
        .parse_get_units(client.build_get_units("42", None).invoke(&channel))
        .unwrap();
    assert_eq!(units.len(), 3);
    assert_eq!(units[0].availability_status().unwrap().as_str(), "vacant_not_leased");
    assert_eq!(units[0].make_ready_date(), Some(date(2014, 1, 10)));
    assert!(units[2].make_ready_date().is_none());

    let a1_units = client
        .parse_get_units(client.build_get_units("42", Some("A1")).invoke(&channel))
        .unwrap();
    assert_eq!(a1_units.len(), 2);

    let unit = client
        .parse_get_unit(client.build_get_unit("42", "102").invoke(&channel))
        .unwrap();
    assert_eq!(unit.square_feet(), Some(710));
    assert_eq!(unit.availability_status().unwrap(), &"occupied");

    let empty = client
        .parse_get_units(client.build_get_units("7", None).invoke(&channel))
        .unwrap();
    assert!(empty.is_empty());

    // Available units: flattened from floor plans, unit values win.
    let available = client
        .parse_get_available_units(client.build_get_available_units("42").invoke(&channel))
        .unwrap();
    assert_eq!(available.len(), 2);
    assert_eq!(available[0].floor_plan_name(), Some("A1"));
    assert_eq!(available[0].unit_number(), Some("101"));
    assert_eq!(available[0].effective_date(), Some(date(2014, 1, 2)));
    assert_eq!(available[0].features(), Some(&[json!("Balcony")][..]));
    assert_eq!(available[0].best_final_rent(), Some(975.5));
    assert_eq!(available[1].square_feet(), Some(960));
    assert_eq!(available[1].bedrooms(), Some(2.0));
    assert_eq!(available[1].availability_status().unwrap().as_str(), "on_notice");

    let summary = client
        .parse_get_rent_summary(client.build_get_rent_summary("42").invoke(&channel))
        .unwrap();
    assert_eq!(summary.len(), 1);
    assert_eq!(summary[0].unit_type(), Some("1x1"));
    assert_eq!(summary[0].min_market_rent(), Some(990.0));

    // Lease-term family.
    let requests = [
        UnitRateRequest {
            min_lease_term: Some(11),
            max_lease_term: Some(13),
            first_move_in_date: Some(date(2014, 2, 1)),
            ..UnitRateRequest::for_unit("101")
        },
        UnitRateRequest::for_unit("201"),
    ];
    let rents = client
        .parse_get_lease_term_rent(client.build_get_lease_term_rent("42", &requests).invoke(&channel))
        .unwrap();
    assert_eq!(rents.len(), 4);
    assert!(rents[..3].iter().all(|r| r.unit_number() == Some("101")));
    assert_eq!(rents[0].move_in_date(), Some(date(2014, 2, 1)));
    assert_eq!(rents[1].term_length(), Some(12));
    assert_eq!(rents[1].best(), Some(true));
    assert_eq!(rents[0].best(), Some(false));
    assert_eq!(rents[0].final_rent(), Some(1025.0));
    assert_eq!(rents[3].unit_number(), Some("201"));
    assert_eq!(rents[3].external_property_id(), Some("42"));
    let mut ids: Vec<String> = rents.iter().map(|r| r.id()).collect();
    ids.dedup();
    assert_eq!(ids.len(), 4);

    let plus = client
        .parse_get_lease_term_rent_plus(
            client.build_get_lease_term_rent_plus("42", &requests[1..]).invoke(&channel),
        )
        .unwrap();
    assert_eq!(plus.len(), 1);
    assert_eq!(plus[0].id(), rents[3].id());

    let renewal_request = [UnitRateRequest {
        start_date: Some(date(2014, 6, 1)),
        ..UnitRateRequest::for_unit("102")
    }];
    let renewals = client
        .parse_get_renewal_lease_term_rent(
            client.build_get_renewal_lease_term_rent("42", &renewal_request).invoke(&channel),
        )
        .unwrap();
    assert_eq!(renewals.len(), 1);
    assert_eq!(renewals[0].start_date(), Some(date(2014, 6, 1)));
    assert_eq!(renewals[0].record().value("market_rent"), &FieldValue::Float(1000.0));
}

#[test]
fn faults_become_typed_errors() {
    let channel = HttpChannel::new(&start_mock_service());

    let stranger = RentClient::new(ClientConfig::new("nobody"));
    let err = stranger
        .parse_get_properties(stranger.build_get_properties().invoke(&channel))
        .unwrap_err();
    assert!(matches!(err, ServerError::Authentication { .. }));
    assert!(err.message().starts_with("Client [nobody] not found for this user ["));
    assert!(err.message().contains(err.code()));

    let client = RentClient::new(ClientConfig::new("acme"));
    let err = client
        .parse_get_floor_plans(client.build_get_floor_plans("999").invoke(&channel))
        .unwrap_err();
    assert!(matches!(err, ServerError::Operation { .. }));
    assert_eq!(err.message(), "Property [999] not found");

    let err = client
        .parse_get_unit(client.build_get_unit("42", "999").invoke(&channel))
        .unwrap_err();
    assert!(matches!(err, ServerError::Operation { .. }));
}
