use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::net::TcpListener;
use tracing::{debug, info};
use uuid::Uuid;

/// One call as the mock expects it on the wire.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RpcEnvelope {
    pub action: String,
    #[serde(default)]
    pub params: Map<String, Value>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Fault {
    pub classification: String,
    pub message: String,
    pub code: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FaultBody {
    pub fault: Fault,
}

/// Static portfolio the mock answers from.
#[derive(Debug)]
pub struct Portfolio {
    pub client_name: String,
    pub properties: Vec<Value>,
}

pub type Db = Arc<Portfolio>;

pub const PROPERTY_ID: &str = "42";
pub const EMPTY_PROPERTY_ID: &str = "7";

impl Portfolio {
    pub fn sample(client_name: &str) -> Self {
        Self {
            client_name: client_name.to_string(),
            properties: vec![
                json!({
                    "external_property_id": PROPERTY_ID,
                    "name": "Maple Court",
                    "address": "1 Maple Ct",
                    "city": "Portland",
                    "state": "OR",
                    "zip": "97201",
                    "type": "Garden Style",
                    "year_built": "1999",
                    "unit_count": "3",
                }),
                json!({
                    "external_property_id": EMPTY_PROPERTY_ID,
                    "name": "Vacant Lot",
                    "year_built": "unknown",
                }),
            ],
        }
    }

    fn property(&self, id: &str) -> Option<&Value> {
        self.properties
            .iter()
            .find(|p| p["external_property_id"] == id)
    }
}

pub fn app(client_name: &str) -> Router {
    let db: Db = Arc::new(Portfolio::sample(client_name));
    Router::new().route("/rpc", post(rpc)).with_state(db)
}

pub async fn run(listener: TcpListener, client_name: &str) -> Result<(), std::io::Error> {
    info!(addr = ?listener.local_addr().ok(), "mock rent service listening");
    axum::serve(listener, app(client_name)).await
}

type Reply = (StatusCode, Json<Value>);

fn fault(classification: &str, message: String, code: String) -> Reply {
    let body = FaultBody {
        fault: Fault {
            classification: classification.to_string(),
            message,
            code,
        },
    };
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::to_value(body).unwrap_or(Value::Null)),
    )
}

fn fault_code() -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("{}-{}", &id[..11], &id[11..14])
}

/// Shape a list the way the service does: no key for zero elements, a bare
/// mapping for one, a sequence for more.
fn collapse(mut items: Vec<Value>) -> Option<Value> {
    match items.len() {
        0 => None,
        1 => items.pop(),
        _ => Some(Value::Array(items)),
    }
}

fn respond(operation: &str, mut ret: Map<String, Value>, key: &str, items: Vec<Value>) -> Reply {
    if let Some(items) = collapse(items) {
        ret.insert(key.to_string(), items);
    }
    let mut body = Map::new();
    body.insert(format!("{operation}_response"), json!({ "return": ret }));
    (StatusCode::OK, Json(Value::Object(body)))
}

fn context(id: &str) -> Map<String, Value> {
    let mut ret = Map::new();
    ret.insert("external_property_id".into(), json!(id));
    ret
}

fn dated_context(id: &str) -> Map<String, Value> {
    let mut ret = context(id);
    ret.insert("effective_date".into(), json!("2014-01-02"));
    ret
}

fn floor_plans(id: &str) -> Vec<Value> {
    if id != PROPERTY_ID {
        return Vec::new();
    }
    vec![
        json!({"name": "A1", "description": "One bedroom", "square_feet": "700", "bed_rooms": "1", "bath_rooms": "1"}),
        json!({"name": "B2", "description": "Two bedroom", "square_feet": "950", "bed_rooms": "2", "bath_rooms": "1.5"}),
    ]
}

fn units(id: &str) -> Vec<Value> {
    if id != PROPERTY_ID {
        return Vec::new();
    }
    vec![
        json!({"name": "101", "floor_plan_name": "A1", "building": "1", "availability_status": "Vacant Not Leased", "square_footage": "700", "make_ready_date": "2014-01-10"}),
        json!({"name": "102", "floor_plan_name": "A1", "building": "1", "availability_status": "Occupied", "square_footage": "710"}),
        json!({"name": "201", "floor_plan_name": "B2", "building": "2", "availability_status": "On Notice", "square_footage": "950", "make_ready_date": "TBD"}),
    ]
}

fn available_units(id: &str) -> Vec<Value> {
    if id != PROPERTY_ID {
        return Vec::new();
    }
    vec![
        json!({"name": "A1", "bed_rooms": "1", "bath_rooms": "1", "square_feet": "700",
               "unit": {"unit_number": "101", "building": "1", "status": "Vacant Not Leased",
                        "feature": "Balcony", "date_available": "2014-01-10",
                        "base_market_rent": "1000", "best_lease_term": "12", "best_final_rent": "975.50"}}),
        json!({"name": "B2", "bed_rooms": "2", "bath_rooms": "1.5", "square_feet": "950",
               "unit": {"unit_number": "201", "building": "2", "status": "On Notice",
                        "feature": ["Corner", "Fireplace"], "square_feet": "960",
                        "base_market_rent": "1400", "best_lease_term": "6"}}),
    ]
}

fn rent_summary(id: &str) -> Vec<Value> {
    if id != PROPERTY_ID {
        return Vec::new();
    }
    vec![json!({"floor_plan_name": "A1", "unit_type": "1x1", "bed_rooms": "1", "bath_rooms": "1",
                "avg_square_feet": "705", "min_market_rent": "990", "max_market_rent": "1010",
                "concession_type": "None", "min_final_rent": "990", "max_final_rent": "1010"})]
}

fn parameters() -> Vec<Value> {
    vec![
        json!({"name": "Post Date", "value": "2014-01-02"}),
        json!({"name": "Min New Lease Term", "value": "6"}),
        json!({"name": "Max New Lease Term", "value": "15"}),
        json!({"name": "Max Move In Days", "value": "60"}),
    ]
}

/// Rates for each requested unit group: one per term in the requested range
/// (default 12 only), moving in on the first move-in date.
fn unit_rates(groups: Option<&Value>, renewal: bool) -> Vec<Value> {
    let groups: Vec<&Map<String, Value>> = match groups {
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_object).collect(),
        Some(Value::Object(single)) => vec![single],
        _ => Vec::new(),
    };
    groups
        .into_iter()
        .map(|group| {
            let term = |key: &str, default: u64| {
                group.get(key).and_then(Value::as_u64).unwrap_or(default)
            };
            let (min, max) = (term("min_lease_term", 12), term("max_lease_term", 12));
            let date_key = if renewal { "start_date" } else { "first_move_in_date" };
            let date = group.get(date_key).cloned().unwrap_or(json!("2014-01-02"));
            let rates: Vec<Value> = (min..=max)
                .map(|months| {
                    let mut rate = json!({
                        "term_length": months.to_string(),
                        "market_rent": "1000",
                        "final_rent": (1000 + (12_i64 - months as i64).abs() * 25).to_string(),
                        "best": (months == 12).to_string(),
                    });
                    rate[date_key.replace("first_", "").as_str()] = date.clone();
                    rate
                })
                .collect();
            let mut element = Map::new();
            if let Some(unit) = group.get("unit_number") {
                element.insert("unit_number".into(), unit.clone());
            }
            if let Some(rates) = collapse(rates) {
                element.insert("unit_rate".into(), rates);
            }
            Value::Object(element)
        })
        .collect()
}

async fn rpc(State(db): State<Db>, Json(envelope): Json<RpcEnvelope>) -> Reply {
    let params = &envelope.params;
    let client = params.get("client_name").and_then(Value::as_str).unwrap_or("");
    debug!(action = %envelope.action, client, "rpc call");

    if client != db.client_name {
        let code = fault_code();
        return fault(
            "authentication",
            format!("Client [{client}] not found for this user [{code}]"),
            code,
        );
    }

    let id = params
        .get("external_property_id")
        .and_then(Value::as_str)
        .unwrap_or("");
    if envelope.action != "getProperties" && db.property(id).is_none() {
        return fault("operation", format!("Property [{id}] not found"), fault_code());
    }

    match envelope.action.as_str() {
        "getProperties" => respond("get_properties", Map::new(), "property", db.properties.clone()),
        "getPropertyInfo" => {
            let property = db.property(id).cloned().into_iter().collect();
            respond("get_property", context(id), "property", property)
        }
        "getPropertyParameters" => {
            respond("get_property_parameters", context(id), "parameter", parameters())
        }
        "getFloorPlans" => respond("get_floor_plans", context(id), "floor_plan", floor_plans(id)),
        "getFloorPlan" => {
            let name = params.get("floor_plan_name").and_then(Value::as_str).unwrap_or("");
            match floor_plans(id).into_iter().find(|p| p["name"] == name) {
                Some(plan) => respond("get_floor_plan", context(id), "floor_plan", vec![plan]),
                None => fault("operation", format!("Floor plan [{name}] not found"), fault_code()),
            }
        }
        "getUnits" => {
            let plan = params.get("floor_plan_name").and_then(Value::as_str);
            let units = units(id)
                .into_iter()
                .filter(|u| plan.is_none_or(|p| u["floor_plan_name"] == p))
                .collect();
            respond("get_units", context(id), "unit", units)
        }
        "getUnit" => {
            let name = params.get("unit_name").and_then(Value::as_str).unwrap_or("");
            match units(id).into_iter().find(|u| u["name"] == name) {
                Some(unit) => respond("get_unit", context(id), "unit", vec![unit]),
                None => fault("operation", format!("Unit [{name}] not found"), fault_code()),
            }
        }
        "getAvailableUnits" => {
            respond("get_available_units", dated_context(id), "floor_plan", available_units(id))
        }
        "getRentSummary" => {
            respond("get_rent_summary", dated_context(id), "floor_plan_unit_type", rent_summary(id))
        }
        "getLeaseTermRent" => respond(
            "get_lease_term_rent",
            context(id),
            "lease_term_rent_unit_response",
            unit_rates(params.get("lease_term_rent_unit_request"), false),
        ),
        "getLeaseTermRentPlus" => respond(
            "get_lease_term_rent_plus",
            context(id),
            "lease_term_rent_plus_unit_response",
            unit_rates(params.get("lease_term_rent_plus_unit_request"), false),
        ),
        "getRenewalLeaseTermRent" => respond(
            "get_renewal_lease_term_rent",
            context(id),
            "renewal_lease_term_rent_unit_response",
            unit_rates(params.get("renewal_lease_term_rent_unit_request"), true),
        ),
        other => fault("internal", format!("Unsupported action [{other}]"), fault_code()),
    }
}
