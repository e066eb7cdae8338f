#![allow(dead_code)]

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use axum::{
    extract::State,
    http::{StatusCode, Uri},
};
use serde_json::{json, Value};

/// In-process stand-in for Universalis, recording every request it gets.
#[derive(Clone, Default)]
pub struct Mock {
    requests: Arc<Mutex<Vec<Uri>>>,
    market: Arc<Mutex<VecDeque<Value>>>,
}

impl Mock {
    /// Queues documents answered to `/{region}/{itemIds}`, one per request.
    pub fn push_market(&self, document: Value) {
        self.market.lock().unwrap().push_back(document);
    }

    pub fn requests(&self) -> Vec<Uri> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|uri| uri.path() == path)
            .count()
    }

    pub fn last(&self) -> Uri {
        self.requests().last().cloned().expect("no request received")
    }

    /// Starts the server and returns its base URL.
    pub async fn serve(&self) -> String {
        let app = axum::Router::new()
            .fallback(handle)
            .with_state(self.clone());

        let server = axum::Server::bind(&"127.0.0.1:0".parse().unwrap())
            .serve(app.into_make_service());
        let addr = server.local_addr();
        tokio::spawn(server);

        format!("http://{}", addr)
    }
}

async fn handle(State(mock): State<Mock>, uri: Uri) -> (StatusCode, String) {
    mock.requests.lock().unwrap().push(uri.clone());

    let path = uri.path();
    let body = match path {
        "/data-centers" => data_centers(),
        "/worlds" => worlds(),
        "/extra/stats/least-recently-updated" => least_recent(),
        p if p.starts_with("/aggregated/") => aggregated(),
        p => match p.rsplit('/').next() {
            Some("400") => return (StatusCode::BAD_REQUEST, String::new()),
            Some("404") => return (StatusCode::NOT_FOUND, String::new()),
            Some("503") => return (StatusCode::SERVICE_UNAVAILABLE, String::new()),
            Some("777") => return (StatusCode::OK, "<html>maintenance</html>".to_string()),
            _ => match mock.market.lock().unwrap().pop_front() {
                Some(document) => document,
                None => return (StatusCode::NOT_FOUND, String::new()),
            },
        },
    };

    (StatusCode::OK, body.to_string())
}

pub fn data_centers() -> Value {
    json!([
        {"name": "Crystal", "region": "North-America", "worlds": [91, 34]},
        {"name": "陆行鸟", "region": "中国", "worlds": [1042]}
    ])
}

pub fn worlds() -> Value {
    json!([
        {"id": 34, "name": "Brynhildr"},
        {"id": 91, "name": "Balmung"},
        {"id": 1042, "name": "拉诺西亚"}
    ])
}

pub fn least_recent() -> Value {
    json!({
        "items": [
            {
                "itemID": 2,
                "lastUploadTime": 1600000000000i64,
                "worldID": 91,
                "worldName": "Balmung"
            },
            {
                "itemID": 3,
                "lastUploadTime": 1600000005000i64,
                "worldID": 91,
                "worldName": "Balmung"
            }
        ]
    })
}

pub fn aggregated() -> Value {
    json!({
        "results": [
            {
                "itemId": 42884,
                "nq": {
                    "averageSalePrice": {"dc": {"price": 119999.6}, "region": {"price": 110000}}
                },
                "hq": {"averageSalePrice": {"world": {"price": 116110.2, "worldId": 34}}},
                "worldUploadTimes": [{"worldId": 34, "timestamp": 1700000000000i64}]
            }
        ],
        "failedItems": [1]
    })
}

pub fn item_doc(item_id: u64, listings: &[(&str, u64)], min_price: u64) -> Value {
    let listings: Vec<Value> = listings
        .iter()
        .map(|(id, price)| {
            json!({"listingID": id, "pricePerUnit": price, "quantity": 1, "hq": false})
        })
        .collect();

    json!({
        "itemID": item_id,
        "lastUploadTime": 1700000000123i64,
        "listings": listings,
        "recentHistory": [],
        "dcName": "Crystal",
        "currentAveragePrice": 121537.5,
        "currentAveragePriceNQ": 121537.5,
        "currentAveragePriceHQ": 0,
        "averagePrice": 119000,
        "averagePriceNQ": 119000,
        "averagePriceHQ": 0,
        "minPrice": min_price,
        "minPriceNQ": min_price,
        "minPriceHQ": 0,
        "maxPrice": 130000,
        "maxPriceNQ": 130000,
        "maxPriceHQ": 0,
        "worldUploadTimes": {"34": 1700000000123i64, "91": 1699000000000i64}
    })
}

pub fn crystal_document() -> Value {
    json!({
        "itemIDs": [42884, 20],
        "items": {
            "42884": item_doc(42884, &[("a1", 123040), ("a2", 125000)], 123040),
            "20": item_doc(20, &[("b1", 30000)], 30000),
        },
        "dcName": "Crystal",
        "unresolvedItems": []
    })
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}
