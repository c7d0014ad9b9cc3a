use launchdeck_core::catalog::CACHE_PLUGINS_ID;
use launchdeck_core::config::Config;
use launchdeck_core::contract::CoreRequest;
use launchdeck_core::core_service::Launcher;
use launchdeck_core::dispatcher::LaunchDispatcher;
use launchdeck_core::model::PluginItem;
use launchdeck_core::revision_store::{DocumentStore, PutRequest, SqliteDocumentStore};
use launchdeck_core::transport::{handle_json, handle_request, ErrorCode, TransportResponse};

fn launcher_with_seed_item() -> Launcher {
    let store = SqliteDocumentStore::open_memory().unwrap();
    let mut launcher =
        Launcher::init(Config::default(), store, LaunchDispatcher::default()).unwrap();
    launcher
        .apply_discovery(Ok(vec![PluginItem::app("Code", "", "")]))
        .unwrap();
    launcher
}

#[test]
fn request_handler_returns_ok_transport_response() {
    let mut launcher = launcher_with_seed_item();

    let response = handle_request(
        &mut launcher,
        CoreRequest::Search {
            query: "code".into(),
        },
    );

    match response {
        TransportResponse::Ok { response } => {
            let encoded = serde_json::to_string(&TransportResponse::Ok { response }).unwrap();
            assert!(encoded.contains("\"status\":\"ok\""));
        }
        other => panic!("expected ok transport response, got {other:?}"),
    }
}

#[test]
fn json_handler_returns_invalid_json_error_code() {
    let mut launcher = launcher_with_seed_item();

    let raw = handle_json(&mut launcher, "{not-json");
    let parsed: TransportResponse = serde_json::from_str(&raw).unwrap();

    match parsed {
        TransportResponse::Err { error } => assert_eq!(error.code, ErrorCode::InvalidJson),
        _ => panic!("expected invalid json error"),
    }
}

#[test]
fn json_handler_output_stays_valid_json_for_escaped_input() {
    let mut launcher = launcher_with_seed_item();

    let raw = handle_json(&mut launcher, "{\"kind\": \"search\\\u{1}\"");
    let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();

    assert_eq!(parsed["status"], "err");
    assert_eq!(parsed["error"]["code"], "invalid_json");
}

#[test]
fn json_handler_returns_entry_not_found_error_code() {
    let mut launcher = launcher_with_seed_item();
    let request = CoreRequest::Open {
        index: 9,
        route: None,
    };

    let raw = handle_json(&mut launcher, &serde_json::to_string(&request).unwrap());
    let parsed: TransportResponse = serde_json::from_str(&raw).unwrap();

    match parsed {
        TransportResponse::Err { error } => assert_eq!(error.code, ErrorCode::EntryNotFound),
        _ => panic!("expected entry not found error"),
    }
}

#[test]
fn json_handler_returns_launch_error_code() {
    let mut launcher = launcher_with_seed_item();
    launcher.on_search("code").unwrap();
    let request = CoreRequest::Open {
        index: 0,
        route: None,
    };

    let raw = handle_json(&mut launcher, &serde_json::to_string(&request).unwrap());
    let parsed: TransportResponse = serde_json::from_str(&raw).unwrap();

    match parsed {
        TransportResponse::Err { error } => assert_eq!(error.code, ErrorCode::Launch),
        _ => panic!("expected launch error"),
    }
}

#[test]
fn json_handler_returns_conflict_error_code() {
    let mut launcher = launcher_with_seed_item();
    let stale = launcher.revisions().cache.clone();
    launcher
        .store()
        .put(
            "main",
            PutRequest {
                id: CACHE_PLUGINS_ID.to_string(),
                data: serde_json::json!([]),
                expected_revision: stale,
            },
        )
        .unwrap();

    let request = CoreRequest::Search {
        query: "code".into(),
    };
    let raw = handle_json(&mut launcher, &serde_json::to_string(&request).unwrap());
    let parsed: TransportResponse = serde_json::from_str(&raw).unwrap();

    match parsed {
        TransportResponse::Err { error } => assert_eq!(error.code, ErrorCode::Conflict),
        _ => panic!("expected conflict error"),
    }
}
