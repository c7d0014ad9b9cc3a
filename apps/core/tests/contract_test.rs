use launchdeck_core::catalog::TOTAL_PLUGINS_ID;
use launchdeck_core::config::Config;
use launchdeck_core::contract::{CoreRequest, CoreResponse, DisplayResponse};
use launchdeck_core::core_service::Launcher;
use launchdeck_core::dispatcher::LaunchDispatcher;
use launchdeck_core::model::{Command, Feature, PluginItem, PluginType};
use launchdeck_core::revision_store::{DocumentStore, PutRequest, SqliteDocumentStore};

fn seeded_launcher() -> Launcher {
    let store = SqliteDocumentStore::open_memory().unwrap();
    let plugin = PluginItem::new("color", PluginType::Installed)
        .with_source_file("/plugins/color/plugin.json")
        .with_logo("logo.png")
        .with_key_words(&["color"])
        .with_features(vec![Feature::new(
            vec![Command::text("pick color")],
            "Pick a color from screen",
        )]);
    store
        .put(
            "main",
            PutRequest {
                id: TOTAL_PLUGINS_ID.to_string(),
                data: serde_json::to_value(vec![plugin]).unwrap(),
                expected_revision: None,
            },
        )
        .unwrap();
    Launcher::init(Config::default(), store, LaunchDispatcher::default()).unwrap()
}

#[test]
fn serializes_and_deserializes_search_request() {
    let request = CoreRequest::Search {
        query: "color".to_string(),
    };

    let encoded = serde_json::to_string(&request).unwrap();
    assert!(encoded.contains("\"kind\":\"Search\""));
    let decoded: CoreRequest = serde_json::from_str(&encoded).unwrap();

    assert_eq!(decoded, request);
}

#[test]
fn handles_search_command_with_ordered_entries() {
    let mut launcher = seeded_launcher();

    let response = launcher
        .handle_command(CoreRequest::Search {
            query: "col".into(),
        })
        .unwrap();

    match response {
        CoreResponse::Search(DisplayResponse { entries }) => {
            assert_eq!(entries.len(), 2);
            assert_eq!(entries[0].name, "pick color");
            assert_eq!(entries[0].value, "plugin");
            assert_eq!(entries[0].icon, "image:///plugins/color/logo.png");
            assert_eq!(entries[0].desc, "Pick a color from screen");
            assert_eq!(entries[1].name, "color");
            assert_eq!(entries[1].kind, "installed");
        }
        other => panic!("expected search response, got {other:?}"),
    }
}

#[test]
fn empty_search_lists_whole_catalog() {
    let mut launcher = seeded_launcher();

    let response = launcher
        .handle_command(CoreRequest::Search {
            query: String::new(),
        })
        .unwrap();

    match response {
        CoreResponse::Search(DisplayResponse { entries }) => {
            assert_eq!(entries.len(), 1);
            assert_eq!(entries[0].name, "color");
        }
        other => panic!("expected search response, got {other:?}"),
    }
}

#[test]
fn open_command_reports_launch() {
    let mut launcher = seeded_launcher();
    launcher.on_search("pick").unwrap();

    let response = launcher
        .handle_command(CoreRequest::Open {
            index: 0,
            route: Some("/main".into()),
        })
        .unwrap();

    assert_eq!(
        response,
        CoreResponse::Open(launchdeck_core::contract::OpenResponse { launched: true })
    );
}
