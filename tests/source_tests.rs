//! Page loading against an in-memory CitySource

use std::sync::Mutex;

use async_trait::async_trait;
use citytable::{
    action::Action,
    api::{self, CitySource, FetchError},
    reducer::reducer,
    state::{AppState, CityRecord},
};
use tui_dispatch::EffectStore;

/// Serves a fixed dataset, recording each requested window.
struct MemorySource {
    cities: Vec<CityRecord>,
    requests: Mutex<Vec<(u64, u32)>>,
}

impl MemorySource {
    fn with_len(len: usize) -> Self {
        Self {
            cities: (0..len)
                .map(|i| CityRecord {
                    id: format!("id-{i}"),
                    name: format!("City {i}"),
                    country: "Testland".into(),
                    timezone: "UTC".into(),
                })
                .collect(),
            requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl CitySource for MemorySource {
    async fn fetch_page(&self, start: u64, rows: u32) -> Result<Vec<CityRecord>, FetchError> {
        self.requests.lock().unwrap().push((start, rows));
        Ok(self
            .cities
            .iter()
            .skip(start as usize)
            .take(rows as usize)
            .cloned()
            .collect())
    }
}

struct BrokenSource;

#[async_trait]
impl CitySource for BrokenSource {
    async fn fetch_page(&self, _start: u64, _rows: u32) -> Result<Vec<CityRecord>, FetchError> {
        Err(api::parse_page("not json").unwrap_err())
    }
}

/// Answers with a well-formed JSON error object instead of a record list.
struct ErrorBodySource;

#[async_trait]
impl CitySource for ErrorBodySource {
    async fn fetch_page(&self, _start: u64, _rows: u32) -> Result<Vec<CityRecord>, FetchError> {
        api::parse_page(r#"{"error": "Unknown dataset", "errorcode": 10002}"#)
    }
}

#[tokio::test]
async fn test_load_page_success() {
    let source = MemorySource::with_len(120);

    let action = api::load_page(&source, 2, 100, 50).await;

    let Action::PageDidLoad { page, records } = action else {
        panic!("expected PageDidLoad, got {action:?}");
    };
    assert_eq!(page, 2);
    assert_eq!(records.len(), 20);
    assert_eq!(records[0].id, "id-100");
    assert_eq!(*source.requests.lock().unwrap(), vec![(100, 50)]);
}

#[tokio::test]
async fn test_load_page_failure_becomes_error_action() {
    let action = api::load_page(&BrokenSource, 0, 0, 50).await;

    assert!(matches!(
        action,
        Action::PageDidError { page: 0, ref error } if error.contains("parse")
    ));
}

#[tokio::test]
async fn test_error_body_keeps_paging_open() {
    let mut store = EffectStore::new(AppState::default(), reducer);
    store.dispatch(Action::PageFetch);

    let loaded = api::load_page(&ErrorBodySource, 0, 0, 50).await;
    assert!(matches!(loaded, Action::PageDidError { page: 0, .. }));
    store.dispatch(loaded);

    let state = store.state();
    assert!(!state.end_of_data);
    assert!(!state.is_loading());
    assert!(state.cities.is_empty());

    let result = store.dispatch(Action::PageRequestNext);
    assert_eq!(
        result.effects,
        vec![citytable::effect::Effect::FetchPage {
            page: 1,
            start: 50,
            rows: 50
        }]
    );
}

/// Drive the reducer and the source together until the data runs out.
#[tokio::test]
async fn test_paging_until_exhausted() {
    let source = MemorySource::with_len(120);
    let mut store = EffectStore::new(AppState::default(), reducer);

    let mut result = store.dispatch(Action::PageFetch);
    while let Some(citytable::effect::Effect::FetchPage { page, start, rows }) =
        result.effects.pop()
    {
        let loaded = api::load_page(&source, page, start, rows).await;
        store.dispatch(loaded);
        result = store.dispatch(Action::PageRequestNext);
    }

    let state = store.state();
    assert!(state.end_of_data);
    assert_eq!(state.cities.len(), 120);
    assert_eq!(state.cursor, 3);
    assert_eq!(
        *source.requests.lock().unwrap(),
        vec![(0, 50), (50, 50), (100, 50), (150, 50)]
    );
}
