//! Extractor lifecycle tests against a mock WebDriver backend.
//!
//! The mock records every `delete_session` call so the tests can pin the
//! release-exactly-once property on both success and failure paths.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use harrow_client::{Extraction, ExtractError, OpenPage, PageExtractor, Row};
use harrow_core::config::{Config, FieldRule, FieldStrategy};
use harrow_webdriver::protocol::{Capabilities, StatusValue};
use harrow_webdriver::{ElementRef, Session, SessionId, WebDriver, WebDriverError};

#[derive(Debug, Clone)]
struct MockRow {
    text: String,
    cells: Vec<String>,
}

#[derive(Debug, Default)]
struct MockState {
    deletes: usize,
    fail_navigation: bool,
    fail_delete: bool,
    rows: Vec<MockRow>,
}

#[derive(Debug, Clone)]
struct MockWebDriver {
    state: Arc<Mutex<MockState>>,
}

impl MockWebDriver {
    fn new(state: MockState) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    fn deletes(&self) -> usize {
        self.state.lock().unwrap().deletes
    }
}

fn row_index(element: &ElementRef, prefix: &str) -> Option<usize> {
    element.element_id.strip_prefix(prefix)?.parse().ok()
}

#[async_trait]
impl WebDriver for MockWebDriver {
    async fn status(&self) -> Result<StatusValue, WebDriverError> {
        Ok(StatusValue {
            ready: true,
            message: String::new(),
        })
    }

    async fn new_session(&self, _caps: &Capabilities) -> Result<SessionId, WebDriverError> {
        Ok(SessionId::new("mock-session"))
    }

    async fn delete_session(&self, session: &SessionId) -> Result<(), WebDriverError> {
        let mut state = self.state.lock().unwrap();
        state.deletes += 1;
        if state.fail_delete {
            Err(WebDriverError::InvalidSessionId(session.to_string()))
        } else {
            Ok(())
        }
    }

    async fn navigate(&self, _session: &SessionId, url: &str) -> Result<(), WebDriverError> {
        if self.state.lock().unwrap().fail_navigation {
            Err(WebDriverError::Timeout(format!(
                "page load timed out for {url}"
            )))
        } else {
            Ok(())
        }
    }

    async fn find_elements(
        &self,
        _session: &SessionId,
        _selector: &str,
    ) -> Result<Vec<ElementRef>, WebDriverError> {
        let state = self.state.lock().unwrap();
        Ok((0..state.rows.len())
            .map(|i| ElementRef {
                element_id: format!("row-{i}"),
            })
            .collect())
    }

    async fn find_elements_within(
        &self,
        _session: &SessionId,
        element: &ElementRef,
        _selector: &str,
    ) -> Result<Vec<ElementRef>, WebDriverError> {
        let state = self.state.lock().unwrap();
        let idx = row_index(element, "row-")
            .ok_or_else(|| WebDriverError::NoSuchElement(element.element_id.clone()))?;
        let row = state
            .rows
            .get(idx)
            .ok_or_else(|| WebDriverError::StaleElement(element.element_id.clone()))?;
        Ok((0..row.cells.len())
            .map(|j| ElementRef {
                element_id: format!("cell-{idx}-{j}"),
            })
            .collect())
    }

    async fn element_text(
        &self,
        _session: &SessionId,
        element: &ElementRef,
    ) -> Result<String, WebDriverError> {
        let state = self.state.lock().unwrap();
        if let Some(idx) = row_index(element, "row-") {
            return state
                .rows
                .get(idx)
                .map(|r| r.text.clone())
                .ok_or_else(|| WebDriverError::StaleElement(element.element_id.clone()));
        }
        if let Some(rest) = element.element_id.strip_prefix("cell-") {
            if let Some((i, j)) = rest.split_once('-') {
                let (i, j): (usize, usize) = (i.parse().unwrap(), j.parse().unwrap());
                return Ok(state.rows[i].cells[j].clone());
            }
        }
        Err(WebDriverError::NoSuchElement(element.element_id.clone()))
    }
}

fn open_page(driver: &MockWebDriver) -> OpenPage {
    OpenPage::from_session(Session::attach(
        Arc::new(driver.clone()),
        SessionId::new("mock-session"),
    ))
}

fn course_rows() -> Vec<MockRow> {
    vec![
        MockRow {
            text: "101 Intro Biology MWF 9:00 10:00 Smith Hall 200 Dr. Lee".to_string(),
            cells: vec![
                "101".to_string(),
                "Intro Biology".to_string(),
                "MWF".to_string(),
            ],
        },
        MockRow {
            text: "214 Organic Chemistry TR 13:00 14:30 Hall 12 Dr. Park".to_string(),
            cells: vec![
                "214".to_string(),
                "Organic Chemistry".to_string(),
                "TR".to_string(),
                "Dr. Park".to_string(),
            ],
        },
    ]
}

#[tokio::test]
async fn full_table_extraction_closes_the_session_once() {
    let driver = MockWebDriver::new(MockState {
        rows: course_rows(),
        ..Default::default()
    });
    let extractor = PageExtractor::new(Config::default());

    let extraction = extractor.run_on(open_page(&driver)).await.unwrap();

    match extraction {
        Extraction::Table(rows) => {
            assert_eq!(rows.len(), 2);
            // Each row's length reflects the cells found for that row;
            // irregular pages legitimately differ row-to-row.
            assert_eq!(rows[0].cells.len(), 3);
            assert_eq!(rows[1].cells.len(), 4);
            assert_eq!(rows[0].cells[1], "Intro Biology");
        }
        other => panic!("expected a table, got {other:?}"),
    }
    assert_eq!(driver.deletes(), 1);
}

#[tokio::test]
async fn navigation_failure_still_closes_the_session() {
    let driver = MockWebDriver::new(MockState {
        fail_navigation: true,
        rows: course_rows(),
        ..Default::default()
    });
    let extractor = PageExtractor::new(Config::default());

    let err = extractor.run_on(open_page(&driver)).await.unwrap_err();
    assert!(matches!(err, ExtractError::Navigation { .. }), "got {err:?}");
    assert_eq!(driver.deletes(), 1);
}

#[tokio::test]
async fn zero_rows_with_requirement_fails_and_closes() {
    let driver = MockWebDriver::new(MockState::default());
    let extractor = PageExtractor::new(Config::default());

    let err = extractor.run_on(open_page(&driver)).await.unwrap_err();
    match err {
        ExtractError::ElementNotFound { selector } => assert_eq!(selector, "tbody tr"),
        other => panic!("expected ElementNotFound, got {other:?}"),
    }
    assert_eq!(driver.deletes(), 1);
}

#[tokio::test]
async fn zero_rows_without_requirement_is_an_empty_success() {
    let driver = MockWebDriver::new(MockState::default());
    let mut config = Config::default();
    config.extractor.require_rows = false;
    let extractor = PageExtractor::new(config);

    let extraction = extractor.run_on(open_page(&driver)).await.unwrap();
    assert_eq!(extraction, Extraction::Table(vec![]));
    assert_eq!(driver.deletes(), 1);
}

#[tokio::test]
async fn cells_without_text_come_back_as_empty_strings() {
    let driver = MockWebDriver::new(MockState {
        rows: vec![MockRow {
            text: String::new(),
            cells: vec![String::new(), String::new(), String::new()],
        }],
        ..Default::default()
    });
    let extractor = PageExtractor::new(Config::default());

    let extraction = extractor.run_on(open_page(&driver)).await.unwrap();
    assert_eq!(
        extraction,
        Extraction::Table(vec![Row {
            cells: vec![String::new(), String::new(), String::new()]
        }])
    );
}

#[tokio::test]
async fn a_row_with_no_cells_yields_an_empty_row_not_a_failure() {
    let driver = MockWebDriver::new(MockState {
        rows: vec![MockRow {
            text: String::new(),
            cells: vec![],
        }],
        ..Default::default()
    });
    let extractor = PageExtractor::new(Config::default());

    let extraction = extractor.run_on(open_page(&driver)).await.unwrap();
    assert_eq!(extraction, Extraction::Table(vec![Row { cells: vec![] }]));
}

#[tokio::test]
async fn first_row_mode_applies_the_legacy_splice() {
    let driver = MockWebDriver::new(MockState {
        rows: course_rows(),
        ..Default::default()
    });
    let mut config = Config::default();
    config.extractor.first_row_only = true;
    let extractor = PageExtractor::new(config);

    let extraction = extractor.run_on(open_page(&driver)).await.unwrap();
    match extraction {
        Extraction::FirstRow(fields) => {
            let values: Vec<&str> = fields.iter().map(|f| f.value.as_str()).collect();
            assert_eq!(values, vec!["101", "Intro", "Biology", "MWF"]);
        }
        other => panic!("expected first-row fields, got {other:?}"),
    }
    assert_eq!(driver.deletes(), 1);
}

#[tokio::test]
async fn first_row_mode_with_column_rules_names_the_fields() {
    let driver = MockWebDriver::new(MockState {
        rows: course_rows(),
        ..Default::default()
    });
    let mut config = Config::default();
    config.extractor.first_row_only = true;
    config.extractor.fields = FieldStrategy::Columns {
        fields: vec![
            FieldRule {
                name: "crn".to_string(),
                cell: 0,
            },
            FieldRule {
                name: "title".to_string(),
                cell: 1,
            },
            FieldRule {
                name: "instructor".to_string(),
                cell: 20,
            },
        ],
    };
    let extractor = PageExtractor::new(config);

    let extraction = extractor.run_on(open_page(&driver)).await.unwrap();
    match extraction {
        Extraction::FirstRow(fields) => {
            assert_eq!(fields[0].name.as_deref(), Some("crn"));
            assert_eq!(fields[0].value, "101");
            assert_eq!(fields[1].value, "Intro Biology");
            // Rule past the row's end yields an empty string.
            assert_eq!(fields[2].value, "");
        }
        other => panic!("expected first-row fields, got {other:?}"),
    }
}

#[tokio::test]
async fn a_failed_release_after_a_good_extraction_surfaces_as_close() {
    let driver = MockWebDriver::new(MockState {
        fail_delete: true,
        rows: course_rows(),
        ..Default::default()
    });
    let extractor = PageExtractor::new(Config::default());

    let err = extractor.run_on(open_page(&driver)).await.unwrap_err();
    assert!(matches!(err, ExtractError::Close(_)), "got {err:?}");
    assert_eq!(driver.deletes(), 1);
}

#[tokio::test]
async fn the_extraction_error_wins_when_the_release_also_fails() {
    let driver = MockWebDriver::new(MockState {
        fail_navigation: true,
        fail_delete: true,
        rows: course_rows(),
        ..Default::default()
    });
    let extractor = PageExtractor::new(Config::default());

    let err = extractor.run_on(open_page(&driver)).await.unwrap_err();
    assert!(matches!(err, ExtractError::Navigation { .. }), "got {err:?}");
    assert_eq!(driver.deletes(), 1);
}

#[tokio::test]
async fn an_unreachable_endpoint_fails_the_run_at_session_start() {
    // Reserve a port and drop the listener so nothing is listening there.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let mut config = Config::default();
    config.webdriver.endpoint = Some(format!("http://{addr}"));
    let extractor = PageExtractor::new(config);

    let err = extractor.run().await.unwrap_err();
    assert!(matches!(err, ExtractError::SessionStart(_)), "got {err:?}");
}

#[tokio::test]
async fn a_missing_driver_binary_fails_the_run_at_session_start() {
    let mut config = Config::default();
    config.webdriver.driver_path = "/nonexistent/driver-binary".to_string();
    let extractor = PageExtractor::new(config);

    let err = extractor.run().await.unwrap_err();
    assert!(matches!(err, ExtractError::SessionStart(_)), "got {err:?}");
}

#[tokio::test]
async fn a_fresh_locate_call_requeries_the_page() {
    let driver = MockWebDriver::new(MockState {
        rows: course_rows(),
        ..Default::default()
    });
    let page = open_page(&driver);

    let first = page.locate_rows("tbody tr").await.unwrap();
    assert_eq!(first.len(), 2);

    driver.state.lock().unwrap().rows.pop();
    let second = page.locate_rows("tbody tr").await.unwrap();
    assert_eq!(second.len(), 1);

    page.close().await.unwrap();
    assert_eq!(driver.deletes(), 1);
}
