//! The extractor: one navigate-locate-extract-release cycle.

use log::{debug, info, warn};

use harrow_core::config::{Config, FieldStrategy};
use harrow_webdriver::{ElementRef, LaunchMode, Session, start_session};

use crate::error::ExtractError;
use crate::fields::{self, Field};

/// One located table row. Valid only while the page it came from stays
/// open and has not navigated away.
#[derive(Debug, Clone)]
pub struct RowHandle(ElementRef);

/// Ordered cell texts for one row at extraction time. No identity beyond
/// position; cell counts may differ row-to-row when the page is irregular.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub cells: Vec<String>,
}

/// Result of one extraction pass.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    /// Every matched row, in document order.
    Table(Vec<Row>),
    /// First-row legacy mode: field values from the first matching row.
    FirstRow(Vec<Field>),
}

/// Performs one extraction cycle against a single page.
///
/// The session lifecycle is Closed → Open → Closed, terminal: [`open`]
/// returns an [`OpenPage`] through which navigation and extraction run,
/// and closing it consumes the value. [`run`] drives the whole cycle and
/// guarantees the close on every path.
///
/// [`open`]: Self::open
/// [`run`]: Self::run
#[derive(Debug, Clone)]
pub struct PageExtractor {
    config: Config,
}

impl PageExtractor {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Acquires a browser session. The returned page must be closed by the
    /// caller; prefer [`run`](Self::run), which guarantees it.
    pub async fn open(&self) -> Result<OpenPage, ExtractError> {
        self.config.webdriver.validate()?;
        let mode = LaunchMode::from_config(&self.config.webdriver);
        let session = start_session(mode, &self.config.webdriver)
            .await
            .map_err(ExtractError::SessionStart)?;
        Ok(OpenPage { session })
    }

    /// Runs the full cycle: open, navigate, locate, extract, close. A
    /// single best-effort pass with no retries; the session is released
    /// exactly once whether or not the steps after `open` succeeded.
    pub async fn run(&self) -> Result<Extraction, ExtractError> {
        let page = self.open().await?;
        self.run_on(page).await
    }

    /// Runs the navigate-locate-extract sequence on an already-open page,
    /// closing it on every path. When both the extraction and the close
    /// fail, the extraction error wins and the close failure is logged.
    pub async fn run_on(&self, page: OpenPage) -> Result<Extraction, ExtractError> {
        let outcome = self.drive(&page).await;
        let closed = page.close().await;
        match (outcome, closed) {
            (Ok(extraction), Ok(())) => Ok(extraction),
            (Ok(_), Err(close_err)) => Err(close_err),
            (Err(run_err), Ok(())) => Err(run_err),
            (Err(run_err), Err(close_err)) => {
                warn!("Session release also failed: {}", close_err);
                Err(run_err)
            }
        }
    }

    async fn drive(&self, page: &OpenPage) -> Result<Extraction, ExtractError> {
        let cfg = &self.config.extractor;

        page.navigate(&cfg.url).await?;

        let rows = page.locate_rows(&cfg.row_selector).await?;
        info!("Found {} row(s) matching '{}'", rows.len(), cfg.row_selector);

        if rows.is_empty() {
            if cfg.require_rows {
                return Err(ExtractError::ElementNotFound {
                    selector: cfg.row_selector.clone(),
                });
            }
            return Ok(Extraction::Table(vec![]));
        }

        if cfg.first_row_only {
            let first = &rows[0];
            let extracted = match &cfg.fields {
                FieldStrategy::Splice { start, count } => {
                    let text = page.row_text(first).await?;
                    fields::splice_fields(&text, *start, *count)
                }
                FieldStrategy::Columns { fields: rules } => {
                    let row = page.extract_row_text(first, &cfg.cell_selector).await?;
                    fields::column_fields(rules, &row.cells)
                }
            };
            return Ok(Extraction::FirstRow(extracted));
        }

        let mut out = Vec::with_capacity(rows.len());
        for handle in &rows {
            out.push(page.extract_row_text(handle, &cfg.cell_selector).await?);
        }
        Ok(Extraction::Table(out))
    }
}

/// A session in the Open state. Navigation, row location, and text
/// extraction are only reachable through this type; [`close`](Self::close)
/// consumes it, so the Closed state is terminal.
#[derive(Debug)]
pub struct OpenPage {
    session: Session,
}

impl OpenPage {
    /// Wraps an already-started session.
    pub fn from_session(session: Session) -> Self {
        Self { session }
    }

    pub async fn navigate(&self, url: &str) -> Result<(), ExtractError> {
        debug!("Navigating to {}", url);
        self.session
            .navigate(url)
            .await
            .map_err(|source| ExtractError::Navigation {
                url: url.to_string(),
                source,
            })
    }

    /// Finite snapshot of matching rows at call time; call again to
    /// re-query the page. An empty page yields an empty snapshot here;
    /// the at-least-one-row requirement is enforced by the run sequence.
    pub async fn locate_rows(&self, selector: &str) -> Result<Vec<RowHandle>, ExtractError> {
        let elements = self
            .session
            .find_elements(selector)
            .await
            .map_err(ExtractError::Extraction)?;
        Ok(elements.into_iter().map(RowHandle).collect())
    }

    /// Ordered cell texts under `row`, one per cell element in document
    /// order. Cells with no text yield an empty string, not an omission;
    /// a row with no matching cells yields an empty sequence, not a
    /// failure.
    pub async fn extract_row_text(
        &self,
        row: &RowHandle,
        cell_selector: &str,
    ) -> Result<Row, ExtractError> {
        let cells = self
            .session
            .find_elements_within(&row.0, cell_selector)
            .await
            .map_err(ExtractError::Extraction)?;

        let mut texts = Vec::with_capacity(cells.len());
        for cell in &cells {
            texts.push(
                self.session
                    .element_text(cell)
                    .await
                    .map_err(ExtractError::Extraction)?,
            );
        }
        Ok(Row { cells: texts })
    }

    /// Whole visible text of `row`, as the browser renders it.
    pub async fn row_text(&self, row: &RowHandle) -> Result<String, ExtractError> {
        self.session
            .element_text(&row.0)
            .await
            .map_err(ExtractError::Extraction)
    }

    /// Releases the session. Consuming `self` makes a second release
    /// unrepresentable.
    pub async fn close(self) -> Result<(), ExtractError> {
        self.session.quit().await.map_err(ExtractError::Close)
    }
}
